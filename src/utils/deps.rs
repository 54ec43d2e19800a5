use crate::error::AppError;
use std::process::{Command, Stdio};

/// Make sure the external tool runs. Returns its version banner.
pub fn check_tool(tool: &str) -> Result<String, AppError> {
    let output = Command::new(tool)
        .arg("-version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| AppError::ToolMissing {
            tool: tool.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(AppError::ToolMissing {
            tool: tool.to_string(),
            message: format!("exited with {}", output.status),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().next().unwrap_or(tool).trim().to_string())
}
