use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Things done once a batch has produced output
pub trait PostRunActions: Send + Sync {
    /// Show the output directory to the user
    fn reveal(&self, dir: &Path);
    /// Audible "done" signal
    fn notify(&self);
}

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: &str = "xdg-open";

/// Platform file manager and terminal bell
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemActions;

impl PostRunActions for SystemActions {
    fn reveal(&self, dir: &Path) {
        match Command::new(OPENER)
            .arg(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(_) => info!("Revealed {}", dir.display()),
            Err(e) => warn!("Failed to open {} with {}: {}", dir.display(), OPENER, e),
        }
    }

    fn notify(&self) {
        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            warn!("Failed to ring terminal bell: {}", e);
        }
    }
}
