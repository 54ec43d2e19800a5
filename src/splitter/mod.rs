pub mod command_builder;
pub mod ffmpeg;
pub mod progress;

pub use command_builder::{SplitSettings, plan_passes};
pub use ffmpeg::{PassResult, run_pass};
pub use progress::ProgressTracker;

use crate::config::ToolConfig;
use crate::queue::CancelToken;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of splitting one input file
#[derive(Debug, Clone, PartialEq)]
pub enum SplitResult {
    /// All planned outputs were written
    Success(Vec<PathBuf>),
    /// Cancelled mid-file
    Cancelled,
    /// A pass failed; later passes were not attempted
    Error(String),
}

/// Run every planned pass for one file, audio first.
///
/// `on_progress` receives the file's overall percentage, weighted evenly
/// across passes, so it never goes backwards between passes.
pub fn split_file(
    input: &Path,
    settings: &SplitSettings,
    tool: &ToolConfig,
    cancel: &CancelToken,
    on_progress: &mut dyn FnMut(f32),
) -> SplitResult {
    let passes = plan_passes(input, settings);
    if passes.is_empty() {
        return SplitResult::Error("Nothing to extract".to_string());
    }

    let pass_count = passes.len() as f32;
    let poll_interval = tool.poll_interval();
    let mut outputs = Vec::with_capacity(passes.len());

    for (i, pass) in passes.into_iter().enumerate() {
        let base = i as f32 * 100.0;
        let mut tracker = ProgressTracker::new();

        info!(
            "Extracting {} stream: {} -> {}",
            pass.kind.label(),
            input.display(),
            pass.output.display()
        );

        let result = run_pass(
            &tool.ffmpeg_path,
            &pass.args,
            &pass.output,
            cancel,
            poll_interval,
            &mut tracker,
            &mut |percent| on_progress((base + percent) / pass_count),
        );

        match result {
            PassResult::Success => {
                on_progress((base + 100.0) / pass_count);
                outputs.push(pass.output);
            }
            PassResult::Cancelled => return SplitResult::Cancelled,
            PassResult::Error(e) => {
                return SplitResult::Error(format!("{} pass: {}", pass.kind.label(), e));
            }
        }
    }

    SplitResult::Success(outputs)
}
