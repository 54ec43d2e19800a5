use crate::error::AppError;
use crate::queue::CancelToken;
use crate::splitter::progress::{OutputLines, ProgressTracker};
use std::collections::VecDeque;
use std::io::BufReader;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lines of stderr kept for the failure message
const TAIL_LINES: usize = 5;

/// Outcome of a single tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum PassResult {
    /// Tool exited with status 0
    Success,
    /// Cancelled by the user, process killed
    Cancelled,
    /// Tool could not be started or exited non-zero
    Error(String),
}

/// Run the tool once and supervise it until it exits or the token fires.
///
/// Stderr is forwarded line by line from a reader thread so the token is
/// also checked when the tool goes quiet for longer than `poll_interval`.
pub fn run_pass(
    tool: &str,
    args: &[String],
    output: &Path,
    cancel: &CancelToken,
    poll_interval: Duration,
    tracker: &mut ProgressTracker,
    on_progress: &mut dyn FnMut(f32),
) -> PassResult {
    if cancel.is_cancelled() {
        return PassResult::Cancelled;
    }

    debug!("Running {} {}", tool, args.join(" "));

    let mut command = Command::new(tool);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    // Own process group: a terminal Ctrl-C goes to us, and we kill the tool
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = match command.spawn() {
        Ok(c) => c,
        Err(source) => {
            let err = AppError::Spawn {
                tool: tool.to_string(),
                source,
            };
            return PassResult::Error(err.to_string());
        }
    };

    let Some(stderr) = child.stderr.take() else {
        kill_child(&mut child);
        return PassResult::Error(format!("Failed to capture {} output", tool));
    };

    let (line_tx, line_rx) = mpsc::channel::<String>();
    let reader = thread::spawn(move || {
        for line in OutputLines::new(BufReader::new(stderr)) {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut tail: VecDeque<String> = VecDeque::with_capacity(TAIL_LINES);

    loop {
        if cancel.is_cancelled() {
            info!("Cancelling {} for {}", tool, output.display());
            kill_child(&mut child);
            // The reader thread ends on its own once the pipe closes
            drop(reader);
            remove_partial(output);
            return PassResult::Cancelled;
        }

        match line_rx.recv_timeout(poll_interval) {
            Ok(line) => {
                if let Some(percent) = tracker.feed(&line) {
                    on_progress(percent);
                }
                if tail.len() == TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let _ = reader.join();

    match child.wait() {
        Ok(status) if status.success() => {
            debug!(
                "{} finished {} (duration {:?}s, last progress {:.1}%)",
                tool,
                output.display(),
                tracker.duration(),
                tracker.percent()
            );
            PassResult::Success
        }
        Ok(status) => {
            remove_partial(output);
            let detail = if tail.is_empty() {
                format!("exit status {}", status)
            } else {
                tail.into_iter().collect::<Vec<_>>().join("\n")
            };
            let err = AppError::ToolFailed {
                tool: tool.to_string(),
                detail,
            };
            PassResult::Error(err.to_string())
        }
        Err(e) => PassResult::Error(format!("Failed to wait for {}: {}", tool, e)),
    }
}

fn kill_child(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!("Failed to kill tool process: {}", e);
    }
    let _ = child.wait();
}

fn remove_partial(output: &Path) {
    if output.exists() && std::fs::remove_file(output).is_ok() {
        debug!("Removed partial output {}", output.display());
    }
}
