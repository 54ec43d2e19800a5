use crate::config::AppConfig;
use crate::error::AppError;
use crate::queue::job::SplitJob;
use crate::queue::state::RunStatus;
use crate::queue::{CancelToken, LogBuffer};
use crate::splitter::{self, SplitResult, SplitSettings};
use crate::utils::{PostRunActions, check_tool, format_file_size, has_enough_space};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;
use tracing::info_span;
use uuid::Uuid;

/// Messages sent from the worker thread to the front end
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// The tool is about to run for this file
    Started(usize),
    /// Per-file percentage
    Progress(usize, f32),
    /// All outputs for this file were written
    Done(usize, Vec<PathBuf>),
    /// Processing failed, the batch continues
    Error(usize, String),
    /// Stopped by the user while this file was running
    Cancelled(usize),
    /// Batch is over, always the last message
    Finished(BatchReport),
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub input: PathBuf,
    pub message: String,
}

/// Summary of one batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: String,
    pub status: RunStatus,
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<FileFailure>,
    /// Files that did not finish: not started, or cut short by cancellation
    pub unfinished: usize,
    pub outputs: Vec<PathBuf>,
    pub output_bytes: u64,
    pub elapsed_secs: f64,
}

impl BatchReport {
    fn new(run_id: Uuid, total: usize) -> Self {
        Self {
            run_id: run_id.to_string(),
            status: RunStatus::Running,
            total,
            succeeded: 0,
            failures: Vec::new(),
            unfinished: total,
            outputs: Vec::new(),
            output_bytes: 0,
            elapsed_secs: 0.0,
        }
    }

    fn record_success(&mut self, outputs: Vec<PathBuf>) {
        self.succeeded += 1;
        self.unfinished -= 1;
        self.output_bytes += outputs
            .iter()
            .filter_map(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .sum::<u64>();
        self.outputs.extend(outputs);
    }

    fn record_failure(&mut self, input: &Path, message: String) {
        self.unfinished -= 1;
        self.failures.push(FileFailure {
            input: input.to_path_buf(),
            message,
        });
    }
}

/// Owns everything a batch shares with the front end: the cancel token,
/// the run log and the post-run actions.
#[derive(Clone)]
pub struct BatchRunner {
    config: AppConfig,
    cancel: CancelToken,
    log: LogBuffer,
    actions: Arc<dyn PostRunActions>,
}

impl BatchRunner {
    pub fn new(config: AppConfig, actions: Arc<dyn PostRunActions>) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
            log: LogBuffer::new(),
            actions,
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn log(&self) -> LogBuffer {
        self.log.clone()
    }

    /// Validate the job, check the tool, and run the batch on a background
    /// thread. Returns the accepted inputs and the message stream.
    pub fn start(&self, job: SplitJob) -> Result<(Vec<PathBuf>, Receiver<WorkerMessage>), AppError> {
        let inputs = job.validate(&self.log)?;

        let version = check_tool(&self.config.tool.ffmpeg_path)?;
        self.log.info(format!("Using {}", version));
        self.check_disk_space(&inputs, &job.settings);

        let (tx, rx) = mpsc::channel();
        let runner = self.clone();
        let worker_inputs = inputs.clone();
        thread::Builder::new()
            .name("avsplit-worker".to_string())
            .spawn(move || {
                runner.run_worker(&worker_inputs, &job.settings, &tx);
            })?;

        Ok((inputs, rx))
    }

    fn check_disk_space(&self, inputs: &[PathBuf], settings: &SplitSettings) {
        let required: u64 = inputs
            .iter()
            .filter_map(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .sum();
        let Some(dir) = settings
            .output_dir
            .as_deref()
            .or_else(|| inputs.first().and_then(|p| p.parent()))
        else {
            return;
        };
        if !has_enough_space(dir, required) {
            self.log.warn(format!(
                "{} may not have room for {} of output",
                dir.display(),
                format_file_size(required)
            ));
        }
    }

    /// Process `inputs` in order. Blocks until the batch is over.
    pub fn run_worker(
        &self,
        inputs: &[PathBuf],
        settings: &SplitSettings,
        tx: &Sender<WorkerMessage>,
    ) -> BatchReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("batch", %run_id);
        let _enter = span.enter();

        let started = Instant::now();
        let mut report = BatchReport::new(run_id, inputs.len());
        let mut cancelled = false;

        self.log
            .info(format!("Starting batch of {} file(s)", inputs.len()));

        for (index, input) in inputs.iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let _ = tx.send(WorkerMessage::Started(index));
            let tx_progress = tx.clone();

            let result = splitter::split_file(
                input,
                settings,
                &self.config.tool,
                &self.cancel,
                &mut |progress| {
                    let _ = tx_progress.send(WorkerMessage::Progress(index, progress));
                },
            );

            match result {
                SplitResult::Success(outputs) => {
                    self.log.info(format!("Split {}", input.display()));
                    report.record_success(outputs.clone());
                    let _ = tx.send(WorkerMessage::Done(index, outputs));
                }
                SplitResult::Cancelled => {
                    self.log
                        .warn(format!("Cancelled while splitting {}", input.display()));
                    let _ = tx.send(WorkerMessage::Cancelled(index));
                    cancelled = true;
                    break;
                }
                SplitResult::Error(e) => {
                    self.log.error(format!("{}: {}", input.display(), e));
                    report.record_failure(input, e.clone());
                    let _ = tx.send(WorkerMessage::Error(index, e));
                }
            }
        }

        // A cancel that lands after the last pass closed its output still counts
        let cancelled = cancelled || self.cancel.is_cancelled();

        report.elapsed_secs = started.elapsed().as_secs_f64();
        report.status = if cancelled {
            RunStatus::Cancelled
        } else if report.failures.is_empty() {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };

        self.log.info(format!(
            "Batch finished: {} succeeded, {} failed, {} unfinished",
            report.succeeded,
            report.failures.len(),
            report.unfinished
        ));

        if !cancelled && !report.outputs.is_empty() {
            self.run_post_actions(settings, &report);
        }

        let _ = tx.send(WorkerMessage::Finished(report.clone()));
        report
    }

    fn run_post_actions(&self, settings: &SplitSettings, report: &BatchReport) {
        if self.config.notify.reveal_output {
            let dir = settings
                .output_dir
                .clone()
                .or_else(|| report.outputs.first().and_then(|p| p.parent()).map(Path::to_path_buf));
            if let Some(dir) = dir {
                self.actions.reveal(&dir);
            }
        }
        if self.config.notify.sound {
            self.actions.notify();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::splitter::ffmpeg::test_support::*;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingActions {
        calls: Mutex<Vec<String>>,
    }

    impl PostRunActions for RecordingActions {
        fn reveal(&self, dir: &Path) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("reveal {}", dir.display()));
        }

        fn notify(&self) {
            self.calls.lock().unwrap().push("notify".to_string());
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        actions: Arc<RecordingActions>,
        runner: BatchRunner,
        inputs: Vec<PathBuf>,
    }

    fn fixture(tool_body: &str, files: usize) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), tool_body);
        let inputs: Vec<PathBuf> = (0..files)
            .map(|i| {
                let path = dir.path().join(format!("clip{}.mp4", i));
                std::fs::write(&path, b"not really a video").unwrap();
                path
            })
            .collect();

        let mut config = AppConfig::default();
        config.tool.ffmpeg_path = tool.to_string_lossy().to_string();
        config.tool.poll_interval_ms = 20;

        let actions = Arc::new(RecordingActions::default());
        let runner = BatchRunner::new(config, actions.clone());
        Fixture {
            dir,
            actions,
            runner,
            inputs,
        }
    }

    fn collect(rx: Receiver<WorkerMessage>) -> (Vec<WorkerMessage>, BatchReport) {
        let mut messages = Vec::new();
        loop {
            match rx.recv_timeout(Duration::from_secs(30)).unwrap() {
                WorkerMessage::Finished(report) => return (messages, report),
                other => messages.push(other),
            }
        }
    }

    #[test]
    fn test_all_failing_batch_completes() {
        let fx = fixture(FAILING, 3);
        let (tx, rx) = mpsc::channel();

        let report = fx
            .runner
            .run_worker(&fx.inputs, &SplitSettings::default(), &tx);

        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(report.failures.len(), 3);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.unfinished, 0);
        assert_eq!(
            fx.runner.log().count(crate::queue::LogLevel::Error),
            3
        );

        drop(tx);
        let errors = rx
            .iter()
            .filter(|m| matches!(m, WorkerMessage::Error(..)))
            .count();
        assert_eq!(errors, 3);
        assert!(fx.actions.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_successful_batch_runs_post_actions() {
        let fx = fixture(PROGRESSING, 2);
        let settings = SplitSettings {
            output_dir: Some(fx.dir.path().to_path_buf()),
            ..Default::default()
        };
        let job = SplitJob::new(fx.inputs.clone(), settings);

        let (accepted, rx) = fx.runner.start(job).unwrap();
        assert_eq!(accepted, fx.inputs);

        let (messages, report) = collect(rx);
        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.outputs.len(), 4);

        for index in 0..2 {
            let progress: Vec<f32> = messages
                .iter()
                .filter_map(|m| match m {
                    WorkerMessage::Progress(i, p) if *i == index => Some(*p),
                    _ => None,
                })
                .collect();
            assert!(!progress.is_empty());
            assert!(progress.windows(2).all(|w| w[0] <= w[1]));
            assert!(progress.iter().all(|p| (0.0..=100.0).contains(p)));
        }

        let calls = fx.actions.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                format!("reveal {}", fx.dir.path().display()),
                "notify".to_string()
            ]
        );
    }

    #[test]
    fn test_cancel_stops_batch_and_skips_post_actions() {
        let fx = fixture(ENDLESS, 3);
        let cancel = fx.runner.cancel_token();
        let job = SplitJob::new(fx.inputs.clone(), SplitSettings::default());

        let (_, rx) = fx.runner.start(job).unwrap();

        let mut started = 0;
        let report = loop {
            match rx.recv_timeout(Duration::from_secs(30)).unwrap() {
                WorkerMessage::Started(_) => started += 1,
                WorkerMessage::Progress(..) => cancel.cancel(),
                WorkerMessage::Finished(report) => break report,
                _ => {}
            }
        };

        assert_eq!(started, 1);
        assert_eq!(report.status, RunStatus::Cancelled);
        assert_eq!(report.unfinished, 3);
        assert!(fx.actions.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_after_output_closed_still_cancels() {
        // The tool closes stderr right away, then keeps running
        let fx = fixture("exec 2>&-\nsleep 1\nexit 0", 1);
        let settings = SplitSettings {
            video_format: crate::config::VideoFormat::Off,
            ..Default::default()
        };
        let trigger = fx.runner.cancel_token();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            trigger.cancel();
        });

        let (tx, _rx) = mpsc::channel();
        let report = fx.runner.run_worker(&fx.inputs, &settings, &tx);
        canceller.join().unwrap();

        assert_eq!(report.status, RunStatus::Cancelled);
        assert!(fx.actions.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_disabled_notifications() {
        let mut fx = fixture(PROGRESSING, 1);
        let mut config = fx.runner.config.clone();
        config.notify.reveal_output = false;
        config.notify.sound = false;
        fx.runner = BatchRunner::new(config, fx.actions.clone());

        let (tx, _rx) = mpsc::channel();
        let report = fx
            .runner
            .run_worker(&fx.inputs, &SplitSettings::default(), &tx);

        assert_eq!(report.status, RunStatus::Completed);
        assert!(fx.actions.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_job_rejected_before_tool_check() {
        let mut config = AppConfig::default();
        config.tool.ffmpeg_path = "/nonexistent/ffmpeg".to_string();
        let runner = BatchRunner::new(config, Arc::new(RecordingActions::default()));

        let empty = SplitJob::new(Vec::new(), SplitSettings::default());
        assert!(matches!(runner.start(empty), Err(AppError::InvalidJob(_))));

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.mp4");
        std::fs::write(&input, b"").unwrap();
        let job = SplitJob::new(vec![input], SplitSettings::default());
        assert!(matches!(runner.start(job), Err(AppError::ToolMissing { .. })));
    }

    #[test]
    fn test_all_invalid_inputs_spawn_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("spawned");
        let tool = dir.path().join("marker-ffmpeg");
        std::fs::write(
            &tool,
            format!("#!/bin/sh\ntouch '{}'\nexit 0\n", marker.display()),
        )
        .unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"").unwrap();

        let mut config = AppConfig::default();
        config.tool.ffmpeg_path = tool.to_string_lossy().to_string();
        let runner = BatchRunner::new(config, Arc::new(RecordingActions::default()));

        let job = SplitJob::new(
            vec![notes, dir.path().join("missing.mp4")],
            SplitSettings::default(),
        );
        assert!(matches!(runner.start(job), Err(AppError::InvalidJob(_))));
        assert!(!marker.exists());
        assert_eq!(runner.log().count(crate::queue::LogLevel::Warn), 2);
    }
}
