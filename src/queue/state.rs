use super::job::FileStatus;
use super::worker::{BatchReport, WorkerMessage};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Overall state of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Idle,
    Running,
    Cancelled,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            RunStatus::Cancelled | RunStatus::Completed | RunStatus::Failed
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RunStatus::Idle => "Idle",
            RunStatus::Running => "Running",
            RunStatus::Cancelled => "Cancelled",
            RunStatus::Completed => "Completed",
            RunStatus::Failed => "Finished with errors",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub status: FileStatus,
}

impl FileEntry {
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Front-end view of a batch, built from worker messages
pub struct QueueState {
    pub files: Vec<FileEntry>,
    pub status: RunStatus,
    pub current_index: Option<usize>,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
    pub report: Option<BatchReport>,
}

impl QueueState {
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            files: inputs
                .into_iter()
                .map(|path| FileEntry {
                    path,
                    status: FileStatus::Pending,
                })
                .collect(),
            status: RunStatus::Idle,
            current_index: None,
            start_time: None,
            end_time: None,
            report: None,
        }
    }

    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.start_time = Some(Instant::now());
        self.end_time = None;
    }

    /// Fold one worker message into the view
    pub fn apply(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Started(index) => {
                self.current_index = Some(index);
                self.set_status(index, FileStatus::Splitting { progress: 0.0 });
            }
            WorkerMessage::Progress(index, progress) => {
                let current = self.files.get(index).map(|f| f.status.progress());
                if let Some(current) = current
                    && progress >= current
                {
                    self.set_status(index, FileStatus::Splitting { progress });
                }
            }
            WorkerMessage::Done(index, _) => self.set_status(index, FileStatus::Done),
            WorkerMessage::Error(index, message) => {
                self.set_status(index, FileStatus::Error { message })
            }
            WorkerMessage::Cancelled(index) => {
                let progress = self
                    .files
                    .get(index)
                    .map(|f| f.status.progress())
                    .unwrap_or(0.0);
                self.set_status(index, FileStatus::Cancelled { progress });
            }
            WorkerMessage::Finished(report) => {
                for file in &mut self.files {
                    if file.status == FileStatus::Pending {
                        file.status = FileStatus::Skipped {
                            reason: "not started".to_string(),
                        };
                    }
                }
                self.status = report.status;
                self.end_time = Some(Instant::now());
                self.current_index = None;
                self.report = Some(report);
            }
        }
    }

    fn set_status(&mut self, index: usize, status: FileStatus) {
        if let Some(file) = self.files.get_mut(index) {
            file.status = status;
        }
    }

    pub fn current_file(&self) -> Option<&FileEntry> {
        self.current_index.and_then(|i| self.files.get(i))
    }

    pub fn elapsed_time(&self) -> Option<Duration> {
        self.start_time.map(|start| {
            self.end_time
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Batch percentage: finished files count fully, the running one partially
    pub fn overall_progress(&self) -> f32 {
        if self.files.is_empty() {
            return 0.0;
        }

        let total: f32 = self.files.iter().map(|f| f.status.progress()).sum();
        (total / self.files.len() as f32).min(100.0)
    }

    pub fn estimated_time_remaining(&self) -> Option<Duration> {
        let progress = self.overall_progress();
        if progress <= 0.0 || progress >= 100.0 || self.status != RunStatus::Running {
            return None;
        }
        let elapsed = self.elapsed_time()?;
        let elapsed_secs = elapsed.as_secs_f64();
        let total_estimated_secs = elapsed_secs / (progress as f64 / 100.0);
        let remaining_secs = total_estimated_secs - elapsed_secs;
        if remaining_secs > 0.0 {
            Some(Duration::from_secs_f64(remaining_secs))
        } else {
            None
        }
    }

    /// (done, failed, other terminal)
    pub fn counts(&self) -> (usize, usize, usize) {
        self.files
            .iter()
            .fold((0, 0, 0), |(done, failed, other), f| match f.status {
                FileStatus::Done => (done + 1, failed, other),
                FileStatus::Error { .. } => (done, failed + 1, other),
                FileStatus::Skipped { .. } | FileStatus::Cancelled { .. } => {
                    (done, failed, other + 1)
                }
                _ => (done, failed, other),
            })
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }
}
