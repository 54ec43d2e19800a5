pub mod cancel;
pub mod job;
pub mod log;
pub mod state;
pub mod worker;

pub use cancel::CancelToken;
pub use job::{FileStatus, SplitJob, collect_inputs};
pub use log::{LogBuffer, LogLevel};
pub use state::{FileEntry, QueueState, RunStatus};
pub use worker::{BatchReport, BatchRunner, WorkerMessage};
