//! Application Module
//!
//! State behind the terminal queue view.

use crate::queue::{BatchRunner, CancelToken, LogBuffer, QueueState, WorkerMessage};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};

/// Confirmation dialog action
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    CancelBatch,
    ExitApp,
}

/// Main application state
pub struct App {
    pub queue: QueueState,
    pub log: LogBuffer,
    pub cancel: CancelToken,
    receiver: Receiver<WorkerMessage>,
    worker_gone: bool,

    pub should_quit: bool,
    pub show_log: bool,
    pub show_about: bool,
    pub confirm_dialog: Option<ConfirmAction>,
    /// true = "Yes" highlighted
    pub confirm_selection: bool,
}

impl App {
    pub fn new(
        runner: &BatchRunner,
        inputs: Vec<PathBuf>,
        receiver: Receiver<WorkerMessage>,
    ) -> Self {
        let mut queue = QueueState::new(inputs);
        queue.start();

        Self {
            queue,
            log: runner.log(),
            cancel: runner.cancel_token(),
            receiver,
            worker_gone: false,
            should_quit: false,
            show_log: false,
            show_about: false,
            confirm_dialog: None,
            confirm_selection: false,
        }
    }

    /// Drain everything the worker has sent since the last frame
    pub fn process_worker_messages(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(message) => self.queue.apply(message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.worker_gone = true;
                    break;
                }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        !self.queue.is_finished() && !self.worker_gone
    }

    pub fn cancel_batch(&mut self) {
        if self.is_running() && !self.cancel.is_cancelled() {
            self.log.warn("Cancellation requested");
            self.cancel.cancel();
        }
    }

    pub fn ask(&mut self, action: ConfirmAction) {
        self.confirm_dialog = Some(action);
        self.confirm_selection = false; // Default to "No"
    }

    pub fn execute_confirm_action(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::CancelBatch => self.cancel_batch(),
            ConfirmAction::ExitApp => {
                self.cancel_batch();
                self.should_quit = true;
            }
        }
    }

    /// Block until the worker has sent its final report. Used on exit so no
    /// tool process outlives the UI.
    pub fn wait_for_worker(&mut self) {
        while !self.queue.is_finished() {
            match self.receiver.recv() {
                Ok(message) => self.queue.apply(message),
                Err(_) => break,
            }
        }
    }
}
