use crate::app::{App, ConfirmAction};
use crate::queue::{BatchReport, BatchRunner, WorkerMessage};
use crate::ui;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Show the queue view until the user leaves it. Returns the final report.
pub fn run_tui(
    runner: &BatchRunner,
    inputs: Vec<PathBuf>,
    rx: Receiver<WorkerMessage>,
) -> Result<BatchReport> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(runner, inputs, rx);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;

    app.wait_for_worker();
    app.queue
        .report
        .take()
        .context("Worker stopped without a report")
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        app.process_worker_messages();

        terminal.draw(|f| ui::render(f, app))?;

        // Handle input with timeout for progress updates
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key(app, key.code);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyCode) {
    if app.confirm_dialog.is_some() {
        handle_confirm_dialog_key(app, key);
        return;
    }

    if app.show_about {
        app.show_about = false;
        return;
    }

    match key {
        KeyCode::Esc if app.is_running() => app.ask(ConfirmAction::CancelBatch),
        KeyCode::Esc if app.show_log => app.show_log = false,
        KeyCode::Char('l') => app.show_log = !app.show_log,
        KeyCode::Char('a') => app.show_about = true,
        KeyCode::Char('q') if app.is_running() => app.ask(ConfirmAction::ExitApp),
        KeyCode::Char('q') | KeyCode::Enter if !app.is_running() => app.should_quit = true,
        _ => {}
    }
}

fn handle_confirm_dialog_key(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.confirm_dialog.take() {
                app.execute_confirm_action(action);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm_dialog = None;
        }
        KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
            app.confirm_selection = !app.confirm_selection;
        }
        KeyCode::Enter => {
            if app.confirm_selection {
                // Yes
                if let Some(action) = app.confirm_dialog.take() {
                    app.execute_confirm_action(action);
                }
            } else {
                // No
                app.confirm_dialog = None;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::queue::{RunStatus, WorkerMessage};
    use crate::utils::SystemActions;
    use std::sync::Arc;
    use std::sync::mpsc::{self, Sender};

    fn app() -> (App, Sender<WorkerMessage>) {
        let runner = BatchRunner::new(AppConfig::default(), Arc::new(SystemActions));
        let (tx, rx) = mpsc::channel();
        let app = App::new(
            &runner,
            vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")],
            rx,
        );
        (app, tx)
    }

    #[test]
    fn test_escape_asks_before_cancelling() {
        let (mut app, _tx) = app();

        handle_key(&mut app, KeyCode::Esc);
        assert_eq!(app.confirm_dialog, Some(ConfirmAction::CancelBatch));
        assert!(!app.cancel.is_cancelled());

        // Default answer is "No"
        handle_key(&mut app, KeyCode::Enter);
        assert!(app.confirm_dialog.is_none());
        assert!(!app.cancel.is_cancelled());

        handle_key(&mut app, KeyCode::Esc);
        handle_key(&mut app, KeyCode::Char('y'));
        assert!(app.cancel.is_cancelled());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_quit_only_without_confirmation_when_finished() {
        let (mut app, tx) = app();

        handle_key(&mut app, KeyCode::Char('q'));
        assert_eq!(app.confirm_dialog, Some(ConfirmAction::ExitApp));
        handle_key(&mut app, KeyCode::Char('n'));
        assert!(!app.should_quit);

        tx.send(WorkerMessage::Finished(crate::queue::BatchReport {
            run_id: "t".to_string(),
            status: RunStatus::Completed,
            total: 2,
            succeeded: 2,
            failures: Vec::new(),
            unfinished: 0,
            outputs: Vec::new(),
            output_bytes: 0,
            elapsed_secs: 0.5,
        }))
        .unwrap();
        app.process_worker_messages();
        assert!(!app.is_running());

        handle_key(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
        assert!(!app.cancel.is_cancelled());
    }

    #[test]
    fn test_log_and_about_toggles() {
        let (mut app, _tx) = app();
        handle_key(&mut app, KeyCode::Char('l'));
        assert!(app.show_log);
        handle_key(&mut app, KeyCode::Char('a'));
        assert!(app.show_about);
        // Any key closes the about box
        handle_key(&mut app, KeyCode::Char('l'));
        assert!(!app.show_about);
        assert!(app.show_log);
    }
}
