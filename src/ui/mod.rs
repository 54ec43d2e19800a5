mod about;
mod common;
mod confirm_dialog;
mod log_view;
mod queue;

use crate::app::App;
use ratatui::Frame;

pub fn render(f: &mut Frame, app: &App) {
    if app.show_log {
        log_view::render_log(f, app);
    } else {
        queue::render_queue(f, app);
    }

    // Overlays
    if app.show_about {
        about::render_about(f);
    }
    if app.confirm_dialog.is_some() {
        confirm_dialog::render_confirm_dialog(f, app);
    }
}
