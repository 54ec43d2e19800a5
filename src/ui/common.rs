use crate::queue::{FileStatus, LogLevel, RunStatus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
};

/// Create a centered rectangle within a given area
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn status_color(status: &FileStatus) -> Color {
    match status {
        FileStatus::Pending => Color::DarkGray,
        FileStatus::Splitting { .. } => Color::Cyan,
        FileStatus::Done => Color::Green,
        FileStatus::Skipped { .. } | FileStatus::Cancelled { .. } => Color::Yellow,
        FileStatus::Error { .. } => Color::Red,
    }
}

pub fn run_status_color(status: RunStatus) -> Color {
    match status {
        RunStatus::Idle | RunStatus::Running => Color::Cyan,
        RunStatus::Completed => Color::Green,
        RunStatus::Cancelled => Color::Yellow,
        RunStatus::Failed => Color::Red,
    }
}

pub fn log_level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Info => Color::White,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Error => Color::Red,
    }
}

/// Gauge percent, clamped so the widget never panics
pub fn gauge_percent(progress: f32) -> u16 {
    progress.clamp(0.0, 100.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_percent_clamped() {
        assert_eq!(gauge_percent(-3.0), 0);
        assert_eq!(gauge_percent(42.9), 42);
        assert_eq!(gauge_percent(250.0), 100);
    }

    #[test]
    fn test_centered_rect_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(50, 30, area);
        assert_eq!(popup.width, 50);
        assert!(popup.x >= 25 && popup.y >= 17);
    }
}
