use super::common::log_level_color;
use crate::app::App;
use crate::queue::log::LogEntry;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render_log(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .margin(1)
        .split(f.area());

    let visible = chunks[0].height.saturating_sub(2) as usize;

    let lines: Vec<Line> = if app.log.is_empty() {
        vec![Line::from(Span::styled(
            "No entries yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        tail_lines(&app.log.entries(), visible)
    };

    let log = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Log ({} entries) ", app.log.len())),
    );
    f.render_widget(log, chunks[0]);

    let help = Paragraph::new(Line::from(vec![
        Span::styled("l", Style::default().fg(Color::Yellow)),
        Span::raw(" Back to queue"),
    ]));
    f.render_widget(help, chunks[1]);
}

/// Last `visible` rows of the log. Multi-line entries (stderr tails) take one
/// row per line, continuation lines indented.
fn tail_lines(entries: &[LogEntry], visible: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = entries
        .iter()
        .flat_map(|entry| {
            let style = Style::default().fg(log_level_color(entry.level));
            entry
                .to_string()
                .lines()
                .enumerate()
                .map(|(i, text)| {
                    let text = if i == 0 {
                        text.to_string()
                    } else {
                        format!("    {}", text)
                    };
                    Line::from(Span::styled(text, style))
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let skip = lines.len().saturating_sub(visible);
    lines.drain(..skip);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::LogLevel;
    use chrono::Local;

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            level,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_stderr_tail_gets_one_row_per_line() {
        let entries = vec![
            entry(LogLevel::Info, "Starting batch of 1 file(s)"),
            entry(LogLevel::Error, "a.mp4: audio pass: ffmpeg failed: one\ntwo\nthree"),
        ];

        let lines = tail_lines(&entries, 10);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3].to_string(), "    three");
    }

    #[test]
    fn test_only_last_rows_kept() {
        let entries = vec![
            entry(LogLevel::Info, "first"),
            entry(LogLevel::Error, "second\nthird\nfourth"),
        ];

        let lines = tail_lines(&entries, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].to_string(), "    fourth");
        assert!(lines[0].to_string().ends_with("third"));
    }
}
