use super::common::centered_rect;
use ratatui::{
    Frame,
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

pub fn render_about(f: &mut Frame) {
    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(format!("avsplit {}", env!("CARGO_PKG_VERSION"))),
        Line::from(""),
        Line::from("Splits video files into separate audio and video streams."),
        Line::from("All media work is done by ffmpeg."),
        Line::from(""),
        Line::from("Press any key to close"),
    ];

    let about = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" About ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
    );
    f.render_widget(about, area);
}
