use super::common::{gauge_percent, run_status_color, status_color};
use crate::app::App;
use crate::queue::{FileEntry, FileStatus, RunStatus};
use crate::utils::{format_duration, format_file_size};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};

pub fn render_queue(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(f.area());

    let queue = &app.queue;

    // Title with progress summary
    let (done, failed, other) = queue.counts();
    let title = Paragraph::new(format!(
        "Split Queue ({}/{})  {}",
        done + failed + other,
        queue.files.len(),
        queue.status
    ))
    .style(
        Style::default()
            .fg(run_status_color(queue.status))
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(title, chunks[0]);

    // File list
    let items: Vec<ListItem> = queue
        .files
        .iter()
        .enumerate()
        .map(|(i, file)| create_queue_item(file, queue.current_index == Some(i)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Files "),
    );
    f.render_widget(list, chunks[1]);

    render_current_file(f, app, chunks[2]);
    render_overall(f, app, chunks[3]);

    // Help
    let mut help = vec![
        Span::styled("l", Style::default().fg(Color::Yellow)),
        Span::raw(" Log  "),
        Span::styled("a", Style::default().fg(Color::Yellow)),
        Span::raw(" About  "),
    ];
    if app.is_running() {
        help.extend([
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Stop"),
        ]);
    } else {
        help.extend([
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ]);
    }
    let help = Paragraph::new(Line::from(help)).alignment(Alignment::Center);
    f.render_widget(help, chunks[4]);
}

fn render_current_file(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    match app.queue.current_file() {
        Some(file) => {
            let progress = file.status.progress();
            let gauge = Gauge::default()
                .block(block.title(format!(" {} ", file.filename())))
                .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
                .percent(gauge_percent(progress))
                .label(format!("{:.1}%", progress));
            f.render_widget(gauge, area);
        }
        None => {
            let text = match &app.queue.report {
                Some(report) => format!(
                    "{} output file(s), {} written",
                    report.outputs.len(),
                    format_file_size(report.output_bytes)
                ),
                None => "Waiting...".to_string(),
            };
            let status = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block.title(" Status "));
            f.render_widget(status, area);
        }
    }
}

fn render_overall(f: &mut Frame, app: &App, area: Rect) {
    let queue = &app.queue;
    let progress = queue.overall_progress();

    let elapsed_str = queue
        .elapsed_time()
        .map(format_duration)
        .unwrap_or_else(|| "--:--".to_string());
    let eta_str = queue
        .estimated_time_remaining()
        .map(format_duration)
        .unwrap_or_else(|| "--:--".to_string());

    let label = format!(
        "{:.1}%  |  Elapsed: {}  |  ETA: {}",
        progress, elapsed_str, eta_str
    );

    let color = match queue.status {
        RunStatus::Running | RunStatus::Idle => Color::Blue,
        other => run_status_color(other),
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Batch "),
        )
        .gauge_style(Style::default().fg(color).bg(Color::DarkGray))
        .percent(gauge_percent(progress))
        .label(label);
    f.render_widget(gauge, area);
}

fn create_queue_item(file: &FileEntry, is_current: bool) -> ListItem<'static> {
    let bold_mod = if is_current {
        Modifier::BOLD
    } else {
        Modifier::empty()
    };
    let name = file.filename();

    let text = match &file.status {
        FileStatus::Pending => format!("  ○ {}", name),
        FileStatus::Splitting { progress } => format!("  ▶ {} {:.1}%", name, progress),
        FileStatus::Done => format!("  ✓ {} Done", name),
        FileStatus::Skipped { reason } => format!("  ⊘ {} ({})", name, reason),
        FileStatus::Error { message } => format!(
            "  ✗ {} Error: {}",
            name,
            message.lines().last().unwrap_or_default()
        ),
        FileStatus::Cancelled { progress } => {
            format!("  ■ {} Cancelled at {:.1}%", name, progress)
        }
    };

    ListItem::new(text).style(
        Style::default()
            .fg(status_color(&file.status))
            .add_modifier(bold_mod),
    )
}
