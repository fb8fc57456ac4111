use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

use crate::format::{format_bytes, format_percent};
use crate::system::snapshot::Snapshot;
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, snapshot: &Snapshot, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(35),
            Constraint::Percentage(35),
        ])
        .split(area);

    render_branding(frame, chunks[0], snapshot, theme);
    render_cpu_gauge(frame, chunks[1], snapshot, theme);
    render_memory_gauge(frame, chunks[2], snapshot, theme);
}

fn bordered<'a>(title: String, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ))
}

fn render_branding(frame: &mut Frame, area: Rect, snapshot: &Snapshot, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = Line::from(vec![
        Span::styled(
            " tbm ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Procs: {}", snapshot.process_count()),
            Style::default().fg(theme.text_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_cpu_gauge(frame: &mut Frame, area: Rect, snapshot: &Snapshot, theme: &Theme) {
    let usage = snapshot.cpu_usage;
    let gauge = Gauge::default()
        .block(bordered(" CPU ".to_string(), theme))
        .gauge_style(Style::default().fg(theme.cpu_gauge).bg(theme.gauge_unfilled))
        .ratio((usage.total / 100.0).clamp(0.0, 1.0))
        .label(format!(
            "{} (usr {} sys {})",
            format_percent(usage.total),
            format_percent(usage.user),
            format_percent(usage.system)
        ));
    frame.render_widget(gauge, area);
}

fn render_memory_gauge(frame: &mut Frame, area: Rect, snapshot: &Snapshot, theme: &Theme) {
    let memory = &snapshot.memory;
    let percent = memory.percent_used;
    let gauge = Gauge::default()
        .block(bordered(
            format!(" MEM  free {} ", format_bytes(memory.free)),
            theme,
        ))
        .gauge_style(
            Style::default()
                .fg(theme.load_color(percent))
                .bg(theme.gauge_unfilled),
        )
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(format!(
            "{}/{} ({})",
            format_bytes(memory.used),
            format_bytes(memory.total),
            format_percent(percent)
        ));
    frame.render_widget(gauge, area);
}
