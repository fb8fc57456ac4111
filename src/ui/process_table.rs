use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table};

use crate::app::App;
use crate::format::{format_bytes, format_percent, truncate_unicode};

const USER_WIDTH: usize = 10;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let title = if app.filter_text.is_empty() {
        format!(
            " Processes  {} {} ",
            app.sort_by.label(),
            if app.sort_descending { "\u{2193}" } else { "\u{2191}" }
        )
    } else {
        format!(" Matches for \"{}\": {} ", app.filter_text, app.rows.len())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ));

    let header = Row::new(["PID", "Name", "CPU%", "MEM%", "Memory", "User", "State"]).style(
        Style::default()
            .fg(theme.table_header_fg)
            .add_modifier(Modifier::BOLD),
    );

    let selected = app.selected_index.checked_sub(app.scroll_offset);
    let rows: Vec<Row> = app
        .visible_rows()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let style = if Some(i) == selected {
                Style::default()
                    .fg(theme.selection_fg)
                    .bg(theme.selection_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text_primary)
            };
            Row::new([
                Cell::from(p.pid.to_string()),
                Cell::from(p.name.clone()),
                Cell::from(format_percent(p.cpu_percent)),
                Cell::from(format_percent(p.memory_percent)),
                Cell::from(format_bytes(p.memory_bytes)),
                Cell::from(truncate_unicode(&p.user, USER_WIDTH)),
                Cell::from(p.state.to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Min(12),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(11),
        Constraint::Length(USER_WIDTH as u16),
        Constraint::Length(5),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}
