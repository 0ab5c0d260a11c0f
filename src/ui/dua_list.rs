//! Dua list screen rendering
//!
//! Renders the main list view: a tab row over the subcategory's duas with
//! favorite and playback markers, an offline banner when the content came
//! from the local store, and a footer with key hints.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, ContentSource, Tab};

/// Renders the dua list screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header: title, tabs, banner
            Constraint::Min(1),    // item list
            Constraint::Length(2), // toast + key hints
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_items(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.subcategory.name.is_empty() {
        "Duaread".to_string()
    } else {
        format!("Duaread — {}", app.subcategory.name)
    };

    let mut lines = vec![
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        tab_line(app.tab),
    ];

    match &app.source {
        Some(ContentSource::OfflineCopy { since }) => {
            lines.push(Line::from(Span::styled(
                offline_banner(since.as_ref()),
                Style::default().fg(Color::Yellow),
            )));
        }
        _ => {
            if let Some(description) = app.subcategory.description.as_deref() {
                lines.push(Line::from(Span::styled(
                    description.to_string(),
                    Style::default().fg(Color::Gray),
                )));
            }
        }
    }

    let header = Paragraph::new(lines).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn tab_line(active: Tab) -> Line<'static> {
    let tab_span = |label: &str, is_active: bool| {
        if is_active {
            Span::styled(
                format!(" {} ", label),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::Gray))
        }
    };

    Line::from(vec![
        tab_span("All", active == Tab::All),
        Span::raw(" "),
        tab_span("Favorites", active == Tab::Favorites),
    ])
}

fn offline_banner(since: Option<&DateTime<Utc>>) -> String {
    match since {
        Some(at) => format!(
            "Offline copy · saved {}",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        None => "Offline copy".to_string(),
    }
}

fn render_items(frame: &mut Frame, app: &App, area: Rect) {
    let visible = app.visible_indices();

    if visible.is_empty() {
        let message = match app.tab {
            Tab::Favorites => "No favorites yet — press f on a dua to keep it here",
            Tab::All => "No duas in this subcategory",
        };
        let empty = Paragraph::new(Span::styled(message, Style::default().fg(Color::Gray)))
            .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    let mut lines = Vec::with_capacity(visible.len());
    for (row, &index) in visible.iter().enumerate() {
        let dua = &app.duas[index];
        let selected = row == app.selected_index;

        let favorite_marker = if app.is_favorite(dua) {
            Span::styled("♥ ", Style::default().fg(Color::Red))
        } else {
            Span::raw("  ")
        };
        let playing_marker = if app.playback.is_playing(&dua.favorite_key()) {
            Span::styled("▶ ", Style::default().fg(Color::Green))
        } else {
            Span::raw("  ")
        };

        let title_style = if selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let mut spans = vec![
            favorite_marker,
            playing_marker,
            Span::styled(dua.title.clone(), title_style),
        ];
        if let Some(snippet) = dua.snippet() {
            spans.push(Span::styled(
                format!("  — {}", snippet),
                Style::default().fg(Color::Gray),
            ));
        }
        lines.push(Line::from(spans));
    }

    let list = Paragraph::new(lines);
    frame.render_widget(list, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let status = match &app.toast {
        Some(toast) => Span::styled(
            toast.message.clone(),
            Style::default().fg(Color::Green),
        ),
        None => match app.last_refresh {
            Some(at) => Span::styled(
                format!("Updated {}", at.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ),
            None => Span::raw(""),
        },
    };

    let hints = Span::styled(
        "↑/k ↓/j move · Enter open · Tab favorites · f fav · p play · c copy · r refresh · ? help · q quit",
        Style::default().fg(Color::DarkGray),
    );

    let footer = Paragraph::new(vec![Line::from(status), Line::from(hints)]);
    frame.render_widget(footer, area);
}
