//! Dua detail screen rendering
//!
//! Renders a single dua as a scrollable card: Arabic text, transliteration,
//! translation, and source reference, plus the recitation status line.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Colors for the detail card sections
mod colors {
    use ratatui::style::Color;

    /// Card title
    pub const TITLE: Color = Color::Cyan;
    /// Arabic script
    pub const ARABIC: Color = Color::White;
    /// Transliteration
    pub const TRANSLITERATION: Color = Color::Blue;
    /// Translation body
    pub const TRANSLATION: Color = Color::White;
    /// Source reference
    pub const REFERENCE: Color = Color::DarkGray;
    /// Favorite marker
    pub const FAVORITE: Color = Color::Red;
    /// Playback status
    pub const PLAYING: Color = Color::Green;
    /// Hints and secondary text
    pub const SECONDARY: Color = Color::DarkGray;
}

/// Renders the dua detail screen
pub fn render(frame: &mut Frame, app: &App, index: usize) {
    if app.duas.get(index).is_none() {
        return;
    }
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // card
            Constraint::Length(2), // toast + hints
        ])
        .split(area);

    render_card(frame, app, index, chunks[0]);
    render_footer(frame, app, chunks[1]);
}

fn render_card(frame: &mut Frame, app: &App, index: usize, area: Rect) {
    let dua = &app.duas[index];

    let mut title_spans = vec![Span::styled(
        dua.title.clone(),
        Style::default()
            .fg(colors::TITLE)
            .add_modifier(Modifier::BOLD),
    )];
    if app.is_favorite(dua) {
        title_spans.push(Span::styled(" ♥", Style::default().fg(colors::FAVORITE)));
    }

    let mut lines: Vec<Line> = Vec::new();

    if let Some(arabic) = dua.arabic.as_deref() {
        lines.push(Line::from(""));
        for text_line in arabic.lines() {
            lines.push(Line::from(Span::styled(
                text_line.to_string(),
                Style::default()
                    .fg(colors::ARABIC)
                    .add_modifier(Modifier::BOLD),
            )));
        }
    }

    if let Some(transliteration) = dua.transliteration.as_deref() {
        lines.push(Line::from(""));
        for text_line in transliteration.lines() {
            lines.push(Line::from(Span::styled(
                text_line.to_string(),
                Style::default()
                    .fg(colors::TRANSLITERATION)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
    }

    if let Some(translation) = dua.translation.as_deref() {
        lines.push(Line::from(""));
        for text_line in translation.lines() {
            lines.push(Line::from(Span::styled(
                text_line.to_string(),
                Style::default().fg(colors::TRANSLATION),
            )));
        }
    }

    if let Some(reference) = dua.reference.as_deref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("— {}", reference),
            Style::default().fg(colors::REFERENCE),
        )));
    }

    lines.push(Line::from(""));
    lines.push(playback_line(app, dua));

    let card = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(title_spans)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll_offset, 0));
    frame.render_widget(card, area);
}

fn playback_line<'a>(app: &App, dua: &crate::data::Dua) -> Line<'a> {
    match (&dua.audio, app.playback.is_playing(&dua.favorite_key())) {
        (Some(_), true) => Line::from(Span::styled(
            "▶ Recitation handed to system player — p to clear",
            Style::default().fg(colors::PLAYING),
        )),
        (Some(_), false) => Line::from(Span::styled(
            "p — play recitation",
            Style::default().fg(colors::SECONDARY),
        )),
        (None, _) => Line::from(Span::styled(
            "No recitation available",
            Style::default().fg(colors::SECONDARY),
        )),
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let status = match &app.toast {
        Some(toast) => Span::styled(toast.message.clone(), Style::default().fg(Color::Green)),
        None => Span::raw(""),
    };

    let hints = Span::styled(
        "j/k scroll · h/l prev/next · f fav · p play · c copy · Esc back · q quit",
        Style::default().fg(colors::SECONDARY),
    );

    let footer = Paragraph::new(vec![Line::from(status), Line::from(hints)]);
    frame.render_widget(footer, area);
}
