mod cards;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::sequencer::Phase;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_section_title(frame, chunks[1]);
    cards::render(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(Line::from(vec![Span::styled(
        format!("anivault - {}", app.catalog().name()),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_section_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Span::styled(
        "Explore Anime",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(title, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Green),
        )])
    } else {
        let feed = match app.sequencer.phase() {
            Phase::Exhausted => "all loaded".to_string(),
            Phase::Fetching => format!("fetching page {}", app.sequencer.cursor()),
            _ if app.sequencer.is_loading() => "loading".to_string(),
            _ => format!("next page {}", app.sequencer.cursor()),
        };
        let counters = match app.sequencer.in_flight() {
            0 | 1 => format!("{} titles | {}", app.len(), feed),
            n => format!("{} titles | {} ({} requests)", app.len(), feed, n),
        };
        Line::from(vec![
            Span::styled(
                "hjkl: nav | g/G: top/end | ^d/^u: page | o: open | y: copy | r: retry | q: quit",
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  "),
            Span::styled(counters, Style::default().fg(Color::Yellow)),
        ])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

/// Cut `text` to at most `max` characters, marking the cut with "..."
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
