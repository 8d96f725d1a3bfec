use std::time::Instant;

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::truncate;
use crate::app::App;
use crate::grid::CARD_HEIGHT;
use crate::types::RenderUnit;

const SPINNER_FRAMES: [&str; 10] = [
    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
];
const BADGE_BG: Color = Color::Rgb(0x16, 0x19, 0x21);
const SCORE_FG: Color = Color::Rgb(0xFF, 0xAD, 0x49);

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.is_empty() {
        let empty = Paragraph::new("No titles found")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let grid = app.grid;
    let len = app.len();
    let card_width = area.width / grid.columns as u16;
    let now = Instant::now();

    let first = app.row_offset * grid.columns;
    let shown = grid.full_rows().min((area.height / CARD_HEIGHT) as usize) * grid.columns;
    for (index, card) in app.cards().enumerate().skip(first).take(shown) {
        let slot = index - first;
        let rect = Rect {
            x: area.x + (slot % grid.columns) as u16 * card_width,
            y: area.y + (slot / grid.columns) as u16 * CARD_HEIGHT,
            width: card_width,
            height: CARD_HEIGHT,
        };
        render_card(frame, app, card, index == app.selected, now, rect);
    }

    if app.sentinel_visible() {
        let sentinel = grid.sentinel_line(len, app.row_offset);
        let rect = Rect {
            x: area.x,
            y: area.y + sentinel as u16,
            width: area.width,
            height: 1,
        };
        frame.render_widget(sentinel_line(app), rect);
    }
}

fn sentinel_line(app: &App) -> Paragraph<'static> {
    let line = if app.sequencer.spinner_visible() {
        let frame = SPINNER_FRAMES[app.tick as usize % SPINNER_FRAMES.len()];
        Line::from(vec![
            Span::styled(frame, Style::default().fg(Color::Cyan)),
            Span::styled(" Loading more titles", Style::default().fg(Color::Gray)),
        ])
    } else if app.sequencer.is_exhausted() {
        Line::from(Span::styled(
            "End of catalog",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from("")
    };
    Paragraph::new(line).alignment(Alignment::Center)
}

fn render_card(
    frame: &mut Frame,
    app: &App,
    card: &RenderUnit,
    selected: bool,
    now: Instant,
    area: Rect,
) {
    // Cards fade in one after another; nothing is drawn before a card's turn
    let progress = card.reveal_progress(now);
    if progress <= 0.0 {
        return;
    }
    let dim = progress < 1.0;
    let text = if dim {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let item = &card.item;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .title(Span::styled(
            format!(" {} ", truncate(&item.name, inner_width.saturating_sub(2))),
            text.add_modifier(Modifier::BOLD),
        ));

    let badge = if dim {
        text
    } else {
        Style::default()
            .fg(Color::White)
            .bg(BADGE_BG)
            .add_modifier(Modifier::BOLD)
    };
    let score = if dim {
        text
    } else {
        Style::default().fg(SCORE_FG).add_modifier(Modifier::BOLD)
    };

    let lines = vec![
        Line::from(Span::styled(format!(" {} ", item.kind_label()), badge)),
        Line::from(vec![
            Span::styled(format!("▶ {} ep", item.episode_count()), text),
            Span::raw("   "),
            Span::styled(format!("★ {}", item.score), score),
        ]),
        Line::from(Span::styled(
            truncate(&app.catalog().image_url(item), inner_width),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
