use crate::cards::Card;
use crate::deck::DECK_SIZE;
use crate::tui::app::AppState;
use ratatui::prelude::*;
use ratatui::widgets::*;

use super::layout::{centered_fixed, inner};

fn card_style(card: Card) -> Style {
    let color = if card.suit().is_red() { Color::Red } else { Color::White };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub(super) fn draw_table(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header
            Constraint::Min(7),    // last card
            Constraint::Length(3), // drawn history
            Constraint::Length(3), // status bar
        ])
        .split(f.area());

    let deck = app.current_deck();
    let ids = app.registry().ids();
    let header_lines = match &deck {
        Some(deck) => {
            let pos = ids.iter().position(|&id| id == deck.id()).map_or(0, |i| i + 1);
            vec![
                Line::from(format!("Deck {}   ({} of {} decks)", deck.id(), pos, ids.len())),
                Line::from(format!(
                    "Remaining: {}/{}   Shuffled: {}",
                    deck.len(),
                    DECK_SIZE,
                    if deck.is_shuffled() { "yes" } else { "no" }
                )),
            ]
        }
        None => vec![Line::from("No deck selected. Press n to create one."), Line::from("")],
    };
    let header = Paragraph::new(header_lines)
        .block(Block::default().title("deck-table").borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let table_block = Block::default().title("Last card").borders(Borders::ALL);
    let table_area = inner(chunks[1]);
    f.render_widget(table_block, chunks[1]);
    render_card(f, centered_fixed(9, 5, table_area), app.last_drawn());

    let drawn = app.drawn();
    let recent = &drawn[drawn.len().saturating_sub(AppState::HISTORY_LEN)..];
    let mut spans: Vec<Span> = Vec::with_capacity(recent.len() * 2);
    for &c in recent.iter().rev() {
        spans.push(Span::styled(c.to_string(), card_style(c)));
        spans.push(Span::raw(" "));
    }
    let history = Paragraph::new(Line::from(spans))
        .block(Block::default().title(format!("Drawn ({})", drawn.len())).borders(Borders::ALL));
    f.render_widget(history, chunks[2]);

    let status = match app.status() {
        Some(msg) => Line::from(Span::styled(msg.to_string(), Style::default().fg(Color::Yellow))),
        None => Line::from(Span::styled(
            "[n] New  [s] Shuffle  [d] Draw  [x] Delete  [[/]] Switch  [?] Help  [q] Quit",
            Style::default().add_modifier(Modifier::DIM),
        )),
    };
    let status_bar =
        Paragraph::new(status).block(Block::default().title("Status").borders(Borders::ALL));
    f.render_widget(status_bar, chunks[3]);
}

fn render_card(f: &mut Frame, area: Rect, card: Option<Card>) {
    let block = Block::default().borders(Borders::ALL);
    let lines = match card {
        Some(c) => {
            let label = c.to_string();
            vec![
                Line::from(Span::styled(label.clone(), card_style(c))),
                Line::from(Span::styled(c.suit().symbol().to_string(), card_style(c)))
                    .alignment(Alignment::Center),
                Line::from(Span::styled(label, card_style(c))).alignment(Alignment::Right),
            ]
        }
        None => vec![
            Line::from(""),
            Line::from(Span::styled("--", Style::default().add_modifier(Modifier::DIM)))
                .alignment(Alignment::Center),
        ],
    };
    f.render_widget(Paragraph::new(lines).block(block), area);
}
