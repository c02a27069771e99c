use ratatui::prelude::*;
use ratatui::widgets::*;

use super::layout::centered_rect;

const KEYS: [(&str, &str); 8] = [
    ("n", "new deck"),
    ("s", "shuffle current deck"),
    ("d / Space", "draw a card"),
    ("x", "delete current deck"),
    ("[ / ]", "previous / next deck"),
    ("?", "toggle this help"),
    ("Esc", "close help"),
    ("q", "quit"),
];

pub(super) fn draw_help(f: &mut Frame) {
    let area = centered_rect(50, 50, f.area());
    let lines: Vec<Line> = KEYS
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:>10}  "), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(*what),
            ])
        })
        .collect();
    let para = Paragraph::new(lines)
        .block(Block::default().title("Keys").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(para, area);
}
