use crossterm::event::KeyCode;
use deckhouse::cards::{Card, Rank, Suit};
use deckhouse::deck::DECK_SIZE;
use deckhouse::registry::DeckRegistry;
use deckhouse::tui::app::{AppState, InputAction};
use deckhouse::tui::controller::handle_key;
use std::sync::Arc;

#[test]
fn new_deck_then_draw_takes_the_top_card() {
    let mut app = AppState::default();
    assert!(app.current_id().is_none());
    assert!(!app.handle_input(InputAction::Draw));

    assert!(app.handle_input(InputAction::NewDeck));
    let id = app.current_id().unwrap();
    assert!(app.status().unwrap().contains(&id.to_string()));

    assert!(app.handle_input(InputAction::Draw));
    assert_eq!(app.last_drawn(), Some(Card::new(Rank::Ace, Suit::Spades)));
    assert_eq!(app.current_deck().unwrap().len(), DECK_SIZE - 1);
    assert_eq!(app.drawn().len(), 1);
}

#[test]
fn help_blocks_other_actions() {
    let mut app = AppState::default();
    assert!(!handle_key(&mut app, KeyCode::Char('?')));
    assert!(app.help_open());

    assert!(!handle_key(&mut app, KeyCode::Char('n')));
    assert!(!handle_key(&mut app, KeyCode::Char('q')));
    assert!(app.registry().is_empty());
    assert!(!app.handle_input(InputAction::NewDeck));

    assert!(!handle_key(&mut app, KeyCode::Esc));
    assert!(!app.help_open());
    assert!(handle_key(&mut app, KeyCode::Char('q')));
}

#[test]
fn switching_decks_wraps_around() {
    let mut app = AppState::default();
    for _ in 0..3 {
        handle_key(&mut app, KeyCode::Char('n'));
    }
    let ids = app.registry().ids();
    assert_eq!(app.current_id(), Some(ids[2]));

    handle_key(&mut app, KeyCode::Char(']'));
    assert_eq!(app.current_id(), Some(ids[0]));
    handle_key(&mut app, KeyCode::Left);
    assert_eq!(app.current_id(), Some(ids[2]));
    handle_key(&mut app, KeyCode::Char('['));
    assert_eq!(app.current_id(), Some(ids[1]));
}

#[test]
fn drawn_history_is_kept_per_deck() {
    let mut app = AppState::default();
    handle_key(&mut app, KeyCode::Char('n'));
    handle_key(&mut app, KeyCode::Char('d'));
    handle_key(&mut app, KeyCode::Char(' '));
    handle_key(&mut app, KeyCode::Char('n'));
    assert!(app.drawn().is_empty());
    assert_eq!(app.last_drawn(), None);

    handle_key(&mut app, KeyCode::Right);
    assert_eq!(app.drawn().len(), 2);
}

#[test]
fn delete_selects_a_remaining_deck() {
    let mut app = AppState::default();
    handle_key(&mut app, KeyCode::Char('n'));
    handle_key(&mut app, KeyCode::Char('n'));
    let ids = app.registry().ids();

    handle_key(&mut app, KeyCode::Char('x'));
    assert_eq!(app.registry().ids(), vec![ids[0]]);
    assert_eq!(app.current_id(), Some(ids[0]));

    handle_key(&mut app, KeyCode::Char('x'));
    assert!(app.registry().is_empty());
    assert_eq!(app.current_id(), None);
    assert!(!app.handle_input(InputAction::DeleteDeck));
}

#[test]
fn draining_reports_an_empty_deck() {
    let mut app = AppState::default();
    handle_key(&mut app, KeyCode::Char('n'));
    handle_key(&mut app, KeyCode::Char('s'));
    assert!(app.current_deck().unwrap().is_shuffled());

    for _ in 0..DECK_SIZE {
        assert!(app.handle_input(InputAction::Draw));
    }
    assert!(!app.handle_input(InputAction::Draw));
    assert!(app.status().unwrap().contains("empty"));
    assert_eq!(app.drawn().len(), DECK_SIZE);
    assert!(app.current_id().is_some());
}

#[test]
fn deck_deleted_elsewhere_resets_selection() {
    let registry = Arc::new(DeckRegistry::new());
    let keep = registry.create_deck().unwrap();
    let mut app = AppState::new(Arc::clone(&registry));
    assert_eq!(app.current_id(), Some(keep));

    handle_key(&mut app, KeyCode::Char('n'));
    let doomed = app.current_id().unwrap();
    registry.delete_deck(doomed).unwrap();

    assert!(!app.handle_input(InputAction::Shuffle));
    assert!(app.status().unwrap().contains("not found"));
    assert_eq!(app.current_id(), Some(keep));
}
