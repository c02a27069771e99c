use crate::cards::Card;
use crate::deck::{Deck, DeckId};
use crate::registry::{DeckRegistry, RegistryError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// High-level input actions for the TUI controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputAction {
    NewDeck,
    Shuffle,
    Draw,
    DeleteDeck,
    NextDeck,
    PrevDeck,
    ToggleHelp,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct AppState {
    registry: Arc<DeckRegistry>,
    current: Option<DeckId>,
    // Cards drawn per deck, oldest first
    drawn: HashMap<DeckId, Vec<Card>>,
    help_open: bool,
    status: Option<String>,
    status_at: Option<Instant>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(DeckRegistry::new()))
    }
}

impl AppState {
    pub const HISTORY_LEN: usize = 12;
    const STATUS_TTL: Duration = Duration::from_secs(3);

    pub fn new(registry: Arc<DeckRegistry>) -> Self {
        let current = registry.ids().first().copied();
        Self {
            registry,
            current,
            drawn: HashMap::new(),
            help_open: false,
            status: None,
            status_at: None,
        }
    }

    pub fn registry(&self) -> &DeckRegistry {
        &self.registry
    }

    pub fn current_id(&self) -> Option<DeckId> {
        self.current
    }

    /// Snapshot of the selected deck, if it still exists.
    pub fn current_deck(&self) -> Option<Deck> {
        self.current.and_then(|id| self.registry.get_deck(id).ok())
    }

    /// Cards drawn from the selected deck, oldest first.
    pub fn drawn(&self) -> &[Card] {
        self.current.and_then(|id| self.drawn.get(&id)).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn last_drawn(&self) -> Option<Card> {
        self.drawn().last().copied()
    }

    pub fn help_open(&self) -> bool {
        self.help_open
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
        self.status_at = Some(Instant::now());
    }

    /// Clear a status message once it has been shown long enough.
    pub fn tick(&mut self) {
        if self.status_at.is_some_and(|at| at.elapsed() >= Self::STATUS_TTL) {
            self.status = None;
            self.status_at = None;
        }
    }

    fn report(&mut self, err: RegistryError) {
        if let RegistryError::NotFound(id) = err {
            self.drawn.remove(&id);
            self.current = self.registry.ids().first().copied();
        }
        self.set_status(err.to_string());
    }

    fn step_deck(&mut self, forward: bool) -> bool {
        let ids = self.registry.ids();
        if ids.is_empty() {
            return false;
        }
        let pos = self.current.and_then(|id| ids.iter().position(|&x| x == id));
        let next = match (pos, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % ids.len(),
            (Some(i), false) => (i + ids.len() - 1) % ids.len(),
        };
        self.current = Some(ids[next]);
        true
    }

    /// Apply an input action. Returns whether anything changed.
    pub fn handle_input(&mut self, action: InputAction) -> bool {
        if self.help_open && action != InputAction::ToggleHelp {
            return false;
        }
        match action {
            InputAction::ToggleHelp => {
                self.help_open = !self.help_open;
                true
            }
            InputAction::NewDeck => match self.registry.create_deck() {
                Ok(id) => {
                    self.current = Some(id);
                    self.set_status(format!("Created deck {id}"));
                    true
                }
                Err(e) => {
                    self.set_status(e.to_string());
                    false
                }
            },
            InputAction::Shuffle => {
                let Some(id) = self.current else { return false };
                match self.registry.shuffle_deck(id) {
                    Ok(()) => {
                        self.set_status("Deck shuffled");
                        true
                    }
                    Err(e) => {
                        self.report(e);
                        false
                    }
                }
            }
            InputAction::Draw => {
                let Some(id) = self.current else { return false };
                match self.registry.draw_card(id) {
                    Ok(card) => {
                        self.drawn.entry(id).or_default().push(card);
                        self.status = None;
                        true
                    }
                    Err(e) => {
                        self.report(e);
                        false
                    }
                }
            }
            InputAction::DeleteDeck => {
                let Some(id) = self.current else { return false };
                match self.registry.delete_deck(id) {
                    Ok(()) => {
                        self.drawn.remove(&id);
                        self.current = self.registry.ids().first().copied();
                        self.set_status(format!("Deleted deck {id}"));
                        true
                    }
                    Err(e) => {
                        self.report(e);
                        false
                    }
                }
            }
            InputAction::NextDeck => self.step_deck(true),
            InputAction::PrevDeck => self.step_deck(false),
        }
    }
}
