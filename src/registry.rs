//! Process-wide owner of every live deck.
//!
//! Decks live in a sharded map, each behind its own mutex. An operation
//! clones the deck's `Arc` out of the map and releases the shard before
//! locking, so work on different decks never waits on the same lock and the
//! map itself is only held for the duration of a lookup or insert.

use crate::cards::Card;
use crate::deck::{Deck, DeckError, DeckId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("deck {0} not found")]
    NotFound(DeckId),
    #[error("deck {0} is empty")]
    Empty(DeckId),
    #[error("deck id {0} is already in use")]
    DuplicateId(DeckId),
    #[error("deck id space exhausted")]
    IdSpaceExhausted,
    #[error(transparent)]
    InvalidDeck(#[from] DeckError),
}

type SharedDeck = Arc<Mutex<Deck>>;

/// Owns the mapping from deck id to deck.
///
/// ```
/// use deckhouse::registry::{DeckRegistry, RegistryError};
///
/// let registry = DeckRegistry::new();
/// let id = registry.create_deck().unwrap();
/// registry.shuffle_deck(id).unwrap();
/// let card = registry.draw_card(id).unwrap();
/// assert!(!registry.get_deck(id).unwrap().cards().contains(&card));
///
/// registry.delete_deck(id).unwrap();
/// assert_eq!(registry.draw_card(id), Err(RegistryError::NotFound(id)));
/// ```
#[derive(Debug)]
pub struct DeckRegistry {
    decks: DashMap<DeckId, SharedDeck>,
    next_id: AtomicU64,
}

impl Default for DeckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckRegistry {
    pub fn new() -> Self {
        Self { decks: DashMap::new(), next_id: AtomicU64::new(1) }
    }

    fn allocate_id(&self) -> Result<DeckId, RegistryError> {
        self.next_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .map(DeckId::new)
            .map_err(|_| RegistryError::IdSpaceExhausted)
    }

    fn handle(&self, id: DeckId) -> Result<SharedDeck, RegistryError> {
        self.decks.get(&id).map(|d| Arc::clone(d.value())).ok_or(RegistryError::NotFound(id))
    }

    /// Create a fresh, unshuffled 52-card deck and return its id.
    ///
    /// Ids come from a monotonic counter and are never handed out twice by
    /// the same registry, even after the deck has been deleted.
    pub fn create_deck(&self) -> Result<DeckId, RegistryError> {
        loop {
            let id = self.allocate_id()?;
            // A restored deck may already sit on this id; take the next one.
            if let Entry::Vacant(slot) = self.decks.entry(id) {
                slot.insert(Arc::new(Mutex::new(Deck::standard(id))));
                tracing::debug!(deck_id = %id, "created deck");
                return Ok(id);
            }
        }
    }

    /// A copy of the deck as it is right now. Changing the copy does not
    /// touch the registry.
    pub fn get_deck(&self, id: DeckId) -> Result<Deck, RegistryError> {
        let deck = self.handle(id)?;
        let snapshot = deck.lock().clone();
        Ok(snapshot)
    }

    /// Shuffle the remaining cards of a deck with the thread-local RNG.
    pub fn shuffle_deck(&self, id: DeckId) -> Result<(), RegistryError> {
        self.shuffle_deck_with(id, &mut rand::rng())
    }

    /// Shuffle the remaining cards of a deck with the provided RNG.
    pub fn shuffle_deck_with<R: Rng + ?Sized>(
        &self,
        id: DeckId,
        rng: &mut R,
    ) -> Result<(), RegistryError> {
        let deck = self.handle(id)?;
        let mut deck = deck.lock();
        deck.shuffle_with(rng);
        tracing::debug!(deck_id = %id, remaining = deck.len(), "shuffled deck");
        Ok(())
    }

    /// Remove and return the top card.
    pub fn draw_card(&self, id: DeckId) -> Result<Card, RegistryError> {
        self.draw_card_counted(id).map(|(card, _)| card)
    }

    /// Like [`draw_card`](Self::draw_card), also returning how many cards
    /// the deck held right after this draw.
    pub fn draw_card_counted(&self, id: DeckId) -> Result<(Card, usize), RegistryError> {
        let deck = self.handle(id)?;
        let mut deck = deck.lock();
        let card = deck.draw().ok_or(RegistryError::Empty(id))?;
        let remaining = deck.len();
        tracing::debug!(deck_id = %id, %card, remaining, "drew card");
        Ok((card, remaining))
    }

    /// Drop a deck. Later operations on `id` report `NotFound`.
    pub fn delete_deck(&self, id: DeckId) -> Result<(), RegistryError> {
        self.decks.remove(&id).ok_or(RegistryError::NotFound(id))?;
        tracing::debug!(deck_id = %id, "deleted deck");
        Ok(())
    }

    /// Insert a deck under a known id, as when replaying persisted state.
    ///
    /// Never overwrites a live deck. The id counter is moved past `id` so
    /// later [`create_deck`](Self::create_deck) calls do not land on it.
    pub fn load_deck(
        &self,
        id: DeckId,
        cards: Vec<Card>,
        shuffled: bool,
    ) -> Result<(), RegistryError> {
        let deck = Deck::try_from_cards(id, cards, shuffled)?;
        self.next_id.fetch_max(id.get().saturating_add(1), Ordering::Relaxed);
        match self.decks.entry(id) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateId(id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(deck)));
                tracing::debug!(deck_id = %id, "loaded deck");
                Ok(())
            }
        }
    }

    pub fn contains(&self, id: DeckId) -> bool {
        self.decks.contains_key(&id)
    }

    /// Number of live decks.
    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    /// Ids of all live decks, ascending.
    pub fn ids(&self) -> Vec<DeckId> {
        let mut ids: Vec<DeckId> = self.decks.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }
}
