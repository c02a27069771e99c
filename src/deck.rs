use crate::cards::{Card, Rank, Suit};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Number of cards in a fresh deck.
pub const DECK_SIZE: usize = 52;

/// Identifier of a live deck. Rendered as a decimal string on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DeckId(u64);

impl DeckId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeckIdParseError {
    #[error("invalid deck id: '{0}'")]
    Invalid(String),
}

impl FromStr for DeckId {
    type Err = DeckIdParseError;

    /// Only plain ASCII digits are accepted; signs and whitespace are not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DeckIdParseError::Invalid(s.to_string()));
        }
        s.parse::<u64>().map(DeckId).map_err(|_| DeckIdParseError::Invalid(s.to_string()))
    }
}

impl From<DeckId> for String {
    fn from(id: DeckId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for DeckId {
    type Error = DeckIdParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeckError {
    #[error("a deck holds at most 52 cards, got {0}")]
    TooManyCards(usize),
    #[error("duplicate card in deck: {0}")]
    DuplicateCard(Card),
}

/// All 52 cards, suits outermost (hearts, diamonds, clubs, spades), ranks
/// innermost (2 through Ace).
///
/// ```
/// use deckhouse::cards::{Card, Rank, Suit};
/// use deckhouse::deck::new_deck_cards;
///
/// let cards = new_deck_cards();
/// assert_eq!(cards.len(), 52);
/// assert_eq!(cards[0], Card::new(Rank::Two, Suit::Hearts));
/// assert_eq!(cards[51], Card::new(Rank::Ace, Suit::Spades));
/// ```
pub fn new_deck_cards() -> Vec<Card> {
    let mut cards = Vec::with_capacity(DECK_SIZE);
    for &s in &Suit::ALL {
        for &r in &Rank::ALL {
            cards.push(Card::new(r, s));
        }
    }
    cards
}

/// An identified stack of cards. The last element of `cards` is the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    id: DeckId,
    cards: Vec<Card>,
    shuffled: bool,
}

impl Deck {
    /// A fresh, unshuffled 52-card deck.
    ///
    /// ```
    /// use deckhouse::deck::{Deck, DeckId};
    ///
    /// let deck = Deck::standard(DeckId::new(1));
    /// assert_eq!(deck.len(), 52);
    /// assert!(!deck.is_shuffled());
    /// ```
    pub fn standard(id: DeckId) -> Self {
        Self { id, cards: new_deck_cards(), shuffled: false }
    }

    /// Rebuild a deck from a stored card sequence, rejecting sequences a real
    /// deck could never reach.
    pub fn try_from_cards(id: DeckId, cards: Vec<Card>, shuffled: bool) -> Result<Self, DeckError> {
        if cards.len() > DECK_SIZE {
            return Err(DeckError::TooManyCards(cards.len()));
        }
        let mut seen = HashSet::with_capacity(cards.len());
        for &c in &cards {
            if !seen.insert(c) {
                return Err(DeckError::DuplicateCard(c));
            }
        }
        Ok(Self { id, cards, shuffled })
    }

    pub fn id(&self) -> DeckId {
        self.id
    }

    /// Cards in draw order; the last one is drawn next.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// The card the next draw would return.
    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    /// Fisher-Yates: walk from the last index down to 1 and swap each slot
    /// with a uniformly chosen slot at or below it.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        debug_assert!(self.cards.len() <= DECK_SIZE, "deck {} overfull", self.id);
        self.cards.shuffle(rng);
        self.shuffled = true;
    }

    /// Shuffle using a seeded RNG for reproducibility.
    pub fn shuffle_seeded(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.shuffle_with(&mut rng);
    }

    /// Draw one card from the top of the deck.
    pub fn draw(&mut self) -> Option<Card> {
        debug_assert!(self.cards.len() <= DECK_SIZE, "deck {} overfull", self.id);
        self.cards.pop()
    }

    /// Draw up to `n` cards from the top of the deck.
    pub fn draw_n(&mut self, n: usize) -> Vec<Card> {
        (0..n).map_while(|_| self.draw()).collect()
    }
}
