//! deckhouse: in-memory playing-card decks behind an HTTP API
//!
//! Goals:
//! - One shared [`registry::DeckRegistry`] per process, injected rather than global
//! - Uniform Fisher-Yates shuffles and O(1) draws from the top of the deck
//! - Per-deck locking so requests on different decks never wait on each other
//! - No panics on caller misuse; every failure is a `Result`
//!
//! ## Quick start
//! ```
//! use deckhouse::registry::{DeckRegistry, RegistryError};
//!
//! let registry = DeckRegistry::new();
//! let id = registry.create_deck().unwrap();
//! registry.shuffle_deck(id).unwrap();
//! for _ in 0..52 {
//!     registry.draw_card(id).unwrap();
//! }
//! assert_eq!(registry.draw_card(id), Err(RegistryError::Empty(id)));
//! ```
//!
//! ## Binaries
//! Run the HTTP server with:
//! ```sh
//! cargo run --bin deckhouse
//! ```
//! and the terminal table with:
//! ```sh
//! cargo run --bin deck-table
//! ```

pub mod cards;
pub mod config;
pub mod deck;
pub mod registry;
pub mod server;
pub mod store;
pub mod tui;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
