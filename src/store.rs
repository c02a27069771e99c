//! Best-effort persistent mirror of deck state.
//!
//! The registry stays the source of truth while the process runs; a store
//! only exists so decks survive a restart. [`restore`] replays every stored
//! record into a registry through [`DeckRegistry::load_deck`].

use crate::cards::Card;
use crate::deck::{Deck, DeckId};
use crate::registry::DeckRegistry;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed deck record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("deck record {id} claims {claimed} cards but holds {actual}")]
    Inconsistent { id: DeckId, claimed: usize, actual: usize },
}

/// Serialized form of one deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRecord {
    pub deck_id: DeckId,
    pub cards: Vec<Card>,
    pub remaining: usize,
    pub shuffled: bool,
}

impl From<&Deck> for DeckRecord {
    fn from(deck: &Deck) -> Self {
        Self {
            deck_id: deck.id(),
            cards: deck.cards().to_vec(),
            remaining: deck.len(),
            shuffled: deck.is_shuffled(),
        }
    }
}

impl DeckRecord {
    fn check(&self) -> Result<(), StoreError> {
        if self.remaining != self.cards.len() {
            return Err(StoreError::Inconsistent {
                id: self.deck_id,
                claimed: self.remaining,
                actual: self.cards.len(),
            });
        }
        Ok(())
    }
}

pub trait DeckStore: Send + Sync {
    /// Write the current state of `deck`, replacing any earlier snapshot.
    fn save(&self, deck: &Deck) -> Result<(), StoreError>;
    /// Forget a deck. Removing an unknown id is not an error.
    fn remove(&self, id: DeckId) -> Result<(), StoreError>;
    /// Every readable record. Records that cannot be parsed are skipped.
    fn load_all(&self) -> Result<Vec<DeckRecord>, StoreError>;
}

/// One `<id>.json` file per deck inside a directory.
///
/// Every save writes a temp file of its own and renames it over the target,
/// so concurrent saves of one deck each publish a complete record.
#[derive(Debug)]
pub struct JsonDirStore {
    dir: PathBuf,
    seq: AtomicU64,
}

impl JsonDirStore {
    /// Open (and create if needed) the store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, seq: AtomicU64::new(0) })
    }

    fn path_for(&self, id: DeckId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl DeckStore for JsonDirStore {
    fn save(&self, deck: &Deck) -> Result<(), StoreError> {
        let record = DeckRecord::from(deck);
        let body = serde_json::to_vec_pretty(&record)?;
        let target = self.path_for(record.deck_id);
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self.dir.join(format!("{}.json.{}-{n}.tmp", record.deck_id, std::process::id()));
        fs::write(&tmp, body)?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, id: DeckId) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(id)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => Ok(other?),
        }
    }

    fn load_all(&self) -> Result<Vec<DeckRecord>, StoreError> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read(&path)?;
            match serde_json::from_slice(&raw) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable deck record");
                }
            }
        }
        records.sort_by_key(|r: &DeckRecord| r.deck_id);
        Ok(records)
    }
}

/// In-process store; state is lost with the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<DeckId, DeckRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: DeckId) -> Option<DeckRecord> {
        self.records.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl DeckStore for MemoryStore {
    fn save(&self, deck: &Deck) -> Result<(), StoreError> {
        self.records.lock().insert(deck.id(), DeckRecord::from(deck));
        Ok(())
    }

    fn remove(&self, id: DeckId) -> Result<(), StoreError> {
        self.records.lock().remove(&id);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<DeckRecord>, StoreError> {
        Ok(self.records.lock().values().cloned().collect())
    }
}

/// Load every stored deck into `registry`. Records that are inconsistent or
/// collide with a live deck are skipped with a warning. Returns the number
/// of decks restored.
pub fn restore(registry: &DeckRegistry, store: &dyn DeckStore) -> Result<usize, StoreError> {
    let mut restored = 0;
    for record in store.load_all()? {
        if let Err(e) = record.check() {
            tracing::warn!(deck_id = %record.deck_id, error = %e, "skipping deck record");
            continue;
        }
        let id = record.deck_id;
        match registry.load_deck(id, record.cards, record.shuffled) {
            Ok(()) => restored += 1,
            Err(e) => tracing::warn!(deck_id = %id, error = %e, "skipping deck record"),
        }
    }
    Ok(restored)
}
