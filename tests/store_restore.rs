use deckhouse::deck::{new_deck_cards, Deck, DeckId, DECK_SIZE};
use deckhouse::registry::DeckRegistry;
use deckhouse::store::{self, DeckStore, JsonDirStore};
use std::fs;
use std::path::PathBuf;
use std::thread;

fn fresh_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("deckhouse-store-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn json_dir_store_survives_a_restart() {
    let dir = fresh_dir("restart");
    let before = DeckRegistry::new();
    let disk = JsonDirStore::open(&dir).unwrap();

    let a = before.create_deck().unwrap();
    let b = before.create_deck().unwrap();
    before.shuffle_deck(a).unwrap();
    before.draw_card(a).unwrap();
    before.draw_card(b).unwrap();
    for id in [a, b] {
        disk.save(&before.get_deck(id).unwrap()).unwrap();
    }

    let after = DeckRegistry::new();
    let reopened = JsonDirStore::open(&dir).unwrap();
    assert_eq!(store::restore(&after, &reopened).unwrap(), 2);
    for id in [a, b] {
        let (old, new) = (before.get_deck(id).unwrap(), after.get_deck(id).unwrap());
        assert_eq!(new.cards(), old.cards());
        assert_eq!(new.is_shuffled(), old.is_shuffled());
    }
    assert_eq!(after.get_deck(b).unwrap().len(), DECK_SIZE - 1);

    // Restored ids are never handed out again.
    let c = after.create_deck().unwrap();
    assert!(c > b);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn removed_decks_stay_gone() {
    let dir = fresh_dir("remove");
    let disk = JsonDirStore::open(&dir).unwrap();
    disk.save(&Deck::standard(DeckId::new(4))).unwrap();
    disk.save(&Deck::standard(DeckId::new(9))).unwrap();
    disk.remove(DeckId::new(4)).unwrap();
    disk.remove(DeckId::new(4)).unwrap();

    let records = disk.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].deck_id, DeckId::new(9));
    assert_eq!(records[0].cards, new_deck_cards());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unrelated_files_are_ignored() {
    let dir = fresh_dir("unrelated");
    let disk = JsonDirStore::open(&dir).unwrap();
    disk.save(&Deck::standard(DeckId::new(1))).unwrap();
    fs::write(dir.join("notes.txt"), "not a deck").unwrap();
    fs::write(dir.join("2.json.tmp"), "{").unwrap();

    let registry = DeckRegistry::new();
    assert_eq!(store::restore(&registry, &disk).unwrap(), 1);
    assert_eq!(registry.ids(), vec![DeckId::new(1)]);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn corrupt_record_is_skipped_on_restore() {
    let dir = fresh_dir("corrupt");
    let disk = JsonDirStore::open(&dir).unwrap();
    disk.save(&Deck::standard(DeckId::new(2))).unwrap();
    fs::write(dir.join("5.json"), "{\"deck_id\": \"5\", \"cards\": [").unwrap();

    let registry = DeckRegistry::new();
    assert_eq!(store::restore(&registry, &disk).unwrap(), 1);
    assert_eq!(registry.ids(), vec![DeckId::new(2)]);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn racing_saves_of_one_deck_leave_a_whole_record() {
    let dir = fresh_dir("racing");
    let disk = JsonDirStore::open(&dir).unwrap();
    let id = DeckId::new(11);

    for _ in 0..100 {
        thread::scope(|s| {
            for drawn in 0..8 {
                let disk = &disk;
                s.spawn(move || {
                    let mut deck = Deck::standard(id);
                    deck.draw_n(drawn * 5);
                    disk.save(&deck).unwrap();
                });
            }
        });

        let records = disk.load_all().unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.deck_id, id);
        assert_eq!(record.remaining, record.cards.len());
        assert_eq!(record.cards[..], new_deck_cards()[..record.cards.len()]);
    }

    let leftovers: Vec<_> = fs::read_dir(&dir).unwrap().map(|e| e.unwrap().file_name()).collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("11.json")]);
    fs::remove_dir_all(&dir).unwrap();
}
