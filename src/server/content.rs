use super::ApiError;
use axum::extract::Path;
use axum::Json;
use rand::seq::IndexedRandom;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, Serialize)]
pub(super) struct Poem {
    title: &'static str,
    author: &'static str,
    text: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(super) struct Quote {
    text: &'static str,
    author: &'static str,
}

const POEMS: [Poem; 3] = [
    Poem {
        title: "The Road Not Taken",
        author: "Robert Frost",
        text: "Two roads diverged in a yellow wood,\nAnd sorry I could not travel both\nAnd be one traveler, long I stood\nAnd looked down one as far as I could\nTo where it bent in the undergrowth;",
    },
    Poem {
        title: "Annabel Lee",
        author: "Edgar Allan Poe",
        text: "It was many and many a year ago,\nIn a kingdom by the sea,\nThat a maiden there lived whom you may know\nBy the name of Annabel Lee;",
    },
    Poem {
        title: "Hope is the thing with feathers",
        author: "Emily Dickinson",
        text: "Hope is the thing with feathers\nThat perches in the soul,\nAnd sings the tune without the words,\nAnd never stops at all,",
    },
];

const QUOTES: [Quote; 5] = [
    Quote { text: "Be the change you wish to see in the world", author: "Mahatma Gandhi" },
    Quote {
        text: "Two things are infinite: the universe and human stupidity; and I'm not sure about the universe",
        author: "Albert Einstein",
    },
    Quote {
        text: "I have not failed. I've just found 10,000 ways that won't work",
        author: "Thomas A. Edison",
    },
    Quote {
        text: "To be yourself in a world that is constantly trying to make you something else is the greatest accomplishment",
        author: "Ralph Waldo Emerson",
    },
    Quote { text: "The only way to do great work is to love what you do", author: "Steve Jobs" },
];

pub(super) async fn root() -> &'static str {
    "Hello World"
}

pub(super) async fn poem() -> Json<Poem> {
    // Both lists are non-empty constants.
    let poem = POEMS.choose(&mut rand::rng()).copied().unwrap_or(POEMS[0]);
    Json(poem)
}

pub(super) async fn quote() -> Json<Quote> {
    let quote = QUOTES.choose(&mut rand::rng()).copied().unwrap_or(QUOTES[0]);
    Json(quote)
}

pub(super) async fn sum(Path((a, b)): Path<(String, String)>) -> Result<Json<Value>, ApiError> {
    let (Some(a), Some(b)) = (leading_int(&a), leading_int(&b)) else {
        return Err(ApiError::NotANumber);
    };
    Ok(Json(json!({ "sum": a.saturating_add(b), "a": a, "b": b })))
}

/// Lenient integer parse: optional sign, then leading decimal digits;
/// whatever follows the digits is ignored.
fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
