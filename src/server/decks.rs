use super::{ApiError, AppState, LogDetail};
use crate::cards::{Card, Rank, Suit};
use crate::deck::{Deck, DeckId};
use crate::registry::RegistryError;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(super) struct Created {
    deck_id: DeckId,
    success: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct Message {
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct DeckView {
    deck_id: DeckId,
    cards: Vec<Card>,
    remaining: usize,
    shuffled: bool,
}

impl From<Deck> for DeckView {
    fn from(deck: Deck) -> Self {
        Self {
            deck_id: deck.id(),
            remaining: deck.len(),
            shuffled: deck.is_shuffled(),
            cards: deck.cards().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct Drawn {
    card: Option<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suit: Option<Suit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Rank>,
    remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub(super) struct Deleted {
    success: bool,
}

fn deck_id(raw: &str) -> Result<DeckId, ApiError> {
    Ok(raw.parse()?)
}

pub(super) async fn create(State(state): State<AppState>) -> Result<Response, ApiError> {
    let id = state.registry.create_deck()?;
    state.sync_snapshot(id).await;
    Ok((Extension(LogDetail::Deck(id)), Json(Created { deck_id: id, success: true }))
        .into_response())
}

pub(super) async fn shuffle(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, ApiError> {
    let id = deck_id(&raw)?;
    state.registry.shuffle_deck(id)?;
    state.sync_snapshot(id).await;
    Ok((Extension(LogDetail::Shuffled), Json(Message { message: "Deck shuffled successfully" }))
        .into_response())
}

pub(super) async fn show(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<DeckView>, ApiError> {
    let id = deck_id(&raw)?;
    let deck = state.registry.get_deck(id)?;
    Ok(Json(DeckView::from(deck)))
}

pub(super) async fn draw(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, ApiError> {
    let id = deck_id(&raw)?;
    match state.registry.draw_card_counted(id) {
        Ok((card, remaining)) => {
            state.sync_snapshot(id).await;
            let body = Drawn {
                card: Some(card),
                suit: Some(card.suit()),
                value: Some(card.rank()),
                remaining,
                message: None,
            };
            Ok((Extension(LogDetail::Card(card)), Json(body)).into_response())
        }
        Err(RegistryError::Empty(_)) => Ok(Json(Drawn {
            card: None,
            suit: None,
            value: None,
            remaining: 0,
            message: Some("Deck is empty"),
        })
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let id = deck_id(&raw)?;
    state.registry.delete_deck(id)?;
    state.forget_snapshot(id).await;
    Ok(Json(Deleted { success: true }))
}
