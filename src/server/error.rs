use crate::deck::DeckIdParseError;
use crate::registry::RegistryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    DeckId(#[from] DeckIdParseError),
    #[error("parameters must be numbers")]
    NotANumber,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Registry(RegistryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, json!({ "error": "Deck not found" }))
            }
            ApiError::Registry(RegistryError::Empty(_)) => {
                (StatusCode::NOT_FOUND, json!({ "error": "Deck is empty" }))
            }
            ApiError::Registry(RegistryError::DuplicateId(_)) => {
                (StatusCode::CONFLICT, json!({ "error": self.to_string() }))
            }
            ApiError::Registry(RegistryError::IdSpaceExhausted) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to create deck", "success": false }),
            ),
            ApiError::Registry(RegistryError::InvalidDeck(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": self.to_string() }))
            }
            ApiError::DeckId(_) => {
                (StatusCode::NOT_FOUND, json!({ "error": "Invalid deck ID format" }))
            }
            ApiError::NotANumber => {
                (StatusCode::NOT_FOUND, json!({ "error": "Parameters must be numbers" }))
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(body)).into_response()
    }
}
