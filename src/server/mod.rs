//! HTTP front end over a shared [`DeckRegistry`].
//!
//! Every request passes through the request log, then the per-client rate
//! limiter, then the router. Anything the router does not know is looked up
//! in the public directory.

mod content;
mod decks;
mod error;
pub mod rate_limit;
pub mod request_log;

pub use error::ApiError;
pub use rate_limit::RateLimiter;
pub use request_log::{LogDetail, RequestLog};

use crate::config::Config;
use crate::deck::DeckId;
use crate::registry::DeckRegistry;
use crate::store::{DeckStore, StoreError};
use axum::routing::{get, patch, post};
use axum::{middleware, Router};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared handler state. Cloning is cheap; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<DeckRegistry>,
    store: Option<Arc<dyn DeckStore>>,
    limiter: Arc<RateLimiter>,
    request_log: Arc<RequestLog>,
}

impl AppState {
    pub fn new(registry: Arc<DeckRegistry>, config: &Config) -> Self {
        Self {
            registry,
            store: None,
            limiter: Arc::new(RateLimiter::new(config.rate_limit_max, config.rate_limit_window)),
            request_log: Arc::new(RequestLog::new(config.log_file.clone())),
        }
    }

    /// Mirror every deck mutation into `store`.
    pub fn with_store(mut self, store: Arc<dyn DeckStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn registry(&self) -> &Arc<DeckRegistry> {
        &self.registry
    }

    /// Run a store update on the blocking pool. Failures are logged and
    /// never reach the client.
    async fn mirror<F>(&self, id: DeckId, update: F)
    where
        F: FnOnce(&dyn DeckStore) -> Result<(), StoreError> + Send + 'static,
    {
        let Some(store) = self.store.clone() else { return };
        match tokio::task::spawn_blocking(move || update(store.as_ref())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(deck_id = %id, error = %e, "failed to mirror deck"),
            Err(e) => tracing::warn!(deck_id = %id, error = %e, "deck mirror task failed"),
        }
    }

    /// Write a fresh snapshot of `id` to the store, if there is one and the
    /// deck still exists.
    async fn sync_snapshot(&self, id: DeckId) {
        if self.store.is_none() {
            return;
        }
        let Ok(deck) = self.registry.get_deck(id) else { return };
        self.mirror(id, move |store| store.save(&deck)).await;
    }

    async fn forget_snapshot(&self, id: DeckId) {
        self.mirror(id, move |store| store.remove(id)).await;
    }
}

pub fn router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route("/", get(content::root))
        .route("/temp/deck", post(decks::create))
        .route("/temp/deck/shuffle/:deck_id", patch(decks::shuffle))
        .route("/temp/deck/:deck_id", get(decks::show).delete(decks::delete))
        .route("/temp/deck/:deck_id/card", get(decks::draw))
        .route("/temp/poem", get(content::poem))
        .route("/temp/quote", get(content::quote))
        .route("/temp/sum/:a/:b", post(content::sum))
        .fallback_service(ServeDir::new(public_dir))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::enforce))
        .layer(middleware::from_fn_with_state(state.clone(), request_log::record))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` resolves. Peer addresses are
/// exposed to the rate limiter through `ConnectInfo`.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await
}
