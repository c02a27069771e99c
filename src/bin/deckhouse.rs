use anyhow::Context;
use deckhouse::config::Config;
use deckhouse::registry::DeckRegistry;
use deckhouse::server::{self, AppState};
use deckhouse::store::{self, DeckStore, JsonDirStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    if let Some(dir) = config.log_file.as_ref().and_then(|p| p.parent()) {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating log directory {}", dir.display()))?;
        }
    }

    let registry = Arc::new(DeckRegistry::new());
    let mut state = AppState::new(Arc::clone(&registry), &config);

    if let Some(dir) = &config.data_dir {
        let store: Arc<dyn DeckStore> = Arc::new(
            JsonDirStore::open(dir)
                .with_context(|| format!("opening deck store {}", dir.display()))?,
        );
        let restored = store::restore(&registry, store.as_ref())?;
        info!(restored, dir = %dir.display(), "deck store ready");
        state = state.with_store(store);
    }

    let app = server::router(state, &config.public_dir);
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    info!("server running on http://{}", addr);

    server::serve(listener, app, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutting down");
    })
    .await?;
    Ok(())
}
