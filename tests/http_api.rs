use deckhouse::config::Config;
use deckhouse::deck::{new_deck_cards, DeckId, DECK_SIZE};
use deckhouse::registry::DeckRegistry;
use deckhouse::server::{self, AppState};
use deckhouse::store::{self, DeckStore, JsonDirStore, MemoryStore};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

struct TestApp {
    base: String,
    registry: Arc<DeckRegistry>,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn create_deck(&self) -> DeckId {
        let res = self.client.post(self.url("/temp/deck")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["success"], true);
        body["deck_id"].as_str().unwrap().parse().unwrap()
    }

    async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("deckhouse-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn test_config(name: &str) -> Config {
    Config {
        rate_limit_max: 10_000,
        log_file: None,
        public_dir: scratch_dir(name),
        ..Config::default()
    }
}

async fn spawn_app(config: Config, store: Option<Arc<dyn DeckStore>>) -> TestApp {
    let registry = Arc::new(DeckRegistry::new());
    let mut state = AppState::new(Arc::clone(&registry), &config);
    if let Some(store) = store {
        state = state.with_store(store);
    }
    let app = server::router(state, &config.public_dir);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, app, std::future::pending()));
    TestApp { base: format!("http://{addr}"), registry, client: reqwest::Client::new() }
}

#[tokio::test]
async fn create_shuffle_draw_until_empty() {
    let app = spawn_app(test_config("flow"), None).await;
    let id = app.create_deck().await;

    let (status, fresh) = app.get_json(&format!("/temp/deck/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fresh["deck_id"], id.to_string());
    assert_eq!(fresh["remaining"], DECK_SIZE);
    assert_eq!(fresh["shuffled"], false);
    assert_eq!(fresh["cards"], serde_json::to_value(new_deck_cards()).unwrap());

    let res = app.client.patch(app.url(&format!("/temp/deck/shuffle/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Deck shuffled successfully");

    let (_, shuffled) = app.get_json(&format!("/temp/deck/{id}")).await;
    assert_eq!(shuffled["remaining"], DECK_SIZE);
    assert_eq!(shuffled["shuffled"], true);
    assert_ne!(shuffled["cards"], fresh["cards"]);

    let mut seen = HashSet::new();
    for n in 1..=DECK_SIZE {
        let (status, body) = app.get_json(&format!("/temp/deck/{id}/card")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["remaining"], DECK_SIZE - n);
        assert_eq!(body["suit"], body["card"]["suit"]);
        assert_eq!(body["value"], body["card"]["value"]);
        assert!(seen.insert(body["card"].to_string()), "repeated card {}", body["card"]);
    }
    assert_eq!(seen.len(), DECK_SIZE);

    let (status, body) = app.get_json(&format!("/temp/deck/{id}/card")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"], Value::Null);
    assert_eq!(body["remaining"], 0);
    assert_eq!(body["message"], "Deck is empty");
    assert!(app.registry.get_deck(id).unwrap().is_empty());
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = spawn_app(test_config("unknown"), None).await;

    let res = app.client.patch(app.url("/temp/deck/shuffle/does-not-exist")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid deck ID format");

    let res = app.client.patch(app.url("/temp/deck/shuffle/424242")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Deck not found");

    let (status, _) = app.get_json("/temp/deck/424242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get_json("/temp/deck/424242/card").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let res = app.client.delete(app.url("/temp/deck/424242")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    assert!(app.registry.is_empty());
}

#[tokio::test]
async fn mutations_are_mirrored_and_delete_forgets() {
    let store = Arc::new(MemoryStore::new());
    let app = spawn_app(test_config("mirror"), Some(store.clone() as Arc<dyn DeckStore>)).await;
    let id = app.create_deck().await;
    assert_eq!(store.get(id).unwrap().remaining, DECK_SIZE);

    app.client.patch(app.url(&format!("/temp/deck/shuffle/{id}"))).send().await.unwrap();
    let (_, drawn) = app.get_json(&format!("/temp/deck/{id}/card")).await;
    assert_ne!(drawn["card"], Value::Null);
    let record = store.get(id).unwrap();
    assert!(record.shuffled);
    assert_eq!(record.remaining, DECK_SIZE - 1);
    let (_, deck) = app.get_json(&format!("/temp/deck/{id}")).await;
    assert_eq!(serde_json::to_value(&record.cards).unwrap(), deck["cards"]);

    let res = app.client.delete(app.url(&format!("/temp/deck/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(store.get(id).is_none());

    let (status, _) = app.get_json(&format!("/temp/deck/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let res = app.client.delete(app.url(&format!("/temp/deck/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_draws_keep_the_disk_mirror_readable() {
    let data_dir = scratch_dir("disk-mirror");
    let _ = std::fs::remove_dir_all(&data_dir);
    let disk: Arc<dyn DeckStore> = Arc::new(JsonDirStore::open(&data_dir).unwrap());
    let app = Arc::new(spawn_app(test_config("disk-mirror-public"), Some(Arc::clone(&disk))).await);
    let id = app.create_deck().await;

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let app = Arc::clone(&app);
            tokio::spawn(async move { app.get_json(&format!("/temp/deck/{id}/card")).await })
        })
        .collect();
    let mut remaining = Vec::new();
    for h in handles {
        let (status, body) = h.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        remaining.push(body["remaining"].as_u64().unwrap() as usize);
    }
    remaining.sort_unstable();
    assert_eq!(remaining, (DECK_SIZE - 20..DECK_SIZE).collect::<Vec<_>>());

    let records = disk.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].remaining, records[0].cards.len());
    assert!(records[0].remaining >= DECK_SIZE - 20);

    let restarted = DeckRegistry::new();
    assert_eq!(store::restore(&restarted, disk.as_ref()).unwrap(), 1);
    assert!(restarted.contains(id));
    std::fs::remove_dir_all(&data_dir).unwrap();
}

#[tokio::test]
async fn content_endpoints() {
    let app = spawn_app(test_config("content"), None).await;

    let res = app.client.get(app.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Hello World");

    let (_, poem) = app.get_json("/temp/poem").await;
    assert!(["Robert Frost", "Edgar Allan Poe", "Emily Dickinson"]
        .contains(&poem["author"].as_str().unwrap()));
    assert!(poem["title"].is_string() && poem["text"].is_string());

    let (_, quote) = app.get_json("/temp/quote").await;
    assert!(quote["text"].is_string() && quote["author"].is_string());

    let res = app.client.post(app.url("/temp/sum/2/40")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "sum": 42, "a": 2, "b": 40 }));

    let res = app.client.post(app.url("/temp/sum/x/3")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Parameters must be numbers");
}

#[tokio::test]
async fn rate_limit_rejects_after_budget() {
    let config = Config { rate_limit_max: 3, ..test_config("limit") };
    let app = spawn_app(config, None).await;

    for _ in 0..3 {
        let (status, _) = app.get_json("/temp/quote").await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = app.get_json("/temp/quote").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests, please try again later.");
    assert_eq!(body["retryAfter"], "60 seconds");

    let res = app.client.post(app.url("/temp/deck")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(app.registry.is_empty());
}

#[tokio::test]
async fn static_files_are_served_from_public_dir() {
    let config = test_config("static");
    std::fs::write(config.public_dir.join("index.html"), "<h1>decks</h1>").unwrap();
    let app = spawn_app(config, None).await;

    let res = app.client.get(app.url("/index.html")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "<h1>decks</h1>");

    let res = app.client.get(app.url("/missing.css")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
