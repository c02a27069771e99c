//! One `timestamp|METHOD|uri|status[details]` line per request.
//!
//! Handlers attach a [`LogDetail`] to their response extensions; the
//! middleware appends it to the line. Lines go to `tracing` and, when a
//! file is configured, to an append-only CSV file.

use super::AppState;
use crate::cards::Card;
use crate::deck::DeckId;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const STATIC_SUFFIXES: [&str; 7] = [".html", ".css", ".js", ".png", ".jpg", ".jpeg", ".gif"];

/// Domain detail a handler wants in its log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LogDetail {
    Deck(DeckId),
    Card(Card),
    Shuffled,
}

impl fmt::Display for LogDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogDetail::Deck(id) => write!(f, " |DECK:{id}"),
            LogDetail::Card(card) => write!(f, " |CARD:{card}"),
            LogDetail::Shuffled => f.write_str(" |SHUFFLED"),
        }
    }
}

pub fn format_line(
    at: DateTime<Utc>,
    method: &Method,
    uri: &Uri,
    status: StatusCode,
    detail: Option<&LogDetail>,
) -> String {
    let detail = detail.map(ToString::to_string).unwrap_or_default();
    format!(
        "{}|{}|{}|{}{}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        method,
        uri,
        status.as_u16(),
        detail
    )
}

fn is_static(path: &str) -> bool {
    STATIC_SUFFIXES.iter().any(|s| path.ends_with(s))
}

#[derive(Debug)]
pub struct RequestLog {
    file: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl RequestLog {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file, write_lock: Mutex::new(()) }
    }

    /// Append one line to the log file. Failures are reported, not returned.
    pub async fn append(&self, line: &str) {
        let Some(path) = &self.file else { return };
        let _guard = self.write_lock.lock().await;
        let result = async {
            let mut f = OpenOptions::new().create(true).append(true).open(path).await?;
            f.write_all(format!("{line}\n").as_bytes()).await
        }
        .await;
        if let Err(e) = result {
            tracing::error!(path = %path.display(), error = %e, "failed to write request log");
        }
    }
}

pub(super) async fn record(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    if is_static(uri.path()) {
        return response;
    }

    let line = format_line(
        Utc::now(),
        &method,
        &uri,
        response.status(),
        response.extensions().get::<LogDetail>(),
    );
    tracing::info!(target: "deckhouse::requests", "{line}");
    let log = Arc::clone(&state.request_log);
    tokio::spawn(async move { log.append(&line).await });
    response
}
