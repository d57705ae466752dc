// HTTP request handlers - Read-only snapshot feed for renderers
use crate::domain::snapshot::Snapshot;
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::watch;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest snapshot as JSON
pub async fn latest_snapshot(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.snapshots.borrow().clone())
}

/// Server-sent events, one `snapshot` event per published snapshot
pub async fn stream_snapshots(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!("Snapshot stream client connected");
    let events = snapshot_json_stream(state.snapshots.clone());
    let stream = async_stream::stream! {
        for await json in events {
            yield Ok(Event::default().event("snapshot").data(json));
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// The current snapshot first, then each new one. Ends when the session is gone.
fn snapshot_json_stream(mut rx: watch::Receiver<Snapshot>) -> impl Stream<Item = String> {
    async_stream::stream! {
        loop {
            let json = serde_json::to_string(&*rx.borrow_and_update());
            match json {
                Ok(json) => yield json,
                Err(e) => tracing::error!("Failed to serialize snapshot: {}", e),
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}
