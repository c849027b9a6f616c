//! HTTP server streaming pipeline runs as Server-Sent Events.
//!
//! - `GET /api/health` → `{"status": "ok"}`
//! - `GET /api/analyze?topic=..&count=..` → one SSE message per pipeline
//!   event (`event: <kind>`, `data: <payload JSON>`), without `full_result`.
//!
//! A client disconnect drops the response body, which drops the event
//! stream and cancels the run.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio_util::sync::{CancellationToken, DropGuard};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::core::Orchestrator;
use crate::domain::{EventKind, PipelineEvent};

/// Origins always allowed to call the API
const DEFAULT_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    pub topic: Option<String>,
    pub count: Option<usize>,
}

/// Build the API router
pub fn router(state: AppState, extra_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = DEFAULT_ORIGINS
        .iter()
        .map(|o| o.to_string())
        .chain(extra_origins.iter().cloned())
        .filter_map(|origin| match HeaderValue::from_str(origin.trim_end_matches('/')) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_credentials(true);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/analyze", get(analyze_news))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(address: &str, state: AppState, extra_origins: &[String]) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %listener.local_addr()?, "Serving news analysis API");

    axum::serve(listener, router(state, extra_origins))
        .await
        .context("HTTP server failed")
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn analyze_news(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let settings = state.orchestrator.settings();
    let topic = query
        .topic
        .unwrap_or_else(|| settings.default_topic.clone());
    let count = query.count.unwrap_or(settings.default_count);

    info!(%topic, count, "Streaming analysis");

    let cancel = CancellationToken::new();
    let guard = DisconnectGuard {
        _cancel: cancel.clone().drop_guard(),
    };
    let events = state.orchestrator.run_with_cancel(topic, count, cancel);

    let stream = events.filter_map(move |event| {
        // Keep the guard alive as long as the response body
        let _guard = &guard;
        let message = to_sse(&event);
        async move { message.map(Ok) }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    )
}

/// Cancels the run when the response stream is dropped
struct DisconnectGuard {
    _cancel: DropGuard,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        info!("Analysis stream closed");
    }
}

/// Convert a pipeline event into an SSE message; `None` for events
/// streaming clients do not receive
pub fn to_sse(event: &PipelineEvent) -> Option<Event> {
    if event.kind() == EventKind::FullResult {
        return None;
    }

    let data = match event.payload() {
        Ok(payload) => payload.to_string(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize event payload");
            return None;
        }
    };

    Some(Event::default().event(event.kind().as_str()).data(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stage;

    #[test]
    fn test_full_result_not_streamed() {
        let event = PipelineEvent::FullResult {
            validated_results: vec![],
            raw_articles: vec![],
        };
        assert!(to_sse(&event).is_none());
    }

    #[test]
    fn test_streamed_kinds() {
        assert!(to_sse(&PipelineEvent::log("hello", Stage::Fetch)).is_some());
        assert!(to_sse(&PipelineEvent::Result { articles: vec![] }).is_some());
        assert!(to_sse(&PipelineEvent::error("boom")).is_some());
        assert!(to_sse(&PipelineEvent::close()).is_some());
    }
}
