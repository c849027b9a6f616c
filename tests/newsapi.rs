//! NewsAPI Client Integration Tests
//!
//! Runs the fetch client against an in-process HTTP server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use newsdigest::adapters::{ArticleSource, NewsApiClient};
use serde_json::{json, Value};

#[derive(Default)]
struct Upstream {
    hits: AtomicUsize,
    /// Number of initial requests answered with 429
    rate_limited: usize,
    status: Option<StatusCode>,
    body: Value,
    last_query: Mutex<HashMap<String, String>>,
}

async fn everything(
    State(upstream): State<Arc<Upstream>>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let hit = upstream.hits.fetch_add(1, Ordering::SeqCst);
    *upstream.last_query.lock().unwrap() = query;

    if hit < upstream.rate_limited {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"status": "error", "code": "rateLimited"})),
        );
    }

    (
        upstream.status.unwrap_or(StatusCode::OK),
        Json(upstream.body.clone()),
    )
}

async fn spawn(upstream: Arc<Upstream>) -> String {
    let router = Router::new()
        .route("/v2/everything", get(everything))
        .with_state(upstream);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}/v2", addr)
}

fn sample_body(n: usize) -> Value {
    let articles: Vec<Value> = (1..=n)
        .map(|i| {
            json!({
                "source": {"id": null, "name": "Test News"},
                "title": format!("  Headline {}  ", i),
                "description": format!("Description {}", i),
                "content": format!("Body {}", i),
                "url": format!("https://example.com/{}", i),
                "publishedAt": "2024-01-15T10:00:00Z"
            })
        })
        .collect();

    json!({"status": "ok", "totalResults": n, "articles": articles})
}

fn client(base_url: &str) -> NewsApiClient {
    NewsApiClient::new("test_key")
        .with_base_url(base_url)
        .with_rate_limit_wait(Duration::ZERO)
}

#[tokio::test]
async fn test_successful_fetch() {
    let upstream = Arc::new(Upstream {
        body: sample_body(2),
        ..Default::default()
    });
    let base = spawn(upstream.clone()).await;

    let articles = client(&base).fetch("Technology", 2).await.unwrap();

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].title, "Headline 1");
    assert_eq!(articles[0].source, "Test News");
    assert_eq!(articles[0].published_at, "2024-01-15T10:00:00Z");

    let query = upstream.last_query.lock().unwrap().clone();
    assert_eq!(
        query.get("q").map(String::as_str),
        Some("technology OR tech news OR artificial intelligence")
    );
    assert_eq!(query.get("pageSize").map(String::as_str), Some("2"));
    assert_eq!(query.get("language").map(String::as_str), Some("en"));
    assert_eq!(query.get("sortBy").map(String::as_str), Some("publishedAt"));
    assert_eq!(query.get("apiKey").map(String::as_str), Some("test_key"));
    assert!(query.contains_key("from"));
    assert!(query.contains_key("to"));
}

#[tokio::test]
async fn test_unknown_topic_uses_default_query() {
    let upstream = Arc::new(Upstream {
        body: sample_body(1),
        ..Default::default()
    });
    let base = spawn(upstream.clone()).await;

    client(&base).fetch("Gardening", 1).await.unwrap();

    let query = upstream.last_query.lock().unwrap().clone();
    assert_eq!(query.get("q").map(String::as_str), Some("India politics"));
}

#[tokio::test]
async fn test_truncates_to_count() {
    let upstream = Arc::new(Upstream {
        body: sample_body(5),
        ..Default::default()
    });
    let base = spawn(upstream).await;

    let articles = client(&base).fetch("Business", 3).await.unwrap();
    assert_eq!(articles.len(), 3);
}

#[tokio::test]
async fn test_rate_limit_retried_once() {
    let upstream = Arc::new(Upstream {
        rate_limited: 1,
        body: sample_body(1),
        ..Default::default()
    });
    let base = spawn(upstream.clone()).await;

    let articles = client(&base).fetch("Business", 1).await.unwrap();

    assert_eq!(articles.len(), 1);
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_persistent_rate_limit_returns_empty() {
    let upstream = Arc::new(Upstream {
        rate_limited: 10,
        body: sample_body(1),
        ..Default::default()
    });
    let base = spawn(upstream.clone()).await;

    let articles = client(&base).fetch("Business", 1).await.unwrap();

    assert!(articles.is_empty());
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_api_error_status_returns_empty() {
    let upstream = Arc::new(Upstream {
        body: json!({"status": "error", "message": "Your API key is invalid."}),
        ..Default::default()
    });
    let base = spawn(upstream).await;

    let articles = client(&base).fetch("Business", 3).await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn test_server_error_returns_empty() {
    let upstream = Arc::new(Upstream {
        status: Some(StatusCode::INTERNAL_SERVER_ERROR),
        body: json!({"status": "error"}),
        ..Default::default()
    });
    let base = spawn(upstream).await;

    let articles = client(&base).fetch("Business", 3).await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn test_unreachable_host_returns_empty() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let articles = client(&format!("http://{}/v2", addr))
        .fetch("Business", 3)
        .await
        .unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn test_items_without_description_skipped() {
    let upstream = Arc::new(Upstream {
        body: json!({
            "status": "ok",
            "articles": [
                {"title": "No description", "description": null, "url": "https://example.com/x"},
                {"title": "Complete", "description": "Has one", "source": {"name": null}}
            ]
        }),
        ..Default::default()
    });
    let base = spawn(upstream).await;

    let articles = client(&base).fetch("Business", 5).await.unwrap();

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "Complete");
    assert_eq!(articles[0].source, "Unknown");
    assert_eq!(articles[0].content, "");
}
