//! NewsAPI client.
//!
//! One GET against the `everything` endpoint, a single retry after an
//! explicit rate-limit response, and normalization of the returned items.
//! Any unrecoverable failure is logged and reported as an empty list.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::ArticleSource;
use crate::config::NewsSettings;
use crate::domain::Article;

/// Query used for topics without an explicit mapping
pub const DEFAULT_QUERY: &str = "India politics";

/// Map a user-facing topic to a provider query
pub fn topic_query(topic: &str) -> &'static str {
    match topic {
        "Indian Politics" => "India politics OR India government",
        "Technology" => "technology OR tech news OR artificial intelligence",
        "Business" => "business OR economy OR market",
        "International" => "international news OR world news",
        _ => DEFAULT_QUERY,
    }
}

/// NewsAPI `everything` endpoint client
pub struct NewsApiClient {
    api_key: String,
    base_url: String,
    /// Per-request timeout
    timeout: Duration,
    /// How long to wait before the single retry after HTTP 429
    rate_limit_wait: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl NewsApiClient {
    /// Create a client with default endpoint and timeouts
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_settings(api_key, &NewsSettings::default())
    }

    /// Create a client from resolved settings
    pub fn from_settings(api_key: impl Into<String>, settings: &NewsSettings) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(settings.timeout_seconds),
            rate_limit_wait: Duration::from_secs(settings.rate_limit_wait_seconds),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the wait before retrying a rate-limited request
    pub fn with_rate_limit_wait(mut self, wait: Duration) -> Self {
        self.rate_limit_wait = wait;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/everything", self.base_url)
    }

    async fn send(&self, params: &[(&str, String)]) -> Result<reqwest::Response> {
        self.client
            .get(self.endpoint())
            .query(params)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("NewsAPI request failed (timeout {:?})", self.timeout))
    }

    async fn request(&self, topic: &str, count: usize) -> Result<Vec<Article>> {
        let to = Utc::now();
        let from = to - chrono::Duration::days(1);

        let params = [
            ("q", topic_query(topic).to_string()),
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
            ("language", "en".to_string()),
            ("sortBy", "publishedAt".to_string()),
            ("pageSize", count.to_string()),
            ("apiKey", self.api_key.clone()),
        ];

        debug!(query = %params[0].1, "Requesting articles from NewsAPI");
        let mut response = self.send(&params).await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!(
                wait_secs = self.rate_limit_wait.as_secs(),
                "NewsAPI rate limit hit, waiting before retry"
            );
            tokio::time::sleep(self.rate_limit_wait).await;
            response = self.send(&params).await?;
        }

        let response = response
            .error_for_status()
            .context("NewsAPI returned an error status")?;

        let body: NewsApiResponse = response
            .json()
            .await
            .context("Failed to parse NewsAPI response")?;

        if body.status != "ok" {
            anyhow::bail!(
                "NewsAPI error: {}",
                body.message.unwrap_or_else(|| "Unknown error".to_string())
            );
        }

        Ok(normalize(body.articles, count))
    }
}

/// Drop items without a title or description, trim text, truncate to `count`
fn normalize(raw: Vec<RawArticle>, count: usize) -> Vec<Article> {
    raw.into_iter()
        .filter_map(|item| {
            let title = item.title.filter(|t| !t.trim().is_empty())?;
            let description = item.description.filter(|d| !d.trim().is_empty())?;

            Some(Article {
                title: title.trim().to_string(),
                description: description.trim().to_string(),
                content: item.content.unwrap_or_default().trim().to_string(),
                url: item.url.unwrap_or_default(),
                published_at: item.published_at.unwrap_or_default(),
                source: item
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "Unknown".to_string()),
            })
        })
        .take(count)
        .collect()
}

#[async_trait]
impl ArticleSource for NewsApiClient {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    #[instrument(skip(self), fields(source = "newsapi"))]
    async fn fetch(&self, topic: &str, count: usize) -> Result<Vec<Article>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        match self.request(topic, count).await {
            Ok(articles) => {
                info!(fetched = articles.len(), "NewsAPI fetch complete");
                Ok(articles)
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "NewsAPI fetch failed");
                Ok(Vec::new())
            }
        }
    }
}
