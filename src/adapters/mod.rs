//! Adapter interfaces for external systems.
//!
//! The orchestrator talks to the outside world through two traits: an
//! [`ArticleSource`] that produces normalized articles and a
//! [`LanguageModel`] that turns a prompt into raw text. Tests substitute
//! in-memory implementations.

pub mod groq;
pub mod newsapi;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::Article;

pub use groq::GroqClient;
pub use newsapi::{topic_query, NewsApiClient, DEFAULT_QUERY};

/// Source of news articles
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Fetch up to `count` recent articles for `topic`.
    ///
    /// Implementations report unrecoverable upstream failures as an empty
    /// list. An `Err` is treated by the orchestrator as unexpected.
    async fn fetch(&self, topic: &str, count: usize) -> Result<Vec<Article>>;
}

/// Single-call contract to a generative language model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Human-readable model/provider name
    fn name(&self) -> &str;

    /// Send a prompt and return the raw, untrusted completion text
    async fn complete(&self, prompt: &str) -> Result<String>;
}
