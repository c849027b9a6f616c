//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use newsdigest::adapters::{ArticleSource, LanguageModel};
use newsdigest::domain::Article;
use serde_json::json;

/// Returns a fixed article list, or fails outright
pub struct StaticSource {
    articles: Option<Vec<Article>>,
    pub requested: Mutex<Vec<(String, usize)>>,
}

impl StaticSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles: Some(articles),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            articles: None,
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ArticleSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, topic: &str, count: usize) -> Result<Vec<Article>> {
        self.requested.lock().unwrap().push((topic.to_string(), count));
        match &self.articles {
            Some(articles) => Ok(articles.clone()),
            None => anyhow::bail!("connection pool exhausted"),
        }
    }
}

/// Replies with scripted responses in call order and records every prompt
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => anyhow::bail!(e),
            None => anyhow::bail!("no scripted reply left"),
        }
    }
}

pub fn article(n: usize) -> Article {
    Article::new(format!("Headline {}", n), format!("Description {}", n))
        .with_content(format!("Body of article {}", n))
        .with_url(format!("https://example.com/{}", n))
        .with_source("Test News")
}

pub fn analysis_reply(sentiment: &str) -> Result<String, String> {
    Ok(json!({"gist": "A short gist.", "sentiment": sentiment, "tone": "analytical"}).to_string())
}

pub fn validation_reply(is_valid: bool, notes: &str) -> Result<String, String> {
    Ok(format!(
        "```json\n{}\n```",
        json!({"is_valid": is_valid, "notes": notes})
    ))
}
