//! Groq chat-completions client (OpenAI-compatible wire format).

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LanguageModel;
use crate::config::ModelSettings;

/// System message sent with every completion
const SYSTEM_PROMPT: &str =
    "You are a careful news analyst. Respond with a single valid JSON object and nothing else.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat-completions client for Groq or any OpenAI-compatible endpoint
pub struct GroqClient {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    http: reqwest::Client,
}

impl GroqClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_settings(api_key, &ModelSettings::default())
    }

    pub fn from_settings(api_key: impl Into<String>, settings: &ModelSettings) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs(settings.timeout_seconds),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .context("API key contains invalid header characters")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl LanguageModel for GroqClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, prompt_bytes = prompt.len(), "Chat completion request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Chat completion request to {} failed", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Model API error ({}): {}", status, error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to decode chat completion response")?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("Model returned no completion"))
    }
}
