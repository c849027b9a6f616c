//! Events emitted by the pipeline orchestrator.
//!
//! A run produces a totally ordered sequence of events. Presentation layers
//! (CLI printer, SSE server) consume the sequence without reinterpreting it.

use serde::{Deserialize, Serialize};

use super::analysis::{ArticleSummary, ValidatedArticle};
use super::article::Article;

/// Pipeline stage a log event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Analyze,
    Validate,
    Done,
}

/// Discriminant of a [`PipelineEvent`], also used as the SSE event name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Log,
    Result,
    FullResult,
    Error,
    Close,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Result => "result",
            Self::FullResult => "full_result",
            Self::Error => "error",
            Self::Close => "close",
        }
    }
}

/// A single unit of observable progress.
///
/// Serializes as `{"kind": ..., "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Progress message
    Log { message: String, step: Stage },

    /// Caller-facing projection of every article
    Result { articles: Vec<ArticleSummary> },

    /// Unprojected records for file-saving consumers; streaming consumers skip it
    FullResult {
        validated_results: Vec<ValidatedArticle>,
        raw_articles: Vec<Article>,
    },

    /// Terminal failure; no `Close` follows
    Error { message: String },

    /// Terminal success marker
    Close { message: String },
}

impl PipelineEvent {
    pub fn log(message: impl Into<String>, step: Stage) -> Self {
        Self::Log {
            message: message.into(),
            step,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn close() -> Self {
        Self::Close {
            message: "Stream closed".to_string(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Log { .. } => EventKind::Log,
            Self::Result { .. } => EventKind::Result,
            Self::FullResult { .. } => EventKind::FullResult,
            Self::Error { .. } => EventKind::Error,
            Self::Close { .. } => EventKind::Close,
        }
    }

    /// True for the events that end a run
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind(), EventKind::Error | EventKind::Close)
    }

    /// The event body without its kind tag
    pub fn payload(&self) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        Ok(value
            .get_mut("payload")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_shape() {
        let event = PipelineEvent::log("Connecting to NewsAPI...", Stage::Fetch);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "log");
        assert_eq!(json["payload"]["message"], "Connecting to NewsAPI...");
        assert_eq!(json["payload"]["step"], "fetch");
    }

    #[test]
    fn test_payload_strips_kind() {
        let event = PipelineEvent::error("No articles found or API error.");

        let payload = event.payload().unwrap();
        assert_eq!(payload, serde_json::json!({"message": "No articles found or API error."}));
        assert_eq!(event.kind().as_str(), "error");
    }

    #[test]
    fn test_terminal_events() {
        assert!(PipelineEvent::close().is_terminal());
        assert!(PipelineEvent::error("boom").is_terminal());
        assert!(!PipelineEvent::log("working", Stage::Analyze).is_terminal());
        assert!(!PipelineEvent::Result { articles: vec![] }.is_terminal());
    }

    #[test]
    fn test_event_roundtrip() {
        let event = PipelineEvent::log("Validating article 1/2...", Stage::Validate);
        let json = serde_json::to_string(&event).unwrap();
        let parsed: PipelineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
