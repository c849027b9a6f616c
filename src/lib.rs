//! newsdigest - Streaming news analysis with dual-LLM validation
//!
//! Fetches recent articles on a topic, asks a language model to summarize
//! and score each one, asks a second model call to validate that analysis,
//! and streams progress plus final results to the caller.
//!
//! # Architecture
//!
//! The system is built around an ordered event stream:
//! - A run is a lazily produced sequence of `PipelineEvent`s
//! - Per-article failures degrade to well-formed fallback records
//! - Only an empty fetch or an unexpected failure ends a run early
//!
//! # Modules
//!
//! - `adapters`: External system integrations (NewsAPI, Groq)
//! - `core`: Orchestration logic (Orchestrator, Extractor, Stages)
//! - `domain`: Data structures (Article, AnalysisResult, PipelineEvent)
//! - `report`: Markdown/JSON outputs for the CLI
//! - `server`: Server-Sent Events API
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Analyze 5 technology articles and write reports to ./output
//! newsdigest run --topic Technology --count 5
//!
//! # Stream runs over SSE
//! newsdigest serve --address 0.0.0.0:8000
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod server;

// Re-export main types at crate root for convenience
pub use crate::adapters::{ArticleSource, LanguageModel};
pub use crate::config::{PipelineSettings, Settings};
pub use crate::core::{extract, ExtractError, Orchestrator};
pub use crate::domain::{AnalysisResult, Article, EventKind, PipelineEvent, Sentiment, ValidationResult};
