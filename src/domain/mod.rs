//! Domain types for the news analysis pipeline.
//!
//! This module contains the core data structures:
//! - Article: Normalized news items
//! - Analysis: Per-article analysis and validation results
//! - Events: The ordered progress stream of a run

pub mod analysis;
pub mod article;
pub mod events;

// Re-export commonly used types
pub use analysis::{
    AnalysisResult, ArticleSummary, Sentiment, ValidatedArticle, ValidationResult,
    UNANALYZED_GIST,
};
pub use article::Article;
pub use events::{EventKind, PipelineEvent, Stage};
