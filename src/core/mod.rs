//! Core pipeline logic.
//!
//! This module contains:
//! - Extract: Recovering structured JSON from model output
//! - Prompts: Analysis and validation prompt construction
//! - Stages: Per-article analysis/validation with degraded fallbacks
//! - Orchestrator: The staged, event-emitting run

pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod prompts;
pub mod stages;

// Re-export commonly used types
pub use error::{PipelineError, StageError};
pub use extract::{extract, extract_as, ExtractError};
pub use orchestrator::{EventStream, Orchestrator};
pub use prompts::{analysis_prompt, validation_prompt, ANALYSIS_FIELDS, VALIDATION_FIELDS};
pub use stages::{analyze_article, validate_analysis};
