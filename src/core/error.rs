//! Error taxonomy for pipeline runs.

use thiserror::Error;

use super::extract::ExtractError;

/// Failures that end a run with a terminal `error` event
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The fetch collaborator produced no articles
    #[error("No articles found or API error.")]
    EmptyFetch,

    /// Anything the pipeline did not anticipate
    #[error("Internal Server Error: {0:#}")]
    Unhandled(#[from] anyhow::Error),
}

/// Per-article failures, recovered by substituting a degraded record
#[derive(Debug, Error)]
pub enum StageError {
    /// The model call itself failed
    #[error("{0:#}")]
    Transport(anyhow::Error),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}
