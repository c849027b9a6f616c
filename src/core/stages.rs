//! Per-article analysis and validation.
//!
//! Both stages call the model once, run the reply through the extractor and
//! convert any failure (transport, parse, schema) into a degraded record so
//! the run can continue.

use tracing::warn;

use crate::adapters::LanguageModel;
use crate::domain::{AnalysisResult, Article, ValidationResult};

use super::error::StageError;
use super::extract::extract_as;
use super::prompts::{analysis_prompt, validation_prompt, ANALYSIS_FIELDS, VALIDATION_FIELDS};

/// Summarize and score one article
pub async fn analyze_article(model: &dyn LanguageModel, article: &Article) -> AnalysisResult {
    match try_analyze(model, article).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!(article = %article.title, error = %e, "Analysis failed, using fallback");
            AnalysisResult::degraded(e.to_string())
        }
    }
}

/// Ask the model to judge a previous analysis
pub async fn validate_analysis(
    model: &dyn LanguageModel,
    article: &Article,
    analysis: &AnalysisResult,
) -> ValidationResult {
    match try_validate(model, article, analysis).await {
        Ok(validation) => validation,
        Err(e) => {
            warn!(article = %article.title, error = %e, "Validation failed, using fallback");
            ValidationResult::degraded(e.to_string())
        }
    }
}

async fn try_analyze(
    model: &dyn LanguageModel,
    article: &Article,
) -> Result<AnalysisResult, StageError> {
    let raw = model
        .complete(&analysis_prompt(article))
        .await
        .map_err(StageError::Transport)?;

    let mut analysis: AnalysisResult = extract_as(&raw, ANALYSIS_FIELDS)?;
    // `error` is ours to set, not the model's
    analysis.error = None;
    Ok(analysis)
}

async fn try_validate(
    model: &dyn LanguageModel,
    article: &Article,
    analysis: &AnalysisResult,
) -> Result<ValidationResult, StageError> {
    let raw = model
        .complete(&validation_prompt(article, analysis))
        .await
        .map_err(StageError::Transport)?;

    let mut validation: ValidationResult = extract_as(&raw, VALIDATION_FIELDS)?;
    validation.error = None;
    Ok(validation)
}
