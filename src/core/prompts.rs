//! Prompt construction for the analysis and validation calls.

use crate::domain::{AnalysisResult, Article};

/// Fields the analysis reply must contain
pub const ANALYSIS_FIELDS: &[&str] = &["gist", "sentiment", "tone"];

/// Fields the validation reply must contain
pub const VALIDATION_FIELDS: &[&str] = &["is_valid", "notes"];

pub fn analysis_prompt(article: &Article) -> String {
    format!(
        r#"Analyze the following news article.

Title: {title}
Description: {description}
Content: {content}

Respond with a JSON object with exactly these fields:
- "gist": a 1-2 sentence summary of the article
- "sentiment": one of "positive", "negative" or "neutral"
- "tone": one or two words describing the tone (e.g. "analytical", "urgent", "critical")

Return only the JSON object."#,
        title = article.title,
        description = article.description,
        content = article.content,
    )
}

pub fn validation_prompt(article: &Article, analysis: &AnalysisResult) -> String {
    format!(
        r#"You are reviewing another analyst's work on a news article.

Article title: {title}
Article description: {description}
Article content: {content}

Proposed analysis:
- Gist: {gist}
- Sentiment: {sentiment}
- Tone: {tone}

Check whether the gist is faithful to the article and whether the sentiment
and tone labels are justified by the text.

Respond with a JSON object with exactly these fields:
- "is_valid": true if the analysis is accurate, false otherwise
- "notes": one or two sentences explaining the verdict

Return only the JSON object."#,
        title = article.title,
        description = article.description,
        content = article.content,
        gist = analysis.gist,
        sentiment = analysis.sentiment,
        tone = analysis.tone,
    )
}
