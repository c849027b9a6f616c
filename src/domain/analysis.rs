//! Per-article results of the analysis and validation stages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::article::Article;

/// Gist used when an article could not be analyzed
pub const UNANALYZED_GIST: &str = "Unable to analyze article";

/// Sentiment label assigned by the analysis stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl Default for Sentiment {
    fn default() -> Self {
        Self::Neutral
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(format!(
                "unknown sentiment '{}' (expected positive, negative or neutral)",
                other
            )),
        }
    }
}

// Models are inconsistent about casing ("Positive", "NEUTRAL"), so labels
// are matched case-insensitively.
impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Output of the first model call for one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// One or two sentence summary
    pub gist: String,

    pub sentiment: Sentiment,

    /// Short description of the writing tone (e.g. "analytical")
    pub tone: String,

    /// Set when extraction or the model call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Well-formed stand-in for an article whose analysis failed
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            gist: UNANALYZED_GIST.to_string(),
            sentiment: Sentiment::Neutral,
            tone: "unknown".to_string(),
            error: Some(error.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Output of the second model call, judging an [`AnalysisResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,

    pub notes: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    /// Failed verdict used when validation could not be completed
    pub fn degraded(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            is_valid: false,
            notes: format!("Validation failed due to error: {}", error),
            error: Some(error),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// An article together with everything the pipeline learned about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedArticle {
    pub article: Article,
    pub analysis: AnalysisResult,
    pub validation: ValidationResult,
}

/// Caller-facing projection of a [`ValidatedArticle`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    /// 1-based position in fetch order
    pub id: usize,
    pub title: String,
    pub sentiment: Sentiment,
    pub validation_passed: bool,
    pub validation_note: String,
    pub summary: String,
    pub url: String,
}

impl ArticleSummary {
    pub fn project(id: usize, record: &ValidatedArticle) -> Self {
        let url = if record.article.url.is_empty() {
            "#".to_string()
        } else {
            record.article.url.clone()
        };

        Self {
            id,
            title: record.article.title.clone(),
            sentiment: record.analysis.sentiment,
            validation_passed: record.validation.is_valid,
            validation_note: record.validation.notes.clone(),
            summary: record.analysis.gist.clone(),
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_case_insensitive() {
        let parsed: Sentiment = serde_json::from_str("\"Positive\"").unwrap();
        assert_eq!(parsed, Sentiment::Positive);

        let parsed: Sentiment = serde_json::from_str("\" NEUTRAL \"").unwrap();
        assert_eq!(parsed, Sentiment::Neutral);

        assert!(serde_json::from_str::<Sentiment>("\"mixed\"").is_err());
        assert_eq!(serde_json::to_string(&Sentiment::Negative).unwrap(), "\"negative\"");
    }

    #[test]
    fn test_degraded_analysis() {
        let analysis = AnalysisResult::degraded("model unavailable");

        assert_eq!(analysis.gist, UNANALYZED_GIST);
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert!(analysis.is_degraded());
    }

    #[test]
    fn test_degraded_validation_notes() {
        let validation = ValidationResult::degraded("Missing required fields: notes");

        assert!(!validation.is_valid);
        assert!(validation.notes.starts_with("Validation failed"));
        assert_eq!(validation.error.as_deref(), Some("Missing required fields: notes"));
    }

    #[test]
    fn test_error_field_omitted_when_absent() {
        let validation = ValidationResult {
            is_valid: true,
            notes: "Accurate".to_string(),
            error: None,
        };

        let json = serde_json::to_value(&validation).unwrap();
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_summary_projection() {
        let record = ValidatedArticle {
            article: Article::new("Budget passed", "Parliament votes").with_url("https://example.com/b"),
            analysis: AnalysisResult {
                gist: "The budget passed.".to_string(),
                sentiment: Sentiment::Positive,
                tone: "neutral".to_string(),
                error: None,
            },
            validation: ValidationResult {
                is_valid: true,
                notes: "Accurate".to_string(),
                error: None,
            },
        };

        let json = serde_json::to_value(ArticleSummary::project(3, &record)).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["sentiment"], "positive");
        assert_eq!(json["validationPassed"], true);
        assert_eq!(json["validationNote"], "Accurate");
        assert_eq!(json["summary"], "The budget passed.");
        assert_eq!(json["url"], "https://example.com/b");
    }
}
