//! News articles as produced by the fetch collaborator.

use serde::{Deserialize, Serialize};

/// A single normalized news item.
///
/// Articles are immutable once produced. Within a run an article is
/// identified by its `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,

    pub description: String,

    /// Article body (may be truncated by the provider)
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub url: String,

    /// Publication timestamp as reported by the provider (ISO 8601)
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,

    /// Name of the publishing outlet
    #[serde(default)]
    pub source: String,
}

impl Article {
    /// Create an article with just a title and description
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            content: String::new(),
            url: String::new(),
            published_at: String::new(),
            source: String::new(),
        }
    }

    /// Set the article body
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the article URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the publishing outlet
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_wire_names() {
        let mut article = Article::new("Title", "Description").with_url("https://example.com/a");
        article.published_at = "2024-01-15T10:00:00Z".to_string();

        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["publishedAt"], "2024-01-15T10:00:00Z");
        assert_eq!(json["url"], "https://example.com/a");
        assert!(json.get("published_at").is_none());
    }
}
