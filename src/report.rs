//! Report generation for completed runs.
//!
//! Writes the raw articles, the validated records and a markdown summary
//! into an output directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::fs;
use tracing::info;

use crate::domain::{Article, Sentiment, ValidatedArticle};

pub const RAW_ARTICLES_FILE: &str = "raw_articles.json";
pub const VALIDATED_RESULTS_FILE: &str = "validated_results.json";
pub const REPORT_FILE: &str = "final_report.md";

/// Sentiment distribution across a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentTally {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentTally {
    pub fn from_records(records: &[ValidatedArticle]) -> Self {
        records
            .iter()
            .fold(Self::default(), |mut tally, record| {
                match record.analysis.sentiment {
                    Sentiment::Positive => tally.positive += 1,
                    Sentiment::Negative => tally.negative += 1,
                    Sentiment::Neutral => tally.neutral += 1,
                }
                tally
            })
    }
}

/// Render the human-readable markdown report
pub fn render_markdown(records: &[ValidatedArticle], generated_at: DateTime<Local>) -> String {
    let tally = SentimentTally::from_records(records);

    let mut lines = vec![
        "# News Analysis Report".to_string(),
        format!("**Date:** {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        format!("**Articles Analyzed:** {}", records.len()),
        "**Source:** NewsAPI".to_string(),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- Positive: {} articles", tally.positive),
        format!("- Negative: {} articles", tally.negative),
        format!("- Neutral: {} articles", tally.neutral),
        String::new(),
        "## Detailed Analysis".to_string(),
        String::new(),
    ];

    for (idx, record) in records.iter().enumerate() {
        let url = if record.article.url.is_empty() {
            "#"
        } else {
            record.article.url.as_str()
        };
        let mark = if record.validation.is_valid { "✓" } else { "✗" };

        lines.push(format!("### Article {}: \"{}\"", idx + 1, record.article.title));
        lines.push(format!("- **Source:** [{}]({})", url, url));
        lines.push(format!("- **Gist:** {}", record.analysis.gist));
        lines.push(format!("- **LLM#1 Sentiment:** {}", record.analysis.sentiment));
        lines.push(format!(
            "- **LLM#2 Validation:** {} {}",
            mark, record.validation.notes
        ));
        lines.push(format!("- **Tone:** {}", record.analysis.tone));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Paths of the files written by [`save_run`]
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub raw_articles: PathBuf,
    pub validated_results: PathBuf,
    pub report: PathBuf,
}

/// Write all run outputs into `dir`, creating it if needed
pub async fn save_run(
    dir: &Path,
    raw_articles: &[Article],
    records: &[ValidatedArticle],
) -> Result<SavedReport> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let saved = SavedReport {
        raw_articles: write_json(dir, RAW_ARTICLES_FILE, &raw_articles).await?,
        validated_results: write_json(dir, VALIDATED_RESULTS_FILE, &records).await?,
        report: dir.join(REPORT_FILE),
    };

    fs::write(&saved.report, render_markdown(records, Local::now()))
        .await
        .with_context(|| format!("Failed to write report: {}", saved.report.display()))?;
    info!(path = %saved.report.display(), "Report written");

    Ok(saved)
}

async fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", name))?;

    fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
