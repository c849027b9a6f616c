//! Main orchestrator for pipeline execution.
//!
//! A run is a lazily produced, totally ordered stream of [`PipelineEvent`]s:
//!
//! ```text
//! INIT -> FETCHING -> ANALYZING -> VALIDATING -> FINALIZING -> CLOSED
//!   \________\___________\____________\______________-> ERRORED
//! ```
//!
//! The producer suspends between events, so nothing runs unless the
//! consumer polls. Dropping the stream or firing the cancellation token
//! stops further model calls.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::adapters::{ArticleSource, GroqClient, LanguageModel, NewsApiClient};
use crate::config::{PipelineSettings, Settings};
use crate::domain::{ArticleSummary, PipelineEvent, Stage, ValidatedArticle};

use super::error::PipelineError;
use super::stages::{analyze_article, validate_analysis};

/// Event stream for a single run
pub type EventStream = Pin<Box<dyn Stream<Item = PipelineEvent> + Send>>;

/// Staged news analysis pipeline
pub struct Orchestrator {
    source: Arc<dyn ArticleSource>,
    model: Arc<dyn LanguageModel>,
    settings: PipelineSettings,
}

impl Orchestrator {
    /// Create an orchestrator over explicit collaborators
    pub fn new(
        source: Arc<dyn ArticleSource>,
        model: Arc<dyn LanguageModel>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            model,
            settings,
        }
    }

    /// Build the NewsAPI and Groq collaborators from resolved settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let source = NewsApiClient::from_settings(settings.newsapi_key()?, &settings.news);
        let model = GroqClient::from_settings(settings.groq_api_key()?, &settings.model);

        Ok(Self::new(
            Arc::new(source),
            Arc::new(model),
            settings.pipeline.clone(),
        ))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run the pipeline for `topic`, analyzing at most `count` articles
    pub fn run(&self, topic: impl Into<String>, count: usize) -> EventStream {
        self.run_with_cancel(topic, count, CancellationToken::new())
    }

    /// Like [`run`](Self::run), stopping early once `cancel` fires.
    ///
    /// Cancellation is checked before each model call and interrupts the
    /// throttling delays. A call that is already in flight completes, but
    /// its result is not emitted.
    ///
    /// Every poll of the returned stream runs inside a `run` span carrying
    /// the run id, so stage and adapter logs inherit it.
    pub fn run_with_cancel(
        &self,
        topic: impl Into<String>,
        count: usize,
        cancel: CancellationToken,
    ) -> EventStream {
        let topic = topic.into();
        let source = Arc::clone(&self.source);
        let model = Arc::clone(&self.model);
        let call_delay = self.settings.call_delay;
        let stage_delay = self.settings.stage_delay;
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id, %topic, count);

        let stream = async_stream::stream! {
            info!("Starting pipeline run");

            // --- INIT ---
            yield PipelineEvent::log(
                format!("Initializing pipeline for '{}' ({} articles)...", topic, count),
                Stage::Fetch,
            );

            // --- FETCHING ---
            if !pause_unless_cancelled(stage_delay, &cancel).await {
                info!("Run cancelled before fetch");
                return;
            }
            yield PipelineEvent::log(format!("Connecting to {}...", source.name()), Stage::Fetch);

            let mut articles = match source.fetch(&topic, count).await {
                Ok(articles) => articles,
                Err(e) => {
                    let err = PipelineError::from(e);
                    error!(error = %err, "Fetch raised instead of returning empty");
                    yield PipelineEvent::error(err.to_string());
                    return;
                }
            };
            articles.truncate(count);

            if articles.is_empty() {
                let err = PipelineError::EmptyFetch;
                warn!(%topic, "No articles fetched");
                yield PipelineEvent::error(err.to_string());
                return;
            }

            let total = articles.len();
            info!(fetched = total, "Articles fetched");
            yield PipelineEvent::log(
                format!("Retrieved {} articles successfully", total),
                Stage::Fetch,
            );
            if !pause_unless_cancelled(stage_delay, &cancel).await {
                info!("Run cancelled before analysis");
                return;
            }

            // --- ANALYZING ---
            yield PipelineEvent::log("Starting LLM analysis (stage 1)...", Stage::Analyze);

            let mut analyses = Vec::with_capacity(total);
            let mut first_call = true;

            for (idx, article) in articles.iter().enumerate() {
                if cancel.is_cancelled() {
                    info!(analyzed = idx, "Run cancelled during analysis");
                    return;
                }
                yield PipelineEvent::log(
                    format!("Analyzing article {}/{}: {}", idx + 1, total, article.title),
                    Stage::Analyze,
                );

                let delay = if first_call { Duration::ZERO } else { call_delay };
                first_call = false;
                if !pause_unless_cancelled(delay, &cancel).await {
                    info!(analyzed = idx, "Run cancelled during analysis");
                    return;
                }

                let analysis = analyze_article(model.as_ref(), article).await;
                if cancel.is_cancelled() {
                    info!(analyzed = idx, "Run cancelled during analysis");
                    return;
                }
                analyses.push(analysis);
            }

            let degraded = analyses.iter().filter(|a| a.is_degraded()).count();
            info!(degraded, "Analysis stage complete");
            yield PipelineEvent::log(
                "Analysis stage 1 complete - moving to validation",
                Stage::Analyze,
            );

            // --- VALIDATING ---
            yield PipelineEvent::log("Starting LLM validation (stage 2)...", Stage::Validate);

            let mut records: Vec<ValidatedArticle> = Vec::with_capacity(total);

            for (idx, (article, analysis)) in articles.iter().zip(analyses).enumerate() {
                if cancel.is_cancelled() {
                    info!(validated = idx, "Run cancelled during validation");
                    return;
                }
                yield PipelineEvent::log(
                    format!("Validating article {}/{}...", idx + 1, total),
                    Stage::Validate,
                );

                if !pause_unless_cancelled(call_delay, &cancel).await {
                    info!(validated = idx, "Run cancelled during validation");
                    return;
                }

                let validation = validate_analysis(model.as_ref(), article, &analysis).await;
                if cancel.is_cancelled() {
                    info!(validated = idx, "Run cancelled during validation");
                    return;
                }
                records.push(ValidatedArticle {
                    article: article.clone(),
                    analysis,
                    validation,
                });
            }

            let passed = records.iter().filter(|r| r.validation.is_valid).count();
            info!(passed, total, "Validation stage complete");
            yield PipelineEvent::log(
                format!("All articles validated ({}/{} passed)", passed, total),
                Stage::Validate,
            );

            // --- FINALIZING ---
            yield PipelineEvent::log("Pipeline complete - results ready", Stage::Done);

            let summaries = records
                .iter()
                .enumerate()
                .map(|(idx, record)| ArticleSummary::project(idx + 1, record))
                .collect();
            yield PipelineEvent::Result { articles: summaries };

            yield PipelineEvent::FullResult {
                validated_results: records,
                raw_articles: articles,
            };

            info!("Pipeline run complete");
            yield PipelineEvent::close();
        };

        let mut stream = Box::pin(stream);
        Box::pin(futures::stream::poll_fn(move |cx| {
            let _entered = span.enter();
            stream.as_mut().poll_next(cx)
        }))
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Sleep for `delay`, returning `false` if `cancel` has fired by the end
async fn pause_unless_cancelled(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = pause(delay) => {}
    }
    !cancel.is_cancelled()
}
