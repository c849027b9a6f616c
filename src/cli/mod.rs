//! Command-line interface for newsdigest.
//!
//! Provides commands for running the pipeline once and saving its outputs,
//! serving the pipeline over SSE, and inspecting the resolved configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use futures::StreamExt;

use crate::config::Settings;
use crate::core::Orchestrator;
use crate::domain::PipelineEvent;
use crate::report;
use crate::server::{self, AppState};

/// newsdigest - News analysis pipeline with dual-LLM validation
#[derive(Parser, Debug)]
#[command(name = "newsdigest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, analyze and validate articles, then write reports
    Run {
        /// Topic to analyze (e.g. "Indian Politics", "Technology")
        #[arg(short, long)]
        topic: Option<String>,

        /// Number of articles to analyze
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=100))]
        count: Option<u32>,

        /// Directory to write raw_articles.json, validated_results.json and final_report.md
        #[arg(short, long, env = "NEWSDIGEST_OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Start the SSE HTTP server
    Serve {
        /// Address to bind to
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load()?;

        match self.command {
            Commands::Run {
                topic,
                count,
                output,
            } => {
                let topic = topic.unwrap_or_else(|| settings.pipeline.default_topic.clone());
                let count = count
                    .map(|c| c as usize)
                    .unwrap_or(settings.pipeline.default_count);
                let output = output.unwrap_or_else(|| settings.output_dir.clone());
                run_pipeline(&settings, &topic, count, output).await
            }
            Commands::Serve { address } => {
                let address = address.unwrap_or_else(|| settings.server_address.clone());
                serve(&settings, &address).await
            }
            Commands::Config => show_config(&settings),
        }
    }
}

/// Run the pipeline once, printing progress and saving outputs
async fn run_pipeline(settings: &Settings, topic: &str, count: usize, output: PathBuf) -> Result<()> {
    println!("{}", "=".repeat(60));
    println!("NEWS ANALYSIS PIPELINE - DUAL LLM VALIDATION");
    println!("{}", "=".repeat(60));

    let orchestrator = Orchestrator::from_settings(settings)?;
    let mut events = orchestrator.run(topic, count);

    while let Some(event) = events.next().await {
        match event {
            PipelineEvent::Log { message, .. } => println!("[LOG] {}", message),
            PipelineEvent::Result { articles } => {
                println!("✓ {} articles analyzed", articles.len());
            }
            PipelineEvent::FullResult {
                validated_results,
                raw_articles,
            } => {
                let saved = report::save_run(&output, &raw_articles, &validated_results).await?;
                println!("✓ Saved {}", saved.raw_articles.display());
                println!("✓ Saved {}", saved.validated_results.display());
                println!("✓ Generated {}", saved.report.display());
            }
            PipelineEvent::Error { message } => {
                eprintln!("✗ ERROR: {}", message);
                std::process::exit(1);
            }
            PipelineEvent::Close { .. } => println!("Stream closed."),
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("PIPELINE COMPLETED SUCCESSFULLY!");
    println!("{}", "=".repeat(60));
    println!("\nCheck '{}' for:", output.display());
    println!("  - {}", report::RAW_ARTICLES_FILE);
    println!("  - {}", report::VALIDATED_RESULTS_FILE);
    println!("  - {}", report::REPORT_FILE);

    Ok(())
}

/// Start the SSE server
async fn serve(settings: &Settings, address: &str) -> Result<()> {
    let orchestrator = Orchestrator::from_settings(settings)?;
    let state = AppState::new(Arc::new(orchestrator));
    server::serve(address, state, &settings.cors_origins).await
}

/// Print resolved configuration with secrets masked
fn show_config(settings: &Settings) -> Result<()> {
    let mask = |present: bool| if present { "set" } else { "missing" };

    println!(
        "Config file:   {}",
        settings
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("NewsAPI:       {}", settings.news.base_url);
    println!("  key:         {}", mask(settings.has_newsapi_key()));
    println!("  timeout:     {}s", settings.news.timeout_seconds);
    println!("  429 wait:    {}s", settings.news.rate_limit_wait_seconds);
    println!("Model:         {} @ {}", settings.model.model, settings.model.base_url);
    println!("  key:         {}", mask(settings.has_groq_api_key()));
    println!("  max tokens:  {}", settings.model.max_tokens);
    println!("Pipeline:");
    println!("  topic:       {}", settings.pipeline.default_topic);
    println!("  count:       {}", settings.pipeline.default_count);
    println!("  call delay:  {:?}", settings.pipeline.call_delay);
    println!("Output dir:    {}", settings.output_dir.display());
    println!("Server:        {}", settings.server_address);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_args() {
        let cli = Cli::try_parse_from([
            "newsdigest",
            "run",
            "--topic",
            "Technology",
            "--count",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Run { topic, count, .. } => {
                assert_eq!(topic.as_deref(), Some("Technology"));
                assert_eq!(count, Some(3));
            }
            other => panic!("Expected run command, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(Cli::try_parse_from(["newsdigest", "run", "--count", "0"]).is_err());
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["newsdigest", "serve", "-a", "127.0.0.1:9000"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve { address: Some(ref a) } if a == "127.0.0.1:9000"
        ));
    }
}
