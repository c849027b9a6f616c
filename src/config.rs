//! Configuration for newsdigest.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (NEWSAPI_KEY, GROQ_API_KEY, NEWSDIGEST_OUTPUT,
//!    NEWSDIGEST_MODEL). API keys are only ever read from the environment.
//! 2. Config file (.newsdigest/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .newsdigest/config.yaml
//! - Falls back to the user config directory (~/.config/newsdigest/config.yaml)
//! - Relative paths in a project config file are resolved against the project
//!   root (the directory containing .newsdigest/); in the user config file,
//!   against ~/.config/newsdigest/
//!
//! Settings are resolved once by the binary and handed to collaborators
//! explicitly; nothing below the CLI reads process state.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const ENV_NEWSAPI_KEY: &str = "NEWSAPI_KEY";
pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_OUTPUT_DIR: &str = "NEWSDIGEST_OUTPUT";
pub const ENV_MODEL: &str = "NEWSDIGEST_MODEL";

const PROJECT_CONFIG_DIR: &str = ".newsdigest";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub version: Option<String>,
    #[serde(default)]
    pub news: Option<NewsConfig>,
    #[serde(default)]
    pub model: Option<ModelConfig>,
    #[serde(default)]
    pub pipeline: Option<PipelineConfig>,
    #[serde(default)]
    pub output: Option<OutputConfig>,
    #[serde(default)]
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub rate_limit_wait_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    pub call_delay_ms: Option<u64>,
    pub stage_delay_ms: Option<u64>,
    pub default_topic: Option<String>,
    pub default_count: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    pub address: Option<String>,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Resolved NewsAPI settings
#[derive(Debug, Clone)]
pub struct NewsSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub rate_limit_wait_seconds: u64,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2".to_string(),
            timeout_seconds: 10,
            rate_limit_wait_seconds: 60,
        }
    }
}

/// Resolved language model settings
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.3,
            max_tokens: 500,
            timeout_seconds: 60,
        }
    }
}

/// Resolved orchestrator settings
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Pause between successive model calls
    pub call_delay: Duration,
    /// Pause after the init and fetch announcements
    pub stage_delay: Duration,
    pub default_topic: String,
    pub default_count: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            call_delay: Duration::from_millis(500),
            stage_delay: Duration::from_millis(100),
            default_topic: "Indian Politics".to_string(),
            default_count: 12,
        }
    }
}

impl PipelineSettings {
    /// Settings with every delay disabled
    pub fn without_delays() -> Self {
        Self {
            call_delay: Duration::ZERO,
            stage_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub news: NewsSettings,
    pub model: ModelSettings,
    pub pipeline: PipelineSettings,
    /// Directory the CLI writes reports into
    pub output_dir: PathBuf,
    /// Default bind address for `serve`
    pub server_address: String,
    /// Extra allowed CORS origins for `serve`
    pub cors_origins: Vec<String>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    newsapi_key: Option<String>,
    groq_api_key: Option<String>,
}

impl Settings {
    /// Load configuration from the environment, config file and defaults
    pub fn load() -> Result<Self> {
        let config_file = find_config_file();
        let parsed = match config_file {
            Some(ref path) => Some(load_config_file(path)?),
            None => None,
        };

        Ok(resolve(
            config_file.as_deref(),
            parsed.unwrap_or_default(),
            |key| std::env::var(key).ok().filter(|v| !v.is_empty()),
        ))
    }

    /// NewsAPI key, required to build the fetch client
    pub fn newsapi_key(&self) -> Result<&str> {
        self.newsapi_key
            .as_deref()
            .with_context(|| format!("{} not found in environment variables", ENV_NEWSAPI_KEY))
    }

    /// Groq key, required to build the model client
    pub fn groq_api_key(&self) -> Result<&str> {
        self.groq_api_key
            .as_deref()
            .with_context(|| format!("{} not found in environment variables", ENV_GROQ_API_KEY))
    }

    pub fn has_newsapi_key(&self) -> bool {
        self.newsapi_key.is_some()
    }

    pub fn has_groq_api_key(&self) -> bool {
        self.groq_api_key.is_some()
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("newsdigest").join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Directory that relative paths in a config file are resolved against.
///
/// A project file at `<root>/.newsdigest/config.yaml` resolves against
/// `<root>`; a user file under the platform config dir resolves against
/// its own directory.
fn config_base_dir(config_path: &Path) -> &Path {
    let dir = config_path.parent().unwrap_or(Path::new("."));
    if dir.file_name() == Some(OsStr::new(PROJECT_CONFIG_DIR)) {
        dir.parent().unwrap_or(dir)
    } else {
        dir
    }
}

/// Merge environment, file and defaults
fn resolve(
    config_path: Option<&Path>,
    file: ConfigFile,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let base_dir = config_path.map(config_base_dir).unwrap_or(Path::new("."));

    let news_defaults = NewsSettings::default();
    let news_file = file.news.unwrap_or_default();
    let news = NewsSettings {
        base_url: news_file.base_url.unwrap_or(news_defaults.base_url),
        timeout_seconds: news_file
            .timeout_seconds
            .unwrap_or(news_defaults.timeout_seconds),
        rate_limit_wait_seconds: news_file
            .rate_limit_wait_seconds
            .unwrap_or(news_defaults.rate_limit_wait_seconds),
    };

    let model_defaults = ModelSettings::default();
    let model_file = file.model.unwrap_or_default();
    let model = ModelSettings {
        base_url: model_file.base_url.unwrap_or(model_defaults.base_url),
        model: env(ENV_MODEL)
            .or(model_file.model)
            .unwrap_or(model_defaults.model),
        temperature: model_file.temperature.unwrap_or(model_defaults.temperature),
        max_tokens: model_file.max_tokens.unwrap_or(model_defaults.max_tokens),
        timeout_seconds: model_file
            .timeout_seconds
            .unwrap_or(model_defaults.timeout_seconds),
    };

    let pipeline_defaults = PipelineSettings::default();
    let pipeline_file = file.pipeline.unwrap_or_default();
    let pipeline = PipelineSettings {
        call_delay: pipeline_file
            .call_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(pipeline_defaults.call_delay),
        stage_delay: pipeline_file
            .stage_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(pipeline_defaults.stage_delay),
        default_topic: pipeline_file
            .default_topic
            .unwrap_or(pipeline_defaults.default_topic),
        default_count: pipeline_file
            .default_count
            .filter(|count| *count > 0)
            .unwrap_or(pipeline_defaults.default_count),
    };

    let output_dir = if let Some(env_dir) = env(ENV_OUTPUT_DIR) {
        PathBuf::from(env_dir)
    } else if let Some(dir) = file.output.and_then(|o| o.dir) {
        resolve_path(base_dir, &dir)
    } else {
        PathBuf::from("output")
    };

    let server = file.server.unwrap_or_default();

    Settings {
        news,
        model,
        pipeline,
        output_dir,
        server_address: server
            .address
            .unwrap_or_else(|| "0.0.0.0:8000".to_string()),
        cors_origins: server.cors_origins,
        config_file: config_path.map(Path::to_path_buf),
        newsapi_key: env(ENV_NEWSAPI_KEY),
        groq_api_key: env(ENV_GROQ_API_KEY),
    }
}
