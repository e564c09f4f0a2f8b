use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::graph::{CONTEXT_CHARS, MAX_NAME_CHARS, MIN_NAME_CHARS};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub notegraph: NotegraphConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Notegraph-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotegraphConfig {
    /// SQLite database holding the notes.
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Extraction tuning
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisConfig {
    /// Notes with this many characters or fewer are not analyzed.
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
    #[serde(default = "default_min_name_chars")]
    pub min_name_chars: usize,
    #[serde(default = "default_max_name_chars")]
    pub max_name_chars: usize,
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,
    /// TOML pattern table replacing the built-in one.
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_content_chars: default_min_content_chars(),
            min_name_chars: default_min_name_chars(),
            max_name_chars: default_max_name_chars(),
            context_chars: default_context_chars(),
            lexicon_path: None,
        }
    }
}

/// Poll loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            output: default_output(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_content_chars() -> usize {
    10
}

fn default_min_name_chars() -> usize {
    MIN_NAME_CHARS
}

fn default_max_name_chars() -> usize {
    MAX_NAME_CHARS
}

fn default_context_chars() -> usize {
    CONTEXT_CHARS
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_output() -> PathBuf {
    PathBuf::from("graph.json")
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in NOTEGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("NOTEGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::from_file(&config_path)
    }

    pub fn from_file(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;

        if analysis.min_name_chars == 0 {
            anyhow::bail!("analysis.min_name_chars must be greater than 0");
        }

        if analysis.max_name_chars < analysis.min_name_chars {
            anyhow::bail!("analysis.max_name_chars must not be less than min_name_chars");
        }

        if analysis.context_chars == 0 {
            anyhow::bail!("analysis.context_chars must be greater than 0");
        }

        if let Some(path) = &analysis.lexicon_path {
            if !path.is_file() {
                anyhow::bail!("analysis.lexicon_path does not exist: {}", path.display());
            }
        }

        if self.watch.poll_interval_ms == 0 {
            anyhow::bail!("watch.poll_interval_ms must be greater than 0");
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.notegraph.db_path
    }
}
