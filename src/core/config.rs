//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::core::models::AUTO_LANG;

/// Default translation endpoint (Google's public web client API)
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Longest text the service accepts in one call, in characters
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 4000;

/// Suffix inserted between the file stem and its extension
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_translated";

/// Configuration for translator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub api_endpoint: String,
    pub source_lang: String,
    pub target_lang: String,
    pub max_chunk_chars: usize,
    pub workers_per_cpu: usize,
    /// No timeout when unset
    pub timeout_ms: Option<u64>,
    pub output_suffix: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            source_lang: AUTO_LANG.to_string(),
            target_lang: "it".to_string(),
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            workers_per_cpu: 2,
            timeout_ms: None,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let api_endpoint =
            std::env::var("TRANSLATE_ENDPOINT").unwrap_or(defaults.api_endpoint);

        let source_lang = std::env::var("SOURCE_LANG").unwrap_or(defaults.source_lang);

        let target_lang = std::env::var("TARGET_LANG").unwrap_or(defaults.target_lang);

        let max_chunk_chars = std::env::var("MAX_CHUNK_CHARS")
            .unwrap_or_else(|_| DEFAULT_MAX_CHUNK_CHARS.to_string())
            .parse::<usize>()?;

        let workers_per_cpu = std::env::var("WORKERS_PER_CPU")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<usize>()?;

        let timeout_ms = match std::env::var("REQUEST_TIMEOUT_MS") {
            Ok(value) => Some(value.parse::<u64>()?),
            Err(_) => None,
        };

        let output_suffix = std::env::var("OUTPUT_SUFFIX").unwrap_or(defaults.output_suffix);

        Ok(Self {
            api_endpoint,
            source_lang,
            target_lang,
            max_chunk_chars,
            workers_per_cpu,
            timeout_ms,
            output_suffix,
        })
    }

    /// Load and validate configuration from the environment
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::from_env()?;
        config.validate()?;
        info!(
            "Loaded configuration: {} -> {} via {}",
            config.source_lang, config.target_lang, config.api_endpoint
        );
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_endpoint.is_empty() {
            return Err(anyhow::anyhow!("API endpoint is required"));
        }

        if self.target_lang.is_empty() {
            return Err(anyhow::anyhow!("Target language is required"));
        }

        if self.max_chunk_chars == 0 {
            return Err(anyhow::anyhow!("max_chunk_chars must be greater than 0"));
        }

        if self.workers_per_cpu == 0 {
            return Err(anyhow::anyhow!("workers_per_cpu must be greater than 0"));
        }

        Ok(())
    }

    /// Size of the worker pool used for long texts
    pub fn worker_pool_size(&self) -> usize {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.workers_per_cpu * cpus
    }
}
