use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (ISO 639-1, optionally with a region, e.g. "zh-TW")
    pub target_language: String,

    /// Field holding the text to translate in each record
    #[serde(default = "default_input_field")]
    pub input_field: String,

    /// Field receiving the translated text in each record
    #[serde(default = "default_output_field")]
    pub output_field: String,

    /// Optional field receiving a per-record translation status
    #[serde(default)]
    pub status_field: Option<String>,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation endpoint and dispatch settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Client certificate (PEM) for mutual TLS
    #[serde(default)]
    pub cert_path: Option<PathBuf>,

    /// Client private key (PKCS#8 PEM) for mutual TLS
    #[serde(default)]
    pub key_path: Option<PathBuf>,

    /// Character budget per batch, including one character of overhead per item
    #[serde(default = "default_max_chars_per_batch")]
    pub max_chars_per_batch: usize,

    /// Maximum number of batch requests in flight at once
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Total attempts per batch before passing its texts through untranslated
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff in milliseconds, doubled after every failed attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Upper bound of the uniform random jitter added to each backoff
    #[serde(default = "default_retry_jitter_ms")]
    pub retry_jitter_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            cert_path: None,
            key_path: None,
            max_chars_per_batch: default_max_chars_per_batch(),
            max_concurrent_requests: default_max_concurrent_requests(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_jitter_ms: default_retry_jitter_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TranslationConfig {
    /// Whether a client certificate/key pair is configured
    pub fn has_client_identity(&self) -> bool {
        self.cert_path.is_some() && self.key_path.is_some()
    }

    /// Validate the endpoint and dispatch limits
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid translation endpoint: {}", self.endpoint))?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(anyhow!("Unsupported endpoint scheme: {}", url.scheme()));
        }

        if self.max_chars_per_batch == 0 {
            return Err(anyhow!("max_chars_per_batch must be positive"));
        }
        if self.max_concurrent_requests == 0 {
            return Err(anyhow!("max_concurrent_requests must be positive"));
        }
        if self.max_retries == 0 {
            return Err(anyhow!("max_retries must be positive"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be positive"));
        }

        match (&self.cert_path, &self.key_path) {
            (Some(_), None) => Err(anyhow!("cert_path is set but key_path is missing")),
            (None, Some(_)) => Err(anyhow!("key_path is set but cert_path is missing")),
            _ => Ok(()),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_input_field() -> String {
    "text".to_string()
}

fn default_output_field() -> String {
    "translated_text".to_string()
}

fn default_endpoint() -> String {
    "https://googleapis.com/".to_string()
}

fn default_max_chars_per_batch() -> usize {
    5000
}

fn default_max_concurrent_requests() -> usize {
    5
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 2^attempt seconds
}

fn default_retry_jitter_ms() -> u64 {
    1000 // plus up to one second of jitter
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_target_language(&self.target_language)?;

        if self.input_field.trim().is_empty() {
            return Err(anyhow!("input_field cannot be empty"));
        }
        if self.output_field.trim().is_empty() {
            return Err(anyhow!("output_field cannot be empty"));
        }
        if self.input_field == self.output_field {
            return Err(anyhow!("output_field must differ from input_field"));
        }
        if let Some(status_field) = &self.status_field {
            if status_field == &self.input_field || status_field == &self.output_field {
                return Err(anyhow!("status_field must differ from the text fields"));
            }
        }

        self.translation.validate()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: "es".to_string(),
            input_field: default_input_field(),
            output_field: default_output_field(),
            status_field: None,
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
