use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// DOI resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Abstract markup converter settings
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Static assets copied next to published documents
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// DOI resolver configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResolverConfig {
    /// Resolver base URL; DOIs are appended as a path
    #[serde(default = "default_resolver_url")]
    pub base_url: String,

    /// User agent sent with every check
    ///
    /// Several publishers answer 403 to non-browser clients, so this
    /// defaults to a desktop browser signature.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of checks in flight
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: default_resolver_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            concurrent_requests: default_concurrent_requests(),
        }
    }
}

/// External converter producing JATS from LaTeX
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConverterConfig {
    // @field: Executable name or path
    #[serde(default = "default_converter_command")]
    pub command: String,

    // @field: Arguments; input arrives on stdin
    #[serde(default = "default_converter_args")]
    pub args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            command: default_converter_command(),
            args: default_converter_args(),
        }
    }
}

/// Static assets shipped with every publication
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Crossmark badge image copied next to the document
    #[serde(default = "default_crossmark_image")]
    pub crossmark_image: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            crossmark_image: default_crossmark_image(),
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
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_resolver_url() -> String {
    "https://doi.org".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_concurrent_requests() -> usize {
    10
}

fn default_converter_command() -> String {
    "pandoc".to_string()
}

fn default_converter_args() -> Vec<String> {
    vec!["--from".to_string(), "latex".to_string(), "--to".to_string(), "jats".to_string()]
}

fn default_crossmark_image() -> PathBuf {
    PathBuf::from("MetaForge/CROSSMARK_BW_square_no_text.png")
}

impl Config {
    /// Load the configuration, writing a default file if none exists
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        log::warn!("Config file not found at {:?}, creating default config.", path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.resolver.base_url)
            .with_context(|| format!("Invalid resolver URL: {}", self.resolver.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!("Resolver URL must use http or https: {}", url));
        }

        if self.resolver.concurrent_requests == 0 {
            return Err(anyhow!("resolver.concurrent_requests must be at least 1"));
        }

        if self.resolver.timeout_secs == 0 {
            return Err(anyhow!("resolver.timeout_secs must be at least 1"));
        }

        if self.converter.command.trim().is_empty() {
            return Err(anyhow!("converter.command must not be empty"));
        }

        Ok(())
    }
}
