//! Application configuration for askbase.
//!
//! User config lives at `~/.askbase/askbase.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AskbaseError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "askbase.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".askbase";

// ---------------------------------------------------------------------------
// Config structs (matching askbase.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source list for ingestion.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Crawl settings.
    #[serde(default)]
    pub crawl: CrawlSettings,

    /// Snapshot artifact location.
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Context budgeting parameters.
    #[serde(default)]
    pub context: ContextConfig,

    /// Completion service settings.
    #[serde(default)]
    pub completion: CompletionConfig,
}

/// `[sources]` section — the configured ordered list of locators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// URLs to ingest, visited in this order.
    #[serde(default)]
    pub urls: Vec<String>,
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSettings {
    /// Maximum concurrent source fetches.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Per-source fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// CSS selector for the content region. Empty means auto
    /// (`main`, `article`, then `body`).
    #[serde(default)]
    pub content_selector: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_fetch_timeout(),
            content_selector: String::new(),
        }
    }
}

fn default_concurrency() -> u32 {
    4
}
fn default_fetch_timeout() -> u64 {
    30
}

/// `[snapshot]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Path to the snapshot artifact. A leading `~/` is expanded at load.
    #[serde(default = "default_snapshot_path")]
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> String {
    "~/.askbase/snapshot.json".into()
}

impl SnapshotConfig {
    /// Resolve the configured snapshot path, expanding a leading `~/`.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        expand_tilde(&self.path)
    }
}

/// `[context]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum characters taken from each record's content.
    #[serde(default = "default_per_record_cap")]
    pub per_record_cap: usize,

    /// Maximum characters in the assembled context.
    #[serde(default = "default_total_budget")]
    pub total_budget: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            per_record_cap: default_per_record_cap(),
            total_budget: default_total_budget(),
        }
    }
}

fn default_per_record_cap() -> usize {
    500
}
fn default_total_budget() -> usize {
    15_000
}

/// `[completion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible completion endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model to request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature. Kept low for factual, reproducible phrasing.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds for the completion call.
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_completion_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_completion_timeout() -> u64 {
    60
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Maximum concurrent source fetches.
    pub concurrency: u32,
    /// Per-source deadline covering fetch and extraction.
    pub timeout: Duration,
    /// CSS selector for the content region (empty = auto).
    pub content_selector: String,
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            concurrency: config.crawl.concurrency,
            timeout: Duration::from_secs(config.crawl.timeout_secs),
            content_selector: config.crawl.content_selector.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.askbase/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AskbaseError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.askbase/askbase.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AskbaseError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| AskbaseError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AskbaseError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AskbaseError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AskbaseError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the completion API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.completion.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(AskbaseError::config(format!(
            "completion API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Expand a leading `~/` against the user's home directory.
fn expand_tilde(path: &str) -> Result<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| AskbaseError::config("could not determine home directory"))?;
        Ok(home.join(rest))
    } else {
        Ok(PathBuf::from(path))
    }
}
