//! Shared types, error model, and configuration for askbase.
//!
//! This crate is the foundation depended on by all other askbase crates.
//! It provides:
//! - [`AskbaseError`] — the unified error type
//! - Domain types ([`KnowledgeRecord`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CompletionConfig, ContextConfig, CrawlConfig, CrawlSettings, SnapshotConfig,
    SourcesConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    validate_api_key,
};
pub use error::{AskbaseError, Result};
pub use types::KnowledgeRecord;
