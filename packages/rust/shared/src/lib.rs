//! Shared types, error model, and configuration for jobwatch.
//!
//! This crate is the foundation depended on by all other jobwatch crates.
//! It provides:
//! - [`JobWatchError`]: the unified error type
//! - Domain types ([`JobRecord`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, RunConfig, SourceConfig, StorageConfig, TelegramConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_chat_id,
};
pub use error::{JobWatchError, Result};
pub use types::JobRecord;
