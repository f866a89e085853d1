//! Shared types, error model, and configuration for UserDB.
//!
//! This crate is the foundation depended on by all other UserDB crates.
//! It provides:
//! - [`UserDbError`]: the unified error type
//! - Domain types ([`User`], [`SpecialNode`], identifier parsing)
//! - Configuration ([`AppConfig`], [`SourcesConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, HttpConfig, OutputFormat, SanityConfig, SourcesConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, UserDbError};
pub use types::{MAX_USER_ID, SpecialNode, User, canonical_id, parse_id};
