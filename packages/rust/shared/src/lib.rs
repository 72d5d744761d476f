//! Shared types, error model, and configuration for mcpdoc.
//!
//! This crate is the foundation depended on by all other mcpdoc crates.
//! It provides:
//! - [`McpDocError`] and [`ErrorKind`], the unified error model
//! - Domain types ([`DocSource`]) and locator helpers
//! - Operator settings ([`AppConfig`], [`FetchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, FetchSettings, config_dir, config_file_path, init_config,
    load_config, load_config_from, timeout_from_secs,
};
pub use error::{ErrorKind, McpDocError, Result};
pub use types::{DocSource, origin_of, parse_http_url};
