//! Shared types, error model, and configuration for docbuild.
//!
//! This crate is the foundation depended on by all other docbuild crates.
//! It provides:
//! - [`DocBuildError`] — the unified error type
//! - Domain types ([`SourceKind`], [`SourceFile`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, BuildPolicyConfig, CONFIG_FILE_NAME, CliOverrides, IndexConfig, PathsConfig,
    ToolsConfig, load_config, load_config_from,
};
pub use error::{DocBuildError, Result};
pub use types::{PDF_EXTENSION, SourceFile, SourceKind};
