//! Error types for docbuild.
//!
//! Library crates use [`DocBuildError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docbuild operations.
#[derive(Debug, thiserror::Error)]
pub enum DocBuildError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An external tool ran and exited unsuccessfully.
    #[error("command failed ({}): {command}", exit_code_label(.exit_code))]
    CompileFailure {
        command: String,
        exit_code: Option<i32>,
    },

    /// An external tool could not be started at all.
    #[error("failed to launch `{program}`: {source}. Is it installed and on PATH?")]
    ToolLaunch {
        program: String,
        source: std::io::Error,
    },

    /// A source matched an extension the dispatcher has no compiler for.
    #[error("unsupported extension '{extension}' for {path:?}")]
    UnsupportedExtension { extension: String, path: PathBuf },

    /// Compiling a single source file failed; wraps the underlying cause.
    #[error("could not compile {path:?}: {source}")]
    Compile {
        path: PathBuf,
        source: Box<DocBuildError>,
    },

    /// HTML index rendering error.
    #[error("render error: {0}")]
    Render(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocBuildError>;

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl DocBuildError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the failing source path to a per-file compile error.
    pub fn compile(path: impl Into<PathBuf>, source: DocBuildError) -> Self {
        Self::Compile {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
