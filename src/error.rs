//! Error types for the fallible edges of the core.
//!
//! The simulation and the renderers never fail; only startup (configuration,
//! worker pool) and high-score persistence can.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File exists but could not be read.
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// RON parsing failed.
    #[error("parse error in config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// Parsed, but a value is out of its usable range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Errors from reading or writing the persisted high score.
#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("high score I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored value is not a non-negative integer.
    #[error("corrupt high score value '{value}'")]
    Corrupt { value: String },
}

/// Errors raised while setting up the raycast engine.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("framebuffer must be at least 1x1, got {width}x{height}")]
    EmptyFrame { width: usize, height: usize },

    #[error("failed to build raycast worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
