//! Error types for lockstep

use thiserror::Error;

/// Result type alias using the lockstep Error
pub type Result<T> = std::result::Result<T, Error>;

/// Lockstep error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Capture timed out after {millis}ms with {matched}/{expected} patterns matched")]
    Timeout {
        millis: u64,
        matched: usize,
        expected: usize,
    },

    #[error("Line source closed with {matched}/{expected} patterns matched")]
    StreamClosed { matched: usize, expected: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
