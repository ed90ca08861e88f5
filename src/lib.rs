//! Sharecheck: batch validity checking for cloud-storage share links
//!
//! This crate verifies whether publicly shared links are still alive by
//! replaying the provider's private web API calls, pacing and bounding
//! concurrent checks so batch runs stay under anti-abuse thresholds.

pub mod baidu;
pub mod checker;
pub mod config;

use thiserror::Error;

/// Setup/programming errors surfaced by checker construction and the
/// batch driver. Expected per-link outcomes (dead links, provider
/// rejections, timeouts) are never reported here; they arrive as
/// classified [`checker::CheckResult`]s.
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Share-URL recognition and parsing errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("no recognized share URL found in input")]
    NotRecognized,

    #[error("failed to parse share URL: {0}")]
    Parse(String),
}

/// Result type alias for checker setup operations
pub type Result<T> = std::result::Result<T, CheckerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for share-URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use baidu::BaiduChecker;
pub use checker::{CheckFailure, CheckResult, Dispatcher, PlatformChecker};
pub use config::Config;
