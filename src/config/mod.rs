//! Configuration module for Sharecheck
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sharecheck::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Concurrency limit: {}", config.checker.concurrency_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BatchConfig, CheckerConfig, Config};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
