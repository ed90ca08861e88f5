use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sharecheck
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub checker: CheckerConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Per-platform checker behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CheckerConfig {
    /// Maximum number of simultaneously in-flight checks for one platform
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: u32,

    /// Overall deadline for a single check, in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Minimum spacing between successive outgoing requests (milliseconds)
    #[serde(rename = "pacing-interval-ms")]
    pub pacing_interval_ms: u64,
}

impl CheckerConfig {
    /// The per-check deadline as a [`Duration`]
    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The minimum inter-request spacing as a [`Duration`]
    pub fn pacing_interval(&self) -> Duration {
        Duration::from_millis(self.pacing_interval_ms)
    }
}

/// Batch driver configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Number of links submitted concurrently by the driver
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,

    /// Cooldown applied before submitting further links after the provider
    /// reports rate limiting (milliseconds)
    #[serde(
        rename = "rate-limit-cooldown-ms",
        default = "default_rate_limit_cooldown_ms"
    )]
    pub rate_limit_cooldown_ms: u64,
}

impl BatchConfig {
    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_millis(self.rate_limit_cooldown_ms)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            rate_limit_cooldown_ms: default_rate_limit_cooldown_ms(),
        }
    }
}

fn default_parallelism() -> u32 {
    8
}

fn default_rate_limit_cooldown_ms() -> u64 {
    5000
}
