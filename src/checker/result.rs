use crate::UrlError;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Classified failure of a single check.
///
/// Every stage of the pipeline converts its errors into one of these
/// terminal classes; the `Display` text becomes the
/// [`CheckResult::failure_reason`].
#[derive(Debug, Clone, Error)]
pub enum CheckFailure {
    /// No recognized share URL could be located or parsed in the input text
    #[error("{0}")]
    MalformedInput(String),

    /// The URL is on the provider's domain but its path matches no known
    /// share-link shape
    #[error("unrecognized share link format")]
    UnrecognizedFormat,

    /// The extraction-code exchange was rejected by the provider
    #[error("extraction code verification failed: {0}")]
    VerificationFailed(String),

    /// The exchange reported success but omitted the required session token
    #[error("verification response carried no session token")]
    MalformedVerificationResponse,

    /// Transport-level failure (DNS, connect, timeout, truncated body) on
    /// either provider call
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The listing body could not be interpreted even via the loose fallback
    #[error("unparsable provider response: {0}")]
    UnparsableResponse(String),

    /// The listing succeeded at the transport level but the provider
    /// answered with a non-zero code
    #[error("{reason}")]
    ProviderRejected {
        errno: i64,
        reason: String,
        /// Whether the code is the provider's throttling signal
        throttled: bool,
    },

    /// The check exceeded its configured deadline
    #[error("check timed out after {0:?}")]
    Timeout(Duration),
}

impl CheckFailure {
    /// True when the provider is throttling this client, as opposed to the
    /// link actually being dead. The batch driver uses this to back off.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::ProviderRejected { throttled: true, .. })
    }
}

impl From<UrlError> for CheckFailure {
    fn from(error: UrlError) -> Self {
        Self::MalformedInput(error.to_string())
    }
}

/// Outcome of checking one share link. Immutable once constructed; exactly
/// one is produced per input link per call.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Whether the share still resolves
    pub valid: bool,

    /// Human-readable failure classification; empty for valid links
    pub failure_reason: String,

    /// Wall-clock time spent on the check, in milliseconds
    pub duration_ms: u64,

    /// Whether the provider signalled rate limiting rather than a dead link
    pub is_rate_limited: bool,
}

impl CheckResult {
    /// A successful check
    pub fn ok(elapsed: Duration) -> Self {
        Self {
            valid: true,
            failure_reason: String::new(),
            duration_ms: elapsed.as_millis() as u64,
            is_rate_limited: false,
        }
    }

    /// A check that terminated with a classified failure
    pub fn failed(failure: &CheckFailure, elapsed: Duration) -> Self {
        Self {
            valid: false,
            failure_reason: failure.to_string(),
            duration_ms: elapsed.as_millis() as u64,
            is_rate_limited: failure.is_rate_limited(),
        }
    }
}
