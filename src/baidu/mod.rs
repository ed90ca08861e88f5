//! Baidu Pan share-link checker
//!
//! Replays the two web API calls a browser makes when opening a share
//! link: an optional extraction-code exchange (`/share/verify`) followed
//! by the authoritative listing probe (`/share/list`). Each check is a
//! stateless, independent probe of one link at one point in time.

mod api;
mod classify;
pub mod url;

pub use api::ProviderResponse;
pub use classify::RATE_LIMITED_ERRNO;
pub use url::{extract_share_id, extraction_code, normalize_share_url, ShareId};

use crate::checker::{CheckFailure, CheckResult, Dispatcher, PlatformChecker};
use crate::config::CheckerConfig;
use ::url::Url;
use std::time::Duration;
use tokio::time::Instant;

/// Platform tag used in logs and reports
const PLATFORM: &str = "baidu";

/// Production API origin
const DEFAULT_ORIGIN: &str = "https://pan.baidu.com";

/// Checker for Baidu Pan share links.
///
/// One instance owns one [`Dispatcher`] and is shared by all concurrent
/// checks of this platform; the admission ceiling, pacing, and per-check
/// deadline come from the [`CheckerConfig`] it was built with.
pub struct BaiduChecker {
    dispatcher: Dispatcher,
    origin: String,
}

impl BaiduChecker {
    /// Creates a checker probing the production API
    pub fn new(config: &CheckerConfig) -> crate::Result<Self> {
        Self::with_origin(config, DEFAULT_ORIGIN)
    }

    /// Creates a checker probing an alternate API origin. Lets tests point
    /// the client at a local mock server.
    pub fn with_origin(config: &CheckerConfig, origin: impl Into<String>) -> crate::Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(PLATFORM, config)?,
            origin: origin.into(),
        })
    }

    /// The network half of the pipeline: extract → verify → probe →
    /// classify. The caller wraps this in the per-check deadline.
    async fn probe(&self, share_url: &Url) -> Result<(), CheckFailure> {
        let share_id =
            url::extract_share_id(share_url).ok_or(CheckFailure::UnrecognizedFormat)?;

        // The session token is scoped to this one check; it is obtained
        // only for password-gated shares and used exactly once
        let session_token = match url::extraction_code(share_url) {
            Some(code) => Some(
                api::verify_extraction_code(
                    self.dispatcher.client(),
                    &self.origin,
                    share_url,
                    &share_id.short,
                    &code,
                )
                .await?,
            ),
            None => None,
        };

        let response = api::fetch_share_listing(
            self.dispatcher.client(),
            &self.origin,
            share_url,
            &share_id.short,
            session_token.as_deref(),
        )
        .await?;

        classify::classify(&response)
    }
}

impl PlatformChecker for BaiduChecker {
    fn platform(&self) -> &'static str {
        PLATFORM
    }

    async fn check(&self, raw_link: &str) -> CheckResult {
        // Recognition failures never cost a concurrency slot or a network
        // call
        let share_url = match url::normalize_share_url(raw_link) {
            Ok(parsed) => parsed,
            Err(error) => {
                let failure = CheckFailure::from(error);
                return CheckResult::failed(&failure, Duration::ZERO);
            }
        };

        let _permit = self.dispatcher.admit().await;

        let deadline = self.dispatcher.check_timeout();
        let start = Instant::now();
        let outcome = match tokio::time::timeout(deadline, self.probe(&share_url)).await {
            Ok(result) => result,
            // Cancellation propagates into the in-flight HTTP call
            Err(_) => Err(CheckFailure::Timeout(deadline)),
        };
        let elapsed = start.elapsed();

        match outcome {
            Ok(()) => {
                tracing::debug!("{} share {} is alive", PLATFORM, share_url);
                CheckResult::ok(elapsed)
            }
            Err(failure) => {
                if let CheckFailure::NetworkFailure(detail) = &failure {
                    tracing::warn!("{} request failed for {}: {}", PLATFORM, share_url, detail);
                }
                CheckResult::failed(&failure, elapsed)
            }
        }
    }
}
