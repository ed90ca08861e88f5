//! Platform checker core
//!
//! Everything shared by platform-specific checkers lives here: the
//! admission/pacing dispatcher, the check result model, and the contract
//! each platform implements.

mod dispatcher;
mod result;

// Re-export public items from submodules
pub use dispatcher::{build_http_client, Dispatcher, BROWSER_USER_AGENT};
pub use result::{CheckFailure, CheckResult};

/// Contract implemented by every platform checker.
///
/// A checker owns its [`Dispatcher`] and performs one stateless probe per
/// call. Expected outcomes (malformed input, dead links, provider
/// rejections, timeouts) are always encoded in the returned
/// [`CheckResult`]; a single bad link never affects concurrent or
/// subsequent checks.
pub trait PlatformChecker {
    /// Short platform tag used in logs and reports
    fn platform(&self) -> &'static str;

    /// Runs one validity check for a raw link string
    fn check(&self, raw_link: &str) -> impl std::future::Future<Output = CheckResult> + Send;
}
