//! Rate-limited dispatching shared by every platform checker
//!
//! The dispatcher is the only synchronization point between concurrent
//! checks: an admission semaphore caps in-flight network operations per
//! platform instance, and a pacing slot enforces a minimum spacing between
//! the issuance of successive requests so batch runs stay under provider
//! anti-abuse thresholds.

use crate::config::CheckerConfig;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Realistic browser user-agent presented on every provider call; the
/// private web API rejects obvious non-browser clients
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

// Independent short timeouts on each HTTP call, the safety net beneath the
// per-check deadline
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the long-lived HTTP client owned by a dispatcher
///
/// One client per platform instance keeps connection pooling effective
/// across all of that platform's checks.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Admission, pacing, and deadline control for one platform instance
///
/// All state is shared by every concurrent check of the platform: the
/// semaphore counts in-flight checks, the pacing slot records when the
/// next request may be issued. Permits are RAII, so a slot is released on
/// every exit path, including timeout and panic unwinding.
pub struct Dispatcher {
    platform: &'static str,
    permits: Arc<Semaphore>,
    next_slot: Mutex<Option<Instant>>,
    pacing_interval: Duration,
    check_timeout: Duration,
    client: Client,
}

impl Dispatcher {
    /// Creates a dispatcher from the per-platform configuration
    pub fn new(platform: &'static str, config: &CheckerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            platform,
            permits: Arc::new(Semaphore::new(config.concurrency_limit as usize)),
            next_slot: Mutex::new(None),
            pacing_interval: config.pacing_interval(),
            check_timeout: config.check_timeout(),
            client: build_http_client()?,
        })
    }

    /// The platform this dispatcher serves
    pub fn platform(&self) -> &'static str {
        self.platform
    }

    /// The shared HTTP client for this platform's requests
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The overall deadline one check may spend on the network
    pub fn check_timeout(&self) -> Duration {
        self.check_timeout
    }

    /// Waits for a concurrency slot, then applies the pacing delay.
    ///
    /// Suspends cooperatively on both; other platforms are never blocked.
    /// The returned permit must be held for the duration of the check.
    pub async fn admit(&self) -> OwnedSemaphorePermit {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .expect("admission semaphore is never closed");
        self.pace().await;
        permit
    }

    /// Reserves the next issuance slot and sleeps until it arrives.
    ///
    /// The slot lock is held only for the reservation arithmetic, never
    /// across the sleep or any network call.
    async fn pace(&self) {
        if self.pacing_interval.is_zero() {
            return;
        }

        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(previous) if previous + self.pacing_interval > now => {
                    previous + self.pacing_interval
                }
                _ => now,
            };
            *next_slot = Some(slot);
            slot
        };

        let wait = slot.duration_since(Instant::now());
        if !wait.is_zero() {
            tracing::debug!("pacing {} check for {:?}", self.platform, wait);
        }
        tokio::time::sleep_until(slot).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn create_test_config(concurrency: u32, pacing_ms: u64) -> CheckerConfig {
        CheckerConfig {
            concurrency_limit: concurrency,
            request_timeout_secs: 30,
            pacing_interval_ms: pacing_ms,
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client();
        assert!(client.is_ok());
    }

    #[test]
    fn test_new_dispatcher() {
        let config = create_test_config(3, 500);
        let dispatcher = Dispatcher::new("test", &config).unwrap();

        assert_eq!(dispatcher.platform(), "test");
        assert_eq!(dispatcher.check_timeout(), Duration::from_secs(30));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_never_exceeds_ceiling() {
        let config = create_test_config(3, 0);
        let dispatcher = Arc::new(Dispatcher::new("test", &config).unwrap());

        let in_flight = Arc::new(AtomicUsize::new(0));
        let observed_max = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..50 {
            let dispatcher = Arc::clone(&dispatcher);
            let in_flight = Arc::clone(&in_flight);
            let observed_max = Arc::clone(&observed_max);

            handles.push(tokio::spawn(async move {
                let _permit = dispatcher.admit().await;

                let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                observed_max.fetch_max(current, Ordering::SeqCst);

                tokio::time::sleep(Duration::from_millis(5)).await;

                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert!(observed_max.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_spaces_out_admissions() {
        let config = create_test_config(10, 50);
        let dispatcher = Dispatcher::new("test", &config).unwrap();

        let start = Instant::now();
        for _ in 0..3 {
            let _permit = dispatcher.admit().await;
        }

        // First admission is immediate; the next two each wait 50ms
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_pacing_admits_immediately() {
        let config = create_test_config(10, 0);
        let dispatcher = Dispatcher::new("test", &config).unwrap();

        let start = Instant::now();
        for _ in 0..5 {
            let _permit = dispatcher.admit().await;
        }

        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_permit_release_frees_slot() {
        let config = create_test_config(1, 0);
        let dispatcher = Dispatcher::new("test", &config).unwrap();

        // With a ceiling of 1, a second admission only succeeds because the
        // first permit was dropped
        drop(dispatcher.admit().await);
        let _permit = dispatcher.admit().await;
    }
}
