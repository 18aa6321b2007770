// src/services/fetcher.rs

//! Page fetching with bounded retry.
//!
//! The catalog is rendered client-side, so the concrete retrieval mechanism
//! is kept behind the [`Fetcher`] trait; the default [`HttpFetcher`] does a
//! plain GET, and tests substitute in-memory fetchers.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// A single page retrieval: `fetch(url) -> raw document`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP fetcher over a shared reqwest client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from the crawler configuration.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Retry policy: `max_attempts` tries with exponential backoff
/// `base_delay * 2^attempt` between them.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Derive the policy from the crawler configuration.
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
        )
    }

    /// Backoff delay before retry number `attempt` (0-based).
    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    /// 3 attempts, 2 second base delay.
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Run `op` under the retry policy. The last error is returned once all
/// attempts are exhausted; the caller records the item as failed rather
/// than aborting the run.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;
    for attempt in 0..policy.max_attempts.max(1) {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                last_error = Some(e);
                if attempt + 1 < policy.max_attempts {
                    tokio::time::sleep(policy.delay_for(attempt)).await;
                }
            }
        }
    }
    Err(last_error.unwrap_or_else(|| AppError::crawl("retry", "no attempts were made")))
}

/// Fetch a URL under the retry policy, wrapping the final failure with the
/// URL and attempt count.
pub async fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    url: &str,
    policy: &RetryPolicy,
) -> Result<String> {
    retry(policy, || fetcher.fetch(url))
        .await
        .map_err(|e| AppError::fetch(url, policy.max_attempts, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fetcher that fails a fixed number of times before succeeding.
    struct FlakyFetcher {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyFetcher {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Fetcher for FlakyFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(AppError::crawl(url, "connection reset"))
            } else {
                Ok(format!("<html>{}</html>", url))
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_transient_failures() {
        let fetcher = FlakyFetcher::new(2);
        let html = fetch_with_retry(&fetcher, "https://example.com/m", &fast_policy(3))
            .await
            .unwrap();
        assert_eq!(html, "<html>https://example.com/m</html>");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let fetcher = FlakyFetcher::new(10);
        let result = fetch_with_retry(&fetcher, "https://example.com/m", &fast_policy(3)).await;
        assert!(matches!(
            result,
            Err(AppError::Fetch { attempts: 3, .. })
        ));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_first_try_success_makes_one_call() {
        let fetcher = FlakyFetcher::new(0);
        fetch_with_retry(&fetcher, "https://example.com/m", &fast_policy(3))
            .await
            .unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(8));
    }
}
