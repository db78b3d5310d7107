//! HTTP client with per-domain rate limiting and retry logic
//!
//! Provides a rate-limited HTTP client with a browser-like header set
//! (to reduce trivial bot-blocking) and linear-backoff retries.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{MagnetioError, Result};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum requests per domain per rolling minute (default: 25)
    pub requests_per_minute: usize,
    /// Request timeout in seconds (default: 15)
    pub timeout_secs: u64,
    /// Total fetch attempts before giving up (default: 3)
    pub max_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 25,
            timeout_secs: 15,
            max_attempts: 3,
        }
    }
}

/// Length of the rolling rate window
const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Safety margin added on top of the computed wait
const RATE_MARGIN: Duration = Duration::from_secs(1);

/// Per-domain sliding-window request throttle
///
/// Keeps a timestamp list per domain; a call that would exceed the limit
/// within the trailing 60-second window suspends until the oldest retained
/// timestamp ages out, plus a one-second margin. Purely local best-effort
/// throttling, no fairness guarantee across domains.
pub struct RateLimiter {
    limit: usize,
    windows: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    /// Create a new rate limiter allowing `limit` requests per minute per
    /// domain; a limit of 0 is treated as 1
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Suspend until a request to `domain` would fit inside the window,
    /// then record the request timestamp
    pub async fn wait_if_needed(&self, domain: &str) {
        let wait = {
            let mut windows = self.windows.lock().await;
            let timestamps = windows.entry(domain.to_string()).or_default();
            timestamps.retain(|t| t.elapsed() < RATE_WINDOW);

            if timestamps.len() >= self.limit {
                // Oldest retained timestamp bounds when a slot frees up
                let oldest_age = timestamps[0].elapsed();
                Some(RATE_WINDOW.saturating_sub(oldest_age) + RATE_MARGIN)
            } else {
                None
            }
        };

        if let Some(wait) = wait {
            warn!(domain, wait_ms = wait.as_millis() as u64, "Rate limit hit");
            sleep(wait).await;
        }

        let mut windows = self.windows.lock().await;
        windows
            .entry(domain.to_string())
            .or_default()
            .push(Instant::now());
    }

    /// Number of requests currently recorded for `domain` within the window
    pub async fn recorded(&self, domain: &str) -> usize {
        let mut windows = self.windows.lock().await;
        match windows.get_mut(domain) {
            Some(timestamps) => {
                timestamps.retain(|t| t.elapsed() < RATE_WINDOW);
                timestamps.len()
            }
            None => 0,
        }
    }

    /// Drop all recorded timestamps (for tests)
    pub async fn clear(&self) {
        self.windows.lock().await.clear();
    }
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client wrapper combining the rate limiter with retry logic
///
/// Handles all HTTP communication with scraper targets:
/// - Per-domain rate limiting before every attempt
/// - Up to `max_attempts` tries with linear backoff (1s, 2s, ...) between them
/// - Browser-like default headers
///
/// Every failure is retried identically; there is no transient/permanent
/// classification. A 404 burns the full retry budget just like a timeout.
pub struct HttpClient {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
    max_attempts: u32,
}

impl HttpClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                        .parse()
                        .unwrap(),
                );
                headers.insert(
                    reqwest::header::ACCEPT_LANGUAGE,
                    "en-US,en;q=0.5".parse().unwrap(),
                );
                headers.insert(
                    reqwest::header::UPGRADE_INSECURE_REQUESTS,
                    "1".parse().unwrap(),
                );
                headers
            })
            .build()
            .map_err(MagnetioError::Http)?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_minute),
            max_attempts: config.max_attempts.max(1),
        })
    }

    /// Fetch a URL and return the response body
    ///
    /// Rate-limits against the URL's host, then retries up to the attempt
    /// budget with a linearly increasing delay between attempts. The last
    /// error is propagated once the budget is exhausted.
    ///
    /// # Errors
    /// - `Http` - network failure, timeout, or non-2xx status after all attempts
    /// - `InvalidQuery` - the URL has no parseable host
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let domain = Self::domain_of(url)?;
        self.rate_limiter.wait_if_needed(&domain).await;

        let mut last_error: Option<MagnetioError> = None;

        for attempt in 1..=self.max_attempts {
            debug!(url, attempt, "Fetching");
            match self.do_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!(url, attempt, error = %e, "Fetch attempt failed");
                    if attempt < self.max_attempts {
                        sleep(Duration::from_millis(1000 * u64::from(attempt))).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| MagnetioError::InvalidQuery(format!("unreachable: {url}"))))
    }

    /// Perform a single fetch attempt
    async fn do_fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(MagnetioError::Http)?
            .error_for_status()
            .map_err(MagnetioError::Http)?;

        response.text().await.map_err(MagnetioError::Http)
    }

    /// Extract the host portion of a URL for rate limiting
    fn domain_of(url: &str) -> Result<String> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| MagnetioError::InvalidQuery(format!("Invalid URL {url}: {e}")))?;
        parsed
            .host_str()
            .map(str::to_string)
            .ok_or_else(|| MagnetioError::InvalidQuery(format!("URL has no host: {url}")))
    }

    /// Get a reference to the rate limiter (for testing)
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.requests_per_minute, 25);
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(
            HttpClient::domain_of("https://ext.to/search?q=test").unwrap(),
            "ext.to"
        );
        assert!(HttpClient::domain_of("not a url").is_err());
    }

    #[tokio::test]
    async fn test_rate_limiter_under_limit_does_not_wait() {
        let limiter = RateLimiter::new(5);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.wait_if_needed("ext.to").await;
        }
        assert!(start.elapsed() < Duration::from_millis(500));
        assert_eq!(limiter.recorded("ext.to").await, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_excess_call_suspends() {
        let limiter = RateLimiter::new(3);
        let start = tokio::time::Instant::now();
        for _ in 0..3 {
            limiter.wait_if_needed("ext.to").await;
        }
        // Fourth call within the same second must suspend for a positive
        // duration (window remainder plus the one-second margin)
        limiter.wait_if_needed("ext.to").await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(60));
        assert!(elapsed <= Duration::from_secs(62));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_window_expiry() {
        let limiter = RateLimiter::new(2);
        limiter.wait_if_needed("ext.to").await;
        limiter.wait_if_needed("ext.to").await;
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(limiter.recorded("ext.to").await, 0);
        let start = tokio::time::Instant::now();
        limiter.wait_if_needed("ext.to").await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_rate_limiter_domains_are_independent() {
        let limiter = RateLimiter::new(1);
        let start = Instant::now();
        limiter.wait_if_needed("ext.to").await;
        limiter.wait_if_needed("watchsomuch.to").await;
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_rate_limiter_zero_limit_does_not_panic() {
        let limiter = RateLimiter::new(0);
        limiter.wait_if_needed("ext.to").await;
        assert_eq!(limiter.recorded("ext.to").await, 1);
    }

    #[tokio::test]
    async fn test_rate_limiter_clear() {
        let limiter = RateLimiter::new(10);
        limiter.wait_if_needed("ext.to").await;
        limiter.clear().await;
        assert_eq!(limiter.recorded("ext.to").await, 0);
    }
}
