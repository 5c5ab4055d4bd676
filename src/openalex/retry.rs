// Rate limiting and retry for OpenAlex requests.
//
// OpenAlex's polite pool allows roughly 10 requests per second per contact
// email. This module provides a sliding-window rate limiter that throttles
// requests to stay under that, plus a retry wrapper that re-issues requests
// failing with a transient status (429/500/503 by default) using
// exponential backoff.
//
// The limiter is shared across concurrent queries via Arc<RateLimiter>,
// using interior mutability so callers only need a &self reference.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Statuses retried when no explicit list is configured.
pub const DEFAULT_RETRY_STATUSES: [u16; 3] = [429, 500, 503];

/// Maximum backoff delay to cap exponential growth.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// A sliding-window rate limiter for API calls.
pub struct RateLimiter {
    /// Timestamps of recent requests within the current window.
    requests: Mutex<VecDeque<Instant>>,
    /// Maximum number of requests allowed per window.
    max_requests: u32,
    /// Duration of the sliding window.
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests_per_window` requests in any
    /// `window` span.
    pub fn new(max_requests_per_window: u32, window: Duration) -> Self {
        Self {
            requests: Mutex::new(VecDeque::new()),
            max_requests: max_requests_per_window.max(1),
            window,
        }
    }

    /// OpenAlex polite-pool default: 10 requests per second.
    pub fn polite_pool() -> Self {
        Self::new(10, Duration::from_secs(1))
    }

    /// Wait until the window has room, then record the request.
    pub async fn acquire(&self) {
        loop {
            // Compute what to do while holding the lock, then drop it
            // before any await points.
            let wait = {
                let now = Instant::now();
                let mut requests = self
                    .requests
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());

                while let Some(&oldest) = requests.front() {
                    if now.duration_since(oldest) >= self.window {
                        requests.pop_front();
                    } else {
                        break;
                    }
                }

                if (requests.len() as u32) < self.max_requests {
                    requests.push_back(now);
                    None
                } else {
                    requests
                        .front()
                        .map(|&oldest| (oldest + self.window).saturating_duration_since(now))
                }
            };

            match wait {
                None => return,
                Some(wait) => {
                    info!(
                        delay_ms = wait.as_millis() as u64,
                        "Rate limit: waiting {}ms before next request",
                        wait.as_millis()
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Requests currently counted in the window.
    pub fn in_flight_window(&self) -> usize {
        self.requests
            .lock()
            .map(|r| r.len())
            .unwrap_or_default()
    }
}

/// How transient failures are retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Seconds to wait before the first retry; doubles on each subsequent one.
    pub backoff_factor: f64,
    /// HTTP statuses treated as transient.
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_factor: 0.1,
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Whether an error is worth another attempt.
    pub fn is_retryable(&self, err: &Error) -> bool {
        match err {
            Error::UpstreamStatus { status, .. } => self.retry_statuses.contains(status),
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Delay before retry number `attempt` (1-based):
    /// `backoff_factor * 2^(attempt - 1)`, capped at one minute.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(30) as i32;
        let secs = self.backoff_factor.max(0.0) * 2f64.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }
}

/// Retry an async operation on transient failures.
///
/// Non-retryable errors are returned immediately. Once `max_retries` retries
/// have failed, the last error is wrapped in `Error::UpstreamUnavailable`.
/// The limiter is acquired before every attempt so retries count against
/// the window too.
pub async fn with_retry<F, Fut, T>(
    rate_limiter: &RateLimiter,
    policy: &RetryPolicy,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0u32;

    loop {
        rate_limiter.acquire().await;

        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !policy.is_retryable(&err) {
                    return Err(err);
                }
                if attempt >= policy.max_retries {
                    return Err(Error::UpstreamUnavailable {
                        attempts: attempt + 1,
                        last_error: err.to_string(),
                    });
                }

                attempt += 1;
                let backoff = policy.backoff(attempt);

                warn!(
                    attempt = attempt,
                    max_retries = policy.max_retries,
                    backoff_secs = backoff.as_secs_f64(),
                    error = %err,
                    "Transient upstream failure, retrying in {:.1}s (attempt {}/{})",
                    backoff.as_secs_f64(),
                    attempt,
                    policy.max_retries,
                );

                tokio::time::sleep(backoff).await;
            }
        }
    }
}
