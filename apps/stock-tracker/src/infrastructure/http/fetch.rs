//! Single GET with status classification and rate-limit retry.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tokio::time::Instant;

use super::transport::HttpTransport;
use crate::infrastructure::metrics;

/// Retry policy for rate-limited requests.
///
/// Only 429 responses are retried. Every other failure propagates at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
    /// Ceiling for the whole operation, retries included.
    pub budget: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(20),
            budget: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Set the retry count.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay between attempts.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the overall budget.
    #[must_use]
    pub const fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }
}

/// Fetch failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// No HTTP response was received.
    #[error("no HTTP response: {message}")]
    NotHttpResponse {
        /// Transport error details.
        message: String,
    },

    /// 429 persisted past the retry policy.
    #[error("rate limited by server")]
    RateLimited,

    /// Any other non-200 status.
    #[error("HTTP status {code}")]
    HttpStatus {
        /// Status code.
        code: u16,
    },

    /// Budget elapsed while an attempt was in flight.
    #[error("retry budget exhausted")]
    Timeout,
}

/// Status category for retry handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusCategory {
    Success,
    RateLimited,
    Failure,
}

const fn categorize_status(status: u16) -> StatusCategory {
    match status {
        200 => StatusCategory::Success,
        429 => StatusCategory::RateLimited,
        _ => StatusCategory::Failure,
    }
}

/// Fixed-delay retry counter.
struct FixedBackoff {
    attempt: u32,
    max_retries: u32,
    delay: Duration,
}

impl FixedBackoff {
    const fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt: 0,
            max_retries: policy.max_retries,
            delay: policy.delay,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_retries {
            return None;
        }
        self.attempt += 1;
        Some(self.delay)
    }
}

/// Stateless GET client. Clones share the transport.
#[derive(Clone)]
pub struct FetchClient {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Create a client over `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Retry policy in effect.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `url`, retrying on 429 within the policy.
    ///
    /// A retry is only scheduled when its delay still fits in the budget.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RateLimited`] once retries are exhausted,
    /// [`FetchError::Timeout`] if the budget runs out mid-attempt, and any
    /// other failure unmodified on first occurrence.
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let deadline = Instant::now() + self.policy.budget;
        let mut backoff = FixedBackoff::new(&self.policy);

        loop {
            let Ok(outcome) = tokio::time::timeout_at(deadline, self.attempt(url)).await else {
                tracing::warn!(path = url.path(), "Request exceeded retry budget");
                return Err(FetchError::Timeout);
            };

            match outcome {
                Err(FetchError::RateLimited) => {
                    metrics::record_rate_limited();
                    match backoff.next_backoff() {
                        Some(delay) if Instant::now() + delay <= deadline => {
                            tracing::warn!(
                                path = url.path(),
                                attempt = backoff.attempt,
                                delay_ms = delay.as_millis(),
                                "Rate limited, retrying"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        _ => {
                            metrics::record_retries_exhausted();
                            tracing::warn!(
                                path = url.path(),
                                attempts = backoff.attempt + 1,
                                "Rate limited, retries exhausted"
                            );
                            return Err(FetchError::RateLimited);
                        }
                    }
                }
                other => return other,
            }
        }
    }

    async fn attempt(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        metrics::record_fetch_attempt();
        let response = self
            .transport
            .get(url)
            .await
            .map_err(|e| FetchError::NotHttpResponse { message: e.0 })?;

        match categorize_status(response.status) {
            StatusCategory::Success => Ok(response.body),
            StatusCategory::RateLimited => Err(FetchError::RateLimited),
            StatusCategory::Failure => {
                tracing::debug!(path = url.path(), status = response.status, "Request failed");
                Err(FetchError::HttpStatus {
                    code: response.status,
                })
            }
        }
    }
}
