//! Prometheus Metrics Module
//!
//! Counters and gauges for the fetch pipeline and refresh loop.
//!
//! # Metrics Categories
//!
//! - **Fetch**: attempts, 429 responses and exhausted retries
//! - **Refresh**: cycles by outcome, per-ticker failures and duration
//! - **Watchlist**: number of tracked tickers
//!
//! Recording functions are no-ops until [`init_metrics`] installs a recorder.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Install the Prometheus recorder with an HTTP listener on `port`.
///
/// Calling again after a successful install is a no-op. Must run inside a
/// Tokio runtime.
///
/// # Errors
///
/// Returns the exporter error if the listener or recorder cannot be installed.
pub fn init_metrics(port: u16) -> Result<(), BuildError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
        .install()?;

    register_metrics();
    let _ = INSTALLED.set(());
    Ok(())
}

fn register_metrics() {
    describe_counter!(
        "stock_tracker_fetch_attempts_total",
        "Total HTTP attempts issued upstream"
    );
    describe_counter!(
        "stock_tracker_rate_limited_total",
        "Total 429 responses received"
    );
    describe_counter!(
        "stock_tracker_retries_exhausted_total",
        "Total fetches that gave up after repeated 429 responses"
    );
    describe_counter!(
        "stock_tracker_refresh_total",
        "Total refresh cycles by outcome"
    );
    describe_counter!(
        "stock_tracker_ticker_failures_total",
        "Total per-ticker failures inside otherwise successful refreshes"
    );
    describe_gauge!(
        "stock_tracker_tracked_tickers",
        "Number of tickers in the cached watchlist"
    );
    describe_histogram!(
        "stock_tracker_refresh_seconds",
        "Wall time of a fetch-and-refresh cycle"
    );
}

/// Refresh cycle outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Every ticker refreshed.
    Success,
    /// Some tickers failed to decode.
    Partial,
    /// The batch failed and the cache was left untouched.
    Failed,
}

impl RefreshOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

/// Record one upstream HTTP attempt.
pub fn record_fetch_attempt() {
    counter!("stock_tracker_fetch_attempts_total").increment(1);
}

/// Record a 429 response.
pub fn record_rate_limited() {
    counter!("stock_tracker_rate_limited_total").increment(1);
}

/// Record a fetch that escalated its rate limit.
pub fn record_retries_exhausted() {
    counter!("stock_tracker_retries_exhausted_total").increment(1);
}

/// Record a refresh cycle and its duration.
pub fn record_refresh(outcome: RefreshOutcome, duration: Duration) {
    counter!("stock_tracker_refresh_total", "outcome" => outcome.as_str()).increment(1);
    histogram!("stock_tracker_refresh_seconds").record(duration.as_secs_f64());
}

/// Record per-ticker failures.
pub fn record_ticker_failures(count: u64) {
    counter!("stock_tracker_ticker_failures_total").increment(count);
}

/// Update the tracked ticker gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_tracked_tickers(count: usize) {
    gauge!("stock_tracker_tracked_tickers").set(count as f64);
}

// =============================================================================
// Tests
// =============================================================================
