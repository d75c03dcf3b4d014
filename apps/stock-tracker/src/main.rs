//! Stock Tracker Binary
//!
//! Runs the watchlist refresh daemon.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin stock-tracker
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `POLYGON_API_KEY`: Polygon API key
//!
//! ## Optional
//! - `POLYGON_BASE_URL`: REST base URL (default: <https://api.polygon.io>)
//! - `TRACKER_STORE_DIR`: Directory for the cached watchlist (default: .stock-tracker)
//! - `TRACKER_TICKERS`: Comma-separated tickers added on startup
//! - `TRACKER_REFRESH_INTERVAL_SECS`: Refresh period (default: 60)
//! - `TRACKER_SNAPSHOT_RESOLUTION`: intraday | daily (default: intraday)
//! - `TRACKER_MAX_IN_FLIGHT`: Concurrent upstream requests (default: 4)
//! - `TRACKER_RETRY_MAX`, `TRACKER_RETRY_DELAY_SECS`, `TRACKER_RETRY_BUDGET_SECS`:
//!   429 retry policy (default: 3, 20, 60)
//! - `TRACKER_METRICS_PORT`: Prometheus port, 0 disables (default: 0)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: false)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use stock_tracker::infrastructure::metrics::{
    record_refresh, record_ticker_failures, set_tracked_tickers,
};
use stock_tracker::infrastructure::telemetry;
use stock_tracker::{
    FetchClient, FileBlobStore, PolygonMarketData, RefreshOutcome, RequestBuilder,
    ReqwestTransport, TrackerConfig, TrackerService, init_metrics,
};
use tokio::signal;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting stock tracker");

    let config = TrackerConfig::from_env().context("loading configuration")?;
    log_config(&config);

    if config.metrics_port != 0 {
        init_metrics(config.metrics_port).context("installing metrics exporter")?;
    }

    let transport = ReqwestTransport::new(config.fetch.http_timeout)?;
    let client = FetchClient::new(Arc::new(transport), config.fetch.retry_policy());
    let requests = RequestBuilder::new(&config.base_url, config.credentials.clone())?;
    let market = PolygonMarketData::new(requests, client, config.fetch.max_in_flight);
    let store = FileBlobStore::new(config.store_dir.clone());

    let tracker = TrackerService::new(
        Arc::new(market),
        Arc::new(store),
        config.tracker_settings(),
    );

    let cached = tracker.load_cached().await?;
    tracing::info!(tracked = cached.len(), "Loaded cached watchlist");

    for ticker in &config.refresh.seed_tickers {
        tracker.add_ticker(ticker.clone()).await?;
    }

    let shutdown_token = CancellationToken::new();
    tokio::spawn(await_shutdown(shutdown_token.clone()));

    let mut ticks = interval(config.refresh.interval.max(Duration::from_secs(1)));
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = shutdown_token.cancelled() => break,
            _ = ticks.tick() => refresh_cycle(&tracker).await,
        }
    }

    tracing::info!("Stock tracker stopped");
    Ok(())
}

/// Run one refresh and record its outcome.
async fn refresh_cycle(tracker: &TrackerService) {
    let started = Instant::now();
    match tracker.refresh_watchlist().await {
        Ok(report) => {
            let outcome = if report.is_complete() {
                RefreshOutcome::Success
            } else {
                RefreshOutcome::Partial
            };
            record_refresh(outcome, started.elapsed());
            record_ticker_failures(report.failures.len() as u64);
            set_tracked_tickers(report.snapshots.len());
        }
        Err(e) => {
            record_refresh(RefreshOutcome::Failed, started.elapsed());
            tracing::error!(error = %e, "Refresh cycle failed");
        }
    }
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Log the parsed configuration. The API key is never logged.
fn log_config(config: &TrackerConfig) {
    tracing::info!(
        base_url = %config.base_url,
        store_dir = %config.store_dir.display(),
        interval_secs = config.refresh.interval.as_secs(),
        resolution = config.refresh.resolution.as_str(),
        seed_tickers = config.refresh.seed_tickers.len(),
        metrics_port = config.metrics_port,
        "Configuration loaded"
    );
    tracing::debug!(
        max_in_flight = config.fetch.max_in_flight,
        retry_max = config.fetch.retry_max,
        retry_delay_secs = config.fetch.retry_delay.as_secs(),
        retry_budget_secs = config.fetch.retry_budget.as_secs(),
        "Fetch policy"
    );
}

/// Load .env file from any ancestor directory.
fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
