//! Tracker Configuration Settings
//!
//! Configuration types for the tracker, loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::application::ports::BarResolution;
use crate::application::services::TrackerSettings;
use crate::domain::Ticker;
use crate::infrastructure::http::{DEFAULT_MAX_IN_FLIGHT, RetryPolicy};
use crate::infrastructure::polygon::DEFAULT_BASE_URL;

/// Polygon API credentials.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(api_key: String) -> Self {
        Self { api_key }
    }

    /// Get the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// HTTP fetch settings.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Maximum concurrent requests per batch.
    pub max_in_flight: usize,
    /// Retries after a 429.
    pub retry_max: u32,
    /// Delay between retries.
    pub retry_delay: Duration,
    /// Overall budget per fetch, retries included.
    pub retry_budget: Duration,
    /// Per-request reqwest timeout.
    pub http_timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            retry_max: policy.max_retries,
            retry_delay: policy.delay,
            retry_budget: policy.budget,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl FetchSettings {
    /// Retry policy for the fetch client.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry_max,
            delay: self.retry_delay,
            budget: self.retry_budget,
        }
    }
}

/// Watchlist refresh settings.
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    /// Interval between periodic refreshes.
    pub interval: Duration,
    /// Bar granularity for snapshots.
    pub resolution: BarResolution,
    /// Days of daily bars requested when `resolution` is daily.
    pub daily_lookback_days: u64,
    /// Days of history for price charts.
    pub history_days: u64,
    /// Tickers added to the watchlist at startup.
    pub seed_tickers: Vec<Ticker>,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        let tracker = TrackerSettings::default();
        Self {
            interval: Duration::from_secs(60),
            resolution: tracker.resolution,
            daily_lookback_days: tracker.daily_lookback_days,
            history_days: tracker.history_days,
            seed_tickers: Vec::new(),
        }
    }
}

/// Complete tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// API credentials.
    pub credentials: Credentials,
    /// Upstream API root.
    pub base_url: String,
    /// Directory for the file blob store.
    pub store_dir: PathBuf,
    /// Prometheus listener port (0 = disabled).
    pub metrics_port: u16,
    /// HTTP fetch settings.
    pub fetch: FetchSettings,
    /// Refresh settings.
    pub refresh: RefreshSettings,
}

impl TrackerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `POLYGON_API_KEY` is missing or empty, or if
    /// `TRACKER_TICKERS` contains an invalid symbol.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`TrackerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("POLYGON_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("POLYGON_API_KEY".to_string()))?;

        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyValue("POLYGON_API_KEY".to_string()));
        }

        let base_url = lookup("POLYGON_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let store_dir = lookup("TRACKER_STORE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(".stock-tracker"), PathBuf::from);

        let fetch_defaults = FetchSettings::default();
        let fetch = FetchSettings {
            max_in_flight: parse_env(&lookup, "TRACKER_MAX_IN_FLIGHT", fetch_defaults.max_in_flight)
                .max(1),
            retry_max: parse_env(&lookup, "TRACKER_RETRY_MAX", fetch_defaults.retry_max),
            retry_delay: parse_env_duration_secs(
                &lookup,
                "TRACKER_RETRY_DELAY_SECS",
                fetch_defaults.retry_delay,
            ),
            retry_budget: parse_env_duration_secs(
                &lookup,
                "TRACKER_RETRY_BUDGET_SECS",
                fetch_defaults.retry_budget,
            ),
            http_timeout: parse_env_duration_secs(
                &lookup,
                "TRACKER_HTTP_TIMEOUT_SECS",
                fetch_defaults.http_timeout,
            ),
        };

        let refresh_defaults = RefreshSettings::default();
        let refresh = RefreshSettings {
            interval: parse_env_duration_secs(
                &lookup,
                "TRACKER_REFRESH_INTERVAL_SECS",
                refresh_defaults.interval,
            ),
            resolution: lookup("TRACKER_SNAPSHOT_RESOLUTION")
                .map_or(refresh_defaults.resolution, |s| {
                    BarResolution::from_str_case_insensitive(&s)
                }),
            daily_lookback_days: parse_env(
                &lookup,
                "TRACKER_DAILY_LOOKBACK_DAYS",
                refresh_defaults.daily_lookback_days,
            ),
            history_days: parse_env(
                &lookup,
                "TRACKER_HISTORY_DAYS",
                refresh_defaults.history_days,
            ),
            seed_tickers: parse_tickers(lookup("TRACKER_TICKERS").as_deref())?,
        };

        Ok(Self {
            credentials: Credentials::new(api_key.trim().to_string()),
            base_url,
            store_dir,
            metrics_port: parse_env(&lookup, "TRACKER_METRICS_PORT", 0),
            fetch,
            refresh,
        })
    }

    /// Service-level settings derived from this configuration.
    #[must_use]
    pub const fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            resolution: self.refresh.resolution,
            daily_lookback_days: self.refresh.daily_lookback_days,
            history_days: self.refresh.history_days,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable could not be interpreted.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// What was wrong.
        message: String,
    },
}

fn parse_tickers(raw: Option<&str>) -> Result<Vec<Ticker>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let mut tickers: Vec<Ticker> = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let ticker = Ticker::parse(part).map_err(|e| ConfigError::InvalidValue {
            key: "TRACKER_TICKERS".to_string(),
            message: e.to_string(),
        })?;
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    Ok(tickers)
}

fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}
