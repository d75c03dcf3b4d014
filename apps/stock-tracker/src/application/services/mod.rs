//! Application Services
//!
//! - `SnapshotRepository`: serialized access to the persisted watchlist
//! - `TrackerService`: refresh, watchlist edits, market cap and history
//! - `SearchService`: symbol search

mod repository;
mod search;
mod tracker;

use thiserror::Error;

use super::ports::{BarResolution, BlobStoreError, MarketDataError};
use crate::domain::{Ticker, TickerError};

pub use repository::SnapshotRepository;
pub use search::SearchService;
pub use tracker::{RefreshReport, TickerFailure, TrackerService};

/// Service-level tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    /// Bar granularity for snapshot fetches.
    pub resolution: BarResolution,
    /// Days of daily bars requested for daily snapshots.
    pub daily_lookback_days: u64,
    /// Days of history for price charts.
    pub history_days: u64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            resolution: BarResolution::Intraday,
            daily_lookback_days: 7,
            history_days: 15,
        }
    }
}

/// Tracker service error.
#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    /// Upstream fetch failed as a whole.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// Blob store read or write failed.
    #[error(transparent)]
    Store(#[from] BlobStoreError),

    /// Persisted bytes are not a snapshot set.
    #[error("cached watchlist is corrupt: {0}")]
    CorruptCache(String),

    /// Snapshot set could not be encoded.
    #[error("failed to encode watchlist: {0}")]
    Encoding(String),

    /// Ticker is not in the watchlist.
    #[error("ticker {0} is not tracked")]
    UnknownTicker(Ticker),

    /// Ticker input was rejected.
    #[error(transparent)]
    InvalidTicker(#[from] TickerError),
}
