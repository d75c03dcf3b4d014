//! Market Data Port (Driven Port)
//!
//! Interface for fetching bars, reference data and search results from the
//! upstream market data provider.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{BarSeries, SearchPage, Ticker};

/// Bar granularity used for snapshot fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BarResolution {
    /// 30-minute bars, unadjusted.
    #[default]
    Intraday,
    /// Daily bars, split-adjusted.
    Daily,
}

impl BarResolution {
    /// Parse from a config string. Unknown values fall back to intraday.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "daily" | "day" => Self::Daily,
            _ => Self::Intraday,
        }
    }

    /// Config name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Intraday => "intraday",
            Self::Daily => "daily",
        }
    }
}

/// Date range and granularity of a bar request. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarWindow {
    /// Granularity.
    pub resolution: BarResolution,
    /// First day.
    pub from: NaiveDate,
    /// Last day.
    pub to: NaiveDate,
}

/// Per-ticker outcome of a batch bar fetch.
#[derive(Debug, Clone)]
pub struct TickerBars {
    /// Requested ticker.
    pub ticker: Ticker,
    /// Decoded series, or the decode failure for this ticker alone.
    pub result: Result<BarSeries, MarketDataError>,
}

/// Market capitalization from the reference endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCap {
    /// Ticker reported upstream.
    pub ticker: Ticker,
    /// Capitalization in the listing currency.
    pub market_cap: f64,
}

/// Response shape a payload was expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Symbol search page.
    SearchPage,
    /// Ticker plus aggregate bars.
    BarSeries,
    /// Ticker plus market cap.
    MarketCap,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SearchPage => "search page",
            Self::BarSeries => "bar series",
            Self::MarketCap => "market cap",
        };
        f.write_str(name)
    }
}

/// Market data error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketDataError {
    /// The request never produced an HTTP response.
    #[error("market data transport error: {message}")]
    Transport {
        /// Error details.
        message: String,
    },

    /// Upstream kept answering 429 until retries ran out.
    #[error("market data rate limited")]
    RateLimited,

    /// Non-retryable upstream status.
    #[error("market data HTTP status {code}")]
    HttpStatus {
        /// Status code.
        code: u16,
    },

    /// The retry budget elapsed before a response arrived.
    #[error("market data request timed out")]
    Timeout,

    /// Payload did not match the expected shape.
    #[error("malformed {kind} payload: {message}")]
    Decode {
        /// Expected shape.
        kind: ResponseKind,
        /// Decoder message.
        message: String,
    },
}

/// Market data port for the watchlist pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Fetch bars for every ticker in one batch.
    ///
    /// Fails as a whole on the first fetch failure. Decode failures are
    /// reported per ticker inside the result.
    async fn snapshot_bars(
        &self,
        tickers: &[Ticker],
        window: BarWindow,
    ) -> Result<Vec<TickerBars>, MarketDataError>;

    /// Fetch daily bars for one ticker.
    async fn history_bars(
        &self,
        ticker: &Ticker,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BarSeries, MarketDataError>;

    /// Fetch market cap for one ticker as of a date.
    async fn market_cap(
        &self,
        ticker: &Ticker,
        as_of: NaiveDate,
    ) -> Result<MarketCap, MarketDataError>;

    /// Search symbols matching a non-empty term.
    async fn search(&self, term: &str) -> Result<SearchPage, MarketDataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_parsing() {
        assert_eq!(
            BarResolution::from_str_case_insensitive("DAILY"),
            BarResolution::Daily
        );
        assert_eq!(
            BarResolution::from_str_case_insensitive("intraday"),
            BarResolution::Intraday
        );
        assert_eq!(
            BarResolution::from_str_case_insensitive("hourly"),
            BarResolution::Intraday
        );
    }

    #[test]
    fn decode_error_names_kind() {
        let err = MarketDataError::Decode {
            kind: ResponseKind::MarketCap,
            message: "missing field `market_cap`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed market cap payload: missing field `market_cap`"
        );
    }
}
