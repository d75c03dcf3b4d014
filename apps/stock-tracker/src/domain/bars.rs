//! OHLCV bars and chart points.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ticker::Ticker;

/// One aggregate window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Traded volume.
    pub volume: u64,
    /// Close price.
    pub close: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Window start in epoch milliseconds.
    pub timestamp: i64,
}

/// Bars for one ticker in server order.
///
/// Consumers treat `bars[0]` as the most recent window, so the series must be
/// requested in descending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// Ticker the bars belong to.
    pub ticker: Ticker,
    /// Bars, possibly empty.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    /// Most recent bar under the descending-order precondition.
    #[must_use]
    pub fn latest(&self) -> Option<&Bar> {
        self.bars.first()
    }

    /// Bar preceding [`BarSeries::latest`].
    #[must_use]
    pub fn prior(&self) -> Option<&Bar> {
        self.bars.get(1)
    }
}

/// A single close price on a calendar day, used for charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// UTC calendar day of the bar.
    pub date: NaiveDate,
    /// Close price.
    pub close: f64,
    /// Original bar timestamp in epoch milliseconds.
    pub timestamp: i64,
}

impl PricePoint {
    /// Build a point from a bar. Returns `None` for timestamps chrono cannot represent.
    #[must_use]
    pub fn from_bar(bar: &Bar) -> Option<Self> {
        let date = DateTime::from_timestamp_millis(bar.timestamp)?.date_naive();
        Some(Self {
            date,
            close: bar.close,
            timestamp: bar.timestamp,
        })
    }
}
