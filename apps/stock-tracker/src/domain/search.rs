//! Symbol search results. Never persisted.

use serde::{Deserialize, Serialize};

use super::ticker::Ticker;

/// One matching instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Symbol.
    pub ticker: Ticker,
    /// Company or fund name.
    pub display_name: String,
    /// Market, e.g. "stocks".
    pub market: String,
    /// Locale, e.g. "us".
    pub locale: String,
    /// Asset type code, e.g. "CS" or "ETF".
    pub asset_type: String,
    /// Whether the instrument is actively traded.
    pub active: bool,
    /// Quote currency name.
    pub currency: String,
    /// Last reference update as reported upstream.
    pub last_updated: String,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchPage {
    /// Matches on this page.
    pub hits: Vec<SearchHit>,
    /// Match count reported upstream.
    pub count: u64,
    /// Cursor for the next page, if any.
    pub next_url: Option<String>,
}
