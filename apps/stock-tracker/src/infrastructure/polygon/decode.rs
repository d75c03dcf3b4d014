//! Strict decoding of Polygon payloads into domain types.
//!
//! Required fields that are missing or mistyped fail the whole decode.
//! Unknown fields are ignored.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::application::ports::{MarketCap, ResponseKind};
use crate::domain::{Bar, BarSeries, SearchHit, SearchPage, Ticker};

/// A payload did not match its expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {kind} payload: {message}")]
pub struct DecodeError {
    /// Expected shape.
    pub kind: ResponseKind,
    /// serde message.
    pub message: String,
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct AggregatesResponse {
    ticker: String,
    results: Option<Vec<AggregateBar>>,
}

#[derive(Debug, Deserialize)]
struct AggregateBar {
    /// Volume; occasionally sent in exponent notation.
    v: f64,
    c: f64,
    h: f64,
    l: f64,
    t: i64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchTicker>,
    #[allow(dead_code)]
    status: String,
    #[allow(dead_code)]
    request_id: String,
    count: u64,
    next_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchTicker {
    ticker: String,
    name: String,
    market: String,
    locale: String,
    #[serde(rename = "type")]
    asset_type: String,
    active: bool,
    currency_name: String,
    last_updated_utc: String,
}

#[derive(Debug, Deserialize)]
struct ReferenceResponse {
    #[allow(dead_code)]
    request_id: String,
    #[allow(dead_code)]
    status: String,
    results: ReferenceResults,
}

#[derive(Debug, Deserialize)]
struct ReferenceResults {
    ticker: String,
    market_cap: f64,
}

// =============================================================================
// Decoders
// =============================================================================

fn parse<T: DeserializeOwned>(kind: ResponseKind, bytes: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| DecodeError {
        kind,
        message: e.to_string(),
    })
}

/// Decode a ticker-plus-bars payload. A missing `results` array is an empty series.
///
/// # Errors
///
/// Returns [`DecodeError`] with kind [`ResponseKind::BarSeries`].
pub fn decode_bar_series(bytes: &[u8]) -> Result<BarSeries, DecodeError> {
    let response: AggregatesResponse = parse(ResponseKind::BarSeries, bytes)?;
    let bars = response
        .results
        .unwrap_or_default()
        .into_iter()
        .map(|b| Bar {
            volume: volume(b.v),
            close: b.c,
            high: b.h,
            low: b.l,
            timestamp: b.t,
        })
        .collect();

    Ok(BarSeries {
        ticker: Ticker::new(response.ticker),
        bars,
    })
}

/// Decode a symbol search page.
///
/// # Errors
///
/// Returns [`DecodeError`] with kind [`ResponseKind::SearchPage`].
pub fn decode_search_page(bytes: &[u8]) -> Result<SearchPage, DecodeError> {
    let response: SearchResponse = parse(ResponseKind::SearchPage, bytes)?;
    let hits = response
        .results
        .into_iter()
        .map(|t| SearchHit {
            ticker: Ticker::new(t.ticker),
            display_name: t.name,
            market: t.market,
            locale: t.locale,
            asset_type: t.asset_type,
            active: t.active,
            currency: t.currency_name,
            last_updated: t.last_updated_utc,
        })
        .collect();

    Ok(SearchPage {
        hits,
        count: response.count,
        next_url: response.next_url,
    })
}

/// Decode a reference payload down to its market cap.
///
/// # Errors
///
/// Returns [`DecodeError`] with kind [`ResponseKind::MarketCap`].
pub fn decode_market_cap(bytes: &[u8]) -> Result<MarketCap, DecodeError> {
    let response: ReferenceResponse = parse(ResponseKind::MarketCap, bytes)?;
    Ok(MarketCap {
        ticker: Ticker::new(response.results.ticker),
        market_cap: response.results.market_cap,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn volume(raw: f64) -> u64 {
    raw.max(0.0).round() as u64
}
