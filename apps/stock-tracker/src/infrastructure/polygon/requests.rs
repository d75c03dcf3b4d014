//! URL construction for the Polygon REST endpoints.

use chrono::NaiveDate;
use reqwest::Url;

use crate::application::ports::{BarResolution, BarWindow};
use crate::domain::Ticker;
use crate::infrastructure::config::{ConfigError, Credentials};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";

const DATE_FORMAT: &str = "%Y-%m-%d";
const SEARCH_LIMIT: &str = "50";

/// Builds fully-formed request URLs, API key included.
///
/// Base URL and credentials are injected once at construction.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base: Url,
    credentials: Credentials,
}

impl RequestBuilder {
    /// Create a builder rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `base_url` does not parse or
    /// cannot carry a path.
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self, ConfigError> {
        let base = Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
            key: "POLYGON_BASE_URL".to_string(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                key: "POLYGON_BASE_URL".to_string(),
                message: format!("'{base_url}' cannot be used as a base URL"),
            });
        }
        Ok(Self { base, credentials })
    }

    /// Daily bars, split-adjusted, newest first, up to 120.
    #[must_use]
    pub fn aggregate_bars(&self, ticker: &Ticker, from: NaiveDate, to: NaiveDate) -> Url {
        self.aggregates(ticker, "1", "day", from, to, "true", "120")
    }

    /// 30-minute bars, unadjusted, newest first, up to 5000.
    #[must_use]
    pub fn intraday_bars(&self, ticker: &Ticker, from: NaiveDate, to: NaiveDate) -> Url {
        self.aggregates(ticker, "30", "minute", from, to, "false", "5000")
    }

    /// Bars for a [`BarWindow`], dispatching on resolution.
    #[must_use]
    pub fn bars(&self, ticker: &Ticker, window: BarWindow) -> Url {
        match window.resolution {
            BarResolution::Daily => self.aggregate_bars(ticker, window.from, window.to),
            BarResolution::Intraday => self.intraday_bars(ticker, window.from, window.to),
        }
    }

    /// Company reference data (market cap) as of a date.
    #[must_use]
    pub fn reference(&self, ticker: &Ticker, as_of: NaiveDate) -> Url {
        let mut url = self.endpoint(&["v3", "reference", "tickers", ticker.as_str()]);
        url.query_pairs_mut()
            .append_pair("date", &as_of.format(DATE_FORMAT).to_string())
            .append_pair("apiKey", self.credentials.api_key());
        url
    }

    /// Active US stock symbols matching `term`, sorted by ticker.
    #[must_use]
    pub fn search(&self, term: &str) -> Url {
        let mut url = self.endpoint(&["v3", "reference", "tickers"]);
        url.query_pairs_mut()
            .append_pair("market", "stocks")
            .append_pair("search", term)
            .append_pair("active", "true")
            .append_pair("sort", "ticker")
            .append_pair("order", "asc")
            .append_pair("limit", SEARCH_LIMIT)
            .append_pair("apiKey", self.credentials.api_key());
        url
    }

    #[allow(clippy::too_many_arguments)]
    fn aggregates(
        &self,
        ticker: &Ticker,
        multiplier: &str,
        timespan: &str,
        from: NaiveDate,
        to: NaiveDate,
        adjusted: &str,
        limit: &str,
    ) -> Url {
        let from = from.format(DATE_FORMAT).to_string();
        let to = to.format(DATE_FORMAT).to_string();
        let mut url = self.endpoint(&[
            "v2",
            "aggs",
            "ticker",
            ticker.as_str(),
            "range",
            multiplier,
            timespan,
            from.as_str(),
            to.as_str(),
        ]);
        url.query_pairs_mut()
            .append_pair("adjusted", adjusted)
            .append_pair("sort", "desc")
            .append_pair("limit", limit)
            .append_pair("apiKey", self.credentials.api_key());
        url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`: the base can always carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
