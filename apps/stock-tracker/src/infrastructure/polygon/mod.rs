//! Polygon REST adapter.
//!
//! - `requests`: URL construction with the injected API key
//! - `decode`: strict payload decoding
//! - `client`: the [`MarketDataPort`](crate::application::ports::MarketDataPort) implementation

mod client;
mod decode;
mod error;
mod requests;

pub use client::PolygonMarketData;
pub use decode::{DecodeError, decode_bar_series, decode_market_cap, decode_search_page};
pub use error::PolygonError;
pub use requests::{DEFAULT_BASE_URL, RequestBuilder};
