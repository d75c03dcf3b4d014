//! Port Interfaces
//!
//! Contracts the infrastructure adapters implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - `MarketDataPort`: bar series, market cap and symbol search
//! - `BlobStore`: opaque key to bytes storage for the cached set
//! - `Clock`: source of today's date

mod blob_store_port;
mod clock_port;
mod market_data_port;

pub use blob_store_port::{BlobStore, BlobStoreError};
pub use clock_port::{Clock, FixedClock, SystemClock};
pub use market_data_port::{
    BarResolution, BarWindow, MarketCap, MarketDataError, MarketDataPort, ResponseKind, TickerBars,
};

#[cfg(test)]
pub use market_data_port::MockMarketDataPort;
