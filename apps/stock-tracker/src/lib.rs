#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Stock Tracker - Watchlist Snapshot Pipeline
//!
//! Keeps a persisted watchlist of daily stock snapshots fresh from the
//! Polygon REST API. Bars are fetched in rate-limited batches, reduced to a
//! close and daily change per ticker, and merged into a single cached blob.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Snapshot model and pure pipeline logic
//!   - `aggregator`: bar series to snapshot reduction
//!   - `merge`: newest-wins reconciliation with the cached set
//!   - `calendar`: effective trading date selection
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: market data, blob store and clock interfaces
//!   - `services`: tracker, repository and search
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `http`: retrying fetch client and batch fetcher
//!   - `polygon`: request builder, decoders and market data adapter
//!   - `persistence`: in-memory and file blob stores
//!   - `config`, `metrics`, `telemetry`: process concerns
//!
//! # Data Flow
//!
//! ```text
//! RequestBuilder ──► BatchFetcher ──► FetchClient ──► Polygon REST
//!                         │
//!                         ▼
//!                  decode + reduce ──► merge ──► BlobStore("StoredStockValues")
//!                                                   │
//!                                                   ▼
//!                                           watch::Receiver
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Snapshot types and pure logic with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::{
    Bar, BarSeries, DailySnapshot, PersistedStockSet, PreviousWeekdayCalendar, PricePoint,
    STORE_KEY, SearchHit, SearchPage, Ticker, TickerError, TradingCalendar,
};

// Ports
pub use application::ports::{
    BarResolution, BarWindow, BlobStore, BlobStoreError, Clock, FixedClock, MarketCap,
    MarketDataError, MarketDataPort, ResponseKind, SystemClock, TickerBars,
};

// Services
pub use application::services::{
    RefreshReport, SearchService, SnapshotRepository, TickerFailure, TrackerError,
    TrackerService, TrackerSettings,
};

// Infrastructure config
pub use infrastructure::config::{
    ConfigError, Credentials, FetchSettings, RefreshSettings, TrackerConfig,
};

// HTTP and Polygon adapter
pub use infrastructure::http::{
    BatchFetcher, FetchClient, FetchError, HttpResponse, HttpTransport, ReqwestTransport,
    RetryPolicy, TransportError,
};
pub use infrastructure::polygon::{DecodeError, PolygonMarketData, RequestBuilder};

// Persistence
pub use infrastructure::persistence::{FileBlobStore, InMemoryBlobStore};

// Metrics
pub use infrastructure::metrics::{RefreshOutcome, init_metrics};

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
