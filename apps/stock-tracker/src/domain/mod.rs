//! Domain Layer - Snapshot model and pure pipeline logic.
//!
//! Nothing here performs I/O. Bar series go in, snapshots come out, and the
//! merge engine reconciles them with the cached set.

/// Ticker value object.
pub mod ticker;

/// Daily snapshot and persisted set.
pub mod snapshot;

/// OHLCV bars and chart points.
pub mod bars;

/// Symbol search results.
pub mod search;

/// Snapshot reduction.
pub mod aggregator;

/// Effective trading date selection.
pub mod calendar;

/// Cache merge engine.
pub mod merge;

pub use bars::{Bar, BarSeries, PricePoint};
pub use calendar::{PreviousWeekdayCalendar, TradingCalendar};
pub use search::{SearchHit, SearchPage};
pub use snapshot::{DailySnapshot, PersistedStockSet, STORE_KEY};
pub use ticker::{Ticker, TickerError};
