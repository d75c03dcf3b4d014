//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the tracker services and the port interfaces that
//! define how they reach market data, storage and time.

/// Port interfaces for market data, blob storage and clocks.
pub mod ports;

/// Watchlist refresh, cache and search services.
pub mod services;
