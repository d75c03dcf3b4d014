//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete implementations of the port interfaces defined in the
//! application layer, plus process-level concerns.

/// HTTP transport, retrying fetch client and batch fetcher.
pub mod http;

/// Polygon REST adapter.
pub mod polygon;

/// Blob store adapters.
pub mod persistence;

/// Environment-driven configuration.
pub mod config;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Tracing subscriber and optional OpenTelemetry export.
pub mod telemetry;
