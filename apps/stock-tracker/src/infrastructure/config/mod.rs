//! Configuration Module
//!
//! Environment-driven configuration for the tracker binary.

mod settings;

pub use settings::{ConfigError, Credentials, FetchSettings, RefreshSettings, TrackerConfig};
