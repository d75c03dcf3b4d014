//! Ticker value object, the natural key for every tracked entity.

use serde::{Deserialize, Serialize};
use std::fmt;

use thiserror::Error;

/// Longest symbol accepted by [`Ticker::parse`].
pub const MAX_TICKER_LEN: usize = 10;

/// A short uppercase stock symbol.
///
/// Examples: "AAPL", "MSFT", "BRK.B"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

/// Rejected ticker input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerError {
    /// Input was empty after trimming.
    #[error("ticker cannot be empty")]
    Empty,
    /// Input exceeded [`MAX_TICKER_LEN`].
    #[error("ticker '{0}' exceeds maximum length")]
    TooLong(String),
    /// Input contained a character outside `[A-Z0-9.-]`.
    #[error("ticker '{0}' contains invalid characters")]
    InvalidCharacters(String),
}

impl Ticker {
    /// Create a new Ticker.
    ///
    /// The symbol is normalized to uppercase. No validation is performed,
    /// which is what decoded upstream payloads need.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().to_uppercase())
    }

    /// Parse user input into a validated ticker.
    ///
    /// # Errors
    ///
    /// Returns error if the trimmed input is empty, too long, or contains
    /// characters other than ASCII letters, digits, `.` and `-`.
    pub fn parse(input: &str) -> Result<Self, TickerError> {
        let ticker = Self::new(input.trim());
        ticker.validate()?;
        Ok(ticker)
    }

    /// Validate the symbol.
    ///
    /// # Errors
    ///
    /// See [`Ticker::parse`].
    pub fn validate(&self) -> Result<(), TickerError> {
        if self.0.is_empty() {
            return Err(TickerError::Empty);
        }

        if self.0.len() > MAX_TICKER_LEN {
            return Err(TickerError::TooLong(self.0.clone()));
        }

        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(TickerError::InvalidCharacters(self.0.clone()));
        }

        Ok(())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Ticker {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Ticker {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
