//! Clock Port
//!
//! Source of the current calendar date, injectable for tests.

use chrono::{Local, NaiveDate};

/// Current date provider.
pub trait Clock: Send + Sync {
    /// Today's date in the user's local time zone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
