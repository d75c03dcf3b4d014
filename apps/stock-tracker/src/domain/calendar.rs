//! Effective trading date selection.
//!
//! Upstream data for a given day is only available once the session has
//! closed, so requests target the latest date known to have data. The
//! default heuristic steps back one day, or three from a Monday. It knows
//! nothing about exchange holidays; swap in another [`TradingCalendar`] for
//! that.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Maps a calendar date to the latest date the upstream API has data for.
pub trait TradingCalendar: Send + Sync {
    /// Effective trading date for `date`.
    fn effective_date(&self, date: NaiveDate) -> NaiveDate;
}

/// Monday goes back to Friday, every other day goes back one day.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviousWeekdayCalendar;

impl TradingCalendar for PreviousWeekdayCalendar {
    fn effective_date(&self, date: NaiveDate) -> NaiveDate {
        let back = if date.weekday() == Weekday::Mon { 3 } else { 1 };
        date.checked_sub_days(Days::new(back)).unwrap_or(date)
    }
}

impl<F> TradingCalendar for F
where
    F: Fn(NaiveDate) -> NaiveDate + Send + Sync,
{
    fn effective_date(&self, date: NaiveDate) -> NaiveDate {
        self(date)
    }
}
