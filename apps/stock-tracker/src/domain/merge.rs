//! Reconciliation of fetched snapshots with the cached set.
//!
//! One entry survives per ticker: the one with the greatest `as_of`. On equal
//! timestamps the incoming side wins, and within one side the later element
//! wins. Output is sorted by ticker.

use std::collections::HashMap;

use super::snapshot::DailySnapshot;
use super::ticker::Ticker;

/// Merge `incoming` into `existing`, keeping the newest snapshot per ticker.
///
/// Idempotent: merging a result with itself returns the same set.
#[must_use]
pub fn merge<I, E>(incoming: I, existing: E) -> Vec<DailySnapshot>
where
    I: IntoIterator<Item = DailySnapshot>,
    E: IntoIterator<Item = DailySnapshot>,
{
    let mut newest: HashMap<Ticker, DailySnapshot> = HashMap::new();

    // Existing first so that incoming entries win ties.
    for snapshot in existing.into_iter().chain(incoming) {
        let superseded = newest
            .get(&snapshot.ticker)
            .is_some_and(|current| current.as_of > snapshot.as_of);
        if !superseded {
            newest.insert(snapshot.ticker.clone(), snapshot);
        }
    }

    let mut merged: Vec<DailySnapshot> = newest.into_values().collect();
    merged.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    merged
}

/// Unconditional overwrite, used for explicit deletions.
///
/// Duplicate tickers in `snapshots` are collapsed with the same rule as [`merge`].
#[must_use]
pub fn replace<I>(snapshots: I) -> Vec<DailySnapshot>
where
    I: IntoIterator<Item = DailySnapshot>,
{
    merge(snapshots, Vec::new())
}
