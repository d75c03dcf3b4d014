//! Reduction of bar series into daily snapshots.

use super::bars::{BarSeries, PricePoint};
use super::snapshot::DailySnapshot;
use super::ticker::Ticker;

/// Reduce a descending bar series to a snapshot.
///
/// Fewer than two bars yields the 0/0/0 placeholder. Otherwise the close and
/// timestamp come from `bars[0]` and the change is measured against `bars[1]`.
#[must_use]
pub fn reduce(ticker: &Ticker, series: &BarSeries) -> DailySnapshot {
    match (series.latest(), series.prior()) {
        (Some(latest), Some(prior)) => DailySnapshot {
            ticker: ticker.clone(),
            close_price: latest.close,
            daily_change: daily_change(latest.close, prior.close),
            as_of: latest.timestamp,
            market_cap: None,
        },
        _ => DailySnapshot::placeholder(ticker.clone()),
    }
}

/// `round(1000 * (latest - prior)) / 1000`.
#[must_use]
pub fn daily_change(latest: f64, prior: f64) -> f64 {
    (1000.0 * (latest - prior)).round() / 1000.0
}

/// Attach a market cap without touching close, change or timestamp.
#[must_use]
pub fn apply_market_cap(snapshot: DailySnapshot, market_cap: f64) -> DailySnapshot {
    DailySnapshot {
        market_cap: Some(market_cap),
        ..snapshot
    }
}

/// Keep the cached market cap when `fresh` has none. Bar data carries no
/// market cap.
#[must_use]
pub fn carry_market_cap(fresh: DailySnapshot, cached: &DailySnapshot) -> DailySnapshot {
    DailySnapshot {
        market_cap: fresh.market_cap.or(cached.market_cap),
        ..fresh
    }
}

/// Chart points for a series, oldest first.
#[must_use]
pub fn price_history(series: &BarSeries) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = series.bars.iter().filter_map(PricePoint::from_bar).collect();
    points.sort_by_key(|p| p.timestamp);
    points
}
