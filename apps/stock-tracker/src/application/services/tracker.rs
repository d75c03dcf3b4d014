//! Watchlist tracker service.
//!
//! Drives the refresh pipeline (fetch bars, reduce to snapshots, merge into
//! the cache) and the user-initiated watchlist edits. Every mutation is
//! published on a `watch` channel so a presentation layer can redraw from
//! its own loop.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tokio::sync::watch;

use super::repository::SnapshotRepository;
use super::{TrackerError, TrackerSettings};
use crate::application::ports::{
    BarResolution, BarWindow, BlobStore, Clock, MarketDataError, MarketDataPort, SystemClock,
    TickerBars,
};
use crate::domain::aggregator::{apply_market_cap, carry_market_cap, price_history, reduce};
use crate::domain::merge::merge;
use crate::domain::{
    DailySnapshot, PersistedStockSet, PreviousWeekdayCalendar, PricePoint, Ticker,
    TradingCalendar,
};

/// A ticker whose update was dropped from an otherwise successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerFailure {
    /// Affected ticker.
    pub ticker: Ticker,
    /// Why its update was dropped.
    pub error: MarketDataError,
}

/// Outcome of a fetch-and-refresh.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    /// Full cached set after the merge.
    pub snapshots: Vec<DailySnapshot>,
    /// Tickers whose fresh snapshot was merged. Tickers removed while the
    /// fetch was in flight are not counted.
    pub refreshed: usize,
    /// Tickers whose update was dropped. Their cached entries are unchanged.
    pub failures: Vec<TickerFailure>,
}

impl RefreshReport {
    /// Whether every requested ticker refreshed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Watchlist tracker.
pub struct TrackerService {
    market: Arc<dyn MarketDataPort>,
    repository: SnapshotRepository,
    calendar: Arc<dyn TradingCalendar>,
    clock: Arc<dyn Clock>,
    settings: TrackerSettings,
    updates: watch::Sender<Vec<DailySnapshot>>,
}

impl std::fmt::Debug for TrackerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerService")
            .field("repository", &self.repository)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TrackerService {
    /// Create a tracker using the wall clock and the previous-weekday calendar.
    #[must_use]
    pub fn new(
        market: Arc<dyn MarketDataPort>,
        store: Arc<dyn BlobStore>,
        settings: TrackerSettings,
    ) -> Self {
        let (updates, _) = watch::channel(Vec::new());
        Self {
            market,
            repository: SnapshotRepository::new(store),
            calendar: Arc::new(PreviousWeekdayCalendar),
            clock: Arc::new(SystemClock),
            settings,
            updates,
        }
    }

    /// Replace the trading calendar.
    #[must_use]
    pub fn with_calendar(mut self, calendar: Arc<dyn TradingCalendar>) -> Self {
        self.calendar = calendar;
        self
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Receive the full cached set after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<DailySnapshot>> {
        self.updates.subscribe()
    }

    /// Latest date the upstream is expected to have data for.
    #[must_use]
    pub fn effective_date(&self) -> NaiveDate {
        self.calendar.effective_date(self.clock.today())
    }

    /// Bar window used for snapshot refreshes.
    #[must_use]
    pub fn snapshot_window(&self) -> BarWindow {
        let to = self.effective_date();
        let from = match self.settings.resolution {
            BarResolution::Intraday => to,
            BarResolution::Daily => to
                .checked_sub_days(Days::new(self.settings.daily_lookback_days))
                .unwrap_or(to),
        };
        BarWindow {
            resolution: self.settings.resolution,
            from,
            to,
        }
    }

    /// Load the persisted watchlist.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Store`] or [`TrackerError::CorruptCache`].
    pub async fn load_cached(&self) -> Result<Vec<DailySnapshot>, TrackerError> {
        let set = self.repository.load().await?;
        Ok(self.publish(set))
    }

    /// Fetch fresh snapshots for `tickers` and merge them into the cache.
    ///
    /// Only tickers still tracked when the merge runs are updated, so a
    /// removal made while the fetch was in flight stays removed. Cached
    /// market caps carry over onto the fresh snapshots.
    ///
    /// A ticker whose payload fails to decode is logged, reported in
    /// [`RefreshReport::failures`] and left as cached. Any fetch failure
    /// fails the whole refresh and leaves the cache untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::MarketData`] for batch failures and store
    /// errors from the merge.
    pub async fn fetch_and_refresh(&self, tickers: &[Ticker]) -> Result<RefreshReport, TrackerError> {
        if tickers.is_empty() {
            let snapshots = self.load_cached().await?;
            return Ok(RefreshReport {
                snapshots,
                refreshed: 0,
                failures: Vec::new(),
            });
        }

        let window = self.snapshot_window();
        tracing::debug!(
            tickers = tickers.len(),
            resolution = window.resolution.as_str(),
            from = %window.from,
            to = %window.to,
            "Refreshing snapshots"
        );

        let results = self
            .market
            .snapshot_bars(tickers, window)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, "Snapshot batch failed, keeping cached values");
            })?;

        let mut fresh = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for TickerBars { ticker, result } in results {
            match result {
                Ok(series) => fresh.push(reduce(&ticker, &series)),
                Err(error) => {
                    tracing::warn!(ticker = %ticker, error = %error, "Dropping ticker update");
                    failures.push(TickerFailure { ticker, error });
                }
            }
        }

        let fetched = fresh.len();
        let mut refreshed = 0;
        let set = self
            .repository
            .update(|existing| {
                let tracked: Vec<DailySnapshot> = fresh
                    .into_iter()
                    .filter_map(|snapshot| {
                        let cached = existing.get(&snapshot.ticker)?;
                        Some(carry_market_cap(snapshot, cached))
                    })
                    .collect();
                refreshed = tracked.len();
                Ok(merge(tracked, existing.into_snapshots()))
            })
            .await?;
        if refreshed < fetched {
            tracing::debug!(
                untracked = fetched - refreshed,
                "Skipped snapshots for tickers no longer tracked"
            );
        }
        let snapshots = self.publish(set);

        tracing::info!(
            refreshed,
            failed = failures.len(),
            tracked = snapshots.len(),
            "Watchlist refreshed"
        );

        Ok(RefreshReport {
            snapshots,
            refreshed,
            failures,
        })
    }

    /// Refresh every ticker currently in the cache.
    ///
    /// # Errors
    ///
    /// See [`TrackerService::fetch_and_refresh`].
    pub async fn refresh_watchlist(&self) -> Result<RefreshReport, TrackerError> {
        let tickers = self.repository.load().await?.tickers();
        self.fetch_and_refresh(&tickers).await
    }

    /// Start tracking `ticker` with a placeholder snapshot.
    ///
    /// Adding an already tracked ticker keeps its data.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidTicker`] or a store error.
    pub async fn add_ticker(&self, ticker: Ticker) -> Result<Vec<DailySnapshot>, TrackerError> {
        ticker.validate()?;
        tracing::info!(ticker = %ticker, "Adding ticker");
        let set = self
            .repository
            .merge_in(vec![DailySnapshot::placeholder(ticker)])
            .await?;
        Ok(self.publish(set))
    }

    /// Stop tracking `tickers`. Unknown tickers are ignored.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn remove_tickers(
        &self,
        tickers: &[Ticker],
    ) -> Result<Vec<DailySnapshot>, TrackerError> {
        let set = self
            .repository
            .update(|set| {
                Ok(set
                    .into_snapshots()
                    .into_iter()
                    .filter(|s| !tickers.contains(&s.ticker))
                    .collect())
            })
            .await?;
        tracing::info!(removed = tickers.len(), tracked = set.len(), "Tickers removed");
        Ok(self.publish(set))
    }

    /// Fetch and store the market cap of a tracked ticker.
    ///
    /// Close, change and timestamp are left as cached.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UnknownTicker`] if `ticker` is not tracked,
    /// otherwise the fetch or store failure.
    pub async fn refresh_market_cap(&self, ticker: &Ticker) -> Result<DailySnapshot, TrackerError> {
        if self.repository.load().await?.get(ticker).is_none() {
            return Err(TrackerError::UnknownTicker(ticker.clone()));
        }

        let cap = self
            .market
            .market_cap(ticker, self.effective_date())
            .await?;

        let set = self
            .repository
            .update(|set| {
                if set.get(ticker).is_none() {
                    return Err(TrackerError::UnknownTicker(ticker.clone()));
                }
                Ok(set
                    .into_snapshots()
                    .into_iter()
                    .map(|s| {
                        if &s.ticker == ticker {
                            apply_market_cap(s, cap.market_cap)
                        } else {
                            s
                        }
                    })
                    .collect())
            })
            .await?;

        let updated = set
            .get(ticker)
            .cloned()
            .ok_or_else(|| TrackerError::UnknownTicker(ticker.clone()))?;
        self.publish(set);
        Ok(updated)
    }

    /// Daily closes over the configured history window, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::MarketData`] on fetch or decode failure.
    pub async fn price_history(&self, ticker: &Ticker) -> Result<Vec<PricePoint>, TrackerError> {
        let to = self.clock.today();
        let from = to
            .checked_sub_days(Days::new(self.settings.history_days))
            .unwrap_or(to);
        let series = self.market.history_bars(ticker, from, to).await?;
        Ok(price_history(&series))
    }

    fn publish(&self, set: PersistedStockSet) -> Vec<DailySnapshot> {
        let snapshots = set.into_snapshots();
        self.updates.send_replace(snapshots.clone());
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use tokio::sync::Notify;

    use super::*;
    use crate::application::ports::{FixedClock, MarketCap, MockMarketDataPort, ResponseKind};
    use crate::domain::{Bar, BarSeries, STORE_KEY, SearchPage};
    use crate::infrastructure::persistence::InMemoryBlobStore;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bar(close: f64, timestamp: i64) -> Bar {
        Bar {
            volume: 100,
            close,
            high: close,
            low: close,
            timestamp,
        }
    }

    fn bars(ticker: &str, closes: &[(f64, i64)]) -> TickerBars {
        TickerBars {
            ticker: Ticker::new(ticker),
            result: Ok(BarSeries {
                ticker: Ticker::new(ticker),
                bars: closes.iter().map(|&(c, t)| bar(c, t)).collect(),
            }),
        }
    }

    fn snap(ticker: &str, close: f64, as_of: i64) -> DailySnapshot {
        DailySnapshot {
            ticker: Ticker::new(ticker),
            close_price: close,
            daily_change: 0.0,
            as_of,
            market_cap: None,
        }
    }

    // 2024-03-04 is a Monday, so the effective date is Friday 2024-03-01.
    fn tracker(market: MockMarketDataPort, store: Arc<InMemoryBlobStore>) -> TrackerService {
        TrackerService::new(Arc::new(market), store, TrackerSettings::default())
            .with_clock(Arc::new(FixedClock(day(2024, 3, 4))))
    }

    async fn seed(store: &InMemoryBlobStore, snapshots: Vec<DailySnapshot>) {
        let bytes = PersistedStockSet::new(snapshots).to_bytes().unwrap();
        store.put(STORE_KEY, bytes).await.unwrap();
    }

    #[tokio::test]
    async fn refresh_merges_reduced_snapshots() {
        let store = Arc::new(InMemoryBlobStore::new());
        seed(&store, vec![snap("AAPL", 100.0, 1), snap("MSFT", 0.0, 0)]).await;

        let mut market = MockMarketDataPort::new();
        market
            .expect_snapshot_bars()
            .withf(|tickers, window| {
                tickers.len() == 2
                    && window.resolution == BarResolution::Intraday
                    && window.from == NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
                    && window.to == window.from
            })
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    bars("AAPL", &[(129.85, 2_000), (129.76, 1_000)]),
                    bars("MSFT", &[(410.0, 2_000)]),
                ])
            });

        let service = tracker(market, store.clone());
        let report = service
            .fetch_and_refresh(&[Ticker::new("AAPL"), Ticker::new("MSFT")])
            .await
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.refreshed, 2);
        let aapl = report.snapshots.iter().find(|s| s.ticker.as_str() == "AAPL").unwrap();
        assert_eq!(aapl.close_price, 129.85);
        assert_eq!(aapl.daily_change, 0.09);
        assert_eq!(aapl.as_of, 2_000);
        let msft = report.snapshots.iter().find(|s| s.ticker.as_str() == "MSFT").unwrap();
        assert!(msft.is_placeholder());

        let persisted = service.load_cached().await.unwrap();
        assert_eq!(persisted.len(), 2);
    }

    #[tokio::test]
    async fn decode_failure_is_reported_and_cache_kept() {
        let store = Arc::new(InMemoryBlobStore::new());
        seed(&store, vec![snap("AAPL", 100.0, 500), snap("TSLA", 1.0, 1)]).await;

        let mut market = MockMarketDataPort::new();
        market.expect_snapshot_bars().returning(|_, _| {
            Ok(vec![
                TickerBars {
                    ticker: Ticker::new("AAPL"),
                    result: Err(MarketDataError::Decode {
                        kind: ResponseKind::BarSeries,
                        message: "missing field `c`".to_string(),
                    }),
                },
                bars("TSLA", &[(200.0, 9_000), (190.0, 8_000)]),
            ])
        });

        let service = tracker(market, store);
        let report = service
            .fetch_and_refresh(&[Ticker::new("AAPL"), Ticker::new("TSLA")])
            .await
            .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ticker.as_str(), "AAPL");
        let aapl = report.snapshots.iter().find(|s| s.ticker.as_str() == "AAPL").unwrap();
        assert_eq!(aapl.close_price, 100.0);
        assert_eq!(aapl.as_of, 500);
        let tsla = report.snapshots.iter().find(|s| s.ticker.as_str() == "TSLA").unwrap();
        assert_eq!(tsla.daily_change, 10.0);
    }

    #[tokio::test]
    async fn batch_failure_leaves_cache_untouched() {
        let store = Arc::new(InMemoryBlobStore::new());
        seed(&store, vec![snap("AAPL", 100.0, 500)]).await;
        let before = store.get(STORE_KEY).await.unwrap();

        let mut market = MockMarketDataPort::new();
        market
            .expect_snapshot_bars()
            .returning(|_, _| Err(MarketDataError::RateLimited));

        let service = tracker(market, store.clone());
        let updates = service.subscribe();
        let err = service
            .fetch_and_refresh(&[Ticker::new("AAPL")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TrackerError::MarketData(MarketDataError::RateLimited)
        ));
        assert_eq!(store.get(STORE_KEY).await.unwrap(), before);
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn refresh_watchlist_uses_cached_tickers() {
        let store = Arc::new(InMemoryBlobStore::new());
        seed(&store, vec![snap("AAPL", 1.0, 1), snap("MSFT", 1.0, 1)]).await;

        let mut market = MockMarketDataPort::new();
        market
            .expect_snapshot_bars()
            .withf(|tickers, _| tickers.iter().map(Ticker::as_str).eq(["AAPL", "MSFT"]))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let report = tracker(market, store).refresh_watchlist().await.unwrap();
        assert_eq!(report.snapshots.len(), 2);
    }

    #[tokio::test]
    async fn empty_watchlist_skips_network() {
        let mut market = MockMarketDataPort::new();
        market.expect_snapshot_bars().times(0);

        let report = tracker(market, Arc::new(InMemoryBlobStore::new()))
            .refresh_watchlist()
            .await
            .unwrap();
        assert!(report.snapshots.is_empty());
    }

    #[tokio::test]
    async fn daily_resolution_window() {
        let settings = TrackerSettings {
            resolution: BarResolution::Daily,
            ..TrackerSettings::default()
        };
        let service = TrackerService::new(
            Arc::new(MockMarketDataPort::new()),
            Arc::new(InMemoryBlobStore::new()),
            settings,
        )
        .with_clock(Arc::new(FixedClock(day(2024, 3, 6))));

        let window = service.snapshot_window();
        assert_eq!(window.to, day(2024, 3, 5));
        assert_eq!(window.from, day(2024, 2, 27));
    }

    #[tokio::test]
    async fn injected_calendar_drives_window() {
        let service = tracker(MockMarketDataPort::new(), Arc::new(InMemoryBlobStore::new()))
            .with_calendar(Arc::new(|d: NaiveDate| d));
        assert_eq!(service.effective_date(), day(2024, 3, 4));
    }

    #[tokio::test]
    async fn add_ticker_inserts_placeholder_once() {
        let store = Arc::new(InMemoryBlobStore::new());
        seed(&store, vec![snap("AAPL", 100.0, 500)]).await;
        let service = tracker(MockMarketDataPort::new(), store);

        let set = service.add_ticker(Ticker::new("nvda")).await.unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.iter().any(|s| s.ticker.as_str() == "NVDA" && s.is_placeholder()));

        let set = service.add_ticker(Ticker::new("AAPL")).await.unwrap();
        let aapl = set.iter().find(|s| s.ticker.as_str() == "AAPL").unwrap();
        assert_eq!(aapl.as_of, 500);
    }

    #[tokio::test]
    async fn add_ticker_rejects_invalid_symbol() {
        let service = tracker(MockMarketDataPort::new(), Arc::new(InMemoryBlobStore::new()));
        let err = service.add_ticker(Ticker::new("NOT VALID")).await.unwrap_err();
        assert!(matches!(err, TrackerError::InvalidTicker(_)));
    }

    #[tokio::test]
    async fn remove_tickers_replaces_set() {
        let store = Arc::new(InMemoryBlobStore::new());
        seed(
            &store,
            vec![snap("AAPL", 1.0, 1), snap("MSFT", 1.0, 1), snap("TSLA", 1.0, 1)],
        )
        .await;
        let service = tracker(MockMarketDataPort::new(), store);
        let mut updates = service.subscribe();

        let set = service
            .remove_tickers(&[Ticker::new("MSFT"), Ticker::new("ZZZ")])
            .await
            .unwrap();

        let tickers: Vec<&str> = set.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAPL", "TSLA"]);
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().len(), 2);
    }

    #[tokio::test]
    async fn market_cap_for_untracked_ticker_skips_network() {
        let mut market = MockMarketDataPort::new();
        market.expect_market_cap().times(0);
        let service = tracker(market, Arc::new(InMemoryBlobStore::new()));

        let err = service
            .refresh_market_cap(&Ticker::new("AAPL"))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::UnknownTicker(_)));
    }

    #[tokio::test]
    async fn market_cap_keeps_price_fields() {
        let store = Arc::new(InMemoryBlobStore::new());
        seed(&store, vec![snap("AAPL", 129.85, 2_000)]).await;

        let mut market = MockMarketDataPort::new();
        market
            .expect_market_cap()
            .with(eq(Ticker::new("AAPL")), eq(day(2024, 3, 1)))
            .times(1)
            .returning(|t, _| {
                Ok(MarketCap {
                    ticker: t.clone(),
                    market_cap: 2.7e12,
                })
            });

        let service = tracker(market, store);
        let updated = service
            .refresh_market_cap(&Ticker::new("AAPL"))
            .await
            .unwrap();

        assert_eq!(updated.market_cap, Some(2.7e12));
        assert_eq!(updated.close_price, 129.85);
        assert_eq!(updated.as_of, 2_000);

        let cached = service.load_cached().await.unwrap();
        assert_eq!(cached[0].market_cap, Some(2.7e12));
    }

    #[tokio::test]
    async fn price_history_requests_window_ending_today() {
        let mut market = MockMarketDataPort::new();
        market
            .expect_history_bars()
            .with(eq(Ticker::new("AAPL")), eq(day(2024, 2, 18)), eq(day(2024, 3, 4)))
            .times(1)
            .returning(|t, _, _| {
                Ok(BarSeries {
                    ticker: t.clone(),
                    bars: vec![bar(2.0, 1_709_510_400_000), bar(1.0, 1_709_251_200_000)],
                })
            });

        let points = tracker(market, Arc::new(InMemoryBlobStore::new()))
            .price_history(&Ticker::new("AAPL"))
            .await
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, day(2024, 3, 1));
        assert_eq!(points[1].date, day(2024, 3, 4));
    }

    #[tokio::test]
    async fn load_cached_publishes() {
        let store = Arc::new(InMemoryBlobStore::new());
        seed(&store, vec![snap("AAPL", 1.0, 1)]).await;
        let service = tracker(MockMarketDataPort::new(), store);
        let updates = service.subscribe();

        service.load_cached().await.unwrap();

        assert_eq!(updates.borrow().len(), 1);
    }

    /// Holds `snapshot_bars` until released.
    struct GatedMarket {
        entered: Notify,
        release: Notify,
        response: Vec<(&'static str, f64, i64)>,
    }

    #[async_trait]
    impl MarketDataPort for GatedMarket {
        async fn snapshot_bars(
            &self,
            _tickers: &[Ticker],
            _window: BarWindow,
        ) -> Result<Vec<TickerBars>, MarketDataError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(self
                .response
                .iter()
                .map(|&(t, close, as_of)| bars(t, &[(close, as_of), (close - 1.0, as_of - 1)]))
                .collect())
        }

        async fn history_bars(
            &self,
            _ticker: &Ticker,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<BarSeries, MarketDataError> {
            Err(MarketDataError::Timeout)
        }

        async fn market_cap(
            &self,
            _ticker: &Ticker,
            _as_of: NaiveDate,
        ) -> Result<MarketCap, MarketDataError> {
            Err(MarketDataError::Timeout)
        }

        async fn search(&self, _term: &str) -> Result<SearchPage, MarketDataError> {
            Err(MarketDataError::Timeout)
        }
    }

    #[tokio::test]
    async fn removal_during_refresh_is_not_undone() {
        let store = Arc::new(InMemoryBlobStore::new());
        seed(&store, vec![snap("AAPL", 1.0, 1), snap("MSFT", 1.0, 1)]).await;
        let market = Arc::new(GatedMarket {
            entered: Notify::new(),
            release: Notify::new(),
            response: vec![("AAPL", 10.0, 2_000), ("MSFT", 20.0, 2_000)],
        });
        let service = Arc::new(
            TrackerService::new(market.clone(), store, TrackerSettings::default())
                .with_clock(Arc::new(FixedClock(day(2024, 3, 4)))),
        );

        let refreshing = {
            let service = service.clone();
            tokio::spawn(async move { service.refresh_watchlist().await })
        };
        market.entered.notified().await;

        let after_remove = service.remove_tickers(&[Ticker::new("MSFT")]).await.unwrap();
        assert_eq!(after_remove.len(), 1);

        market.release.notify_one();
        let report = refreshing.await.unwrap().unwrap();

        let tickers: Vec<&str> = report.snapshots.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAPL"]);
        assert_eq!(report.refreshed, 1);
        assert_eq!(report.snapshots[0].close_price, 10.0);

        let cached = service.load_cached().await.unwrap();
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn refresh_of_untracked_ticker_adds_nothing() {
        let mut market = MockMarketDataPort::new();
        market
            .expect_snapshot_bars()
            .returning(|_, _| Ok(vec![bars("NVDA", &[(900.0, 2_000), (890.0, 1_000)])]));

        let report = tracker(market, Arc::new(InMemoryBlobStore::new()))
            .fetch_and_refresh(&[Ticker::new("NVDA")])
            .await
            .unwrap();

        assert!(report.snapshots.is_empty());
        assert_eq!(report.refreshed, 0);
    }

    #[tokio::test]
    async fn refresh_keeps_cached_market_cap() {
        let store = Arc::new(InMemoryBlobStore::new());
        let mut cached = snap("AAPL", 129.85, 2_000);
        cached.market_cap = Some(2.7e12);
        seed(&store, vec![cached]).await;

        let mut market = MockMarketDataPort::new();
        market
            .expect_snapshot_bars()
            .returning(|_, _| Ok(vec![bars("AAPL", &[(130.0, 2_000), (129.0, 1_000)])]));

        let report = tracker(market, store)
            .fetch_and_refresh(&[Ticker::new("AAPL")])
            .await
            .unwrap();

        assert_eq!(report.snapshots[0].close_price, 130.0);
        assert_eq!(report.snapshots[0].market_cap, Some(2.7e12));
    }
}
