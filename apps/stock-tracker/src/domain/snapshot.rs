//! Daily snapshot model and the persisted watchlist set.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::ticker::Ticker;

/// Blob store key under which the watchlist set is persisted.
pub const STORE_KEY: &str = "StoredStockValues";

/// Reduced daily summary for one ticker.
///
/// Equality and hashing consider `ticker` only, so two snapshots of the same
/// ticker are duplicates regardless of their values. Compare fields directly
/// when full structural equality matters.
///
/// The serialized field names (`daily`, `dailyChange`, `date`, `marketCap`)
/// are the persisted format and must stay stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySnapshot {
    /// Ticker this snapshot describes.
    pub ticker: Ticker,
    /// Latest close price.
    #[serde(rename = "daily")]
    pub close_price: f64,
    /// Latest close minus prior close, rounded to three decimals.
    #[serde(rename = "dailyChange")]
    pub daily_change: f64,
    /// Timestamp of the latest bar in epoch milliseconds. Zero means unpopulated.
    #[serde(rename = "date")]
    pub as_of: i64,
    /// Market capitalization, when a reference fetch has supplied one.
    #[serde(
        rename = "marketCap",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub market_cap: Option<f64>,
}

impl DailySnapshot {
    /// Snapshot signalling "no usable data yet" (0/0/0).
    #[must_use]
    pub const fn placeholder(ticker: Ticker) -> Self {
        Self {
            ticker,
            close_price: 0.0,
            daily_change: 0.0,
            as_of: 0,
            market_cap: None,
        }
    }

    /// Whether this snapshot carries no fetched data.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.as_of == 0
    }
}

impl PartialEq for DailySnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.ticker == other.ticker
    }
}

impl Eq for DailySnapshot {}

impl Hash for DailySnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ticker.hash(state);
    }
}

/// Full set of cached snapshots, one per ticker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedStockSet {
    snapshots: Vec<DailySnapshot>,
}

impl PersistedStockSet {
    /// Wrap an already de-duplicated sequence of snapshots.
    #[must_use]
    pub const fn new(snapshots: Vec<DailySnapshot>) -> Self {
        Self { snapshots }
    }

    /// Decode the stored bytes.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the bytes are not a snapshot array.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Encode for storage.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.snapshots)
    }

    /// Snapshots in stored order.
    #[must_use]
    pub fn snapshots(&self) -> &[DailySnapshot] {
        &self.snapshots
    }

    /// Consume into the inner sequence.
    #[must_use]
    pub fn into_snapshots(self) -> Vec<DailySnapshot> {
        self.snapshots
    }

    /// Look up the snapshot for a ticker.
    #[must_use]
    pub fn get(&self, ticker: &Ticker) -> Option<&DailySnapshot> {
        self.snapshots.iter().find(|s| &s.ticker == ticker)
    }

    /// Tickers present in the set.
    #[must_use]
    pub fn tickers(&self) -> Vec<Ticker> {
        self.snapshots.iter().map(|s| s.ticker.clone()).collect()
    }

    /// Number of tracked tickers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn snapshot(ticker: &str, close: f64, as_of: i64) -> DailySnapshot {
        DailySnapshot {
            ticker: Ticker::new(ticker),
            close_price: close,
            daily_change: 0.5,
            as_of,
            market_cap: None,
        }
    }

    #[test]
    fn equality_uses_ticker_only() {
        let a = snapshot("AAPL", 10.0, 1);
        let b = snapshot("AAPL", 20.0, 2);
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b, snapshot("MSFT", 1.0, 1)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn placeholder_is_zeroed() {
        let p = DailySnapshot::placeholder(Ticker::new("TSLA"));
        assert_eq!(p.close_price, 0.0);
        assert_eq!(p.daily_change, 0.0);
        assert_eq!(p.as_of, 0);
        assert!(p.is_placeholder());
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let json = serde_json::to_value(snapshot("AAPL", 129.85, 1_700_000_000_000)).unwrap();
        assert_eq!(json["ticker"], "AAPL");
        assert_eq!(json["daily"], 129.85);
        assert_eq!(json["dailyChange"], 0.5);
        assert_eq!(json["date"], 1_700_000_000_000_i64);
        assert!(json.get("marketCap").is_none());
    }

    #[test]
    fn decodes_entries_without_market_cap() {
        let bytes = br#"[{"ticker":"AAPL","daily":1.5,"dailyChange":-0.25,"date":42}]"#;
        let set = PersistedStockSet::from_bytes(bytes).unwrap();
        let aapl = set.get(&Ticker::new("AAPL")).unwrap();
        assert_eq!(aapl.close_price, 1.5);
        assert_eq!(aapl.daily_change, -0.25);
        assert_eq!(aapl.as_of, 42);
        assert_eq!(aapl.market_cap, None);
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let mut with_cap = snapshot("MSFT", 410.12, 1_700_000_000_000);
        with_cap.market_cap = Some(3.05e12);
        let set = PersistedStockSet::new(vec![snapshot("AAPL", 129.85, 7), with_cap]);

        let decoded = PersistedStockSet::from_bytes(&set.to_bytes().unwrap()).unwrap();

        assert_eq!(decoded.len(), set.len());
        for original in set.snapshots() {
            let restored = decoded.get(&original.ticker).unwrap();
            assert_eq!(restored.close_price, original.close_price);
            assert_eq!(restored.daily_change, original.daily_change);
            assert_eq!(restored.as_of, original.as_of);
            assert_eq!(restored.market_cap, original.market_cap);
        }
    }

    #[test]
    fn rejects_non_array_payload() {
        assert!(PersistedStockSet::from_bytes(b"{\"ticker\":\"AAPL\"}").is_err());
    }
}
