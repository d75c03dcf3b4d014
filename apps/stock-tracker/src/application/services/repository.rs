//! Single-writer access to the persisted watchlist.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::TrackerError;
use crate::application::ports::BlobStore;
use crate::domain::merge::{merge, replace};
use crate::domain::{DailySnapshot, PersistedStockSet, STORE_KEY};

/// Serializes every read-modify-write of the cached set.
///
/// Each operation holds the lock from its read through its write, so a
/// refresh merge and a concurrent add or remove cannot lose each other's
/// updates.
pub struct SnapshotRepository {
    store: Arc<dyn BlobStore>,
    key: String,
    lock: Mutex<()>,
}

impl std::fmt::Debug for SnapshotRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotRepository")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SnapshotRepository {
    /// Repository over `store` using the well-known key.
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_key(store, STORE_KEY)
    }

    /// Repository over `store` using a custom key.
    #[must_use]
    pub fn with_key(store: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    /// Current persisted set. Never-written stores yield an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Store`] or [`TrackerError::CorruptCache`].
    pub async fn load(&self) -> Result<PersistedStockSet, TrackerError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Merge `incoming` into the persisted set and write it back.
    ///
    /// # Errors
    ///
    /// Returns any read, decode, encode or write failure. Nothing is written
    /// unless the read succeeded.
    pub async fn merge_in(
        &self,
        incoming: Vec<DailySnapshot>,
    ) -> Result<PersistedStockSet, TrackerError> {
        let _guard = self.lock.lock().await;
        let existing = self.read().await?;
        let merged = PersistedStockSet::new(merge(incoming, existing.into_snapshots()));
        self.write(&merged).await?;
        Ok(merged)
    }

    /// Overwrite the persisted set unconditionally.
    ///
    /// # Errors
    ///
    /// Returns any encode or write failure.
    pub async fn replace(
        &self,
        snapshots: Vec<DailySnapshot>,
    ) -> Result<PersistedStockSet, TrackerError> {
        let _guard = self.lock.lock().await;
        let set = PersistedStockSet::new(replace(snapshots));
        self.write(&set).await?;
        Ok(set)
    }

    /// Read, transform and replace under one lock.
    ///
    /// # Errors
    ///
    /// Returns the read failure, the error produced by `f`, or the write
    /// failure. When `f` fails nothing is written.
    pub async fn update<F>(&self, f: F) -> Result<PersistedStockSet, TrackerError>
    where
        F: FnOnce(PersistedStockSet) -> Result<Vec<DailySnapshot>, TrackerError> + Send,
    {
        let _guard = self.lock.lock().await;
        let existing = self.read().await?;
        let set = PersistedStockSet::new(replace(f(existing)?));
        self.write(&set).await?;
        Ok(set)
    }

    async fn read(&self) -> Result<PersistedStockSet, TrackerError> {
        match self.store.get(&self.key).await? {
            None => Ok(PersistedStockSet::default()),
            Some(bytes) => PersistedStockSet::from_bytes(&bytes).map_err(|e| {
                tracing::error!(key = %self.key, error = %e, "Cached watchlist failed to decode");
                TrackerError::CorruptCache(e.to_string())
            }),
        }
    }

    async fn write(&self, set: &PersistedStockSet) -> Result<(), TrackerError> {
        let bytes = set
            .to_bytes()
            .map_err(|e| TrackerError::Encoding(e.to_string()))?;
        self.store.put(&self.key, bytes).await?;
        tracing::debug!(key = %self.key, tickers = set.len(), "Watchlist persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::application::ports::BlobStoreError;
    use crate::domain::Ticker;
    use crate::infrastructure::persistence::InMemoryBlobStore;

    fn snap(ticker: &str, as_of: i64) -> DailySnapshot {
        DailySnapshot {
            ticker: Ticker::new(ticker),
            close_price: 1.0,
            daily_change: 0.0,
            as_of,
            market_cap: None,
        }
    }

    /// Yields between read and write so unserialized access would interleave.
    #[derive(Default)]
    struct SlowStore {
        inner: InMemoryBlobStore,
    }

    #[async_trait]
    impl BlobStore for SlowStore {
        async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError> {
            tokio::time::sleep(Duration::from_millis(1)).await;
            self.inner.put(key, bytes).await
        }

        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobStoreError> {
            let value = self.inner.get(key).await;
            tokio::time::sleep(Duration::from_millis(1)).await;
            value
        }
    }

    #[tokio::test]
    async fn empty_store_loads_empty_set() {
        let repo = SnapshotRepository::new(Arc::new(InMemoryBlobStore::new()));
        assert!(repo.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn merge_in_persists_under_well_known_key() {
        let store = Arc::new(InMemoryBlobStore::new());
        let repo = SnapshotRepository::new(store.clone());

        repo.merge_in(vec![snap("AAPL", 5)]).await.unwrap();

        let raw = store.get(STORE_KEY).await.unwrap().unwrap();
        let set = PersistedStockSet::from_bytes(&raw).unwrap();
        assert_eq!(set.get(&Ticker::new("AAPL")).unwrap().as_of, 5);
    }

    #[tokio::test]
    async fn merge_in_keeps_newest() {
        let repo = SnapshotRepository::new(Arc::new(InMemoryBlobStore::new()));
        repo.merge_in(vec![snap("AAPL", 10)]).await.unwrap();
        let set = repo.merge_in(vec![snap("AAPL", 3)]).await.unwrap();
        assert_eq!(set.get(&Ticker::new("AAPL")).unwrap().as_of, 10);
    }

    #[tokio::test]
    async fn replace_overwrites() {
        let repo = SnapshotRepository::new(Arc::new(InMemoryBlobStore::new()));
        repo.merge_in(vec![snap("AAPL", 10), snap("MSFT", 10)])
            .await
            .unwrap();
        let set = repo.replace(vec![snap("MSFT", 1)]).await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(repo.load().await.unwrap().tickers(), vec![Ticker::new("MSFT")]);
    }

    #[tokio::test]
    async fn failed_update_writes_nothing() {
        let repo = SnapshotRepository::new(Arc::new(InMemoryBlobStore::new()));
        repo.merge_in(vec![snap("AAPL", 10)]).await.unwrap();

        let err = repo
            .update(|_| Err(TrackerError::UnknownTicker(Ticker::new("ZZZ"))))
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::UnknownTicker(_)));
        assert_eq!(repo.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_blob_is_reported() {
        let store = Arc::new(InMemoryBlobStore::new());
        store.put(STORE_KEY, b"not json".to_vec()).await.unwrap();
        let repo = SnapshotRepository::new(store);

        let err = repo.load().await.unwrap_err();
        assert!(matches!(err, TrackerError::CorruptCache(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_merges_lose_nothing() {
        let repo = Arc::new(SnapshotRepository::new(Arc::new(SlowStore::default())));

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.merge_in(vec![snap(&format!("T{i}"), 1)]).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(repo.load().await.unwrap().len(), 20);
    }
}
