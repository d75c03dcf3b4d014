//! Blob Store Port (Driven Port)
//!
//! Opaque key to bytes storage. The tracker needs exactly `put` and `get`.

use async_trait::async_trait;

/// Blob store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BlobStoreError {
    /// Underlying I/O failed.
    #[error("blob store I/O error on '{key}': {message}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Error details.
        message: String,
    },

    /// The store cannot hold a blob under this key.
    #[error("invalid blob key '{0}'")]
    InvalidKey(String),
}

/// Key-value byte storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous value.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError>;

    /// Fetch the bytes under `key`, or `None` if never written.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobStoreError>;
}
