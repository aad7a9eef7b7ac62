//! Durable key-value storage port for the suspension ledger.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for ledger store operations.
pub type LedgerStoreResult<T> = Result<T, LedgerStoreError>;

/// Key-value storage holding serialized ledgers.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Loads the value stored under `key`.
    ///
    /// Returns `None` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError`] when the backing store cannot be read.
    async fn load(&self, key: &str) -> LedgerStoreResult<Option<String>>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError`] when the backing store cannot be written.
    async fn save(&self, key: &str, value: &str) -> LedgerStoreResult<()>;
}

/// Errors returned by ledger store implementations.
#[derive(Debug, Clone, Error)]
pub enum LedgerStoreError {
    /// The storage key cannot be used by this store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LedgerStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
