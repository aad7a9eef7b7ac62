//! In-memory ledger store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::suspension::ports::{LedgerStore, LedgerStoreError, LedgerStoreResult};

/// Thread-safe in-memory key-value ledger store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `value` under `key`.
    #[must_use]
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let values = HashMap::from([(key.into(), value.into())]);
        Self {
            values: Arc::new(RwLock::new(values)),
        }
    }

    /// Returns the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::Persistence`] when the lock is poisoned.
    pub fn raw(&self, key: &str) -> LedgerStoreResult<Option<String>> {
        let values = self.values.read().map_err(|err| {
            LedgerStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(values.get(key).cloned())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn load(&self, key: &str) -> LedgerStoreResult<Option<String>> {
        self.raw(key)
    }

    async fn save(&self, key: &str, value: &str) -> LedgerStoreResult<()> {
        let mut values = self.values.write().map_err(|err| {
            LedgerStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
