//! Service owning the process-wide suspension ledger.
//!
//! The ledger lives in memory and is mirrored to a [`LedgerStore`] on every
//! change. Loading never fails: a missing, unreadable, or malformed stored
//! value starts an empty ledger. Saving failures are reported to the caller
//! but never undo the in-memory change.

use crate::suspension::{
    domain::{
        LedgerCodecError, SuspendPolicy, SuspensionLedger, SuspensionRecord, UserRecord,
        UserStatus,
    },
    ports::{LedgerStore, LedgerStoreError},
};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Storage key used for the ledger unless configured otherwise.
pub const DEFAULT_LEDGER_KEY: &str = "recentSuspensions";

/// Errors returned while persisting the ledger.
#[derive(Debug, Error)]
pub enum SuspensionHistoryError {
    /// The ledger could not be encoded.
    #[error(transparent)]
    Codec(#[from] LedgerCodecError),
    /// The store rejected the write.
    #[error(transparent)]
    Store(#[from] LedgerStoreError),
}

/// Result type for history service operations.
pub type SuspensionHistoryResult<T> = Result<T, SuspensionHistoryError>;

/// What `init` found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerLoadOutcome {
    /// Nothing was stored under the key.
    Empty,
    /// A stored ledger with this many records was loaded.
    Loaded(usize),
    /// The stored value could not be used; an empty ledger was started.
    Recovered {
        /// Why the stored value was discarded.
        reason: String,
    },
}

/// Ledger lifecycle service: load, record, list, flush and reset.
pub struct SuspensionHistoryService<S>
where
    S: LedgerStore,
{
    store: Arc<S>,
    key: String,
    ledger: RwLock<SuspensionLedger>,
}

impl<S> SuspensionHistoryService<S>
where
    S: LedgerStore,
{
    /// Creates a service with an empty in-memory ledger.
    ///
    /// Call [`Self::init`] to load the stored ledger.
    #[must_use]
    pub fn new(store: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            ledger: RwLock::new(SuspensionLedger::new()),
        }
    }

    /// Returns the storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the stored ledger, replacing the in-memory one.
    pub async fn init(&self) -> LedgerLoadOutcome {
        let (ledger, outcome) = match self.store.load(&self.key).await {
            Ok(None) => (SuspensionLedger::new(), LedgerLoadOutcome::Empty),
            Ok(Some(raw)) => match SuspensionLedger::decode(&raw) {
                Ok(ledger) => {
                    let count = ledger.len();
                    (ledger, LedgerLoadOutcome::Loaded(count))
                }
                Err(err) => (
                    SuspensionLedger::new(),
                    LedgerLoadOutcome::Recovered {
                        reason: err.to_string(),
                    },
                ),
            },
            Err(err) => (
                SuspensionLedger::new(),
                LedgerLoadOutcome::Recovered {
                    reason: err.to_string(),
                },
            ),
        };

        match &outcome {
            LedgerLoadOutcome::Recovered { reason } => {
                warn!(key = %self.key, %reason, "discarding unusable suspension ledger");
            }
            LedgerLoadOutcome::Loaded(count) => {
                info!(key = %self.key, records = count, "loaded suspension ledger");
            }
            LedgerLoadOutcome::Empty => debug!(key = %self.key, "no stored suspension ledger"),
        }
        *self.write_ledger() = ledger;
        outcome
    }

    /// Prepends `entry` to the ledger and saves it.
    ///
    /// # Errors
    ///
    /// Returns [`SuspensionHistoryError`] when the ledger could not be
    /// saved. The entry stays recorded in memory either way.
    pub async fn record(&self, entry: SuspensionRecord) -> SuspensionHistoryResult<()> {
        let encoded = {
            let mut ledger = self.write_ledger();
            ledger.record(entry);
            ledger.encode()
        };
        self.save(encoded?).await
    }

    /// Returns a snapshot of the ledger, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<SuspensionRecord> {
        self.read_ledger().list().to_vec()
    }

    /// Returns the newest record.
    #[must_use]
    pub fn head(&self) -> Option<SuspensionRecord> {
        self.read_ledger().head().cloned()
    }

    /// Returns the status to display for `user` under `policy`.
    #[must_use]
    pub fn displayed_status(&self, user: &UserRecord, policy: SuspendPolicy) -> UserStatus {
        self.read_ledger().displayed_status(user, policy)
    }

    /// Writes the current ledger to the store.
    ///
    /// # Errors
    ///
    /// Returns [`SuspensionHistoryError`] when encoding or saving fails.
    pub async fn flush(&self) -> SuspensionHistoryResult<()> {
        let encoded = self.read_ledger().encode()?;
        self.save(encoded).await
    }

    /// Clears every record and saves the empty ledger.
    ///
    /// # Errors
    ///
    /// Returns [`SuspensionHistoryError`] when encoding or saving fails.
    pub async fn reset(&self) -> SuspensionHistoryResult<()> {
        let encoded = {
            let mut ledger = self.write_ledger();
            *ledger = SuspensionLedger::new();
            ledger.encode()
        };
        info!(key = %self.key, "suspension ledger reset");
        self.save(encoded?).await
    }

    async fn save(&self, encoded: String) -> SuspensionHistoryResult<()> {
        self.store.save(&self.key, &encoded).await?;
        debug!(key = %self.key, bytes = encoded.len(), "saved suspension ledger");
        Ok(())
    }

    fn read_ledger(&self) -> RwLockReadGuard<'_, SuspensionLedger> {
        self.ledger.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_ledger(&self) -> RwLockWriteGuard<'_, SuspensionLedger> {
        self.ledger.write().unwrap_or_else(PoisonError::into_inner)
    }
}
