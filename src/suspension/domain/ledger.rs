//! Bounded, newest-first suspension history and its storage format.

use super::{SuspendPolicy, SuspensionRecord, UserId, UserRecord, UserStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of records retained by the ledger.
pub const LEDGER_CAPACITY: usize = 10;

/// Version tag written with every stored ledger.
pub const LEDGER_FORMAT_VERSION: u32 = 1;

/// Error returned when a stored ledger cannot be decoded.
#[derive(Debug, Error)]
pub enum LedgerCodecError {
    /// The stored value is not a recognised ledger document.
    #[error("malformed ledger document: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct LedgerDocumentRef<'a> {
    version: u32,
    records: &'a [SuspensionRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLedger {
    Versioned {
        #[serde(rename = "version")]
        _version: u32,
        records: Vec<SuspensionRecord>,
    },
    Unversioned(Vec<SuspensionRecord>),
}

/// Ordered history of completed runs, newest first, holding at most
/// [`LEDGER_CAPACITY`] records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuspensionLedger {
    records: Vec<SuspensionRecord>,
}

impl SuspensionLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Rebuilds a ledger from records already ordered newest first.
    ///
    /// Records beyond the capacity are dropped from the old end.
    #[must_use]
    pub fn from_records(mut records: Vec<SuspensionRecord>) -> Self {
        records.truncate(LEDGER_CAPACITY);
        Self { records }
    }

    /// Prepends `entry`, evicting the oldest record once over capacity.
    pub fn record(&mut self, entry: SuspensionRecord) {
        self.records.insert(0, entry);
        self.records.truncate(LEDGER_CAPACITY);
    }

    /// Returns the records, newest first.
    #[must_use]
    pub fn list(&self) -> &[SuspensionRecord] {
        &self.records
    }

    /// Returns the newest record.
    #[must_use]
    pub fn head(&self) -> Option<&SuspensionRecord> {
        self.records.first()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the newest record for `user_id`.
    #[must_use]
    pub fn latest_for(&self, user_id: &UserId) -> Option<&SuspensionRecord> {
        self.records
            .iter()
            .find(|record| record.user_id() == user_id)
    }

    /// Returns the status to display for `user`.
    ///
    /// A user with a retained entry that `policy` treats as suspending is
    /// shown as suspended even when the directory copy has not caught up yet.
    #[must_use]
    pub fn displayed_status(&self, user: &UserRecord, policy: SuspendPolicy) -> UserStatus {
        let suspended = self
            .records
            .iter()
            .any(|record| record.user_id() == user.id() && policy.suspends_record(record));
        if suspended {
            UserStatus::Suspended
        } else {
            user.status()
        }
    }

    /// Serializes the ledger as a versioned JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerCodecError::Malformed`] if serialization fails.
    pub fn encode(&self) -> Result<String, LedgerCodecError> {
        let document = LedgerDocumentRef {
            version: LEDGER_FORMAT_VERSION,
            records: &self.records,
        };
        Ok(serde_json::to_string(&document)?)
    }

    /// Parses a stored ledger.
    ///
    /// Accepts both the versioned document and a bare array of records.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerCodecError::Malformed`] when `raw` is neither.
    pub fn decode(raw: &str) -> Result<Self, LedgerCodecError> {
        let records = match serde_json::from_str::<StoredLedger>(raw)? {
            StoredLedger::Versioned { records, .. } | StoredLedger::Unversioned(records) => {
                records
            }
        };
        Ok(Self::from_records(records))
    }
}
