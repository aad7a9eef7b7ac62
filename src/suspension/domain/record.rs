//! Persisted ledger entry describing one completed run.

use super::{SuspensionRecordId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable history entry for a completed suspension run.
///
/// Field names on the wire are `id`, `userId`, `name`, `timestamp` and
/// `actions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionRecord {
    id: SuspensionRecordId,
    user_id: UserId,
    #[serde(rename = "name")]
    user_display_name: String,
    timestamp: DateTime<Utc>,
    actions: Vec<String>,
}

impl SuspensionRecord {
    /// Creates a ledger entry.
    #[must_use]
    pub fn new(
        id: SuspensionRecordId,
        user_id: UserId,
        user_display_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        actions: Vec<String>,
    ) -> Self {
        Self {
            id,
            user_id,
            user_display_name: user_display_name.into(),
            timestamp,
            actions,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> &SuspensionRecordId {
        &self.id
    }

    /// Returns the suspended user's identifier.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the user's display name at the time of the run.
    #[must_use]
    pub fn user_display_name(&self) -> &str {
        &self.user_display_name
    }

    /// Returns when the run finished.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the labels of the actions performed.
    #[must_use]
    pub fn actions(&self) -> &[String] {
        &self.actions
    }
}
