//! Mapping from a finished run onto the ledger entry and user status.

use super::{
    ProjectionError, SuspensionRecord, SuspensionRecordId, SuspensionRun, UserRecord, UserStatus,
};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Decides whether a run marks its user as suspended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendPolicy {
    /// Every executed run suspends the user, even one that completed no
    /// task.
    #[default]
    Always,
    /// Only runs with at least one completed task suspend the user.
    RequireCompletedTask,
}

impl SuspendPolicy {
    /// Returns whether `run` marks its user as suspended.
    #[must_use]
    pub fn suspends(self, run: &SuspensionRun) -> bool {
        match self {
            Self::Always => true,
            Self::RequireCompletedTask => !run.completed_task_labels().is_empty(),
        }
    }

    /// Returns whether the run behind `record` marked its user as suspended.
    #[must_use]
    pub fn suspends_record(self, record: &SuspensionRecord) -> bool {
        match self {
            Self::Always => true,
            Self::RequireCompletedTask => !record.actions().is_empty(),
        }
    }
}

/// Ledger entry and updated user derived from one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Entry to prepend to the ledger.
    pub entry: SuspensionRecord,
    /// User record carrying the new status.
    pub updated_user: UserRecord,
}

/// Projects a finished run onto a new ledger entry and user record.
///
/// The entry identifier is derived from the current clock time and kept
/// strictly after `ledger_head`. The entry timestamp is the run's finish
/// time.
///
/// # Errors
///
/// Returns [`ProjectionError::UserMismatch`] when `run` was executed for a
/// different user than `prior_user`.
pub fn project(
    prior_user: &UserRecord,
    ledger_head: Option<&SuspensionRecord>,
    run: &SuspensionRun,
    policy: SuspendPolicy,
    clock: &impl Clock,
) -> Result<Projection, ProjectionError> {
    if run.user_id() != prior_user.id() {
        return Err(ProjectionError::UserMismatch {
            run_user: run.user_id().clone(),
            record_user: prior_user.id().clone(),
        });
    }

    let id = SuspensionRecordId::derive(clock.utc(), ledger_head.map(SuspensionRecord::id));
    let entry = SuspensionRecord::new(
        id,
        run.user_id().clone(),
        prior_user.name(),
        run.finished_at(),
        run.completed_task_labels().to_vec(),
    );
    let updated_user = if policy.suspends(run) {
        prior_user.with_status(UserStatus::Suspended)
    } else {
        prior_user.clone()
    };

    Ok(Projection {
        entry,
        updated_user,
    })
}
