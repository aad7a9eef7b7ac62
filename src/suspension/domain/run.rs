//! Output of one engine execution.

use super::{RunId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result reported for a visited task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task action succeeded.
    Succeeded,
    /// The task action failed with a reason.
    Failed(String),
}

/// Policy applied when a task fails mid-run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep visiting the remaining planned tasks.
    #[default]
    Continue,
    /// Skip every task that has not been visited yet.
    Halt,
}

/// A task that ended in failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedTask {
    /// Display label of the task.
    pub label: String,
    /// Reason reported by the executor.
    pub reason: String,
}

/// Transient summary of one completed execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspensionRun {
    run_id: RunId,
    user_id: UserId,
    completed_task_labels: Vec<String>,
    failed_tasks: Vec<FailedTask>,
    skipped_task_labels: Vec<String>,
    cancelled: bool,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

/// Parameter object for assembling a run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspensionRunData {
    /// Run correlation identifier.
    pub run_id: RunId,
    /// User the run was executed for.
    pub user_id: UserId,
    /// Labels of tasks completed during the run, in execution order.
    pub completed_task_labels: Vec<String>,
    /// Tasks that failed during the run, in execution order.
    pub failed_tasks: Vec<FailedTask>,
    /// Labels of planned tasks that were skipped.
    pub skipped_task_labels: Vec<String>,
    /// Whether the run was cancelled by the operator.
    pub cancelled: bool,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl SuspensionRun {
    /// Assembles a run summary.
    #[must_use]
    pub fn new(data: SuspensionRunData) -> Self {
        Self {
            run_id: data.run_id,
            user_id: data.user_id,
            completed_task_labels: data.completed_task_labels,
            failed_tasks: data.failed_tasks,
            skipped_task_labels: data.skipped_task_labels,
            cancelled: data.cancelled,
            started_at: data.started_at,
            finished_at: data.finished_at,
        }
    }

    /// Returns the run correlation identifier.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the user the run was executed for.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns labels of completed tasks, directory group first.
    #[must_use]
    pub fn completed_task_labels(&self) -> &[String] {
        &self.completed_task_labels
    }

    /// Returns tasks that failed.
    #[must_use]
    pub fn failed_tasks(&self) -> &[FailedTask] {
        &self.failed_tasks
    }

    /// Returns labels of skipped tasks.
    #[must_use]
    pub fn skipped_task_labels(&self) -> &[String] {
        &self.skipped_task_labels
    }

    /// Returns whether the run was cancelled.
    #[must_use]
    pub const fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns when the run started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when the run finished.
    #[must_use]
    pub const fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }
}
