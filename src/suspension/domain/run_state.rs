//! Per-task run state and its monotonic status machine.

use super::{ParseTaskStatusError, SuspensionDomainError, TaskDefinition, TaskKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of one task within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has not been visited.
    Idle,
    /// Task action is executing.
    InProgress,
    /// Task action finished successfully.
    Completed,
    /// Task action reported a failure.
    Failed,
    /// Task was planned but never visited because the run halted.
    Skipped,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Returns whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    /// Returns whether transition to `target` is allowed.
    ///
    /// Statuses only move forward: `Idle` to `InProgress` or `Skipped`, and
    /// `InProgress` to `Completed` or `Failed`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Idle, Self::InProgress | Self::Skipped)
                | (Self::InProgress, Self::Completed | Self::Failed)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "idle" => Ok(Self::Idle),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "skipped" => Ok(Self::Skipped),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Mutable state of one catalogue task for the active user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRunState {
    definition: TaskDefinition,
    selected: bool,
    status: TaskStatus,
    failure_reason: Option<String>,
}

impl TaskRunState {
    /// Creates an idle, unselected state for `definition`.
    #[must_use]
    pub const fn idle(definition: TaskDefinition) -> Self {
        Self {
            definition,
            selected: false,
            status: TaskStatus::Idle,
            failure_reason: None,
        }
    }

    /// Returns the task definition.
    #[must_use]
    pub const fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    /// Returns the task key.
    #[must_use]
    pub const fn key(&self) -> &TaskKey {
        self.definition.key()
    }

    /// Returns whether the task is selected.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the failure reason for failed tasks.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns whether the task is selected and has not been visited.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.selected && matches!(self.status, TaskStatus::Idle)
    }

    pub(crate) const fn toggle(&mut self) -> bool {
        self.selected = !self.selected;
        self.selected
    }

    pub(crate) fn begin(&mut self) -> Result<(), SuspensionDomainError> {
        self.transition_to(TaskStatus::InProgress)
    }

    pub(crate) fn complete(&mut self) -> Result<(), SuspensionDomainError> {
        self.transition_to(TaskStatus::Completed)
    }

    pub(crate) fn fail(&mut self, reason: String) -> Result<(), SuspensionDomainError> {
        self.transition_to(TaskStatus::Failed)?;
        self.failure_reason = Some(reason);
        Ok(())
    }

    pub(crate) fn skip(&mut self) -> Result<(), SuspensionDomainError> {
        self.transition_to(TaskStatus::Skipped)
    }

    fn transition_to(&mut self, target: TaskStatus) -> Result<(), SuspensionDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(SuspensionDomainError::InvalidTaskTransition {
                task: self.key().clone(),
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}
