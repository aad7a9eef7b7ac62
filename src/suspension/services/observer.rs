//! Progress notifications emitted while a run executes.

use crate::suspension::domain::{RunId, TaskDefinition, TaskStatus, UserId};

/// Step boundary reached by a running execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// A run was planned for the user.
    RunStarted {
        /// Run correlation identifier.
        run_id: RunId,
        /// User the run executes for.
        user_id: UserId,
    },
    /// A task moved to `InProgress`.
    TaskStarted(TaskDefinition),
    /// A task reached its final status.
    TaskFinished {
        /// The finished task.
        task: TaskDefinition,
        /// Its resulting status.
        status: TaskStatus,
    },
}

/// Receives progress events between execution steps.
pub trait RunObserver: Send + Sync {
    /// Handles one event.
    fn on_event(&self, event: &RunEvent);
}

impl RunObserver for () {
    fn on_event(&self, _event: &RunEvent) {}
}
