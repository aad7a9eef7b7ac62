//! Executor port performing one remediation task against an identity
//! system.

use crate::suspension::domain::{TaskDefinition, UserRecord};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for task execution.
pub type TaskExecutionResult<T> = Result<T, TaskExecutionError>;

/// Performs the action behind a task definition.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Performs `task` for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskExecutionError`] when the action does not take effect.
    async fn perform(&self, user: &UserRecord, task: &TaskDefinition) -> TaskExecutionResult<()>;
}

/// Errors reported for a single task action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskExecutionError {
    /// The identity system rejected the action.
    #[error("action rejected: {0}")]
    Rejected(String),

    /// The action did not finish within the allowed time.
    #[error("action timed out after {0:?}")]
    TimedOut(Duration),
}
