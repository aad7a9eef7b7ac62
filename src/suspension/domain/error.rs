//! Error types for suspension domain validation, parsing, and engine
//! preconditions.

use super::{SystemGroup, TaskKey, TaskStatus, UserId};
use thiserror::Error;

/// Errors returned while constructing or mutating domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SuspensionDomainError {
    /// The task key is empty or contains whitespace.
    #[error("invalid task key '{0}', expected a non-empty token without whitespace")]
    InvalidTaskKey(String),

    /// The task label is empty after trimming.
    #[error("task label must not be empty")]
    EmptyTaskLabel,

    /// The user identifier is empty after trimming.
    #[error("user identifier must not be empty")]
    EmptyUserId,

    /// Two catalogue entries share the same key.
    #[error("duplicate task key '{key}' in {group} catalogue")]
    DuplicateTaskKey {
        /// Offending task key.
        key: TaskKey,
        /// Group of the second definition using the key.
        group: SystemGroup,
    },

    /// The requested task status transition is not allowed.
    #[error("task '{task}' cannot move from {from} to {to}")]
    InvalidTaskTransition {
        /// Task being transitioned.
        task: TaskKey,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// A directory page number was zero.
    #[error("page numbers start at 1")]
    InvalidPageNumber,
}

/// Precondition violations reported by the orchestration engine.
///
/// These are rejected-operation signals: the engine state is left untouched
/// whenever one is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// No user has been bound with `initialize`.
    #[error("engine has not been initialized for a user")]
    NotInitialized,

    /// A run is executing and the operation would alter its plan.
    #[error("a suspension run is already in progress")]
    RunInProgress,

    /// The operation requires a run that is executing.
    #[error("no suspension run is in progress")]
    NoRunInProgress,

    /// `execute` was requested with no pending selected task.
    #[error("no pending task is selected")]
    NothingSelected,

    /// No catalogue entry uses the requested key.
    #[error("unknown task '{0}'")]
    UnknownTask(String),

    /// The task already ran in this session and its selection is locked.
    #[error("task '{0}' has already been executed for this user")]
    TaskAlreadyExecuted(TaskKey),

    /// A step is still in flight and must be finished first.
    #[error("task '{0}' is still in progress")]
    TaskInFlight(TaskKey),

    /// No step is in flight to be finished.
    #[error("no task is in progress")]
    NoTaskInFlight,

    /// The run has planned tasks that have not been visited yet.
    #[error("{0} planned task(s) have not been visited")]
    RunNotExhausted(usize),

    /// A domain invariant was violated while stepping.
    #[error(transparent)]
    Domain(#[from] SuspensionDomainError),
}

/// Errors returned by the result projection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectionError {
    /// The run belongs to a different user than the prior user record.
    #[error("run for user {run_user} cannot be projected onto user {record_user}")]
    UserMismatch {
        /// User named by the run.
        run_user: UserId,
        /// User named by the prior record.
        record_user: UserId,
    },
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing system groups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown system group: {0}")]
pub struct ParseSystemGroupError(pub String);

/// Error returned while parsing user statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown user status: {0}")]
pub struct ParseUserStatusError(pub String);
