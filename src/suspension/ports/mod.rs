//! Port contracts for suspension orchestration.
//!
//! Ports define infrastructure-agnostic interfaces used by suspension
//! services: durable ledger storage, the user directory, and the per-task
//! action executor.

pub mod ledger_store;
pub mod task_executor;
pub mod user_directory;

pub use ledger_store::{LedgerStore, LedgerStoreError, LedgerStoreResult};
pub use task_executor::{TaskExecutionError, TaskExecutionResult, TaskExecutor};
pub use user_directory::{UserDirectory, UserDirectoryError, UserDirectoryResult};
