//! Shared test doubles for suspension integration tests.

use async_trait::async_trait;
use mockable::DefaultClock;
use offboard::suspension::{
    adapters::memory::{InMemoryLedgerStore, SimulatedUserDirectory},
    domain::{FailurePolicy, TaskCatalogue, TaskDefinition, TaskEngine, UserRecord},
    ports::{
        LedgerStore, LedgerStoreError, LedgerStoreResult, TaskExecutionError,
        TaskExecutionResult, TaskExecutor,
    },
    services::{DEFAULT_LEDGER_KEY, SuspensionHistoryService, SuspensionService},
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

/// Executor that fails the configured task keys and records visit order.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    failing: HashSet<String>,
    visited: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    /// Creates an executor failing every key in `failing`.
    pub fn failing(failing: &[&str]) -> Self {
        Self {
            failing: failing.iter().map(|key| (*key).to_owned()).collect(),
            visited: Mutex::new(Vec::new()),
        }
    }

    /// Returns the task keys performed so far, in order.
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl TaskExecutor for ScriptedExecutor {
    async fn perform(&self, _user: &UserRecord, task: &TaskDefinition) -> TaskExecutionResult<()> {
        let key = task.key().as_str().to_owned();
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.clone());
        if self.failing.contains(&key) {
            return Err(TaskExecutionError::Rejected(format!("{key} refused")));
        }
        Ok(())
    }
}

/// Executor that blocks every task until the test releases it.
#[derive(Debug, Default)]
pub struct GatedExecutor {
    started: Notify,
    release: Notify,
}

impl GatedExecutor {
    /// Waits until a task has started.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Lets the in-flight task finish.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl TaskExecutor for GatedExecutor {
    async fn perform(&self, _user: &UserRecord, _task: &TaskDefinition) -> TaskExecutionResult<()> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

/// Ledger store whose writes always fail.
#[derive(Debug, Default)]
pub struct ReadOnlyLedgerStore;

#[async_trait]
impl LedgerStore for ReadOnlyLedgerStore {
    async fn load(&self, _key: &str) -> LedgerStoreResult<Option<String>> {
        Ok(None)
    }

    async fn save(&self, _key: &str, _value: &str) -> LedgerStoreResult<()> {
        Err(LedgerStoreError::persistence(std::io::Error::other(
            "storage quota exceeded",
        )))
    }
}

/// Service wired to the simulated directory and the system clock.
pub type TestService<X, S = InMemoryLedgerStore> =
    SuspensionService<X, S, SimulatedUserDirectory, DefaultClock>;

/// Builds a service over `executor` and `store` with the standard catalogue.
///
/// # Errors
///
/// Returns an error if the standard catalogue cannot be built.
pub fn build_service<X, S>(
    executor: Arc<X>,
    store: Arc<S>,
    failure_policy: FailurePolicy,
) -> Result<TestService<X, S>, eyre::Report>
where
    X: TaskExecutor,
    S: LedgerStore,
{
    let engine = TaskEngine::new(TaskCatalogue::standard()?).with_failure_policy(failure_policy);
    Ok(SuspensionService::new(
        engine,
        executor,
        Arc::new(SuspensionHistoryService::new(store, DEFAULT_LEDGER_KEY)),
        Arc::new(SimulatedUserDirectory::default()),
        Arc::new(DefaultClock),
    ))
}
