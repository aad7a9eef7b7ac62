//! Task executor that simulates work with a fixed delay.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::suspension::{
    domain::{TaskDefinition, UserRecord},
    ports::{TaskExecutionResult, TaskExecutor},
};

/// Executor whose every action succeeds after a fixed work interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedTaskExecutor {
    work_interval: Duration,
}

impl SimulatedTaskExecutor {
    /// Default simulated work interval.
    pub const DEFAULT_WORK_INTERVAL: Duration = Duration::from_secs(1);

    /// Creates an executor sleeping `work_interval` per task.
    #[must_use]
    pub const fn new(work_interval: Duration) -> Self {
        Self { work_interval }
    }

    /// Returns the simulated work interval.
    #[must_use]
    pub const fn work_interval(&self) -> Duration {
        self.work_interval
    }
}

impl Default for SimulatedTaskExecutor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WORK_INTERVAL)
    }
}

#[async_trait]
impl TaskExecutor for SimulatedTaskExecutor {
    async fn perform(&self, user: &UserRecord, task: &TaskDefinition) -> TaskExecutionResult<()> {
        debug!(
            user_id = %user.id(),
            task = %task.key(),
            group = %task.group(),
            interval = ?self.work_interval,
            "simulating task action"
        );
        tokio::time::sleep(self.work_interval).await;
        Ok(())
    }
}
