//! Service layer driving suspension runs end to end.

use crate::suspension::{
    domain::{
        EngineError, PageNumber, PlaceholderCredential, Projection, ProjectionError, RunId,
        SuspendPolicy, SuspensionRecord, SuspensionRun, TaskBoard, TaskDefinition, TaskEngine,
        TaskOutcome, UserRecord, project,
    },
    ports::{LedgerStore, TaskExecutionError, TaskExecutor, UserDirectory, UserDirectoryError},
    services::{RunEvent, RunObserver, SuspensionHistoryError, SuspensionHistoryService},
};
use mockable::Clock;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const ABANDONED_REASON: &str = "run abandoned before the task finished";

/// Tunables for suspension runs.
#[derive(Debug, Clone, Default)]
pub struct SuspensionSettings {
    /// Whether runs that complete nothing still suspend the user.
    pub suspend_policy: SuspendPolicy,
    /// Upper bound for a single task action; `None` waits indefinitely.
    pub task_timeout: Option<Duration>,
    /// Credential revealed after the password-reset task.
    pub credential: PlaceholderCredential,
}

/// Service-level errors for suspension operations.
#[derive(Debug, Error)]
pub enum SuspensionServiceError {
    /// The engine rejected the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// The finished run could not be projected.
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    /// The user directory could not be queried.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
}

/// Result type for suspension service operations.
pub type SuspensionServiceResult<T> = Result<T, SuspensionServiceError>;

/// Everything a finished run produced.
///
/// Persistence failures are carried alongside the result rather than
/// replacing it: the run and its effect on the user stand regardless.
#[derive(Debug)]
pub struct SuspensionOutcome {
    /// Summary of the run.
    pub run: SuspensionRun,
    /// Entry prepended to the ledger.
    pub record: SuspensionRecord,
    /// User record carrying the projected status.
    pub updated_user: UserRecord,
    /// Set when the ledger could not be saved.
    pub ledger_error: Option<SuspensionHistoryError>,
    /// Set when the directory rejected the status write-back.
    pub directory_error: Option<UserDirectoryError>,
}

/// Suspension orchestration service.
///
/// Owns the task engine for the user under review and drives runs one task
/// at a time against a [`TaskExecutor`]. The engine lock is only held
/// between awaits, so a concurrent caller observes progress and is rejected
/// when it tries to alter a running plan.
pub struct SuspensionService<X, S, D, C>
where
    X: TaskExecutor,
    S: LedgerStore,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    engine: Mutex<TaskEngine>,
    executor: Arc<X>,
    history: Arc<SuspensionHistoryService<S>>,
    directory: Arc<D>,
    clock: Arc<C>,
    settings: SuspensionSettings,
}

impl<X, S, D, C> SuspensionService<X, S, D, C>
where
    X: TaskExecutor,
    S: LedgerStore,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new suspension service with default settings.
    #[must_use]
    pub fn new(
        engine: TaskEngine,
        executor: Arc<X>,
        history: Arc<SuspensionHistoryService<S>>,
        directory: Arc<D>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            engine: Mutex::new(engine),
            executor,
            history,
            directory,
            clock,
            settings: SuspensionSettings::default(),
        }
    }

    /// Replaces the run settings.
    #[must_use]
    pub fn with_settings(mut self, settings: SuspensionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the run settings.
    #[must_use]
    pub const fn settings(&self) -> &SuspensionSettings {
        &self.settings
    }

    /// Returns the ledger service.
    #[must_use]
    pub const fn history(&self) -> &Arc<SuspensionHistoryService<S>> {
        &self.history
    }

    /// Lists one directory page with each user's displayed status.
    ///
    /// # Errors
    ///
    /// Returns [`SuspensionServiceError::Directory`] when the directory
    /// cannot be queried.
    pub async fn list_users(&self, page: PageNumber) -> SuspensionServiceResult<Vec<UserRecord>> {
        let users = self.directory.list_users(page).await?;
        Ok(users
            .into_iter()
            .map(|user| {
                let status = self.history
                    .displayed_status(&user, self.settings.suspend_policy);
                user.with_status(status)
            })
            .collect())
    }

    /// Binds the engine to `user` with fresh task state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RunInProgress`] while a run is executing.
    pub fn select_user(&self, user: UserRecord) -> SuspensionServiceResult<TaskBoard> {
        let credential = self.settings.credential.clone();
        self.with_engine(|engine| {
            engine.initialize(user, credential)?;
            engine.snapshot().ok_or(EngineError::NotInitialized)
        })
    }

    /// Flips the selection of the task with `key`.
    ///
    /// # Errors
    ///
    /// Returns the engine's rejection when toggling is unavailable.
    pub fn toggle_task(&self, key: &str) -> SuspensionServiceResult<TaskBoard> {
        self.with_engine(|engine| {
            engine.toggle_selection(key)?;
            engine.snapshot().ok_or(EngineError::NotInitialized)
        })
    }

    /// Returns the current task board, if a user is selected.
    #[must_use]
    pub fn board(&self) -> Option<TaskBoard> {
        self.lock_engine().snapshot()
    }

    /// Returns whether `execute` is currently available.
    #[must_use]
    pub fn can_execute(&self) -> bool {
        self.lock_engine().can_execute()
    }

    /// Asks the running execution to stop at the next step boundary.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRunInProgress`] when nothing is running.
    pub fn cancel(&self) -> SuspensionServiceResult<()> {
        self.with_engine(TaskEngine::cancel)?;
        info!("suspension run cancellation requested");
        Ok(())
    }

    /// Executes every selected pending task, then records the run.
    ///
    /// Tasks run strictly one at a time, directory group first. After the
    /// last step the run is projected, prepended to the ledger, and the new
    /// status is written back to the directory.
    ///
    /// Dropping the returned future mid-run closes the run in the engine:
    /// the interrupted task is marked failed, the rest skipped, and nothing
    /// is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`SuspensionServiceError::Engine`] when no run can start
    /// (nothing selected, or a run already in progress) and
    /// [`SuspensionServiceError::Projection`] if the run cannot be projected.
    /// Ledger and directory write failures are reported in the outcome.
    pub async fn execute(
        &self,
        observer: &impl RunObserver,
    ) -> SuspensionServiceResult<SuspensionOutcome> {
        let (run_id, user) = self.with_engine(|engine| {
            let run_id = engine.execute(&*self.clock)?;
            let user = engine.user().cloned().ok_or(EngineError::NotInitialized)?;
            Ok((run_id, user))
        })?;
        let mut guard = RunGuard {
            engine: &self.engine,
            clock: &*self.clock,
            run_id,
            armed: true,
        };
        info!(%run_id, user_id = %user.id(), "suspension run started");
        observer.on_event(&RunEvent::RunStarted {
            run_id,
            user_id: user.id().clone(),
        });

        while let Some(task) = self.with_engine(TaskEngine::begin_next_task)? {
            observer.on_event(&RunEvent::TaskStarted(task.clone()));
            let outcome = self.perform(&user, &task).await;
            let status = self.with_engine(move |engine| engine.finish_current_task(outcome))?;
            info!(%run_id, task = %task.key(), %status, "suspension task finished");
            observer.on_event(&RunEvent::TaskFinished { task, status });
        }

        let run = self.with_engine(|engine| engine.finish_run(&*self.clock))?;
        guard.armed = false;
        let head = self.history.head();
        let Projection {
            entry,
            updated_user,
        } = project(
            &user,
            head.as_ref(),
            &run,
            self.settings.suspend_policy,
            &*self.clock,
        )?;

        let ledger_error = self.history.record(entry.clone()).await.err();
        if let Some(err) = &ledger_error {
            warn!(%run_id, error = %err, "suspension ledger could not be saved");
        }

        let directory_error = if updated_user.status() == user.status() {
            None
        } else {
            self.directory
                .update_status(updated_user.id(), updated_user.status())
                .await
                .err()
        };
        if let Some(err) = &directory_error {
            warn!(%run_id, error = %err, "user status write-back failed");
        }

        let refreshed = updated_user.clone();
        self.with_engine(move |engine| engine.refresh_user(refreshed))?;
        info!(
            %run_id,
            user_id = %user.id(),
            completed = run.completed_task_labels().len(),
            failed = run.failed_tasks().len(),
            skipped = run.skipped_task_labels().len(),
            status = %updated_user.status(),
            "suspension run finished"
        );

        Ok(SuspensionOutcome {
            run,
            record: entry,
            updated_user,
            ledger_error,
            directory_error,
        })
    }

    async fn perform(&self, user: &UserRecord, task: &TaskDefinition) -> TaskOutcome {
        let action = self.executor.perform(user, task);
        let result = match self.settings.task_timeout {
            Some(limit) => tokio::time::timeout(limit, action)
                .await
                .unwrap_or(Err(TaskExecutionError::TimedOut(limit))),
            None => action.await,
        };
        match result {
            Ok(()) => TaskOutcome::Succeeded,
            Err(err) => {
                warn!(
                    user_id = %user.id(),
                    task = %task.key(),
                    error = %err,
                    "suspension task failed"
                );
                TaskOutcome::Failed(err.to_string())
            }
        }
    }

    fn lock_engine(&self) -> std::sync::MutexGuard<'_, TaskEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_engine<T, F>(&self, operation: F) -> SuspensionServiceResult<T>
    where
        F: FnOnce(&mut TaskEngine) -> Result<T, EngineError>,
    {
        Ok(operation(&mut *self.lock_engine())?)
    }
}

/// Closes the engine's run if `execute` stops before finishing it.
struct RunGuard<'a, C: Clock> {
    engine: &'a Mutex<TaskEngine>,
    clock: &'a C,
    run_id: RunId,
    armed: bool,
}

impl<C: Clock> Drop for RunGuard<'_, C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        match engine.abort_run(ABANDONED_REASON, self.clock) {
            Ok(run) => warn!(
                run_id = %self.run_id,
                completed = run.completed_task_labels().len(),
                skipped = run.skipped_task_labels().len(),
                "suspension run abandoned"
            ),
            Err(EngineError::NoRunInProgress) => {}
            Err(err) => warn!(
                run_id = %self.run_id,
                error = %err,
                "abandoned suspension run could not be closed"
            ),
        }
    }
}
