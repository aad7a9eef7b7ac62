//! Task orchestration engine.
//!
//! The engine owns the run state of every catalogue task for the active
//! user. Execution is cooperative: [`TaskEngine::execute`] only plans a run,
//! and the caller drives it one task at a time with
//! [`TaskEngine::begin_next_task`] and [`TaskEngine::finish_current_task`],
//! regaining control between every step. [`TaskEngine::finish_run`] closes
//! the run and yields its [`SuspensionRun`].

use super::{
    EngineError, FailedTask, FailurePolicy, PlaceholderCredential, RunId, SuspensionDomainError,
    SuspensionRun, SuspensionRunData, SystemGroup, TaskCatalogue, TaskDefinition, TaskOutcome,
    TaskRunState, TaskStatus, UserRecord,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::VecDeque;

/// Read-only view of one system group's tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBoard {
    /// Owning system group.
    pub group: SystemGroup,
    /// Task states in catalogue order.
    pub tasks: Vec<TaskRunState>,
}

/// Read-only snapshot of the engine for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBoard {
    /// User bound to the engine.
    pub user: UserRecord,
    /// Groups in execution order.
    pub groups: Vec<GroupBoard>,
    /// Whether a run is executing.
    pub running: bool,
    /// Whether `execute` is currently available.
    pub can_execute: bool,
    /// Credential revealed by a completed password reset, if any.
    pub revealed_credential: Option<PlaceholderCredential>,
}

#[derive(Debug)]
struct ActiveRun {
    run_id: RunId,
    started_at: DateTime<Utc>,
    pending: VecDeque<usize>,
    visited: Vec<usize>,
    skipped: Vec<usize>,
    in_flight: Option<usize>,
    halted: bool,
    cancelled: bool,
}

#[derive(Debug)]
struct EngineSession {
    user: UserRecord,
    tasks: Vec<TaskRunState>,
    credential: PlaceholderCredential,
    credential_revealed: bool,
    active_run: Option<ActiveRun>,
}

/// Per-user task state machine with sequential, cooperative execution.
#[derive(Debug)]
pub struct TaskEngine {
    catalogue: TaskCatalogue,
    failure_policy: FailurePolicy,
    session: Option<EngineSession>,
}

impl TaskEngine {
    /// Creates an engine over `catalogue` with no bound user.
    #[must_use]
    pub const fn new(catalogue: TaskCatalogue) -> Self {
        Self {
            catalogue,
            failure_policy: FailurePolicy::Continue,
            session: None,
        }
    }

    /// Sets the policy applied when a task fails.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Returns the catalogue driving this engine.
    #[must_use]
    pub const fn catalogue(&self) -> &TaskCatalogue {
        &self.catalogue
    }

    /// Returns the configured failure policy.
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Binds the engine to `user` with every task idle and unselected.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RunInProgress`] while a run is executing.
    pub fn initialize(
        &mut self,
        user: UserRecord,
        credential: PlaceholderCredential,
    ) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::RunInProgress);
        }
        let tasks = self
            .catalogue
            .definitions()
            .iter()
            .cloned()
            .map(TaskRunState::idle)
            .collect();
        self.session = Some(EngineSession {
            user,
            tasks,
            credential,
            credential_revealed: false,
            active_run: None,
        });
        Ok(())
    }

    /// Replaces the bound user record when `user` has the same identifier.
    ///
    /// Returns whether the record was replaced. Task state is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotInitialized`] when no user is bound.
    pub fn refresh_user(&mut self, user: UserRecord) -> Result<bool, EngineError> {
        let session = self.session.as_mut().ok_or(EngineError::NotInitialized)?;
        if session.user.id() != user.id() {
            return Ok(false);
        }
        session.user = user;
        Ok(true)
    }

    /// Returns the bound user.
    #[must_use]
    pub fn user(&self) -> Option<&UserRecord> {
        self.session.as_ref().map(|session| &session.user)
    }

    /// Returns every task state in execution order.
    #[must_use]
    pub fn tasks(&self) -> &[TaskRunState] {
        self.session
            .as_ref()
            .map(|session| session.tasks.as_slice())
            .unwrap_or_default()
    }

    /// Returns the state of the task with `key`.
    #[must_use]
    pub fn task(&self, key: &str) -> Option<&TaskRunState> {
        self.tasks().iter().find(|task| task.key().as_str() == key)
    }

    /// Returns whether a run is executing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.active_run.is_some())
    }

    /// Returns whether `toggle_selection(key)` would be accepted.
    #[must_use]
    pub fn can_toggle(&self, key: &str) -> bool {
        !self.is_running()
            && self
                .task(key)
                .is_some_and(|task| matches!(task.status(), TaskStatus::Idle))
    }

    /// Returns whether `execute` would be accepted.
    #[must_use]
    pub fn can_execute(&self) -> bool {
        !self.is_running() && self.tasks().iter().any(TaskRunState::is_pending)
    }

    /// Returns the placeholder credential once the password-reset task has
    /// completed.
    #[must_use]
    pub fn revealed_credential(&self) -> Option<&PlaceholderCredential> {
        self.session
            .as_ref()
            .filter(|session| session.credential_revealed)
            .map(|session| &session.credential)
    }

    /// Flips the selection of the task with `key`.
    ///
    /// Returns the new selection value.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotInitialized`] before `initialize`,
    /// [`EngineError::RunInProgress`] while executing,
    /// [`EngineError::UnknownTask`] for keys outside the catalogue, and
    /// [`EngineError::TaskAlreadyExecuted`] for tasks that already left
    /// `Idle`.
    pub fn toggle_selection(&mut self, key: &str) -> Result<bool, EngineError> {
        let session = self.session.as_mut().ok_or(EngineError::NotInitialized)?;
        if session.active_run.is_some() {
            return Err(EngineError::RunInProgress);
        }
        let task = session
            .tasks
            .iter_mut()
            .find(|task| task.key().as_str() == key)
            .ok_or_else(|| EngineError::UnknownTask(key.to_owned()))?;
        if !matches!(task.status(), TaskStatus::Idle) {
            return Err(EngineError::TaskAlreadyExecuted(task.key().clone()));
        }
        Ok(task.toggle())
    }

    /// Plans a run over every selected idle task.
    ///
    /// Directory tasks are planned before cloud identity tasks, each group in
    /// catalogue order, independent of the order selections were made in.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotInitialized`] before `initialize`,
    /// [`EngineError::RunInProgress`] for re-entrant calls, and
    /// [`EngineError::NothingSelected`] when no selected task is idle.
    pub fn execute(&mut self, clock: &impl Clock) -> Result<RunId, EngineError> {
        let session = self.session.as_mut().ok_or(EngineError::NotInitialized)?;
        if session.active_run.is_some() {
            return Err(EngineError::RunInProgress);
        }
        let pending: VecDeque<usize> = session
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.is_pending())
            .map(|(index, _)| index)
            .collect();
        if pending.is_empty() {
            return Err(EngineError::NothingSelected);
        }

        let run_id = RunId::new();
        session.active_run = Some(ActiveRun {
            run_id,
            started_at: clock.utc(),
            pending,
            visited: Vec::new(),
            skipped: Vec::new(),
            in_flight: None,
            halted: false,
            cancelled: false,
        });
        Ok(run_id)
    }

    /// Moves the next planned task to `InProgress` and returns it.
    ///
    /// Returns `Ok(None)` once the plan is exhausted. After a halt or
    /// cancellation every remaining planned task is marked `Skipped` and
    /// `Ok(None)` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRunInProgress`] outside a run and
    /// [`EngineError::TaskInFlight`] while the previous step is unfinished.
    pub fn begin_next_task(&mut self) -> Result<Option<TaskDefinition>, EngineError> {
        let EngineSession {
            tasks, active_run, ..
        } = self.session.as_mut().ok_or(EngineError::NotInitialized)?;
        let run = active_run.as_mut().ok_or(EngineError::NoRunInProgress)?;
        if let Some(task) = run.in_flight.and_then(|index| tasks.get(index)) {
            return Err(EngineError::TaskInFlight(task.key().clone()));
        }
        if run.halted {
            skip_pending(tasks, run)?;
            return Ok(None);
        }

        while let Some(index) = run.pending.pop_front() {
            let Some(task) = tasks.get_mut(index) else {
                continue;
            };
            task.begin()?;
            run.in_flight = Some(index);
            return Ok(Some(task.definition().clone()));
        }
        Ok(None)
    }

    /// Records the outcome of the in-flight task.
    ///
    /// Returns the task's resulting status. A failure under
    /// [`FailurePolicy::Halt`] halts the run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRunInProgress`] outside a run and
    /// [`EngineError::NoTaskInFlight`] when no step has begun.
    pub fn finish_current_task(&mut self, outcome: TaskOutcome) -> Result<TaskStatus, EngineError> {
        let failure_policy = self.failure_policy;
        let EngineSession {
            tasks,
            active_run,
            credential_revealed,
            ..
        } = self.session.as_mut().ok_or(EngineError::NotInitialized)?;
        let run = active_run.as_mut().ok_or(EngineError::NoRunInProgress)?;
        let index = run.in_flight.ok_or(EngineError::NoTaskInFlight)?;
        let task = tasks.get_mut(index).ok_or(EngineError::NoTaskInFlight)?;

        match outcome {
            TaskOutcome::Succeeded => {
                task.complete()?;
                if task.definition().reveals_credential() {
                    *credential_revealed = true;
                }
            }
            TaskOutcome::Failed(reason) => {
                task.fail(reason)?;
                if matches!(failure_policy, FailurePolicy::Halt) {
                    run.halted = true;
                }
            }
        }
        run.in_flight = None;
        run.visited.push(index);
        Ok(task.status())
    }

    /// Requests that the run stop at the next step boundary.
    ///
    /// The in-flight task, if any, still finishes; every task not yet
    /// visited is marked `Skipped`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRunInProgress`] outside a run.
    pub fn cancel(&mut self) -> Result<(), EngineError> {
        let session = self.session.as_mut().ok_or(EngineError::NotInitialized)?;
        let run = session
            .active_run
            .as_mut()
            .ok_or(EngineError::NoRunInProgress)?;
        run.halted = true;
        run.cancelled = true;
        Ok(())
    }

    /// Closes a run that lost its driver.
    ///
    /// The in-flight task, if any, is marked `Failed` with `reason`, every
    /// task not yet visited is marked `Skipped`, and the run is closed as
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRunInProgress`] outside a run.
    pub fn abort_run(
        &mut self,
        reason: &str,
        clock: &impl Clock,
    ) -> Result<SuspensionRun, EngineError> {
        let EngineSession {
            tasks, active_run, ..
        } = self.session.as_mut().ok_or(EngineError::NotInitialized)?;
        let run = active_run.as_mut().ok_or(EngineError::NoRunInProgress)?;
        if let Some(index) = run.in_flight.take() {
            let task = tasks.get_mut(index).ok_or(EngineError::NoTaskInFlight)?;
            task.fail(reason.to_owned())?;
            run.visited.push(index);
        }
        run.halted = true;
        run.cancelled = true;
        self.finish_run(clock)
    }

    /// Closes the run and returns its summary.
    ///
    /// Completed labels follow execution order, so every directory task
    /// precedes every cloud identity task.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRunInProgress`] outside a run,
    /// [`EngineError::TaskInFlight`] while a step is unfinished, and
    /// [`EngineError::RunNotExhausted`] when planned tasks remain unvisited
    /// in a run that was not halted.
    pub fn finish_run(&mut self, clock: &impl Clock) -> Result<SuspensionRun, EngineError> {
        let EngineSession {
            user,
            tasks,
            active_run,
            ..
        } = self.session.as_mut().ok_or(EngineError::NotInitialized)?;
        let run = active_run.as_mut().ok_or(EngineError::NoRunInProgress)?;
        if let Some(task) = run.in_flight.and_then(|index| tasks.get(index)) {
            return Err(EngineError::TaskInFlight(task.key().clone()));
        }
        if run.halted {
            skip_pending(tasks, run)?;
        } else if !run.pending.is_empty() {
            return Err(EngineError::RunNotExhausted(run.pending.len()));
        }

        let completed_task_labels =
            tasks_with_status(tasks, &run.visited, TaskStatus::Completed)
                .map(|task| task.definition().label().to_owned())
                .collect();
        let failed_tasks = tasks_with_status(tasks, &run.visited, TaskStatus::Failed)
            .map(|task| FailedTask {
                label: task.definition().label().to_owned(),
                reason: task.failure_reason().unwrap_or_default().to_owned(),
            })
            .collect();
        let skipped_task_labels = tasks_with_status(tasks, &run.skipped, TaskStatus::Skipped)
            .map(|task| task.definition().label().to_owned())
            .collect();

        let summary = SuspensionRun::new(SuspensionRunData {
            run_id: run.run_id,
            user_id: user.id().clone(),
            completed_task_labels,
            failed_tasks,
            skipped_task_labels,
            cancelled: run.cancelled,
            started_at: run.started_at,
            finished_at: clock.utc(),
        });
        *active_run = None;
        Ok(summary)
    }

    /// Returns a display snapshot, or `None` before `initialize`.
    #[must_use]
    pub fn snapshot(&self) -> Option<TaskBoard> {
        let session = self.session.as_ref()?;
        let groups = SystemGroup::EXECUTION_ORDER
            .iter()
            .map(|group| GroupBoard {
                group: *group,
                tasks: session
                    .tasks
                    .iter()
                    .filter(|task| task.definition().group() == *group)
                    .cloned()
                    .collect(),
            })
            .collect();
        Some(TaskBoard {
            user: session.user.clone(),
            groups,
            running: session.active_run.is_some(),
            can_execute: self.can_execute(),
            revealed_credential: self.revealed_credential().cloned(),
        })
    }
}

fn tasks_with_status<'a>(
    tasks: &'a [TaskRunState],
    indices: &'a [usize],
    status: TaskStatus,
) -> impl Iterator<Item = &'a TaskRunState> {
    indices
        .iter()
        .filter_map(|index| tasks.get(*index))
        .filter(move |task| task.status() == status)
}

fn skip_pending(
    tasks: &mut [TaskRunState],
    run: &mut ActiveRun,
) -> Result<(), SuspensionDomainError> {
    while let Some(index) = run.pending.pop_front() {
        if let Some(task) = tasks.get_mut(index) {
            task.skip()?;
            run.skipped.push(index);
        }
    }
    Ok(())
}
