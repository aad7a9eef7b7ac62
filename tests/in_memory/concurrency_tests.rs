//! Integration tests for re-entrancy, cancellation, and task timeouts.

use std::sync::Arc;
use std::time::Duration;

use crate::test_helpers::{GatedExecutor, TestService, build_service};
use offboard::suspension::{
    adapters::{memory::InMemoryLedgerStore, simulated::SimulatedTaskExecutor},
    domain::{EngineError, FailurePolicy, PageNumber, TaskStatus, UserStatus},
    services::{SuspensionServiceError, SuspensionSettings},
};
use rstest::rstest;

async fn select_first_user<X>(service: &TestService<X>, keys: &[&str]) -> Result<(), eyre::Report>
where
    X: offboard::suspension::ports::TaskExecutor,
{
    let user = service
        .list_users(PageNumber::FIRST)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| eyre::eyre!("directory returned no users"))?;
    service.select_user(user)?;
    for key in keys {
        service.toggle_task(key)?;
    }
    Ok(())
}

fn gated_service() -> Result<(Arc<GatedExecutor>, Arc<TestService<GatedExecutor>>), eyre::Report> {
    let executor = Arc::new(GatedExecutor::default());
    let service = build_service(
        Arc::clone(&executor),
        Arc::new(InMemoryLedgerStore::new()),
        FailurePolicy::Continue,
    )?;
    Ok((executor, Arc::new(service)))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_execute_is_rejected_while_a_run_is_in_flight() -> Result<(), eyre::Report> {
    let (executor, service) = gated_service()?;
    select_first_user(&service, &["password"]).await?;

    let running = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.execute(&()).await }
    });
    executor.wait_started().await;

    let second = service.execute(&()).await;
    eyre::ensure!(
        matches!(
            second,
            Err(SuspensionServiceError::Engine(EngineError::RunInProgress))
        ),
        "expected RunInProgress, got {second:?}"
    );
    eyre::ensure!(!service.can_execute(), "execute should be unavailable");
    let toggle = service.toggle_task("groups");
    eyre::ensure!(
        matches!(
            toggle,
            Err(SuspensionServiceError::Engine(EngineError::RunInProgress))
        ),
        "expected toggling to be locked, got {toggle:?}"
    );
    let board = service.board().ok_or_else(|| eyre::eyre!("missing board"))?;
    eyre::ensure!(board.running, "board should report the run");

    executor.release();
    let outcome = running.await??;

    eyre::ensure!(
        outcome.record.actions() == ["Reset Password"],
        "unexpected actions {:?}",
        outcome.record.actions()
    );
    eyre::ensure!(
        service.history().list().len() == 1,
        "the rejected call must not record a second entry"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_skips_tasks_not_yet_started() -> Result<(), eyre::Report> {
    let (executor, service) = gated_service()?;
    select_first_user(&service, &["password", "groups", "gou"]).await?;

    let running = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.execute(&()).await }
    });
    executor.wait_started().await;
    service.cancel()?;
    executor.release();
    let outcome = running.await??;

    eyre::ensure!(outcome.run.was_cancelled(), "run should be marked cancelled");
    eyre::ensure!(
        outcome.run.completed_task_labels() == ["Reset Password"],
        "in-flight task should complete"
    );
    eyre::ensure!(
        outcome.run.skipped_task_labels() == ["Remove from AD Groups", "Move Google OU"],
        "unexpected skipped tasks {:?}",
        outcome.run.skipped_task_labels()
    );
    let board = service.board().ok_or_else(|| eyre::eyre!("missing board"))?;
    let gou = board
        .groups
        .iter()
        .flat_map(|group| group.tasks.iter())
        .find(|task| task.key().as_str() == "gou")
        .ok_or_else(|| eyre::eyre!("missing gou task"))?;
    eyre::ensure!(gou.status() == TaskStatus::Skipped, "gou should be skipped");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn abandoned_execute_closes_the_run() -> Result<(), eyre::Report> {
    let (_executor, service) = gated_service()?;
    select_first_user(&service, &["password", "groups"]).await?;

    let timed_out = tokio::time::timeout(Duration::from_millis(50), service.execute(&()))
        .await
        .is_err();
    eyre::ensure!(timed_out, "gated run should not finish on its own");

    let board = service.board().ok_or_else(|| eyre::eyre!("missing board"))?;
    eyre::ensure!(!board.running, "dropped run should be closed");
    let statuses: Vec<(String, TaskStatus)> = board
        .groups
        .iter()
        .flat_map(|group| group.tasks.iter())
        .filter(|task| task.is_selected())
        .map(|task| (task.key().as_str().to_owned(), task.status()))
        .collect();
    eyre::ensure!(
        statuses
            == [
                ("password".to_owned(), TaskStatus::Failed),
                ("groups".to_owned(), TaskStatus::Skipped),
            ],
        "unexpected task states {statuses:?}"
    );
    eyre::ensure!(
        service.history().list().is_empty(),
        "an abandoned run is not recorded"
    );

    let cancel = service.cancel();
    eyre::ensure!(
        matches!(
            cancel,
            Err(SuspensionServiceError::Engine(EngineError::NoRunInProgress))
        ),
        "expected NoRunInProgress, got {cancel:?}"
    );
    service.toggle_task("suspend")?;
    let other = service
        .list_users(PageNumber::FIRST)
        .await?
        .into_iter()
        .nth(1)
        .ok_or_else(|| eyre::eyre!("directory returned one user"))?;
    service.select_user(other)?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_without_a_run_is_rejected() -> Result<(), eyre::Report> {
    let (_executor, service) = gated_service()?;
    select_first_user(&service, &[]).await?;

    let result = service.cancel();

    eyre::ensure!(
        matches!(
            result,
            Err(SuspensionServiceError::Engine(EngineError::NoRunInProgress))
        ),
        "expected NoRunInProgress, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn slow_task_fails_after_the_timeout() -> Result<(), eyre::Report> {
    let service = build_service(
        Arc::new(SimulatedTaskExecutor::new(Duration::from_secs(60))),
        Arc::new(InMemoryLedgerStore::new()),
        FailurePolicy::Continue,
    )?
    .with_settings(SuspensionSettings {
        task_timeout: Some(Duration::from_secs(5)),
        ..SuspensionSettings::default()
    });
    select_first_user(&service, &["ou"]).await?;

    let outcome = service.execute(&()).await?;

    let failed = outcome.run.failed_tasks();
    eyre::ensure!(failed.len() == 1, "expected one failure, got {failed:?}");
    eyre::ensure!(
        failed.iter().all(|task| task.reason.contains("timed out")),
        "unexpected failure reason {failed:?}"
    );
    eyre::ensure!(
        outcome.updated_user.status() == UserStatus::Suspended,
        "default policy suspends even without completed tasks"
    );
    Ok(())
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn simulated_tasks_run_one_interval_each() -> Result<(), eyre::Report> {
    let service = build_service(
        Arc::new(SimulatedTaskExecutor::new(Duration::from_secs(1))),
        Arc::new(InMemoryLedgerStore::new()),
        FailurePolicy::Continue,
    )?;
    select_first_user(&service, &["password", "gpassword", "ggroups"]).await?;

    let started = tokio::time::Instant::now();
    let outcome = service.execute(&()).await?;

    eyre::ensure!(
        started.elapsed() >= Duration::from_secs(3),
        "tasks should run sequentially"
    );
    eyre::ensure!(
        outcome.record.actions().len() == 3,
        "all three tasks should complete"
    );
    Ok(())
}
