//! In-memory integration tests for suspension runs.

use std::sync::Arc;

use crate::test_helpers::{ScriptedExecutor, TestService, build_service};
use offboard::suspension::{
    adapters::memory::InMemoryLedgerStore,
    domain::{EngineError, FailurePolicy, PageNumber, SuspendPolicy, UserRecord, UserStatus},
    services::{SuspensionServiceError, SuspensionSettings},
};
use rstest::{fixture, rstest};

struct Harness {
    executor: Arc<ScriptedExecutor>,
    service: TestService<ScriptedExecutor>,
}

fn harness_with(failing: &[&str], policy: FailurePolicy) -> Result<Harness, eyre::Report> {
    let executor = Arc::new(ScriptedExecutor::failing(failing));
    let service = build_service(
        Arc::clone(&executor),
        Arc::new(InMemoryLedgerStore::new()),
        policy,
    )?;
    Ok(Harness { executor, service })
}

#[fixture]
fn harness() -> Harness {
    harness_with(&[], FailurePolicy::Continue).expect("harness should build")
}

async fn first_page_user(service: &TestService<ScriptedExecutor>, id: &str) -> UserRecord {
    service
        .list_users(PageNumber::FIRST)
        .await
        .expect("directory listing should succeed")
        .into_iter()
        .find(|user| user.id().as_str() == id)
        .expect("user should be on the first page")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn selected_tasks_are_recorded_in_catalogue_order(harness: Harness) {
    let user = first_page_user(&harness.service, "user-1-3").await;
    harness.service.select_user(user).expect("select user");
    harness.service.toggle_task("gou").expect("toggle gou");
    harness.service.toggle_task("password").expect("toggle password");

    let outcome = harness.service.execute(&()).await.expect("run should finish");

    assert_eq!(harness.executor.visited(), ["password", "gou"]);
    assert_eq!(
        outcome.record.actions(),
        ["Reset Password", "Move Google OU"]
    );
    assert_eq!(outcome.record.user_display_name(), "User 3");
    assert_eq!(outcome.updated_user.status(), UserStatus::Suspended);
    assert!(outcome.ledger_error.is_none());
    assert!(outcome.directory_error.is_none());

    let history = harness.service.history().list();
    assert_eq!(history.first(), Some(&outcome.record));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn execute_without_selection_is_rejected(harness: Harness) {
    let user = first_page_user(&harness.service, "user-1-1").await;
    harness.service.select_user(user).expect("select user");

    let result = harness.service.execute(&()).await;

    assert!(matches!(
        result,
        Err(SuspensionServiceError::Engine(EngineError::NothingSelected))
    ));
    assert!(harness.service.history().list().is_empty());
    assert!(harness.executor.visited().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn execute_before_selecting_a_user_is_rejected(harness: Harness) {
    let result = harness.service.execute(&()).await;

    assert!(matches!(
        result,
        Err(SuspensionServiceError::Engine(EngineError::NotInitialized))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn suspended_status_is_written_back_to_the_directory(harness: Harness) {
    let user = first_page_user(&harness.service, "user-1-4").await;
    assert_eq!(user.status(), UserStatus::Active);
    harness.service.select_user(user).expect("select user");
    harness.service.toggle_task("suspend").expect("toggle");

    harness.service.execute(&()).await.expect("run should finish");

    let listed = first_page_user(&harness.service, "user-1-4").await;
    assert_eq!(listed.status(), UserStatus::Suspended);
    let board = harness.service.board().expect("board");
    assert_eq!(board.user.status(), UserStatus::Suspended);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_tasks_are_left_out_of_the_record() {
    let harness = harness_with(&["groups"], FailurePolicy::Continue).expect("harness");
    let user = first_page_user(&harness.service, "user-1-1").await;
    harness.service.select_user(user).expect("select user");
    for key in ["password", "groups", "ggroups"] {
        harness.service.toggle_task(key).expect("toggle");
    }

    let outcome = harness.service.execute(&()).await.expect("run should finish");

    assert_eq!(harness.executor.visited(), ["password", "groups", "ggroups"]);
    assert_eq!(
        outcome.record.actions(),
        ["Reset Password", "Remove from Google Groups"]
    );
    assert_eq!(outcome.run.failed_tasks().len(), 1);
    assert_eq!(outcome.run.failed_tasks()[0].reason, "action rejected: groups refused");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn halt_policy_skips_tasks_after_a_failure() {
    let harness = harness_with(&["password"], FailurePolicy::Halt).expect("harness");
    let user = first_page_user(&harness.service, "user-1-1").await;
    harness.service.select_user(user).expect("select user");
    for key in ["password", "ou", "gpassword"] {
        harness.service.toggle_task(key).expect("toggle");
    }

    let outcome = harness.service.execute(&()).await.expect("run should finish");

    assert_eq!(harness.executor.visited(), ["password"]);
    assert!(outcome.record.actions().is_empty());
    assert_eq!(
        outcome.run.skipped_task_labels(),
        ["Move to Suspended OU", "Change Google Password"]
    );
    assert_eq!(outcome.updated_user.status(), UserStatus::Suspended);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fully_failed_run_keeps_the_user_active_when_configured() {
    let executor = Arc::new(ScriptedExecutor::failing(&["suspend"]));
    let service = build_service(
        executor,
        Arc::new(InMemoryLedgerStore::new()),
        FailurePolicy::Continue,
    )
    .expect("service")
    .with_settings(SuspensionSettings {
        suspend_policy: SuspendPolicy::RequireCompletedTask,
        ..SuspensionSettings::default()
    });
    let user = service
        .list_users(PageNumber::FIRST)
        .await
        .expect("listing")
        .into_iter()
        .next()
        .expect("first user");
    service.select_user(user).expect("select user");
    service.toggle_task("suspend").expect("toggle");

    let outcome = service.execute(&()).await.expect("run should finish");

    assert_eq!(outcome.updated_user.status(), UserStatus::Active);
    assert!(outcome.record.actions().is_empty());
    assert_eq!(service.history().list().len(), 1);

    let listed = service
        .list_users(PageNumber::FIRST)
        .await
        .expect("listing")
        .into_iter()
        .find(|candidate| candidate.id().as_str() == "user-1-1")
        .expect("user should still be listed");
    assert_eq!(listed.status(), UserStatus::Active);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_password_reset_reveals_the_credential(harness: Harness) {
    let user = first_page_user(&harness.service, "user-1-1").await;
    harness.service.select_user(user).expect("select user");
    harness.service.toggle_task("password").expect("toggle");

    harness.service.execute(&()).await.expect("run should finish");

    let board = harness.service.board().expect("board");
    assert_eq!(
        board.revealed_credential.as_ref().map(|credential| credential.expose()),
        Some("TempPass123!")
    );
    assert!(!board.can_execute);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn selecting_another_user_resets_the_board(harness: Harness) {
    let first = first_page_user(&harness.service, "user-1-1").await;
    harness.service.select_user(first).expect("select first");
    harness.service.toggle_task("password").expect("toggle");
    harness.service.execute(&()).await.expect("run should finish");

    let second = first_page_user(&harness.service, "user-1-2").await;
    let board = harness.service.select_user(second).expect("select second");

    assert!(board.revealed_credential.is_none());
    assert!(
        board
            .groups
            .iter()
            .flat_map(|group| group.tasks.iter())
            .all(|task| !task.is_selected())
    );
}
