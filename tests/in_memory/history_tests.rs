//! Integration tests for the bounded suspension history.

use std::sync::Arc;

use crate::test_helpers::{ReadOnlyLedgerStore, ScriptedExecutor, build_service};
use camino::Utf8Path;
use offboard::suspension::{
    adapters::{fs::FileLedgerStore, memory::InMemoryLedgerStore},
    domain::{FailurePolicy, LEDGER_CAPACITY, PageNumber, UserStatus},
    ports::{LedgerStore, LedgerStoreError},
    services::{DEFAULT_LEDGER_KEY, LedgerLoadOutcome, SuspensionHistoryService},
};
use rstest::rstest;
use std::collections::HashSet;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn eleventh_suspension_evicts_the_oldest_entry() -> Result<(), eyre::Report> {
    let service = build_service(
        Arc::new(ScriptedExecutor::default()),
        Arc::new(InMemoryLedgerStore::new()),
        FailurePolicy::Continue,
    )?;
    let users = service.list_users(PageNumber::FIRST).await?;

    let mut recorded = Vec::new();
    for user in users.into_iter().take(11) {
        service.select_user(user)?;
        service.toggle_task("suspend")?;
        recorded.push(service.execute(&()).await?.record);
    }

    let history = service.history().list();
    eyre::ensure!(history.len() == LEDGER_CAPACITY, "ledger should stay bounded");
    let newest_first: Vec<_> = recorded.iter().rev().take(LEDGER_CAPACITY).cloned().collect();
    eyre::ensure!(history == newest_first, "ledger should be newest first");
    let ids: HashSet<&str> = history.iter().map(|entry| entry.id().as_str()).collect();
    eyre::ensure!(ids.len() == LEDGER_CAPACITY, "entry ids should be unique");
    eyre::ensure!(
        history.iter().all(|entry| entry.user_id().as_str() != "user-1-1"),
        "the first suspension should have been evicted"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ledger_save_failure_keeps_the_run_result() -> Result<(), eyre::Report> {
    let service = build_service(
        Arc::new(ScriptedExecutor::default()),
        Arc::new(ReadOnlyLedgerStore),
        FailurePolicy::Continue,
    )?;
    let user = service
        .list_users(PageNumber::FIRST)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| eyre::eyre!("directory returned no users"))?;
    service.select_user(user)?;
    service.toggle_task("password")?;

    let outcome = service.execute(&()).await?;

    eyre::ensure!(outcome.ledger_error.is_some(), "save failure should be reported");
    eyre::ensure!(
        outcome.updated_user.status() == UserStatus::Suspended,
        "the user is suspended regardless"
    );
    eyre::ensure!(
        service.history().list().len() == 1,
        "the entry stays in memory"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn file_store_round_trips_values() -> Result<(), eyre::Report> {
    let temp = tempfile::tempdir()?;
    let path = Utf8Path::from_path(temp.path())
        .ok_or_else(|| eyre::eyre!("temporary path is not UTF-8"))?
        .join("history");
    let store = FileLedgerStore::open(&path)?;

    eyre::ensure!(
        store.load(DEFAULT_LEDGER_KEY).await?.is_none(),
        "fresh store should be empty"
    );
    store.save(DEFAULT_LEDGER_KEY, "[]").await?;
    store.save(DEFAULT_LEDGER_KEY, "{\"version\":1,\"records\":[]}").await?;

    let reopened = FileLedgerStore::open(&path)?;
    let loaded = reopened.load(DEFAULT_LEDGER_KEY).await?;
    eyre::ensure!(
        loaded.as_deref() == Some("{\"version\":1,\"records\":[]}"),
        "unexpected stored value {loaded:?}"
    );
    eyre::ensure!(
        path.join("recentSuspensions.json").exists(),
        "value should live in <key>.json"
    );
    Ok(())
}

#[rstest]
#[case("../escape")]
#[case("")]
#[case("nested/key")]
#[tokio::test(flavor = "multi_thread")]
async fn file_store_rejects_unsafe_keys(#[case] key: &str) -> Result<(), eyre::Report> {
    let temp = tempfile::tempdir()?;
    let path = Utf8Path::from_path(temp.path())
        .ok_or_else(|| eyre::eyre!("temporary path is not UTF-8"))?;
    let store = FileLedgerStore::open(path)?;

    let result = store.save(key, "[]").await;

    eyre::ensure!(
        matches!(result, Err(LedgerStoreError::InvalidKey(_))),
        "expected InvalidKey, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_survives_a_restart_on_disk() -> Result<(), eyre::Report> {
    let temp = tempfile::tempdir()?;
    let path = Utf8Path::from_path(temp.path())
        .ok_or_else(|| eyre::eyre!("temporary path is not UTF-8"))?;

    let service = build_service(
        Arc::new(ScriptedExecutor::default()),
        Arc::new(FileLedgerStore::open(path)?),
        FailurePolicy::Continue,
    )?;
    let user = service
        .list_users(PageNumber::FIRST)
        .await?
        .into_iter()
        .nth(4)
        .ok_or_else(|| eyre::eyre!("directory returned too few users"))?;
    service.select_user(user)?;
    service.toggle_task("gou")?;
    let outcome = service.execute(&()).await?;

    let restarted = SuspensionHistoryService::new(
        Arc::new(FileLedgerStore::open(path)?),
        DEFAULT_LEDGER_KEY,
    );
    let loaded = restarted.init().await;

    eyre::ensure!(
        loaded == LedgerLoadOutcome::Loaded(1),
        "unexpected load outcome {loaded:?}"
    );
    eyre::ensure!(
        restarted.list() == vec![outcome.record],
        "reloaded history should match"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn legacy_array_on_disk_is_accepted() -> Result<(), eyre::Report> {
    let temp = tempfile::tempdir()?;
    let path = Utf8Path::from_path(temp.path())
        .ok_or_else(|| eyre::eyre!("temporary path is not UTF-8"))?;
    std::fs::write(
        path.join("recentSuspensions.json"),
        r#"[{"id":"suspension-1700000000000","userId":"user-1-7","name":"User 7",
            "timestamp":"2023-11-14T22:13:20Z","actions":["Suspend in AD"]}]"#,
    )?;
    let history = SuspensionHistoryService::new(
        Arc::new(FileLedgerStore::open(path)?),
        DEFAULT_LEDGER_KEY,
    );

    let loaded = history.init().await;

    eyre::ensure!(
        loaded == LedgerLoadOutcome::Loaded(1),
        "unexpected load outcome {loaded:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn corrupt_file_on_disk_starts_an_empty_history() -> Result<(), eyre::Report> {
    let temp = tempfile::tempdir()?;
    let path = Utf8Path::from_path(temp.path())
        .ok_or_else(|| eyre::eyre!("temporary path is not UTF-8"))?;
    std::fs::write(path.join("recentSuspensions.json"), "{{{{")?;
    let history = SuspensionHistoryService::new(
        Arc::new(FileLedgerStore::open(path)?),
        DEFAULT_LEDGER_KEY,
    );

    let loaded = history.init().await;

    eyre::ensure!(
        matches!(loaded, LedgerLoadOutcome::Recovered { .. }),
        "unexpected load outcome {loaded:?}"
    );
    eyre::ensure!(history.list().is_empty(), "history should start empty");
    Ok(())
}
