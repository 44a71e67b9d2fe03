//! End-to-end editing workflow tests.
//!
//! These drive an RFC through a session exactly as the editor page would:
//! create it on the dashboard, add tasks and pull requests, adjust the
//! version table, generate, then change it again and watch the generated
//! document get invalidated.

use rfc_assembler_lib::models::{ChangeClass, ReviewState, RfcStatus};
use rfc_assembler_lib::services::identifiers::{DUPLICATE_REVIEW_URL, INVALID_REVIEW_URL};
use rfc_assembler_lib::services::providers::{ReviewInfo, TaskInfo};
use rfc_assembler_lib::services::{
    EngineSettings, FixtureProvider, MemoryRfcStore, Providers, RepositoryPolicy, RfcCatalog,
    RfcSession, RfcStore,
};
use std::sync::Arc;

const TASK_URL: &str = "https://tracker.yandex.ru/SPD-1234";
const REVIEW_URL: &str = "https://github.example.com/acme/widget/pull/42";

fn fixture() -> FixtureProvider {
    FixtureProvider::new()
        .with_task(
            "SPD-1234",
            TaskInfo {
                title: "SPD-1234: Fix payment retries".to_string(),
                description: "Retries were not idempotent.".to_string(),
            },
        )
        .with_review(
            REVIEW_URL,
            ReviewInfo {
                state: ReviewState::Merged,
                author: "alice".to_string(),
            },
        )
}

async fn open_new(store: &Arc<MemoryRfcStore>, settings: &EngineSettings) -> RfcSession {
    let catalog = RfcCatalog::new(store.clone(), settings);
    let summary = catalog.create("Release 2024-05").await.unwrap();
    RfcSession::open(store.clone(), Providers::fixture(fixture()), settings, &summary.id)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_workflow() {
    let store = Arc::new(MemoryRfcStore::new());
    let mut session = open_new(&store, &EngineSettings::default()).await;

    // Empty RFC cannot be generated
    assert!(!session.can_generate());
    assert!(session.generate().is_err());
    assert_eq!(session.status(), RfcStatus::Draft);

    let item = session.add_work_item(TASK_URL).await.unwrap();
    assert_eq!(item.number, "1234");
    assert_eq!(item.title, "SPD-1234: Fix payment retries");

    // A task without pull requests is not enough
    assert!(!session.can_generate());

    let link = session.add_review_link(&item.id, REVIEW_URL).await.unwrap();
    assert_eq!(link.repository, "acme/widget");
    assert_eq!(link.number, 42);
    assert_eq!(link.state, ReviewState::Merged);

    let entry = &session.aggregate().repositories[0];
    assert_eq!(entry.repository, "acme/widget");
    assert_eq!(entry.current_version, "1.0.0");
    assert_eq!(entry.change_class, ChangeClass::Patch);
    assert_eq!(entry.next_version, "1.0.1");

    let document = session.generate().unwrap();
    assert!(document.contains("• acme/widget Build tag 1.0.1"));
    assert!(document.contains("• acme/widget Roll back to tag 1.0.0"));
    assert_eq!(session.status(), RfcStatus::Ready);
    assert!(session.aggregate().generated_at.is_some());

    // Generation is deterministic
    let again = session.generate().unwrap();
    assert_eq!(document, again);

    // Any structural change sends it back to draft and drops the document
    session
        .add_review_link(&item.id, "https://github.com/acme/gadget/pull/7")
        .await
        .unwrap();
    assert_eq!(session.status(), RfcStatus::Draft);
    assert!(session.aggregate().generated_document.is_none());
    assert!(session.aggregate().generated_at.is_none());
    assert_eq!(session.aggregate().repositories.len(), 2);

    session.close().await.unwrap();

    let summaries = store.load_summaries().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].work_item_count, 1);
    assert_eq!(summaries[0].review_link_count, 2);
}

#[tokio::test]
async fn test_invalid_and_duplicate_links() {
    let store = Arc::new(MemoryRfcStore::new());
    let mut session = open_new(&store, &EngineSettings::default()).await;
    let item = session.add_work_item(TASK_URL).await.unwrap();

    let err = session.add_review_link(&item.id, "not-a-url").await.unwrap_err();
    assert_eq!(err.to_string(), INVALID_REVIEW_URL);
    assert_eq!(session.pending().review_error(&item.id), Some(INVALID_REVIEW_URL));
    assert!(session.aggregate().work_items[0].review_links.is_empty());

    session.add_review_link(&item.id, REVIEW_URL).await.unwrap();
    let err = session.add_review_link(&item.id, REVIEW_URL).await.unwrap_err();
    assert_eq!(err.to_string(), DUPLICATE_REVIEW_URL);
    assert_eq!(session.aggregate().work_items[0].review_links.len(), 1);

    let err = session
        .add_work_item("https://tracker.yandex.ru/SPD-1234")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Task 1234 has already been added");
    assert_eq!(session.aggregate().work_items.len(), 1);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_pending_inputs() {
    let store = Arc::new(MemoryRfcStore::new());
    let mut session = open_new(&store, &EngineSettings::default()).await;

    session.set_task_input(format!("  {}  ", TASK_URL));
    let item = session.add_pending_work_item().await.unwrap();
    assert_eq!(session.pending().task_url(), "");

    session.set_review_input(&item.id, REVIEW_URL);
    session.submit_pending_review_link(&item.id).await.unwrap();
    assert_eq!(session.pending().review_url(&item.id), "");
    assert_eq!(session.pending().review_error(&item.id), None);

    session.set_review_input(&item.id, "https://gitlab.com/a/b/-/merge_requests/1");
    assert!(session.submit_pending_review_link(&item.id).await.is_err());
    assert!(session.pending().review_error(&item.id).is_some());

    // Editing the field clears its error
    session.set_review_input(&item.id, "https://github.com/a/b/pull/1");
    assert_eq!(session.pending().review_error(&item.id), None);

    // Removing the task discards its pending input
    session.remove_work_item(&item.id).unwrap();
    assert_eq!(session.pending().review_url(&item.id), "");
    assert!(session.aggregate().repositories.is_empty());

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_version_table_edits_do_not_invalidate() {
    let store = Arc::new(MemoryRfcStore::new());
    let mut session = open_new(&store, &EngineSettings::default()).await;
    let item = session.add_work_item(TASK_URL).await.unwrap();
    session.add_review_link(&item.id, REVIEW_URL).await.unwrap();
    session.generate().unwrap();

    session.set_current_version("acme/widget", "2.3.4").unwrap();
    session.set_change_class("acme/widget", ChangeClass::Major).unwrap();
    assert_eq!(session.aggregate().repositories[0].next_version, "3.0.0");

    session.set_next_version("acme/widget", "3.0.0-rc1").unwrap();
    session.set_regression_link("https://allure.example.com/launch/1");
    session.rename("Release 2024-06").unwrap();

    assert_eq!(session.status(), RfcStatus::Ready);
    assert!(session.aggregate().generated_document.is_some());

    let err = session.set_current_version("acme/widget", "2.3").unwrap_err();
    assert!(err.is_invalid_input());
    assert_eq!(session.aggregate().repositories[0].current_version, "2.3.4");

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_revert_to_draft_keeps_document() {
    let store = Arc::new(MemoryRfcStore::new());
    let mut session = open_new(&store, &EngineSettings::default()).await;
    let item = session.add_work_item(TASK_URL).await.unwrap();
    session.add_review_link(&item.id, REVIEW_URL).await.unwrap();
    let document = session.generate().unwrap();

    session.revert_to_draft();
    assert_eq!(session.status(), RfcStatus::Draft);
    assert_eq!(session.aggregate().generated_document.as_deref(), Some(document.as_str()));

    // A structural change after reverting still drops the old document
    let link_id = session.aggregate().work_items[0].review_links[0].id.clone();
    session.remove_review_link(&item.id, &link_id).unwrap();
    assert!(session.aggregate().generated_document.is_none());

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_repository_policies() {
    for (policy, expected) in [
        (RepositoryPolicy::Reset, "1.0.1"),
        (RepositoryPolicy::PreserveOverrides, "4.1.0"),
    ] {
        let mut settings = EngineSettings::default();
        settings.repositories.policy = policy;

        let store = Arc::new(MemoryRfcStore::new());
        let mut session = open_new(&store, &settings).await;
        let item = session.add_work_item(TASK_URL).await.unwrap();
        session.add_review_link(&item.id, REVIEW_URL).await.unwrap();
        session.set_current_version("acme/widget", "4.0.3").unwrap();
        session.set_change_class("acme/widget", ChangeClass::Minor).unwrap();

        // Adding a link to another repository re-derives the table
        session
            .add_review_link(&item.id, "https://github.com/acme/gadget/pull/1")
            .await
            .unwrap();

        let widget = session.aggregate().repository("acme/widget").unwrap();
        assert_eq!(widget.next_version, expected, "policy {:?}", policy);

        session.close().await.unwrap();
    }
}
