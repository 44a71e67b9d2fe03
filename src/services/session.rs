//! Editing session for one open RFC.
//!
//! A session owns the [`RfcEditor`] for the RFC, performs the provider
//! lookups that adding tasks and pull requests need, and feeds every change
//! to a background [`AutosaveHandle`]. Only one session per RFC is expected
//! to be open at a time.

use crate::error::AppError;
use crate::models::{ChangeClass, ReviewLink, RfcAggregate, RfcStatus, WorkItem};
use crate::services::autosave::{AutosaveHandle, AutosaveStatus};
use crate::services::editor::RfcEditor;
use crate::services::identifiers::{ReviewRef, TaskRef};
use crate::services::pending::PendingInputs;
use crate::services::providers::Providers;
use crate::services::settings::EngineSettings;
use crate::services::store::{delete_with_summary, save_with_summary, RfcStore};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;

/// An open RFC with autosave running.
pub struct RfcSession {
    editor: RfcEditor,
    store: Arc<dyn RfcStore>,
    providers: Providers,
    snapshots: watch::Sender<RfcAggregate>,
    autosave: AutosaveHandle,
}

impl std::fmt::Debug for RfcSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RfcSession")
            .field("id", &self.id())
            .field("status", &self.status())
            .field("autosave", &self.autosave_status())
            .finish()
    }
}

impl RfcSession {
    /// Open the RFC with the given id and start autosave.
    ///
    /// An RFC listed on the dashboard but never edited gets an empty draft,
    /// which is saved right away. An id that is not listed at all is
    /// `NotFound`.
    pub async fn open(
        store: Arc<dyn RfcStore>,
        providers: Providers,
        settings: &EngineSettings,
        id: &str,
    ) -> Result<Self, AppError> {
        let rfc = match store.load_aggregate(id).await? {
            Some(rfc) => rfc,
            None => {
                let summaries = store.load_summaries().await?;
                let summary = summaries
                    .iter()
                    .find(|s| s.id == id)
                    .ok_or_else(|| AppError::not_found_with_id("RFC", id))?;

                log::info!("Creating empty draft for RFC {}", id);
                let rfc = RfcAggregate::new_draft(id, summary.title.clone(), Utc::now());
                save_with_summary(store.as_ref(), &rfc).await?;
                rfc
            }
        };

        let (snapshots, snapshot_rx) = watch::channel(rfc.clone());
        let autosave = AutosaveHandle::start_background(
            store.clone(),
            snapshot_rx,
            settings.autosave.interval_secs,
        );

        Ok(Self {
            editor: RfcEditor::new(rfc, settings),
            store,
            providers,
            snapshots,
            autosave,
        })
    }

    pub fn id(&self) -> &str {
        &self.editor.aggregate().id
    }

    pub fn aggregate(&self) -> &RfcAggregate {
        self.editor.aggregate()
    }

    pub fn pending(&self) -> &PendingInputs {
        self.editor.pending()
    }

    pub fn status(&self) -> RfcStatus {
        self.editor.status()
    }

    pub fn can_generate(&self) -> bool {
        self.editor.can_generate()
    }

    pub fn autosave_status(&self) -> AutosaveStatus {
        self.autosave.status()
    }

    pub fn subscribe_autosave(&self) -> watch::Receiver<AutosaveStatus> {
        self.autosave.subscribe()
    }

    // --- Pending input ---

    pub fn set_task_input(&mut self, url: impl Into<String>) {
        self.editor.set_task_input(url);
    }

    pub fn set_review_input(&mut self, work_item_id: &str, url: impl Into<String>) {
        self.editor.set_review_input(work_item_id, url);
    }

    // --- Tasks ---

    /// Add the task in the pending new-task field.
    pub async fn add_pending_work_item(&mut self) -> Result<WorkItem, AppError> {
        let task = self.editor.prepare_pending_work_item()?;
        self.finish_work_item(task).await
    }

    /// Add a task by tracker link.
    pub async fn add_work_item(&mut self, url: &str) -> Result<WorkItem, AppError> {
        let task = self.editor.prepare_work_item(url)?;
        self.finish_work_item(task).await
    }

    async fn finish_work_item(&mut self, task: TaskRef) -> Result<WorkItem, AppError> {
        let info = match self.providers.tasks.fetch_task(&task).await {
            Ok(info) => info,
            Err(e) => {
                log::warn!("Task lookup for {} failed: {}", task.key, e);
                self.editor.record_task_error(&e);
                return Err(e);
            }
        };

        let item = self.editor.add_work_item(task, info)?.clone();
        self.publish();
        Ok(item)
    }

    pub fn remove_work_item(&mut self, work_item_id: &str) -> Result<WorkItem, AppError> {
        let removed = self.editor.remove_work_item(work_item_id)?;
        self.publish();
        Ok(removed)
    }

    // --- Pull requests ---

    /// Add the pull request in a task's pending field.
    pub async fn submit_pending_review_link(
        &mut self,
        work_item_id: &str,
    ) -> Result<ReviewLink, AppError> {
        let review = self.editor.prepare_pending_review_link(work_item_id)?;
        self.finish_review_link(work_item_id, review).await
    }

    /// Add a pull request to a task by link.
    pub async fn add_review_link(
        &mut self,
        work_item_id: &str,
        url: &str,
    ) -> Result<ReviewLink, AppError> {
        let review = self.editor.prepare_review_link(work_item_id, url)?;
        self.finish_review_link(work_item_id, review).await
    }

    async fn finish_review_link(
        &mut self,
        work_item_id: &str,
        review: ReviewRef,
    ) -> Result<ReviewLink, AppError> {
        let info = match self.providers.reviews.fetch_review(&review).await {
            Ok(info) => info,
            Err(e) => {
                log::warn!("Pull request lookup for {} failed: {}", review.url, e);
                self.editor.record_review_error(work_item_id, &e);
                return Err(e);
            }
        };

        let link = self.editor.add_review_link(work_item_id, review, info)?.clone();
        self.publish();
        Ok(link)
    }

    pub fn remove_review_link(
        &mut self,
        work_item_id: &str,
        review_link_id: &str,
    ) -> Result<ReviewLink, AppError> {
        let removed = self.editor.remove_review_link(work_item_id, review_link_id)?;
        self.publish();
        Ok(removed)
    }

    // --- Version table ---

    pub fn set_change_class(
        &mut self,
        repository: &str,
        change_class: ChangeClass,
    ) -> Result<(), AppError> {
        self.editor.set_change_class(repository, change_class)?;
        self.publish();
        Ok(())
    }

    pub fn set_next_version(&mut self, repository: &str, version: &str) -> Result<(), AppError> {
        self.editor.set_next_version(repository, version)?;
        self.publish();
        Ok(())
    }

    pub fn set_current_version(&mut self, repository: &str, version: &str) -> Result<(), AppError> {
        self.editor.set_current_version(repository, version)?;
        self.publish();
        Ok(())
    }

    // --- Metadata and status ---

    pub fn set_regression_link(&mut self, link: &str) {
        self.editor.set_regression_link(link);
        self.publish();
    }

    pub fn rename(&mut self, title: &str) -> Result<(), AppError> {
        self.editor.rename(title)?;
        self.publish();
        Ok(())
    }

    /// Generate the document and mark the RFC ready.
    pub fn generate(&mut self) -> Result<String, AppError> {
        let document = self.editor.generate()?.to_string();
        self.publish();
        Ok(document)
    }

    pub fn revert_to_draft(&mut self) {
        self.editor.revert_to_draft();
        self.publish();
    }

    // --- Lifecycle ---

    /// Persist the current state without waiting for the next autosave tick.
    pub async fn save_now(&self) -> Result<(), AppError> {
        self.autosave.save_now().await
    }

    /// Flush pending changes and stop autosave.
    ///
    /// Autosave is stopped even when the final save fails.
    pub async fn close(self) -> Result<(), AppError> {
        let flushed = self.autosave.save_now().await;
        self.autosave.stop().await?;
        log::debug!("Closed RFC {}", self.editor.aggregate().id);
        flushed
    }

    /// Delete the RFC and its dashboard entry, ending the session.
    pub async fn delete(self) -> Result<(), AppError> {
        // Stopped first so a late tick cannot write the aggregate back
        self.autosave.stop().await?;

        let id = self.editor.aggregate().id.clone();
        delete_with_summary(self.store.as_ref(), &id).await?;
        log::info!("Deleted RFC {}", id);
        Ok(())
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.editor.aggregate().clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::FixtureProvider;
    use crate::services::store::MemoryRfcStore;
    use crate::services::RfcCatalog;

    async fn listed_rfc(store: &Arc<MemoryRfcStore>) -> String {
        let catalog = RfcCatalog::new(store.clone(), &EngineSettings::default());
        catalog.create("Weekly release").await.unwrap().id
    }

    async fn open(store: &Arc<MemoryRfcStore>, id: &str) -> RfcSession {
        RfcSession::open(
            store.clone(),
            Providers::fixture(FixtureProvider::new()),
            &EngineSettings::default(),
            id,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_open_unknown_id_is_not_found() {
        let store = Arc::new(MemoryRfcStore::new());
        let err = RfcSession::open(
            store,
            Providers::fixture(FixtureProvider::new()),
            &EngineSettings::default(),
            "missing",
        )
        .await
        .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_open_listed_rfc_creates_empty_draft() {
        let store = Arc::new(MemoryRfcStore::new());
        let id = listed_rfc(&store).await;

        let session = open(&store, &id).await;
        assert_eq!(session.aggregate().title, "Weekly release");
        assert_eq!(session.status(), RfcStatus::Draft);
        assert!(store.load_aggregate(&id).await.unwrap().is_some());

        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_flushes_changes() {
        let store = Arc::new(MemoryRfcStore::new());
        let id = listed_rfc(&store).await;

        let mut session = open(&store, &id).await;
        let item = session
            .add_work_item("https://tracker.yandex.ru/SPD-1")
            .await
            .unwrap();
        session
            .add_review_link(&item.id, "https://github.com/acme/widget/pull/42")
            .await
            .unwrap();
        session.close().await.unwrap();

        let stored = store.load_aggregate(&id).await.unwrap().unwrap();
        assert_eq!(stored.work_items.len(), 1);
        assert_eq!(stored.repositories[0].repository, "acme/widget");

        let summaries = store.load_summaries().await.unwrap();
        assert_eq!(summaries[0].review_link_count, 1);
    }

    #[tokio::test]
    async fn test_invalid_link_is_recorded_as_pending_error() {
        let store = Arc::new(MemoryRfcStore::new());
        let id = listed_rfc(&store).await;
        let mut session = open(&store, &id).await;

        session.set_task_input("not-a-url");
        assert!(session.add_pending_work_item().await.is_err());
        assert!(session.pending().task_error().is_some());
        assert!(session.aggregate().work_items.is_empty());

        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_everything() {
        let store = Arc::new(MemoryRfcStore::new());
        let id = listed_rfc(&store).await;

        let session = open(&store, &id).await;
        session.delete().await.unwrap();

        assert!(store.load_summaries().await.unwrap().is_empty());
        assert_eq!(store.load_aggregate(&id).await.unwrap(), None);
    }
}
