//! In-memory RFC editing and the draft/ready state machine.
//!
//! Every operation validates first and only then touches the aggregate, so a
//! failed call leaves the RFC exactly as it was. Changes to the task or
//! repository set rebuild the version table and invalidate any generated
//! document; edits to table rows, the regression link or the title do not.
//!
//! Adding a task or pull request is split in two steps (`prepare_*`, then
//! `add_*`) so the caller can fetch provider data in between without holding
//! the aggregate across an await.

use crate::error::AppError;
use crate::models::{ChangeClass, ReviewLink, RfcAggregate, RfcStatus, WorkItem};
use crate::services::document::generate_document;
use crate::services::identifiers::{
    ensure_review_not_duplicate, ensure_task_not_duplicate, IdentifierParser, ReviewRef, TaskRef,
};
use crate::services::pending::PendingInputs;
use crate::services::providers::{ReviewInfo, TaskInfo};
use crate::services::repositories::{rederive_repositories, RepositoryPolicy};
use crate::services::settings::{EngineSettings, TitleSettings};
use crate::services::versioning::{next_version, SemVer};
use chrono::Utc;
use uuid::Uuid;

/// Error shown when generation is requested without any pull request.
pub const CANNOT_GENERATE: &str = "Add at least one task with a pull request before generating";

/// Editor for one open RFC.
#[derive(Debug, Clone)]
pub struct RfcEditor {
    rfc: RfcAggregate,
    pending: PendingInputs,
    parser: IdentifierParser,
    policy: RepositoryPolicy,
    products: Vec<String>,
    titles: TitleSettings,
}

impl RfcEditor {
    pub fn new(rfc: RfcAggregate, settings: &EngineSettings) -> Self {
        Self {
            rfc,
            pending: PendingInputs::new(),
            parser: IdentifierParser::new(&settings.tracker, &settings.code_host),
            policy: settings.repositories.policy,
            products: settings.document.products.clone(),
            titles: settings.titles,
        }
    }

    pub fn aggregate(&self) -> &RfcAggregate {
        &self.rfc
    }

    pub fn into_aggregate(self) -> RfcAggregate {
        self.rfc
    }

    pub fn pending(&self) -> &PendingInputs {
        &self.pending
    }

    pub fn status(&self) -> RfcStatus {
        self.rfc.status
    }

    pub fn can_generate(&self) -> bool {
        self.rfc.can_generate()
    }

    // --- Pending input ---

    pub fn set_task_input(&mut self, url: impl Into<String>) {
        self.pending.set_task_url(url);
    }

    pub fn set_review_input(&mut self, work_item_id: &str, url: impl Into<String>) {
        self.pending.set_review_url(work_item_id, url);
    }

    // --- Tasks ---

    /// Validate the pending new-task link.
    pub fn prepare_pending_work_item(&mut self) -> Result<TaskRef, AppError> {
        let url = self.pending.task_url().to_string();
        self.prepare_work_item(&url)
    }

    /// Validate a task link and check it is not already in the RFC.
    ///
    /// A failure is also recorded as the new-task field error.
    pub fn prepare_work_item(&mut self, url: &str) -> Result<TaskRef, AppError> {
        let result = self
            .parser
            .parse_task_reference(url)
            .and_then(|task| ensure_task_not_duplicate(&self.rfc.work_items, &task).map(|_| task));

        if let Err(e) = &result {
            self.pending.set_task_error(e.to_string());
        }
        result
    }

    /// Show a lookup failure as the new-task field error.
    pub(crate) fn record_task_error(&mut self, error: &AppError) {
        self.pending.set_task_error(error.to_string());
    }

    /// Append a validated task with its tracker metadata.
    pub fn add_work_item(&mut self, task: TaskRef, info: TaskInfo) -> Result<&WorkItem, AppError> {
        // Re-checked: another task may have been added while metadata was fetched
        if let Err(e) = ensure_task_not_duplicate(&self.rfc.work_items, &task) {
            self.pending.set_task_error(e.to_string());
            return Err(e);
        }

        log::debug!("Adding task {} to RFC {}", task.key, self.rfc.id);
        self.rfc.work_items.push(WorkItem {
            id: Uuid::new_v4().to_string(),
            url: task.url,
            number: task.number,
            title: info.title,
            description: info.description,
            review_links: Vec::new(),
        });
        self.pending.clear_task();
        self.after_structural_change();

        let last = self.rfc.work_items.len() - 1;
        Ok(&self.rfc.work_items[last])
    }

    /// Remove a task together with its pull requests and pending input.
    pub fn remove_work_item(&mut self, work_item_id: &str) -> Result<WorkItem, AppError> {
        let index = self.work_item_index(work_item_id)?;

        let removed = self.rfc.work_items.remove(index);
        log::debug!("Removed task {} from RFC {}", removed.url, self.rfc.id);
        self.pending.forget_work_item(work_item_id);
        self.after_structural_change();

        Ok(removed)
    }

    // --- Pull requests ---

    /// Validate the pending pull request link of a task.
    pub fn prepare_pending_review_link(&mut self, work_item_id: &str) -> Result<ReviewRef, AppError> {
        let url = self.pending.review_url(work_item_id).to_string();
        self.prepare_review_link(work_item_id, &url)
    }

    /// Validate a pull request link and check it is not already on the task.
    ///
    /// A failure is also recorded as the error of that task's field.
    pub fn prepare_review_link(
        &mut self,
        work_item_id: &str,
        url: &str,
    ) -> Result<ReviewRef, AppError> {
        let index = self.work_item_index(work_item_id)?;
        let result = self.parser.parse_review_link(url).and_then(|review| {
            ensure_review_not_duplicate(&self.rfc.work_items[index], &review).map(|_| review)
        });

        if let Err(e) = &result {
            self.pending.set_review_error(work_item_id, e.to_string());
        }
        result
    }

    pub(crate) fn record_review_error(&mut self, work_item_id: &str, error: &AppError) {
        self.pending.set_review_error(work_item_id, error.to_string());
    }

    /// Attach a validated pull request with its code-host state.
    pub fn add_review_link(
        &mut self,
        work_item_id: &str,
        review: ReviewRef,
        info: ReviewInfo,
    ) -> Result<&ReviewLink, AppError> {
        let index = self.work_item_index(work_item_id)?;
        if let Err(e) = ensure_review_not_duplicate(&self.rfc.work_items[index], &review) {
            self.pending.set_review_error(work_item_id, e.to_string());
            return Err(e);
        }

        let repository = review.repository();
        log::debug!("Adding pull request {} to task {}", review.url, work_item_id);
        self.rfc.work_items[index].review_links.push(ReviewLink {
            id: Uuid::new_v4().to_string(),
            url: review.url,
            repository,
            number: review.number,
            state: info.state,
            author: info.author,
        });
        self.pending.clear_review(work_item_id);
        self.after_structural_change();

        let links = &self.rfc.work_items[index].review_links;
        Ok(&links[links.len() - 1])
    }

    pub fn remove_review_link(
        &mut self,
        work_item_id: &str,
        review_link_id: &str,
    ) -> Result<ReviewLink, AppError> {
        let index = self.work_item_index(work_item_id)?;
        let links = &mut self.rfc.work_items[index].review_links;
        let position = links
            .iter()
            .position(|l| l.id == review_link_id)
            .ok_or_else(|| AppError::not_found_with_id("Pull request", review_link_id))?;

        let removed = links.remove(position);
        self.after_structural_change();

        Ok(removed)
    }

    // --- Version table ---

    /// Choose the bump category and recompute the next version from the current one.
    pub fn set_change_class(&mut self, repository: &str, change_class: ChangeClass) -> Result<(), AppError> {
        let index = self.repository_index(repository)?;
        let next = next_version(&self.rfc.repositories[index].current_version, change_class)?;

        let entry = &mut self.rfc.repositories[index];
        entry.change_class = change_class;
        entry.next_version = next;
        self.touch();
        Ok(())
    }

    /// Override the next version verbatim.
    pub fn set_next_version(&mut self, repository: &str, version: impl Into<String>) -> Result<(), AppError> {
        let index = self.repository_index(repository)?;
        self.rfc.repositories[index].next_version = version.into();
        self.touch();
        Ok(())
    }

    /// Set the deployed version and recompute the next one for the chosen category.
    pub fn set_current_version(&mut self, repository: &str, version: &str) -> Result<(), AppError> {
        let index = self.repository_index(repository)?;
        let current: SemVer = version.parse()?;

        let next = current.bump(self.rfc.repositories[index].change_class)?;

        let entry = &mut self.rfc.repositories[index];
        entry.current_version = current.to_string();
        entry.next_version = next.to_string();
        self.touch();
        Ok(())
    }

    // --- Metadata ---

    pub fn set_regression_link(&mut self, link: impl Into<String>) {
        self.rfc.regression_link = link.into();
        self.touch();
    }

    pub fn rename(&mut self, title: &str) -> Result<(), AppError> {
        self.titles.validate(title)?;
        self.rfc.title = title.to_string();
        self.touch();
        Ok(())
    }

    // --- Status ---

    /// Render the document and mark the RFC ready.
    pub fn generate(&mut self) -> Result<&str, AppError> {
        if !self.rfc.can_generate() {
            return Err(AppError::invalid_input(CANNOT_GENERATE));
        }

        let document = generate_document(&self.rfc, &self.products);
        let now = Utc::now();
        self.rfc.generated_document = Some(document);
        self.rfc.generated_at = Some(now);
        self.rfc.status = RfcStatus::Ready;
        self.rfc.updated_at = now;
        log::info!("Generated RFC {}", self.rfc.id);

        Ok(self.rfc.generated_document.as_deref().unwrap_or_default())
    }

    /// Return to draft. The last generated document stays until the next change.
    pub fn revert_to_draft(&mut self) {
        self.rfc.status = RfcStatus::Draft;
        self.touch();
    }

    // --- Internals ---

    fn work_item_index(&self, work_item_id: &str) -> Result<usize, AppError> {
        self.rfc
            .work_items
            .iter()
            .position(|w| w.id == work_item_id)
            .ok_or_else(|| AppError::not_found_with_id("Task", work_item_id))
    }

    fn repository_index(&self, repository: &str) -> Result<usize, AppError> {
        self.rfc
            .repositories
            .iter()
            .position(|r| r.repository == repository)
            .ok_or_else(|| AppError::not_found_with_id("Repository", repository))
    }

    fn after_structural_change(&mut self) {
        self.rfc.repositories =
            rederive_repositories(&self.rfc.work_items, &self.rfc.repositories, self.policy);

        if self.rfc.is_ready() {
            log::info!("RFC {} changed after generation, back to draft", self.rfc.id);
            self.rfc.status = RfcStatus::Draft;
        }
        self.rfc.generated_document = None;
        self.rfc.generated_at = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.rfc.updated_at = Utc::now();
    }
}
