//! Unsent form input held alongside an open RFC.
//!
//! This state belongs to the editing session only. It is never persisted and
//! entries for a task are dropped when the task is removed.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingInputs {
    task_url: String,
    task_error: Option<String>,
    review_urls: HashMap<String, String>,
    review_errors: HashMap<String, String>,
}

impl PendingInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_url(&self) -> &str {
        &self.task_url
    }

    pub fn task_error(&self) -> Option<&str> {
        self.task_error.as_deref()
    }

    /// Edit the new-task field. Editing clears its error.
    pub fn set_task_url(&mut self, url: impl Into<String>) {
        self.task_url = url.into();
        self.task_error = None;
    }

    pub(crate) fn set_task_error(&mut self, message: impl Into<String>) {
        self.task_error = Some(message.into());
    }

    pub(crate) fn clear_task(&mut self) {
        self.task_url.clear();
        self.task_error = None;
    }

    pub fn review_url(&self, work_item_id: &str) -> &str {
        self.review_urls
            .get(work_item_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn review_error(&self, work_item_id: &str) -> Option<&str> {
        self.review_errors.get(work_item_id).map(String::as_str)
    }

    /// Edit the pull request field of a task. Editing clears its error.
    pub fn set_review_url(&mut self, work_item_id: &str, url: impl Into<String>) {
        self.review_urls.insert(work_item_id.to_string(), url.into());
        self.review_errors.remove(work_item_id);
    }

    pub(crate) fn set_review_error(&mut self, work_item_id: &str, message: impl Into<String>) {
        self.review_errors
            .insert(work_item_id.to_string(), message.into());
    }

    /// Reset the pull request field of a task after a successful submit.
    pub(crate) fn clear_review(&mut self, work_item_id: &str) {
        self.review_urls.insert(work_item_id.to_string(), String::new());
        self.review_errors.remove(work_item_id);
    }

    /// Drop everything held for a removed task.
    pub(crate) fn forget_work_item(&mut self, work_item_id: &str) {
        self.review_urls.remove(work_item_id);
        self.review_errors.remove(work_item_id);
    }

    /// Number of tasks with pending pull request input or errors.
    pub fn tracked_work_items(&self) -> usize {
        self.review_urls
            .keys()
            .chain(self.review_errors.keys())
            .collect::<std::collections::HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_clears_error() {
        let mut pending = PendingInputs::new();
        pending.set_review_url("w1", "bad");
        pending.set_review_error("w1", "Invalid");
        assert_eq!(pending.review_error("w1"), Some("Invalid"));

        pending.set_review_url("w1", "better");
        assert_eq!(pending.review_error("w1"), None);
        assert_eq!(pending.review_url("w1"), "better");
    }

    #[test]
    fn test_forget_work_item() {
        let mut pending = PendingInputs::new();
        pending.set_review_url("w1", "x");
        pending.set_review_error("w2", "oops");
        assert_eq!(pending.tracked_work_items(), 2);

        pending.forget_work_item("w1");
        pending.forget_work_item("w2");
        assert_eq!(pending.tracked_work_items(), 0);
        assert_eq!(pending.review_url("w1"), "");
    }
}
