//! Task and pull request link parsing.
//!
//! Both link kinds are matched against anchored patterns built once from the
//! tracker and code-host settings.

use crate::error::AppError;
use crate::models::WorkItem;
use crate::services::settings::{CodeHostSettings, TrackerSettings};
use regex::Regex;

/// Error for blank input in either link field.
pub const EMPTY_URL: &str = "URL must not be empty";

/// The one message reported for any malformed pull request link.
pub const INVALID_REVIEW_URL: &str =
    "Invalid pull request URL. Expected format: https://github.com/<owner>/<repo>/pull/<number>";

/// Error for a pull request already attached to the same task.
pub const DUPLICATE_REVIEW_URL: &str = "This pull request has already been added";

/// Form field names used in validation errors.
pub const TASK_URL_FIELD: &str = "taskUrl";
pub const REVIEW_URL_FIELD: &str = "reviewUrl";

/// A parsed tracker task link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRef {
    /// The trimmed link.
    pub url: String,

    /// Task key (e.g., "SPD-1234").
    pub key: String,

    /// Numeric suffix of the key, kept as written.
    pub number: String,
}

/// A parsed pull request link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRef {
    /// The link exactly as submitted.
    pub url: String,
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl ReviewRef {
    /// Repository path in `owner/repo` form.
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Parser for task and pull request links.
#[derive(Debug, Clone)]
pub struct IdentifierParser {
    task_pattern: Regex,
    review_pattern: Regex,
    task_example: String,
}

impl Default for IdentifierParser {
    fn default() -> Self {
        Self::new(&TrackerSettings::default(), &CodeHostSettings::default())
    }
}

impl IdentifierParser {
    pub fn new(tracker: &TrackerSettings, code_host: &CodeHostSettings) -> Self {
        // Settings values are escaped, so these patterns always compile.
        let task_pattern = Regex::new(&format!(
            r"^https://{}/({}-([0-9]+))$",
            regex::escape(&tracker.host),
            regex::escape(&tracker.task_prefix)
        ))
        .expect("task link pattern");

        let review_pattern = Regex::new(&format!(
            r"^https?://{}(?:\.[A-Za-z0-9_.-]+)?/([^/\s]+)/([^/\s]+)/pull/([0-9]+)(?:#.*)?$",
            regex::escape(&code_host.host_base)
        ))
        .expect("pull request link pattern");

        Self {
            task_pattern,
            review_pattern,
            task_example: format!("https://{}/{}-XXXX", tracker.host, tracker.task_prefix),
        }
    }

    /// Parse a tracker task link. Surrounding whitespace is ignored.
    pub fn parse_task_reference(&self, url: &str) -> Result<TaskRef, AppError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::invalid_input_field(EMPTY_URL, TASK_URL_FIELD));
        }

        let caps = self.task_pattern.captures(url).ok_or_else(|| {
            AppError::invalid_input_field(
                format!(
                    "Please enter a valid task link in the format: {}",
                    self.task_example
                ),
                TASK_URL_FIELD,
            )
        })?;

        Ok(TaskRef {
            url: url.to_string(),
            key: caps[1].to_string(),
            number: caps[2].to_string(),
        })
    }

    /// Parse a pull request link. The link is matched as submitted, untrimmed.
    pub fn parse_review_link(&self, url: &str) -> Result<ReviewRef, AppError> {
        if url.trim().is_empty() {
            return Err(AppError::invalid_input_field(EMPTY_URL, REVIEW_URL_FIELD));
        }

        let caps = self
            .review_pattern
            .captures(url)
            .ok_or_else(invalid_review_url)?;

        // Digits only, but may still overflow u64
        let number = caps[3].parse::<u64>().map_err(|_| invalid_review_url())?;

        Ok(ReviewRef {
            url: url.to_string(),
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            number,
        })
    }
}

fn invalid_review_url() -> AppError {
    AppError::invalid_input_field(INVALID_REVIEW_URL, REVIEW_URL_FIELD)
}

/// Reject a task whose number is already present among `work_items`.
pub fn ensure_task_not_duplicate(work_items: &[WorkItem], task: &TaskRef) -> Result<(), AppError> {
    if work_items.iter().any(|w| w.number == task.number) {
        return Err(AppError::invalid_input_field(
            format!("Task {} has already been added", task.number),
            TASK_URL_FIELD,
        ));
    }
    Ok(())
}

/// Reject a pull request whose exact URL is already attached to `work_item`.
pub fn ensure_review_not_duplicate(work_item: &WorkItem, review: &ReviewRef) -> Result<(), AppError> {
    if work_item.has_review_url(&review.url) {
        return Err(AppError::invalid_input_field(
            DUPLICATE_REVIEW_URL,
            REVIEW_URL_FIELD,
        ));
    }
    Ok(())
}
