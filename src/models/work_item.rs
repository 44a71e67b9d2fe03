//! Tracker task (work item) model.

use super::review_link::ReviewLink;
use serde::{Deserialize, Serialize};

/// A tracked task contributing content and code changes to an RFC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    /// Local identifier.
    pub id: String,

    /// Tracker URL as submitted (trimmed).
    pub url: String,

    /// Numeric suffix of the task key, used to detect duplicates.
    pub number: String,

    /// Task title from the tracker.
    pub title: String,

    /// Task description from the tracker.
    pub description: String,

    /// Pull requests in insertion order.
    #[serde(default)]
    pub review_links: Vec<ReviewLink>,
}

impl WorkItem {
    /// Check whether a pull request with this exact URL is already attached.
    pub fn has_review_url(&self, url: &str) -> bool {
        self.review_links.iter().any(|link| link.url == url)
    }

    /// Check whether at least one pull request is attached.
    pub fn has_review_links(&self) -> bool {
        !self.review_links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewState;

    fn link(url: &str) -> ReviewLink {
        ReviewLink {
            id: "1".to_string(),
            url: url.to_string(),
            repository: "acme/widget".to_string(),
            number: 42,
            state: ReviewState::Open,
            author: "developer".to_string(),
        }
    }

    #[test]
    fn test_has_review_url_is_exact_match() {
        let item = WorkItem {
            id: "t1".to_string(),
            url: "https://tracker.yandex.ru/SPD-1".to_string(),
            number: "1".to_string(),
            title: "Title".to_string(),
            description: String::new(),
            review_links: vec![link("https://github.com/acme/widget/pull/42")],
        };

        assert!(item.has_review_url("https://github.com/acme/widget/pull/42"));
        // No normalization: a fragment makes it a different URL
        assert!(!item.has_review_url("https://github.com/acme/widget/pull/42#files"));
        assert!(item.has_review_links());
    }
}
