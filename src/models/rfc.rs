//! RFC aggregate, summary and dashboard statistics models.

use super::repository_entry::RepositoryEntry;
use super::work_item::WorkItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of an RFC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RfcStatus {
    #[default]
    Draft,
    Ready,
}

impl std::fmt::Display for RfcStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// Full mutable state of one RFC.
///
/// `generated_document` and `generated_at` are set together by generation and
/// cleared together by any change to the task or repository set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfcAggregate {
    pub id: String,

    pub title: String,

    pub status: RfcStatus,

    /// Tasks in insertion order.
    #[serde(default)]
    pub work_items: Vec<WorkItem>,

    /// Version table, one row per repository referenced by any pull request.
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,

    /// Regression test report link. Empty means absent.
    #[serde(default)]
    pub regression_link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_document: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,

    pub updated_at: DateTime<Utc>,
}

impl RfcAggregate {
    /// Create an empty draft.
    pub fn new_draft(id: impl Into<String>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: RfcStatus::Draft,
            work_items: Vec::new(),
            repositories: Vec::new(),
            regression_link: String::new(),
            generated_document: None,
            generated_at: None,
            updated_at: now,
        }
    }

    /// At least one task exists and at least one task has a pull request.
    pub fn can_generate(&self) -> bool {
        !self.work_items.is_empty() && self.work_items.iter().any(WorkItem::has_review_links)
    }

    /// Total number of pull requests across all tasks.
    pub fn review_link_count(&self) -> usize {
        self.work_items.iter().map(|w| w.review_links.len()).sum()
    }

    pub fn work_item(&self, work_item_id: &str) -> Option<&WorkItem> {
        self.work_items.iter().find(|w| w.id == work_item_id)
    }

    pub fn repository(&self, repository: &str) -> Option<&RepositoryEntry> {
        self.repositories.iter().find(|r| r.repository == repository)
    }

    /// Check if this RFC is ready for copying.
    pub fn is_ready(&self) -> bool {
        self.status == RfcStatus::Ready
    }

    /// Project this aggregate into its dashboard summary.
    pub fn summary(&self) -> RfcSummary {
        RfcSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            work_item_count: self.work_items.len(),
            review_link_count: self.review_link_count(),
            status: self.status,
            updated_at: self.updated_at,
            generated_at: self.generated_at,
        }
    }
}

/// Lightweight dashboard row for an RFC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfcSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub work_item_count: usize,
    #[serde(default)]
    pub review_link_count: usize,
    pub status: RfcStatus,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfcStats {
    pub total: usize,
    pub draft: usize,
    pub ready: usize,
    pub review_links: usize,
}

impl RfcStats {
    pub fn from_summaries(summaries: &[RfcSummary]) -> Self {
        summaries.iter().fold(Self::default(), |mut stats, s| {
            stats.total += 1;
            match s.status {
                RfcStatus::Draft => stats.draft += 1,
                RfcStatus::Ready => stats.ready += 1,
            }
            stats.review_links += s.review_link_count;
            stats
        })
    }
}
