//! Sources of task metadata and pull request state.
//!
//! The engine never invents this data itself. A session is given one provider
//! of each kind: the table-driven [`FixtureProvider`] for tests and offline
//! use, or the network clients in `tracker_client` and `code_host_client`.

use crate::error::AppError;
use crate::models::ReviewState;
use crate::services::code_host_client::{CodeHostClient, CodeHostClientConfig};
use crate::services::identifiers::{ReviewRef, TaskRef};
use crate::services::settings::EngineSettings;
use crate::services::tracker_client::{TrackerClient, TrackerClientConfig};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Title and description of a tracker task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub title: String,
    pub description: String,
}

/// State and author of a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInfo {
    pub state: ReviewState,
    pub author: String,
}

/// Looks up task metadata in the tracker.
#[async_trait]
pub trait TaskInfoProvider: Send + Sync {
    async fn fetch_task(&self, task: &TaskRef) -> Result<TaskInfo, AppError>;
}

/// Looks up pull request state on the code host.
#[async_trait]
pub trait ReviewInfoProvider: Send + Sync {
    async fn fetch_review(&self, review: &ReviewRef) -> Result<ReviewInfo, AppError>;
}

/// Title suffix used for tasks missing from the fixture table.
pub const FIXTURE_TASK_TITLE: &str = "Critical bug fix";

/// Description used for tasks missing from the fixture table.
pub const FIXTURE_TASK_DESCRIPTION: &str =
    "Task description from the tracker. Detailed description of the problem and how it is solved.";

/// Author used for pull requests missing from the fixture table.
pub const FIXTURE_REVIEW_AUTHOR: &str = "developer";

/// Deterministic, table-driven provider.
///
/// Entries are keyed by task key (`SPD-42`) and pull request URL. Anything
/// not in the table gets a fixed fallback derived only from the key, so
/// repeated lookups always agree.
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    tasks: HashMap<String, TaskInfo>,
    reviews: HashMap<String, ReviewInfo>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register task metadata for a task key.
    pub fn with_task(mut self, key: impl Into<String>, info: TaskInfo) -> Self {
        self.tasks.insert(key.into(), info);
        self
    }

    /// Register pull request state for a URL.
    pub fn with_review(mut self, url: impl Into<String>, info: ReviewInfo) -> Self {
        self.reviews.insert(url.into(), info);
        self
    }
}

#[async_trait]
impl TaskInfoProvider for FixtureProvider {
    async fn fetch_task(&self, task: &TaskRef) -> Result<TaskInfo, AppError> {
        Ok(self.tasks.get(&task.key).cloned().unwrap_or_else(|| TaskInfo {
            title: format!("{}: {}", task.key, FIXTURE_TASK_TITLE),
            description: FIXTURE_TASK_DESCRIPTION.to_string(),
        }))
    }
}

#[async_trait]
impl ReviewInfoProvider for FixtureProvider {
    async fn fetch_review(&self, review: &ReviewRef) -> Result<ReviewInfo, AppError> {
        Ok(self.reviews.get(&review.url).cloned().unwrap_or_else(|| ReviewInfo {
            state: ReviewState::Open,
            author: FIXTURE_REVIEW_AUTHOR.to_string(),
        }))
    }
}

/// The pair of lookups a session needs.
#[derive(Clone)]
pub struct Providers {
    pub tasks: Arc<dyn TaskInfoProvider>,
    pub reviews: Arc<dyn ReviewInfoProvider>,
}

impl Providers {
    /// Serve both lookups from one fixture table.
    pub fn fixture(fixture: FixtureProvider) -> Self {
        let fixture = Arc::new(fixture);
        Self {
            tasks: fixture.clone(),
            reviews: fixture,
        }
    }

    /// Tracker and code-host REST clients built from settings.
    ///
    /// The tracker token must be set.
    pub fn network(settings: &EngineSettings) -> Result<Self, AppError> {
        let tracker = TrackerClient::new(TrackerClientConfig::from(&settings.tracker))?;
        let code_host = CodeHostClient::new(CodeHostClientConfig::from(&settings.code_host))?;
        Ok(Self {
            tasks: Arc::new(tracker),
            reviews: Arc::new(code_host),
        })
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers").finish_non_exhaustive()
    }
}
