//! Task tracker API client.
//!
//! Fetches task title and description for a task key over the tracker's
//! REST API (`GET /v2/issues/{key}`).

use crate::error::AppError;
use crate::services::http::handle_response;
use crate::services::identifiers::TaskRef;
use crate::services::providers::{TaskInfo, TaskInfoProvider};
use crate::services::settings::TrackerSettings;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;

/// Tracker API client configuration.
#[derive(Debug, Clone)]
pub struct TrackerClientConfig {
    /// API base URL (e.g., `https://api.tracker.yandex.net`).
    pub base_url: String,

    /// OAuth token.
    pub token: String,

    /// Organization ID, if the tracker requires one.
    pub org_id: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl From<&TrackerSettings> for TrackerClientConfig {
    fn from(settings: &TrackerSettings) -> Self {
        Self {
            base_url: settings.api_base_url.clone(),
            token: settings.token.clone(),
            org_id: settings.org_id.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }
}

/// Issue as returned by the tracker API. Only the fields we use.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerIssue {
    pub key: String,
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<TrackerIssue> for TaskInfo {
    fn from(issue: TrackerIssue) -> Self {
        Self {
            title: format!("{}: {}", issue.key, issue.summary),
            description: issue.description.unwrap_or_default(),
        }
    }
}

/// Tracker API client.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    client: Client,
    config: TrackerClientConfig,
}

impl TrackerClient {
    /// Create a new tracker client.
    pub fn new(config: TrackerClientConfig) -> Result<Self, AppError> {
        if config.token.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "Tracker token is required",
                "tracker.token",
            ));
        }

        let mut headers = header::HeaderMap::new();

        let auth = header::HeaderValue::from_str(&format!("OAuth {}", config.token))
            .map_err(|_| AppError::invalid_input_field("Invalid token format", "tracker.token"))?;
        headers.insert(header::AUTHORIZATION, auth);

        if let Some(org_id) = &config.org_id {
            let value = header::HeaderValue::from_str(org_id).map_err(|_| {
                AppError::invalid_input_field("Invalid organization ID", "tracker.orgId")
            })?;
            headers.insert("X-Org-ID", value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v2{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Fetch a single issue by key.
    pub async fn get_issue(&self, key: &str) -> Result<TrackerIssue, AppError> {
        let endpoint = issue_endpoint(key);
        let response = self.client.get(self.api_url(&endpoint)).send().await?;
        handle_response(response, &endpoint, "Tracker").await
    }
}

fn issue_endpoint(key: &str) -> String {
    format!("/issues/{}", urlencoding::encode(key))
}

#[async_trait]
impl TaskInfoProvider for TrackerClient {
    async fn fetch_task(&self, task: &TaskRef) -> Result<TaskInfo, AppError> {
        log::debug!("Fetching task {} from tracker", task.key);
        Ok(self.get_issue(&task.key).await?.into())
    }
}
