//! Code-hosting API client.
//!
//! Fetches pull request state and author over a GitHub-compatible REST API
//! (`GET /repos/{owner}/{repo}/pulls/{number}`).

use crate::error::AppError;
use crate::models::ReviewState;
use crate::services::http::handle_response;
use crate::services::identifiers::ReviewRef;
use crate::services::providers::{ReviewInfo, ReviewInfoProvider};
use crate::services::settings::CodeHostSettings;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;

/// Code-host API client configuration.
#[derive(Debug, Clone)]
pub struct CodeHostClientConfig {
    /// API base URL (e.g., `https://api.github.com`).
    pub base_url: String,

    /// Bearer token; may be empty for public repositories.
    pub token: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl From<&CodeHostSettings> for CodeHostClientConfig {
    fn from(settings: &CodeHostSettings) -> Self {
        Self {
            base_url: settings.api_base_url.clone(),
            token: settings.token.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }
}

/// Pull request as returned by the API. Only the fields we use.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPullRequest {
    pub number: u64,
    pub state: String,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub merged_at: Option<String>,
    pub user: ApiUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub login: String,
}

impl ApiPullRequest {
    /// The API reports merged pull requests as `closed`.
    pub fn review_state(&self) -> ReviewState {
        if self.merged || self.merged_at.is_some() {
            ReviewState::Merged
        } else {
            ReviewState::from(self.state.as_str())
        }
    }
}

/// Code-host API client.
#[derive(Debug, Clone)]
pub struct CodeHostClient {
    client: Client,
    config: CodeHostClientConfig,
}

impl CodeHostClient {
    /// Create a new code-host client.
    pub fn new(config: CodeHostClientConfig) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("rfc-assembler/", env!("CARGO_PKG_VERSION"))),
        );

        if !config.token.is_empty() {
            let auth = header::HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|_| AppError::invalid_input_field("Invalid token format", "codeHost.token"))?;
            headers.insert(header::AUTHORIZATION, auth);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Fetch a single pull request.
    pub async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<ApiPullRequest, AppError> {
        let endpoint = pull_request_endpoint(owner, repo, number);
        let response = self.client.get(self.api_url(&endpoint)).send().await?;
        handle_response(response, &endpoint, "Code host").await
    }
}

fn pull_request_endpoint(owner: &str, repo: &str, number: u64) -> String {
    format!(
        "/repos/{}/{}/pulls/{}",
        urlencoding::encode(owner),
        urlencoding::encode(repo),
        number
    )
}

#[async_trait]
impl ReviewInfoProvider for CodeHostClient {
    async fn fetch_review(&self, review: &ReviewRef) -> Result<ReviewInfo, AppError> {
        log::debug!("Fetching pull request {}#{}", review.repository(), review.number);
        let pr = self
            .get_pull_request(&review.owner, &review.repo, review.number)
            .await?;

        Ok(ReviewInfo {
            state: pr.review_state(),
            author: pr.user.login,
        })
    }
}
