//! Pull request (review link) model.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewState {
    Open,
    Closed,
    Merged,
}

impl From<&str> for ReviewState {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "merged" => Self::Merged,
            "closed" => Self::Closed,
            _ => Self::Open,
        }
    }
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// A pull request attached to a task.
///
/// Never mutated after creation; it can only be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLink {
    /// Local identifier.
    pub id: String,

    /// URL exactly as submitted.
    pub url: String,

    /// Repository path (e.g., "acme/widget").
    pub repository: String,

    /// Pull request number.
    pub number: u64,

    /// State reported by the code host when the link was added.
    pub state: ReviewState,

    /// Author's username.
    pub author: String,
}
