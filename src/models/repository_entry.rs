//! Affected repository (version table row) model.

use serde::{Deserialize, Serialize};

/// Semantic-version bump category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeClass {
    #[default]
    Patch,
    Minor,
    Major,
}

impl std::str::FromStr for ChangeClass {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            other => Err(crate::error::AppError::invalid_input_field(
                format!("Unknown change type '{}'", other),
                "changeClass",
            )),
        }
    }
}

impl std::fmt::Display for ChangeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// One affected repository with its current and next release tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    /// Repository path (e.g., "acme/widget").
    pub repository: String,

    /// Version currently deployed ("X.Y.Z").
    pub current_version: String,

    /// Chosen bump category.
    pub change_class: ChangeClass,

    /// Version to build; may be a manual override.
    pub next_version: String,
}
