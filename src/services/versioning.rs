//! Semantic version bump calculation.

use crate::error::AppError;
use crate::models::ChangeClass;
use std::fmt;
use std::str::FromStr;

/// A plain `X.Y.Z` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemVer {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Increment one component and zero every less significant one.
    ///
    /// A component already at `u64::MAX` cannot be incremented.
    pub fn bump(self, change_class: ChangeClass) -> Result<Self, AppError> {
        let bumped = match change_class {
            ChangeClass::Major => self.major.checked_add(1).map(|major| Self::new(major, 0, 0)),
            ChangeClass::Minor => self
                .minor
                .checked_add(1)
                .map(|minor| Self::new(self.major, minor, 0)),
            ChangeClass::Patch => self
                .patch
                .checked_add(1)
                .map(|patch| Self::new(self.major, self.minor, patch)),
        };

        bumped.ok_or_else(|| {
            AppError::invalid_input_field(
                format!("Version {} cannot be bumped further ({})", self, change_class),
                "version",
            )
        })
    }
}

impl FromStr for SemVer {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            AppError::invalid_input_field(
                format!("Invalid version '{}': expected X.Y.Z", s),
                "version",
            )
        };

        let mut parts = s.split('.');
        let mut component = || -> Result<u64, AppError> {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        let version = Self::new(component()?, component()?, component()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Compute the next version string for a bump of `change_class`.
pub fn next_version(current: &str, change_class: ChangeClass) -> Result<String, AppError> {
    Ok(current.parse::<SemVer>()?.bump(change_class)?.to_string())
}
