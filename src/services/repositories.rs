//! Version table derivation from attached pull requests.

use crate::models::{ChangeClass, RepositoryEntry, WorkItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Version assumed for a repository that has just appeared in the table.
pub const BASELINE_VERSION: &str = "1.0.0";

/// Next version for the baseline under the default patch bump.
pub const BASELINE_NEXT_VERSION: &str = "1.0.1";

/// What happens to edited rows when the table is rebuilt after a task or
/// pull request change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepositoryPolicy {
    /// Every row is rebuilt from the baseline, discarding edits.
    #[default]
    Reset,

    /// Rows for repositories that are still referenced keep their edits.
    PreserveOverrides,
}

/// Fresh table row for a repository.
pub fn baseline_entry(repository: impl Into<String>) -> RepositoryEntry {
    RepositoryEntry {
        repository: repository.into(),
        current_version: BASELINE_VERSION.to_string(),
        change_class: ChangeClass::Patch,
        next_version: BASELINE_NEXT_VERSION.to_string(),
    }
}

/// Distinct repositories referenced by any pull request, in first-seen order.
pub fn referenced_repositories(work_items: &[WorkItem]) -> Vec<&str> {
    let mut seen = HashSet::new();
    work_items
        .iter()
        .flat_map(|w| w.review_links.iter())
        .map(|link| link.repository.as_str())
        .filter(|repo| seen.insert(*repo))
        .collect()
}

/// Build a fresh version table from the pull requests of `work_items`.
pub fn derive_repositories(work_items: &[WorkItem]) -> Vec<RepositoryEntry> {
    referenced_repositories(work_items)
        .into_iter()
        .map(baseline_entry)
        .collect()
}

/// Rebuild the version table, carrying over `previous` rows per `policy`.
pub fn rederive_repositories(
    work_items: &[WorkItem],
    previous: &[RepositoryEntry],
    policy: RepositoryPolicy,
) -> Vec<RepositoryEntry> {
    match policy {
        RepositoryPolicy::Reset => derive_repositories(work_items),
        RepositoryPolicy::PreserveOverrides => referenced_repositories(work_items)
            .into_iter()
            .map(|repo| {
                previous
                    .iter()
                    .find(|entry| entry.repository == repo)
                    .cloned()
                    .unwrap_or_else(|| baseline_entry(repo))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewLink, ReviewState};

    fn item(id: &str, repos: &[&str]) -> WorkItem {
        WorkItem {
            id: id.to_string(),
            url: format!("https://tracker.yandex.ru/SPD-{}", id),
            number: id.to_string(),
            title: String::new(),
            description: String::new(),
            review_links: repos
                .iter()
                .enumerate()
                .map(|(n, repo)| ReviewLink {
                    id: format!("{}-{}", id, n),
                    url: format!("https://github.com/{}/pull/{}", repo, n),
                    repository: repo.to_string(),
                    number: n as u64,
                    state: ReviewState::Open,
                    author: "developer".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_derive_is_distinct_set_of_referenced_repositories() {
        let items = vec![
            item("1", &["acme/widget", "acme/api", "acme/widget"]),
            item("2", &[]),
            item("3", &["acme/api", "acme/web"]),
        ];

        let entries = derive_repositories(&items);
        let names: Vec<&str> = entries.iter().map(|e| e.repository.as_str()).collect();
        assert_eq!(names, vec!["acme/widget", "acme/api", "acme/web"]);

        for entry in &entries {
            assert_eq!(entry.current_version, "1.0.0");
            assert_eq!(entry.change_class, ChangeClass::Patch);
            assert_eq!(entry.next_version, "1.0.1");
        }
    }

    #[test]
    fn test_derive_empty() {
        assert!(derive_repositories(&[]).is_empty());
        assert!(derive_repositories(&[item("1", &[])]).is_empty());
    }

    #[test]
    fn test_reset_policy_discards_edits() {
        let items = vec![item("1", &["acme/widget"])];
        let mut previous = derive_repositories(&items);
        previous[0].change_class = ChangeClass::Major;
        previous[0].next_version = "2.0.0".to_string();

        let rebuilt = rederive_repositories(&items, &previous, RepositoryPolicy::Reset);
        assert_eq!(rebuilt, vec![baseline_entry("acme/widget")]);
    }

    #[test]
    fn test_preserve_policy_keeps_edits_and_drops_stale_rows() {
        let before = vec![item("1", &["acme/widget", "acme/old"])];
        let mut previous = derive_repositories(&before);
        previous[0].change_class = ChangeClass::Minor;
        previous[0].next_version = "1.1.0".to_string();

        let after = vec![item("1", &["acme/widget"]), item("2", &["acme/new"])];
        let rebuilt = rederive_repositories(&after, &previous, RepositoryPolicy::PreserveOverrides);

        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt[0].repository, "acme/widget");
        assert_eq!(rebuilt[0].change_class, ChangeClass::Minor);
        assert_eq!(rebuilt[0].next_version, "1.1.0");
        assert_eq!(rebuilt[1], baseline_entry("acme/new"));
    }
}
