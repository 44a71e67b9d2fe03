//! RFC document rendering.
//!
//! Rendering is a pure function of the aggregate contents and the product list,
//! so the same state always yields byte-identical markdown.

use crate::models::RfcAggregate;

/// Render the RFC markdown.
///
/// Sections, in order: title, description, deployment plan, rollback plan,
/// products, and regression testing (only when a regression link is set).
pub fn generate_document(rfc: &RfcAggregate, products: &[String]) -> String {
    let title = match rfc.work_items.as_slice() {
        [only] => only.title.as_str(),
        _ => rfc.title.as_str(),
    };

    let description = rfc
        .work_items
        .iter()
        .map(|w| format!("{}\n{}", w.description, w.url))
        .collect::<Vec<_>>()
        .join("\n\n");

    let deployment_plan = bullets(
        rfc.repositories
            .iter()
            .map(|r| format!("{} Build tag {}", r.repository, r.next_version)),
    );

    let rollback_plan = bullets(
        rfc.repositories
            .iter()
            .map(|r| format!("{} Roll back to tag {}", r.repository, r.current_version)),
    );

    let mut sections = vec![
        format!("# {}", title),
        section("Description", &description),
        section("Deployment plan", &deployment_plan),
        section("Rollback plan", &rollback_plan),
        section("Products", &bullets(products.iter().cloned())),
    ];

    let regression = rfc.regression_link.trim();
    if !regression.is_empty() {
        sections.push(section("Regression testing", regression));
    }

    sections.join("\n\n")
}

fn section(heading: &str, body: &str) -> String {
    format!("## {}\n{}", heading, body)
}

fn bullets(lines: impl Iterator<Item = String>) -> String {
    lines
        .map(|line| format!("• {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeClass, RepositoryEntry, WorkItem};
    use chrono::Utc;

    fn products() -> Vec<String> {
        vec!["0179".to_string(), "0796".to_string()]
    }

    fn work_item(number: &str, title: &str, description: &str) -> WorkItem {
        WorkItem {
            id: number.to_string(),
            url: format!("https://tracker.yandex.ru/SPD-{}", number),
            number: number.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            review_links: Vec::new(),
        }
    }

    fn entry(repo: &str, current: &str, next: &str) -> RepositoryEntry {
        RepositoryEntry {
            repository: repo.to_string(),
            current_version: current.to_string(),
            change_class: ChangeClass::Patch,
            next_version: next.to_string(),
        }
    }

    #[test]
    fn test_single_task_document() {
        let mut rfc = RfcAggregate::new_draft("1", "Weekly release", Utc::now());
        rfc.work_items.push(work_item("42", "SPD-42: Fix login", "Login fails on retry."));
        rfc.repositories.push(entry("acme/widget", "1.0.0", "1.0.1"));

        let expected = "\
# SPD-42: Fix login

## Description
Login fails on retry.
https://tracker.yandex.ru/SPD-42

## Deployment plan
• acme/widget Build tag 1.0.1

## Rollback plan
• acme/widget Roll back to tag 1.0.0

## Products
• 0179
• 0796";
        assert_eq!(generate_document(&rfc, &products()), expected);
    }

    #[test]
    fn test_multiple_tasks_use_rfc_title_and_regression_section() {
        let mut rfc = RfcAggregate::new_draft("1", "Weekly release", Utc::now());
        rfc.work_items.push(work_item("1", "First", "One."));
        rfc.work_items.push(work_item("2", "Second", "Two."));
        rfc.repositories.push(entry("acme/api", "2.3.4", "3.0.0"));
        rfc.repositories.push(entry("acme/web", "0.1.0", "0.1.1"));
        rfc.regression_link = "https://allure.example.com/launch/7".to_string();

        let doc = generate_document(&rfc, &products());
        assert!(doc.starts_with("# Weekly release\n\n"));
        assert!(doc.contains(
            "One.\nhttps://tracker.yandex.ru/SPD-1\n\nTwo.\nhttps://tracker.yandex.ru/SPD-2"
        ));
        assert!(doc.contains("• acme/api Build tag 3.0.0\n• acme/web Build tag 0.1.1"));
        assert!(doc.contains("• acme/api Roll back to tag 2.3.4\n• acme/web Roll back to tag 0.1.0"));
        assert!(doc.ends_with("## Regression testing\nhttps://allure.example.com/launch/7"));
    }

    #[test]
    fn test_blank_regression_link_omits_section() {
        let mut rfc = RfcAggregate::new_draft("1", "Weekly release", Utc::now());
        rfc.regression_link = "   ".to_string();

        let doc = generate_document(&rfc, &products());
        assert!(!doc.contains("Regression testing"));
    }

    #[test]
    fn test_configured_products() {
        let rfc = RfcAggregate::new_draft("1", "Weekly release", Utc::now());
        let doc = generate_document(&rfc, &["0001".to_string()]);
        assert!(doc.ends_with("## Products\n• 0001"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut rfc = RfcAggregate::new_draft("1", "Weekly release", Utc::now());
        rfc.work_items.push(work_item("1", "First", "One."));
        rfc.repositories.push(entry("acme/api", "1.0.0", "1.0.1"));

        assert_eq!(
            generate_document(&rfc, &products()),
            generate_document(&rfc, &products())
        );
    }
}
