//! Data models for the RFC engine.
//!
//! These models represent the RFC aggregate and its parts as they are held in
//! memory by an editing session and persisted as JSON by the store.

pub mod repository_entry;
pub mod review_link;
pub mod rfc;
pub mod work_item;

// Re-exports for convenient access
pub use repository_entry::{ChangeClass, RepositoryEntry};
pub use review_link::{ReviewLink, ReviewState};
pub use rfc::{RfcAggregate, RfcStats, RfcStatus, RfcSummary};
pub use work_item::WorkItem;
