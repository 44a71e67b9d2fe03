//! Business logic services.
//!
//! This module contains the RFC editing rules (link parsing, version bumps,
//! repository derivation, document rendering), the persistence gateway, the
//! lookups against the tracker and code host, and the editing session with
//! its background autosave.
//!
//! Everything except `session`, `autosave` and the network clients is
//! synchronous and free of I/O.

pub mod autosave;
pub mod catalog;
pub mod code_host_client;
pub mod document;
pub mod editor;
mod http;
pub mod identifiers;
pub mod pending;
pub mod providers;
pub mod repositories;
pub mod session;
pub mod settings;
pub mod store;
pub mod tracker_client;
pub mod versioning;

pub use autosave::{AutosaveHandle, AutosaveStatus};
pub use catalog::RfcCatalog;
pub use code_host_client::CodeHostClient;
pub use editor::RfcEditor;
pub use identifiers::IdentifierParser;
pub use providers::{FixtureProvider, Providers, ReviewInfoProvider, TaskInfoProvider};
pub use repositories::RepositoryPolicy;
pub use session::RfcSession;
pub use settings::EngineSettings;
pub use store::{MemoryRfcStore, RfcStore, SqliteRfcStore};
pub use tracker_client::TrackerClient;
