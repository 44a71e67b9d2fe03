//! RFC Assembler - release request (RFC) authoring engine.
//!
//! Collects tracker tasks and their pull requests into an RFC, derives the
//! affected repositories with their version bumps, and renders the release
//! document. State is kept per RFC in a key-value store and autosaved while
//! an editing session is open.
//!
//! The library installs no logger; output goes through the `log` facade.

pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::AppError;
pub use models::{ChangeClass, RfcAggregate, RfcStatus, RfcSummary};
pub use services::{
    EngineSettings, FixtureProvider, MemoryRfcStore, Providers, RfcCatalog, RfcSession, RfcStore,
    SqliteRfcStore,
};
