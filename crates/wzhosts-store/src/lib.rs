//! wzhosts store - persistence of API host records in a hand-editable file
//!
//! Provides:
//! - File Store: guarded read, append and patch primitives over the hosts file
//! - Host Repository: id-oriented CRUD with timestamp-derived ids
//! - Migration of legacy indexed API entries
//! - API target selection for scheduled jobs

pub mod config;
pub mod errors;
pub mod file;
pub mod migration;
pub mod repo;
pub mod targets;

// Re-export key types
pub use config::StoreConfig;
pub use errors::Result;
pub use file::{ExclusiveGuard, FileStore};
pub use repo::{AddManySummary, HostRepository};
pub use targets::{select_api_targets, TargetSelectionError};
