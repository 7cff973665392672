//! Host store core - domain model, record codec and ambient facilities
//!
//! This crate provides:
//! - The `HostRecord` model for remote-API connection descriptors
//! - The record codec that encodes, matches and parses `wazuh.hosts` blocks
//! - The error facility (`HostsError`, `ExError`, `ExErrorKind`)
//! - The structured logging facility and its macros

pub mod codec;
pub mod errors;
pub mod logging_facility;
pub mod model;

pub use wzhosts_core_types::schema;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, HostsError, Result};
pub use model::{HostRecord, NewHost};
