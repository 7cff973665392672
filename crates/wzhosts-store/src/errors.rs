//! Error handling for wzhosts-store
//!
//! Wraps wzhosts-core ExError with store-specific helpers

use std::path::Path;

use wzhosts_core::errors::{ExError, ExErrorKind, HostsError};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Another mutation holds the exclusivity flag
pub fn busy(op: &str) -> ExError {
    ExError::from(HostsError::Busy).with_op(op)
}

/// The hosts file could not be read or written
pub fn io_error(op: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(op)
        .with_message(format!("{}: {}", path.display(), err))
}

pub fn host_not_found(op: &str, id: &str) -> ExError {
    ExError::from(HostsError::HostNotFound { id: id.to_string() }).with_op(op)
}

/// Mutation requested on a store without hosts
pub fn no_hosts_configured(op: &str) -> ExError {
    ExError::from(HostsError::NoHostsConfigured).with_op(op)
}

/// A caller-supplied id is already taken
pub fn host_already_exists(op: &str, id: &str) -> ExError {
    ExError::new(ExErrorKind::AlreadyExists)
        .with_op(op)
        .with_entity_id(id)
        .with_message(format!("Host {} already exists", id))
}

/// The host parsed from the file has no block in canonical shape
pub fn block_not_matched(op: &str, id: &str) -> ExError {
    ExError::new(ExErrorKind::Codec)
        .with_op(op)
        .with_entity_id(id)
        .with_message(format!(
            "Block of host {} does not have the url/port/user/password layout",
            id
        ))
}

/// Adapter for `map_err` on core results
pub fn in_op(op: &'static str) -> impl Fn(HostsError) -> ExError {
    move |err| ExError::from(err).with_op(op)
}
