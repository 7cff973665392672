//! Repository layer over the hosts file
//!
//! Id-oriented CRUD built on the File Store and the record codec

pub mod host_repository;

pub use host_repository::{AddManySummary, HostRepository};
