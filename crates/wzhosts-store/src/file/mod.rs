//! File Store
//!
//! Provides:
//! - Guarded read/patch/write access to the hosts file
//! - The per-store exclusivity flag
//! - Atomic whole-file replacement

mod atomic;
mod store;

pub use store::{ExclusiveGuard, FileStore};
