pub mod host;

pub use host::{HostRecord, NewHost};
