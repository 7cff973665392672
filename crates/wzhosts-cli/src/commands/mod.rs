pub mod hosts;
pub mod migrate;
pub mod targets;
