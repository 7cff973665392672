//! Store configuration
//!
//! The hosts file path comes from `WZHOSTS_FILE` when set, otherwise
//! `wazuh-hosts.yml` in the working directory.

use std::path::PathBuf;

/// Default hosts file name
pub const DEFAULT_HOSTS_FILE: &str = "wazuh-hosts.yml";

/// Environment variable overriding the hosts file path
pub const HOSTS_FILE_ENV: &str = "WZHOSTS_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub hosts_file: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            hosts_file: PathBuf::from(DEFAULT_HOSTS_FILE),
        }
    }
}

impl StoreConfig {
    pub fn new(hosts_file: impl Into<PathBuf>) -> Self {
        Self {
            hosts_file: hosts_file.into(),
        }
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(HOSTS_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            Some(path) => Self::new(path),
            None => Self::default(),
        }
    }
}
