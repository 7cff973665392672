//! Shared helpers for store integration tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use wzhosts_core::NewHost;
use wzhosts_store::{FileStore, HostRepository};

/// The hosts file shipped with the app, three hosts under comments
pub const SAMPLE_CONFIG: &str = include_str!("../fixtures/wazuh-hosts.yml");

/// Repository over a fresh copy of `content`
pub fn setup_repo(content: &str) -> (HostRepository, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = hosts_path(&temp_dir);
    fs::write(&path, content).expect("Failed to write hosts file");
    (HostRepository::new(FileStore::new(path)), temp_dir)
}

pub fn hosts_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("wazuh-hosts.yml")
}

pub fn new_host(id: &str) -> NewHost {
    NewHost::new(format!("https://{}", id), 55000, "wazuh", "wazuh").with_id(id)
}

pub fn ids(repo: &HostRepository) -> Vec<String> {
    HostRepository::ids_of(&repo.list().expect("list failed"))
}
