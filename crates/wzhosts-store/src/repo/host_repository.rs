//! Host repository
//!
//! Every public operation follows the same shape:
//! - `log_op_start!` at entry
//! - the `_impl` function does the work
//! - `log_op_end!` on success, `log_op_error!` on failure
//!
//! Mutations take the store's exclusivity flag for their whole
//! read-patch-write cycle and fail fast with `Busy` if it is held.

use std::collections::HashSet;
use std::time::Instant;

use regex::Regex;
use wzhosts_core::codec::{self, Indentation};
use wzhosts_core::{log_op_end, log_op_error, log_op_start};
use wzhosts_core::{HostRecord, NewHost};

use crate::config::StoreConfig;
use crate::errors::{
    block_not_matched, host_already_exists, host_not_found, in_op, no_hosts_configured, Result,
};
use crate::file::{ExclusiveGuard, FileStore};

/// Outcome of a bulk insertion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddManySummary {
    /// Ids written, in insertion order
    pub added: Vec<String>,
    /// Ids dropped because they were already present or repeated in the batch
    pub skipped: Vec<String>,
}

/// Id-oriented CRUD over one hosts file
///
/// The repository holds no cached state: every call re-reads the file.
/// It is `Send + Sync` and can be shared behind an `Arc`.
#[derive(Debug)]
pub struct HostRepository {
    store: FileStore,
}

impl HostRepository {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }

    pub fn open(config: &StoreConfig) -> Self {
        Self::new(FileStore::from_config(config))
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// All hosts, in file order
    pub fn list(&self) -> Result<Vec<HostRecord>> {
        log_op_start!("list_hosts");
        let start = Instant::now();

        let hosts = self.store.list_hosts().map_err(|e| {
            log_op_error!(
                "list_hosts",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "list_hosts",
            duration_ms = start.elapsed().as_millis() as u64,
            host_count = hosts.len()
        );
        Ok(hosts)
    }

    /// Ids of `hosts`, in the same order
    pub fn ids_of(hosts: &[HostRecord]) -> Vec<String> {
        hosts.iter().map(|h| h.id.clone()).collect()
    }

    /// The host with this id
    ///
    /// # Errors
    ///
    /// `NotFound` if no host has this id, including when the store is empty.
    pub fn get_by_id(&self, id: &str) -> Result<HostRecord> {
        log_op_start!("get_host", host_id = id);
        let start = Instant::now();

        let host = self
            .store
            .list_hosts()
            .and_then(|hosts| {
                hosts
                    .into_iter()
                    .find(|h| h.id == id)
                    .ok_or_else(|| host_not_found("get_host", id))
            })
            .map_err(|e| {
                log_op_error!(
                    "get_host",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    host_id = id
                );
                e
            })?;

        log_op_end!(
            "get_host",
            duration_ms = start.elapsed().as_millis() as u64,
            host_id = id
        );
        Ok(host)
    }

    /// Insert one host and return its id
    ///
    /// Without an id, one is derived from the current time in milliseconds.
    /// Derived ids are only as unique as the clock; a taken value is bumped
    /// until free.
    ///
    /// # Errors
    ///
    /// - `Busy` if another mutation is in flight
    /// - `AlreadyExists` if the supplied id is taken
    /// - `Codec` if the id is unusable or the last block cannot be located
    pub fn add(&self, host: NewHost) -> Result<String> {
        let requested = host.id.clone().unwrap_or_default();
        log_op_start!("add_host", host_id = requested.as_str());
        let start = Instant::now();

        let id = self.add_impl(host).map_err(|e| {
            log_op_error!(
                "add_host",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                host_id = requested.as_str()
            );
            e
        })?;

        log_op_end!(
            "add_host",
            duration_ms = start.elapsed().as_millis() as u64,
            host_id = id.as_str()
        );
        Ok(id)
    }

    fn add_impl(&self, host: NewHost) -> Result<String> {
        let guard = self.store.acquire_exclusive()?;
        let text = self.store.read_all()?;
        let hosts = codec::parse_host_list(&text).map_err(in_op("add_host"))?;

        let id = match host.id.clone() {
            Some(id) if hosts.iter().any(|h| h.id == id) => {
                return Err(host_already_exists("add_host", &id));
            }
            Some(id) => id,
            None => {
                let taken: HashSet<&str> = hosts.iter().map(|h| h.id.as_str()).collect();
                derive_timestamp_id(chrono::Utc::now().timestamp_millis(), &taken)
            }
        };
        codec::build_match_pattern(&id).map_err(in_op("add_host"))?;

        let record = host.into_record(id.clone());
        match hosts.last() {
            Some(last) => self.insert_after(&guard, &text, last, &record)?,
            None if codec::list_marker_pattern().is_match(&text) => {
                let replacement = codec::encode_list_block(&record);
                self.store
                    .patch(&guard, codec::list_marker_pattern(), &replacement)?;
            }
            None => self
                .store
                .append_list_block(&guard, &codec::encode_list_block(&record))?,
        }
        Ok(id)
    }

    /// Replace the last block with itself followed by the new block
    ///
    /// Both blocks take the indentation the last block already has.
    fn insert_after(
        &self,
        guard: &ExclusiveGuard<'_>,
        text: &str,
        last: &HostRecord,
        record: &HostRecord,
    ) -> Result<()> {
        let pattern = codec::build_match_pattern(&last.id).map_err(in_op("add_host"))?;
        let indent = matched_indentation(&pattern, text)
            .ok_or_else(|| block_not_matched("add_host", &last.id))?;
        let replacement = format!(
            "{}{}",
            codec::encode_host_with(last, &indent),
            codec::encode_host_with(record, &indent)
        );
        match self.store.patch(guard, &pattern, &replacement)? {
            0 => Err(block_not_matched("add_host", &last.id)),
            _ => Ok(()),
        }
    }

    /// Insert the hosts whose id is not present yet, one at a time
    ///
    /// Ids already in the store, or repeated earlier in `hosts`, are skipped
    /// silently. Hosts without an id are always inserted. Stops at the first
    /// failing insertion; hosts added before it stay in the file.
    pub fn add_many(&self, hosts: Vec<NewHost>) -> Result<AddManySummary> {
        log_op_start!("add_hosts", host_count = hosts.len());
        let start = Instant::now();

        let summary = self.add_many_impl(hosts).map_err(|e| {
            log_op_error!(
                "add_hosts",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "add_hosts",
            duration_ms = start.elapsed().as_millis() as u64,
            added_count = summary.added.len(),
            skipped_count = summary.skipped.len()
        );
        Ok(summary)
    }

    fn add_many_impl(&self, hosts: Vec<NewHost>) -> Result<AddManySummary> {
        let existing: HashSet<String> = Self::ids_of(&self.store.list_hosts()?)
            .into_iter()
            .collect();
        let mut seen = HashSet::new();
        let mut summary = AddManySummary::default();

        for host in hosts {
            if let Some(id) = &host.id {
                if existing.contains(id) || !seen.insert(id.clone()) {
                    summary.skipped.push(id.clone());
                    continue;
                }
            }
            let id = self.add(host)?;
            summary.added.push(id);
        }
        Ok(summary)
    }

    /// Replace the connection fields of host `id`, keeping its id
    ///
    /// Any id carried by `fields` is ignored.
    ///
    /// # Errors
    ///
    /// - `Busy` if another mutation is in flight
    /// - `PreconditionFailed` if the store has no hosts
    /// - `NotFound` if no host has this id; the file is left untouched
    pub fn update(&self, id: &str, fields: &NewHost) -> Result<HostRecord> {
        log_op_start!("update_host", host_id = id);
        let start = Instant::now();

        let updated = self.update_impl(id, fields).map_err(|e| {
            log_op_error!(
                "update_host",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                host_id = id
            );
            e
        })?;

        log_op_end!(
            "update_host",
            duration_ms = start.elapsed().as_millis() as u64,
            host_id = id
        );
        Ok(updated)
    }

    fn update_impl(&self, id: &str, fields: &NewHost) -> Result<HostRecord> {
        let guard = self.store.acquire_exclusive()?;
        let text = self.store.read_all()?;
        let existing = locate("update_host", &text, id)?;

        let updated = existing.updated_from(fields);
        let pattern = codec::build_match_pattern(id).map_err(in_op("update_host"))?;
        let indent = matched_indentation(&pattern, &text)
            .ok_or_else(|| block_not_matched("update_host", id))?;
        match self
            .store
            .patch(&guard, &pattern, &codec::encode_host_with(&updated, &indent))?
        {
            0 => Err(block_not_matched("update_host", id)),
            _ => Ok(updated),
        }
    }

    /// Remove host `id`, and the list marker with it if it was the last host
    ///
    /// # Errors
    ///
    /// - `Busy` if another mutation is in flight
    /// - `PreconditionFailed` if the store has no hosts
    /// - `NotFound` if no host has this id; the file is left untouched
    pub fn delete(&self, id: &str) -> Result<()> {
        log_op_start!("delete_host", host_id = id);
        let start = Instant::now();

        self.delete_impl(id).map_err(|e| {
            log_op_error!(
                "delete_host",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                host_id = id
            );
            e
        })?;

        log_op_end!(
            "delete_host",
            duration_ms = start.elapsed().as_millis() as u64,
            host_id = id
        );
        Ok(())
    }

    fn delete_impl(&self, id: &str) -> Result<()> {
        let guard = self.store.acquire_exclusive()?;
        locate("delete_host", &self.store.read_all()?, id)?;

        let pattern = codec::build_match_pattern(id).map_err(in_op("delete_host"))?;
        match self.store.remove_block(&guard, &pattern)? {
            0 => Err(block_not_matched("delete_host", id)),
            _ => Ok(()),
        }
    }

}

/// Host `id` in `text`, read by a mutation already holding the flag
fn locate(op: &'static str, text: &str, id: &str) -> Result<HostRecord> {
    let hosts = codec::parse_host_list(text).map_err(in_op(op))?;
    if hosts.is_empty() {
        return Err(no_hosts_configured(op));
    }
    hosts
        .into_iter()
        .find(|h| h.id == id)
        .ok_or_else(|| host_not_found(op, id))
}

/// Indentation of the block `pattern` finds in `text`
fn matched_indentation(pattern: &Regex, text: &str) -> Option<Indentation> {
    pattern
        .find(text)
        .map(|found| Indentation::of_block(found.as_str()))
}

/// Millisecond timestamp id, bumped past any value already taken
fn derive_timestamp_id(now_ms: i64, taken: &HashSet<&str>) -> String {
    let mut candidate = now_ms;
    loop {
        let id = candidate.to_string();
        if !taken.contains(id.as_str()) {
            return id;
        }
        candidate += 1;
    }
}
