//! Guarded access to the hosts file
//!
//! Every read goes to disk; nothing is cached between calls. Writes require
//! an `ExclusiveGuard` from the same store, so a mutation cannot reach the
//! file without holding the exclusivity flag.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use regex::{NoExpand, Regex};
use sha2::{Digest, Sha256};
use tracing::debug;
use wzhosts_core::codec;
use wzhosts_core::errors::{ExError, ExErrorKind};
use wzhosts_core::HostRecord;

use crate::config::StoreConfig;
use crate::errors::{busy, in_op, io_error, Result};
use crate::file::atomic::atomic_write;

/// Sole owner of one hosts file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    busy: AtomicBool,
}

/// Proof that the exclusivity flag is held; releases it on drop
#[derive(Debug)]
pub struct ExclusiveGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ExclusiveGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.hosts_file.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a mutation currently holds the flag
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Take the exclusivity flag without waiting
    ///
    /// # Errors
    ///
    /// Returns `Busy` if another mutation already holds it. There is no
    /// queueing; the caller decides whether to retry.
    pub fn acquire_exclusive(&self) -> Result<ExclusiveGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ExclusiveGuard { flag: &self.busy })
            .map_err(|_| busy("acquire_exclusive"))
    }

    /// Raw file contents
    pub fn read_all(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| io_error("read_hosts_file", &self.path, e))
    }

    /// Hosts of the `wazuh.hosts` list, in file order
    pub fn list_hosts(&self) -> Result<Vec<HostRecord>> {
        let text = self.read_all()?;
        codec::parse_host_list(&text).map_err(in_op("list_hosts"))
    }

    /// SHA-256 of the current file contents, hex encoded
    pub fn digest(&self) -> Result<String> {
        let bytes = fs::read(&self.path).map_err(|e| io_error("digest_hosts_file", &self.path, e))?;
        Ok(content_digest(&bytes))
    }

    /// Append the list marker and its first block at the end of the file
    ///
    /// Only valid while the file has no `wazuh.hosts` marker at all.
    pub fn append_list_block(&self, guard: &ExclusiveGuard<'_>, block: &str) -> Result<()> {
        self.check_guard(guard)?;
        self.rewrite("append_list_block", |text| {
            let mut out = String::with_capacity(text.len() + block.len() + 2);
            out.push_str(text);
            if !text.is_empty() {
                if !text.ends_with('\n') {
                    out.push('\n');
                }
                out.push('\n');
            }
            out.push_str(block);
            Some(out)
        })
        .map(|_| ())
    }

    /// Replace every match of `pattern` with `replacement`
    ///
    /// `replacement` is inserted literally (no `$` expansion). Returns the
    /// number of matches; with zero matches the file is not rewritten.
    pub fn patch(
        &self,
        guard: &ExclusiveGuard<'_>,
        pattern: &Regex,
        replacement: &str,
    ) -> Result<usize> {
        self.check_guard(guard)?;
        let mut count = 0;
        self.rewrite("patch", |text| {
            count = pattern.find_iter(text).count();
            (count > 0).then(|| pattern.replace_all(text, NoExpand(replacement)).into_owned())
        })?;
        Ok(count)
    }

    /// Delete every match of `pattern`, dropping the list marker if the
    /// list is left without hosts
    ///
    /// Both edits land in a single write.
    pub fn remove_block(&self, guard: &ExclusiveGuard<'_>, pattern: &Regex) -> Result<usize> {
        self.check_guard(guard)?;
        let mut count = 0;
        let mut marker_removed = false;
        self.rewrite("remove_block", |text| {
            count = pattern.find_iter(text).count();
            if count == 0 {
                return None;
            }
            let mut out = pattern.replace_all(text, NoExpand("")).into_owned();
            if codec::parse_host_list(&out).is_ok_and(|hosts| hosts.is_empty()) {
                let marker = codec::list_marker_pattern();
                marker_removed = marker.is_match(&out);
                out = marker.replace(&out, NoExpand("")).into_owned();
            }
            Some(out)
        })?;
        if marker_removed {
            debug!(hosts_file = %self.path.display(), "removed empty host list marker");
        }
        Ok(count)
    }

    /// Read, transform and write back the file in one write call
    ///
    /// `edit` returning `None` means nothing changed. An edit that turns a
    /// readable host list into an unreadable one is refused with `Codec`
    /// and the file is left as it was.
    fn rewrite<F>(&self, op: &'static str, edit: F) -> Result<bool>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let text = self.read_all()?;
        let Some(updated) = edit(&text) else {
            debug!(op, hosts_file = %self.path.display(), "no matching content, file untouched");
            return Ok(false);
        };
        if codec::parse_host_list(&text).is_ok() {
            if let Err(e) = codec::parse_host_list(&updated) {
                return Err(ExError::new(ExErrorKind::Codec)
                    .with_op(op)
                    .with_message(format!("rewrite would leave the host list unreadable: {}", e)));
            }
        }
        atomic_write(&self.path, updated.as_bytes())?;
        debug!(
            op,
            hosts_file = %self.path.display(),
            before = %content_digest(text.as_bytes()),
            after = %content_digest(updated.as_bytes()),
            "hosts file rewritten"
        );
        Ok(true)
    }

    fn check_guard(&self, guard: &ExclusiveGuard<'_>) -> Result<()> {
        if std::ptr::eq(guard.flag, &self.busy) {
            Ok(())
        } else {
            Err(ExError::new(ExErrorKind::Internal)
                .with_op("check_guard")
                .with_message("exclusive guard belongs to another store"))
        }
    }
}

fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
