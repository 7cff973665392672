//! Atomic write primitives
//!
//! Uses temp→rename pattern to ensure no partial writes

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::{io_error, Result};

/// Atomically replace the contents of a file
///
/// The temp file lives next to the target so the rename never crosses a
/// filesystem. It gets an unpredictable name and owner-only permissions;
/// an existing target's permissions are carried over before the rename.
/// On any failure the temp file is removed when it goes out of scope.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    let dir = match target_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| io_error("create_hosts_temp", dir, e))?;
    if let Err(e) = temp.write_all(content).and_then(|()| temp.as_file().sync_all()) {
        return Err(io_error("write_hosts_temp", temp.path(), e));
    }

    if let Ok(metadata) = fs::metadata(target_path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| io_error("copy_hosts_permissions", temp.path(), e))?;
    }

    temp.persist(target_path)
        .map(|_| ())
        .map_err(|e| io_error("rename_hosts_temp", target_path, e.error))
}
