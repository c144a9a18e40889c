use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CacheError, Result};

/// Hard upper bound for any cache payload we will attempt to deserialize.
///
/// Cache corruption should degrade to a cache miss, not an out-of-memory
/// crash. Payloads here are small count structs and workspace file lists, so
/// this cap is generous.
pub const PAYLOAD_LIMIT_BYTES: u64 = 16 * 1024 * 1024;

/// Read a cache file, treating anything unexpected (symlink, oversized entry,
/// unreadable) as a miss. Invalid entries are removed best-effort so they do
/// not keep tripping the same path.
pub(crate) fn read_entry(path: &Path) -> Option<Vec<u8>> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            // Misses are expected; only log unexpected filesystem errors.
            if err.kind() != io::ErrorKind::NotFound {
                tracing::debug!(
                    target = "sfcc.cache",
                    path = %path.display(),
                    error = %err,
                    "failed to stat cache entry"
                );
            }
            return None;
        }
    };

    if meta.file_type().is_symlink() || !meta.is_file() || meta.len() > PAYLOAD_LIMIT_BYTES {
        remove_entry_best_effort(path, "read_entry.invalid");
        return None;
    }

    match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::debug!(
                    target = "sfcc.cache",
                    path = %path.display(),
                    error = %err,
                    "failed to read cache entry"
                );
            }
            None
        }
    }
}

pub(crate) fn remove_entry_best_effort(path: &Path, reason: &'static str) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::debug!(
                target = "sfcc.cache",
                path = %path.display(),
                reason,
                error = %err,
                "failed to remove cache entry"
            );
        }
    }
}

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `bytes` to `path` atomically: a unique temp file in the same
/// directory, then rename over the destination.
pub(crate) fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Err(io::Error::other("cache path has no parent").into());
    };
    fs::create_dir_all(parent)?;

    let (tmp_path, mut file) = open_unique_tmp_file(path, parent)?;
    let write_result = (|| -> Result<()> {
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(())
    })();
    drop(file);

    if let Err(err) = write_result {
        remove_entry_best_effort(&tmp_path, "atomic_write.write_failed");
        return Err(err);
    }

    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(err) if cfg!(windows) && path.exists() => {
            // On Windows, `rename` doesn't overwrite. Remove and retry once;
            // concurrent writers of the same key produce equivalent payloads.
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(remove_err) if remove_err.kind() == io::ErrorKind::NotFound => {}
                Err(remove_err) => {
                    remove_entry_best_effort(&tmp_path, "atomic_write.remove_failed");
                    return Err(remove_err.into());
                }
            }
            match fs::rename(&tmp_path, path) {
                Ok(()) => Ok(()),
                Err(_) => {
                    remove_entry_best_effort(&tmp_path, "atomic_write.rename_retry_failed");
                    Err(CacheError::from(err))
                }
            }
        }
        Err(err) => {
            remove_entry_best_effort(&tmp_path, "atomic_write.rename_failed");
            Err(err.into())
        }
    }
}

fn open_unique_tmp_file(dest: &Path, parent: &Path) -> io::Result<(PathBuf, fs::File)> {
    let file_name = dest
        .file_name()
        .ok_or_else(|| io::Error::other("cache path has no file name"))?;
    let pid = std::process::id();

    loop {
        let counter = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(format!(".tmp.{pid}.{counter}"));
        let tmp_path = parent.join(tmp_name);

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
        {
            Ok(file) => return Ok((tmp_path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }
}
