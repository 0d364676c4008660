//! Timestamped backups of files about to be rewritten.
//!
//! A backup is a byte-for-byte sibling copy named
//! `<original-path>.bak.<YYYYMMDDhhmmss>`; when that name is taken within the
//! same second, `-1`, `-2`, ... are appended until a free name is found.
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use time::macros::format_description;
use time::OffsetDateTime;

use crate::constants::BACKUP_INFIX;

/// Render the timestamp part of a backup name.
#[must_use]
pub fn backup_stamp(at: OffsetDateTime) -> String {
    let fmt = format_description!("[year][month][day][hour][minute][second]");
    at.format(&fmt)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Compute the backup path for `target` at `stamp`, without touching the disk.
#[must_use]
pub fn backup_path(target: &Path, stamp: &str) -> PathBuf {
    let mut s = OsString::from(target.as_os_str());
    s.push(BACKUP_INFIX);
    s.push(stamp);
    PathBuf::from(s)
}

fn with_counter(base: &Path, n: u32) -> PathBuf {
    let mut s = OsString::from(base.as_os_str());
    s.push(format!("-{n}"));
    PathBuf::from(s)
}

/// Copy `target` to a fresh timestamped sibling and return the backup path.
///
/// The backup keeps the original permissions and is synced before returning,
/// so the original content is recoverable once this succeeds.
///
/// # Errors
///
/// Returns an IO error if the target cannot be read or the backup cannot be
/// created. An existing file is never overwritten.
pub fn create_backup(target: &Path) -> io::Result<PathBuf> {
    let meta = fs::metadata(target)?;
    let content = fs::read(target)?;
    let base = backup_path(target, &backup_stamp(OffsetDateTime::now_utc()));

    let mut candidate = base.clone();
    let mut n = 0u32;
    let mut file = loop {
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(f) => break f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                n = n.saturating_add(1);
                candidate = with_counter(&base, n);
            }
            Err(e) => return Err(e),
        }
    };
    let written = file
        .write_all(&content)
        .and_then(|()| file.set_permissions(meta.permissions()))
        .and_then(|()| file.sync_all());
    drop(file);
    discard_on_err(&candidate, written)?;
    let _ = crate::fs::atomic::fsync_parent_dir(&candidate);
    Ok(candidate)
}

/// Remove a partially written backup at `path` when `res` failed.
fn discard_on_err<T>(path: &Path, res: io::Result<T>) -> io::Result<T> {
    if res.is_err() {
        let _ = fs::remove_file(path);
    }
    res
}

/// List existing backups of `target`, oldest name first.
#[must_use]
pub fn list_backups(target: &Path) -> Vec<PathBuf> {
    let Some(name) = target.file_name().and_then(|s| s.to_str()) else {
        return Vec::new();
    };
    let prefix = format!("{name}{BACKUP_INFIX}");
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut out: Vec<PathBuf> = fs::read_dir(parent)
        .map(|rd| {
            rd.flatten()
                .filter(|e| {
                    e.file_name()
                        .to_str()
                        .is_some_and(|s| s.starts_with(&prefix))
                })
                .map(|e| e.path())
                .collect()
        })
        .unwrap_or_default();
    out.sort();
    out
}
