use std::fs;
use std::io;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Absent,
}

/// Remove a well-known directory tree; a missing path is fine.
///
/// A symlink at `path` is unlinked, never followed.
///
/// # Errors
///
/// Returns an IO error if the path exists but cannot be removed.
pub fn remove_dir_if_present(path: &Path) -> io::Result<RemoveOutcome> {
    let md = match fs::symlink_metadata(path) {
        Ok(md) => md,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RemoveOutcome::Absent),
        Err(e) => return Err(e),
    };
    if md.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(RemoveOutcome::Removed)
}
