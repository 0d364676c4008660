use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use crate::types::config_line::{rewrite_assignments, ConfigLine, ValueChange};

/// What `edit_config_line` did to the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// The value changed: the original went to `backup`, the file was rewritten.
    Rewritten {
        backup: PathBuf,
        changes: Vec<ValueChange>,
    },
    /// The key is present and already carries the transformed value.
    Unchanged { value: String },
    /// No uncommented assignment of the key exists; nothing was touched.
    KeyMissing,
    /// The file does not exist; nothing was touched.
    FileMissing,
}

/// Apply `line` to the file at `path`.
///
/// The file is read whole. When the transform changes the key's value, a
/// timestamped backup is taken first and the new content replaces the file
/// atomically with the original mode. Every other byte is preserved. A
/// missing key or missing file is reported, not treated as an error.
///
/// # Errors
///
/// Returns an IO error if the file exists but cannot be read (or is not
/// UTF-8), or if the backup or the write fails. The original file is intact
/// in every error case.
pub fn edit_config_line(path: &Path, line: &ConfigLine) -> io::Result<EditOutcome> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(EditOutcome::FileMissing),
        Err(e) => return Err(e),
    };
    let Some(rewrite) = rewrite_assignments(&content, line) else {
        return Ok(EditOutcome::KeyMissing);
    };
    if !rewrite.is_modified() {
        let value = rewrite
            .changes
            .last()
            .map(|c| c.new.clone())
            .unwrap_or_default();
        return Ok(EditOutcome::Unchanged { value });
    }

    let mode = fs::metadata(path)?.permissions().mode();
    let backup = super::backup::create_backup(path)?;
    super::atomic::atomic_write(path, rewrite.content.as_bytes(), mode)?;
    Ok(EditOutcome::Rewritten {
        backup,
        changes: rewrite.changes,
    })
}
