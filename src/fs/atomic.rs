//! Atomic file replacement primitives.
//!
//! This module implements a TOCTOU-safe sequence using directory handles:
//! `open_dir_nofollow(parent) -> openat(tmp, O_EXCL) -> write + fsync -> renameat(tmp, final) -> fsync(dirfd)`.
use std::ffi::CString;
use std::fs;
use std::io::Write as _;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::constants::TMP_SUFFIX;
use rustix::fd::OwnedFd;
use rustix::fs::{openat, renameat, unlinkat, AtFlags, Mode, OFlags, CWD};
use rustix::io::Errno;
use std::sync::atomic::{AtomicU64, Ordering};

fn errno_to_io(e: Errno) -> std::io::Error {
    std::io::Error::from_raw_os_error(e.raw_os_error())
}

fn cstring(bytes: &[u8]) -> std::io::Result<CString> {
    CString::new(bytes)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid cstring"))
}

// Global counter to produce unique temporary names within a process.
static NEXT_TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Open a directory with `O_DIRECTORY` | `O_NOFOLLOW` for atomic operations.
///
/// # Errors
///
/// Returns an IO error if the directory cannot be opened.
pub fn open_dir_nofollow(dir: &Path) -> std::io::Result<OwnedFd> {
    let c = cstring(dir.as_os_str().as_bytes())?;
    openat(
        CWD,
        c.as_c_str(),
        OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC | OFlags::NOFOLLOW,
        Mode::empty(),
    )
    .map_err(errno_to_io)
}

/// Fsync the parent directory of `path` for durability.
///
/// # Errors
///
/// Returns an IO error if the parent directory cannot be opened or fsynced.
pub fn fsync_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        let dir = fs::File::open(parent)?;
        dir.sync_all()?;
    }
    Ok(())
}

fn parent_of(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Replace the contents of `target` with `bytes` atomically.
///
/// The new file is staged next to the target, given `mode`, synced and then
/// renamed over the target, so readers see either the old or the new file.
///
/// # Errors
///
/// Returns an IO error if staging, syncing or the rename fails. The staged
/// temporary file is removed on failure.
pub fn atomic_write(target: &Path, bytes: &[u8], mode: u32) -> std::io::Result<()> {
    let fname = target.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "target has no file name")
    })?;
    let pid = std::process::id();
    let ctr = NEXT_TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(".{}.{pid}.{ctr}{TMP_SUFFIX}", fname.to_string_lossy());

    let dirfd = open_dir_nofollow(parent_of(target))?;
    let tmp_c = cstring(tmp_name.as_bytes())?;
    let new_c = cstring(fname.as_bytes())?;

    let fd = openat(
        &dirfd,
        tmp_c.as_c_str(),
        OFlags::WRONLY | OFlags::CREATE | OFlags::EXCL | OFlags::CLOEXEC,
        Mode::from_bits_truncate(mode & 0o7777),
    )
    .map_err(errno_to_io)?;

    let staged = (|| -> std::io::Result<()> {
        // Creation mode is filtered by the umask; set it explicitly.
        rustix::fs::fchmod(&fd, Mode::from_bits_truncate(mode & 0o7777)).map_err(errno_to_io)?;
        let mut file = fs::File::from(fd);
        file.write_all(bytes)?;
        file.sync_all()?;
        renameat(&dirfd, tmp_c.as_c_str(), &dirfd, new_c.as_c_str()).map_err(errno_to_io)
    })();

    match staged {
        Ok(()) => {
            let _ = rustix::fs::fsync(&dirfd);
            Ok(())
        }
        Err(e) => {
            let _ = unlinkat(&dirfd, tmp_c.as_c_str(), AtFlags::empty());
            Err(e)
        }
    }
}
