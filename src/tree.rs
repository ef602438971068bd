//! Directory-tree replication.
//!
//! Pre-order, queue-driven copy of a subtree: each destination directory is
//! created before the files inside it, relative structure is preserved and
//! existing destination files are overwritten (replace-existing, never a
//! merge). Failure partway stops the walk and returns that failure; whatever
//! was already copied stays on disk, mirroring the engine's non-atomic batch
//! policy at the tree level.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{OpError, OpResult};

/// Free-space cushion kept on top of the measured subtree size.
const SPACE_CUSHION: u64 = 4 * 1024 * 1024;

/// Copy the tree rooted at `src` to `dest`.
pub fn replicate(src: &Path, dest: &Path) -> OpResult {
    ensure_space(src, dest)?;

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            warn!(src = %src.display(), error = %e, "tree walk failed");
            e.io_error().map(OpError::from_io).unwrap_or(OpError::IoError)
        })?;

        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| OpError::Unknown)?;
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| {
                warn!(path = %target.display(), error = %e, "create directory failed");
                OpError::from_io(&e)
            })?;
        } else {
            // fs::copy truncates an existing destination file.
            fs::copy(entry.path(), &target).map_err(|e| {
                warn!(
                    src = %entry.path().display(),
                    dest = %target.display(),
                    error = %e,
                    "file copy failed"
                );
                OpError::from_io(&e)
            })?;
        }
    }

    debug!(src = %src.display(), dest = %dest.display(), "tree replicated");
    Ok(())
}

/// Total size of all regular files under `root`.
fn subtree_size(root: &Path) -> u64 {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Fail before the first write when the destination filesystem cannot hold
/// the subtree. Probes the nearest existing ancestor of `dest`.
fn ensure_space(src: &Path, dest: &Path) -> OpResult {
    let required = subtree_size(src).saturating_add(SPACE_CUSHION);

    let mut probe = dest;
    while !probe.exists() {
        match probe.parent() {
            Some(parent) => probe = parent,
            None => return Ok(()), // nothing to probe against
        }
    }

    match fs2::available_space(probe) {
        Ok(free) if free < required => {
            warn!(
                dest = %dest.display(),
                required,
                free,
                "not enough free space for tree copy"
            );
            Err(OpError::IoError)
        }
        // An unprobeable filesystem is not a reason to refuse the copy.
        _ => Ok(()),
    }
}
