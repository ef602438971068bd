//! Mutation primitives: create, delete, copy, move, rename.
//!
//! Every primitive validates its inputs, acquires the canonical path lock(s)
//! for each target through an RAII guard (so release runs on success,
//! expected failure and panic alike), performs the OS call and maps the
//! outcome into the closed taxonomy.
//!
//! Batch forms are fail-fast and explicitly NOT transactional: processing
//! stops at the first non-success, and mutations already applied before the
//! failing element are not undone.

use std::fs;

use tracing::{debug, info, warn};

use crate::errors::{OpError, OpResult};
use crate::lock::LockRegistry;
use crate::path::CanonPath;
use crate::tree;

/// Characters that may not appear in a created name.
pub const ILLEGAL_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Validation used before any creation touches the filesystem.
pub fn name_is_legal(name: &str) -> bool {
    !name.is_empty() && !name.contains(ILLEGAL_CHARS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateKind {
    File,
    Dir,
}

/// Create files or directories under `dest`, sequentially.
///
/// Checked before any mutation: every name passes the reserved-character
/// validation (`IllegalName` otherwise), and no target is locked by another
/// context (`EntityIsLocked` otherwise). After that the batch is fail-fast:
/// names created before a failure remain created.
pub fn create(
    registry: &LockRegistry,
    dest: &CanonPath,
    names: &[String],
    kind: CreateKind,
) -> OpResult {
    if names.iter().any(|n| !name_is_legal(n)) {
        return Err(OpError::IllegalName);
    }

    let targets: Vec<CanonPath> = names.iter().map(|n| dest.join(n)).collect();
    if registry.locked_elsewhere(&targets) {
        return Err(OpError::EntityIsLocked);
    }

    for target in &targets {
        let _guard = registry.guard(vec![target.clone()]);
        if target.exists() {
            return Err(match kind {
                CreateKind::File => OpError::FileAlreadyExists,
                CreateKind::Dir => OpError::DirAlreadyExists,
            });
        }
        let created = match kind {
            CreateKind::File => fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(target.as_path())
                .map(|_| ()),
            CreateKind::Dir => fs::create_dir(target.as_path()),
        };
        if let Err(e) = created {
            warn!(path = %target, error = %e, "create failed");
            return Err(OpError::from_io(&e));
        }
        info!(path = %target, kind = ?kind, "created");
    }
    Ok(())
}

/// Delete files and empty directories under `dir`, sequentially, fail-fast.
///
/// Each candidate is refused with `OperationNotSupported` when its resolved
/// path is the working directory itself or one of its ancestors (a delete
/// through oneself), and with `EntityNotFound` when absent.
pub fn delete(registry: &LockRegistry, dir: &CanonPath, names: &[String]) -> OpResult {
    for name in names {
        let target = dir.join(name);
        if target.is_ancestor_of(dir) {
            debug!(path = %target, "refusing to delete own ancestor");
            return Err(OpError::OperationNotSupported);
        }
        if !target.exists() {
            return Err(OpError::EntityNotFound);
        }

        let _guard = registry.guard(vec![target.clone()]);
        let result = if target.is_dir() {
            remove_empty_dir(&target)
        } else {
            fs::remove_file(target.as_path()).map_err(|e| {
                warn!(path = %target, error = %e, "remove file failed");
                OpError::from_io(&e)
            })
        };
        result?;
        info!(path = %target, "deleted");
    }
    Ok(())
}

/// `remove_dir` only after probing emptiness, so a populated directory maps
/// to `DirNotEmpty` on every toolchain.
fn remove_empty_dir(target: &CanonPath) -> OpResult {
    let mut entries = fs::read_dir(target.as_path()).map_err(|e| OpError::from_io(&e))?;
    if entries.next().is_some() {
        return Err(OpError::DirNotEmpty);
    }
    fs::remove_dir(target.as_path()).map_err(|e| {
        warn!(path = %target, error = %e, "remove dir failed");
        OpError::from_io(&e)
    })
}

/// Copy one entity (file or whole directory tree) with replace-existing
/// semantics. Source and destination are locked in that order; callers
/// composing multi-path operations keep the same order everywhere.
pub fn copy_entry(
    registry: &LockRegistry,
    src_dir: &CanonPath,
    src_name: &str,
    dest_dir: &CanonPath,
    dest_name: &str,
) -> OpResult {
    let src = src_dir.join(src_name);
    let dest = dest_dir.join(dest_name);
    if !src.exists() {
        return Err(OpError::EntityNotFound);
    }
    // Copying a directory into its own subtree would never terminate.
    if src.is_ancestor_of(&dest) {
        return Err(OpError::OperationNotSupported);
    }

    let _guard = registry.guard(vec![src.clone(), dest.clone()]);
    if src.is_dir() {
        tree::replicate(src.as_path(), dest.as_path())?;
    } else if let Err(e) = fs::copy(src.as_path(), dest.as_path()) {
        warn!(src = %src, dest = %dest, error = %e, "copy failed");
        return Err(OpError::from_io(&e));
    }
    info!(src = %src, dest = %dest, "copied");
    Ok(())
}

/// Move one entity with replace-existing semantics: a plain rename when the
/// OS allows it, otherwise copy-then-remove (cross-device, or an existing
/// destination on platforms where rename will not replace).
pub fn move_entry(
    registry: &LockRegistry,
    src_dir: &CanonPath,
    src_name: &str,
    dest_dir: &CanonPath,
    dest_name: &str,
) -> OpResult {
    let src = src_dir.join(src_name);
    let dest = dest_dir.join(dest_name);
    if !src.exists() {
        return Err(OpError::EntityNotFound);
    }
    if src == dest {
        return Ok(());
    }
    if src.is_ancestor_of(&dest) {
        return Err(OpError::OperationNotSupported);
    }

    let _guard = registry.guard(vec![src.clone(), dest.clone()]);
    if fs::rename(src.as_path(), dest.as_path()).is_ok() {
        info!(src = %src, dest = %dest, "renamed");
        return Ok(());
    }

    debug!(src = %src, dest = %dest, "rename failed, falling back to copy+remove");
    if src.is_dir() {
        tree::replicate(src.as_path(), dest.as_path())?;
        fs::remove_dir_all(src.as_path()).map_err(|e| {
            warn!(path = %src, error = %e, "remove source tree failed");
            OpError::from_io(&e)
        })?;
    } else {
        fs::copy(src.as_path(), dest.as_path()).map_err(|e| {
            warn!(src = %src, dest = %dest, error = %e, "copy fallback failed");
            OpError::from_io(&e)
        })?;
        fs::remove_file(src.as_path()).map_err(|e| {
            warn!(path = %src, error = %e, "remove source failed");
            OpError::from_io(&e)
        })?;
    }
    info!(src = %src, dest = %dest, "moved");
    Ok(())
}
