//! Desktop-open collaborator.
//!
//! Thin wrapper over the platform opener: resolves the target under the
//! given directory, checks the registry, and asks the OS to open the file
//! with its default associated application.

use tracing::{debug, info};

use crate::errors::{OpError, OpResult};
use crate::lock::LockRegistry;
use crate::path::CanonPath;
use crate::platform;

pub fn open_external(registry: &LockRegistry, dir: &CanonPath, name: &str) -> OpResult {
    if !platform::opener_available() {
        return Err(OpError::OperationNotSupported);
    }
    let target = dir.join(name);
    if !target.exists() {
        return Err(OpError::EntityNotFound);
    }
    if registry.locked_elsewhere(std::slice::from_ref(&target)) {
        return Err(OpError::EntityIsLocked);
    }

    let _guard = registry.guard(vec![target.clone()]);
    platform::open_with_default_app(target.as_path()).map_err(|e| {
        debug!(path = %target, error = %e, "opener failed");
        OpError::from_io(&e)
    })?;
    info!(path = %target, "opened with default application");
    Ok(())
}
