//! Unix implementations of platform helpers.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Unix convention: a leading dot marks a hidden entry.
pub fn is_hidden(_path: &Path, name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

/// Whether this platform offers a default-application opener at all.
pub fn opener_available() -> bool {
    // Probe PATH for the opener binary without running it.
    std::env::var_os("PATH").is_some_and(|paths| {
        std::env::split_paths(&paths).any(|dir| dir.join(OPENER).is_file())
    })
}

/// Ask the desktop environment to open `path` with its associated
/// application. Detached: we do not wait for the viewer to exit.
pub fn open_with_default_app(path: &Path) -> io::Result<()> {
    Command::new(OPENER)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}
