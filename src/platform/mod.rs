//! Platform-specific helpers.
//! Hides OS differences (Unix/Windows) behind a uniform API so the rest of
//! the codebase can remain platform-agnostic.

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{is_hidden, open_with_default_app, opener_available};

#[cfg(not(unix))]
pub use windows::{is_hidden, open_with_default_app, opener_available};
