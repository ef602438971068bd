//! Core library for `filedeck`.
//!
//! A programmatic file-manager core: a navigable "current directory" cursor
//! plus batch operations (create, delete, copy, move, rename, search) over a
//! real filesystem, safe under concurrent invocation.
//!
//! The moving parts, leaf-first:
//! - [`lock::LockRegistry`]: canonical-path-keyed reentrant locks; the sole
//!   shared mutable state.
//! - [`path::CanonPath`]: one normalized path value used both as lock key
//!   and filesystem target.
//! - [`cursor::Cursor`]: the navigation state machine (atomic `cd`).
//! - [`ops`] / [`tree`]: mutation primitives and tree replication,
//!   fail-fast and non-transactional by contract.
//! - [`pool::WorkerPool`]: bounded per-session workers with deferred batch
//!   results; no cancellation once a unit is queued.
//! - [`listing`]: hidden-aware listings and full-match regex search.
//! - [`session::Session`]: the explicit per-session entry point binding the
//!   pieces together.
//!
//! Batch operations stop at the first non-success and do not undo work
//! already done; callers that need all-or-nothing semantics must build it
//! on top.

pub mod config;
pub mod cursor;
pub mod desktop;
pub mod errors;
pub mod listing;
pub mod lock;
pub mod ops;
pub mod output;
pub mod path;
pub mod platform;
pub mod pool;
pub mod session;
pub mod shutdown;
pub mod tree;

pub use cursor::Cursor;
pub use errors::{status_message, OpError, OpResult};
pub use listing::{EntryKind, ListOptions, ListingEntry};
pub use lock::{LockGuard, LockRegistry};
pub use path::CanonPath;
pub use pool::{Deferred, WorkerPool};
pub use session::{EntityProps, Session};

#[cfg(any(test, feature = "test-helpers"))]
pub use session::scratch_session;
