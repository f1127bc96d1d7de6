//! shelf-rs: a reading client for a remote book library.
//!
//! This crate is the client-side state layer of a book reading
//! application: it owns the canonical in-memory view of the catalog, the
//! currently open book and its bookmarks, reconciles that view with a
//! remote HTTP backend, and persists just enough of it to restore the
//! last reading position across restarts.
//!
//! # Features
//!
//! - Catalog browsing with a category filter
//! - Bookmark creation, update and deletion, synced to the backend
//! - Backend library scans with a dedicated long timeout
//! - Session restore: the last open book and category filter survive
//!   process restarts
//! - Fail-open list reads (an unreachable backend degrades to an empty
//!   catalog instead of an error)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration and CLI.
pub mod config;
/// Error types.
pub mod error;
/// Book and bookmark models.
pub mod library;
/// Local session persistence.
pub mod persist;
/// Remote backend client.
pub mod remote;
/// The library state store.
pub mod store;


pub use config::{Cli, Command, Config};
pub use error::{AppError, Result};
pub use remote::{HttpBookService, RemoteBookService};
pub use store::LibraryStore;
