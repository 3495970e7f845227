//! SQLite-backed named stores for cached responses.
//!
//! This module provides the store set consumed by the fetch strategies, with
//! async access via tokio-rusqlite. It supports:
//!
//! - Multiple named stores over one database (static, runtime, images)
//! - Insertion-ordered enumeration (rowid order, stable under re-write)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Single-oldest-entry eviction for bounded stores

pub mod connection;
pub mod entries;
pub mod evict;
pub mod migrations;
pub mod request;

pub use crate::Error;

pub use connection::StoreSet;
pub use request::{CachedResponse, Request, RequestKey};
