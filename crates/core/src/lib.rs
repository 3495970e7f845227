//! Core engine for outpost, an offline-caching and update-delivery agent.
//!
//! This crate provides:
//! - SQLite-backed named stores with bounded-size eviction
//! - Request classification into strategy buckets
//! - The four fetch strategies behind [`engine::Engine`]
//! - Push-notification decoding and click routing
//! - Store provisioning and retirement

pub mod cache;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod notify;

pub use cache::{CachedResponse, Request, RequestKey, StoreSet};
pub use classify::{Route, Router};
pub use config::EngineConfig;
pub use engine::{Engine, Fetcher, Outcome};
pub use error::Error;
