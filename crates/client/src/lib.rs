//! Network client for outpost.
//!
//! This crate provides the reqwest-backed implementation of the core
//! [`Fetcher`](outpost_core::Fetcher) seam.

pub mod http;

pub use http::{HttpFetcher, HttpFetcherConfig};
