//! Tsgate networking
//!
//! This crate provides the outbound side of the compile service:
//! - The [`ModuleFetcher`] trait the crawler and standard library loader use
//! - An HTTP fetcher backed by reqwest
//! - An in-memory fetcher for embedding and tests

pub mod fetch;
pub mod memory;

pub use fetch::{FetchError, HttpFetcher, ModuleFetcher, MAX_CONTENT_SIZE, REQUEST_TIMEOUT};
pub use memory::MemoryFetcher;
