//! In-memory module fetcher
//!
//! Serves module text from a map instead of the network. Useful for embedding
//! the compile service where sources already live in memory, and for tests that
//! need to edit sources between requests, delay individual responses, or count
//! how often a URL was fetched.

use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::fetch::{FetchError, ModuleFetcher};

/// Module fetcher backed by an in-memory map of URL to text
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: RwLock<FxHashMap<String, String>>,
    delays: RwLock<FxHashMap<String, Duration>>,
    fetch_counts: Mutex<FxHashMap<String, usize>>,
}

impl MemoryFetcher {
    /// Create an empty fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher serving the given files
    pub fn with_files<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fetcher = Self::new();
        for (url, text) in files {
            fetcher.insert(url, text);
        }
        fetcher
    }

    /// Add or replace the text served for `url`
    pub fn insert(&self, url: impl Into<String>, text: impl Into<String>) {
        self.files.write().insert(url.into(), text.into());
    }

    /// Stop serving `url`; later fetches fail with 404
    pub fn remove(&self, url: &str) -> Option<String> {
        self.files.write().remove(url)
    }

    /// Delay every response for `url` by `delay`
    pub fn set_delay(&self, url: impl Into<String>, delay: Duration) {
        self.delays.write().insert(url.into(), delay);
    }

    /// Number of fetches issued for `url` so far
    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetch_counts.lock().get(url).copied().unwrap_or(0)
    }

    /// Total number of fetches issued
    pub fn total_fetches(&self) -> usize {
        self.fetch_counts.lock().values().sum()
    }

    /// Reset all fetch counters
    pub fn reset_counts(&self) {
        self.fetch_counts.lock().clear();
    }
}

impl ModuleFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        *self.fetch_counts.lock().entry(url.to_string()).or_insert(0) += 1;

        let delay = self.delays.read().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        // Read after the delay so edits made while "in flight" are observed
        let text = self.files.read().get(url).cloned();
        text.ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}
