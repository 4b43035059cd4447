//! Source and compiled-output caches
//!
//! Provides in-memory storage of:
//! - The last fetched text of every module ever crawled
//! - The compiled text of every artifact the engine emitted
//!
//! Both live as long as the owning [`ModuleCompiler`](crate::ModuleCompiler)
//! and are never persisted.

use rustc_hash::FxHashMap;

use crate::module_id::ModuleId;

/// Last fetched text per module
#[derive(Debug, Default, Clone)]
pub struct SourceCache {
    files: FxHashMap<ModuleId, String>,
}

impl SourceCache {
    /// Create a new empty source cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached text of a module
    pub fn get(&self, id: &str) -> Option<&str> {
        self.files.get(id).map(String::as_str)
    }

    /// Store the text of a module.
    ///
    /// Returns `true` if there was no previous entry or the previous text
    /// differs from `text`.
    pub fn put(&mut self, id: ModuleId, text: String) -> bool {
        match self.files.get_mut(&id) {
            Some(existing) if *existing == text => false,
            Some(existing) => {
                *existing = text;
                true
            }
            None => {
                self.files.insert(id, text);
                true
            }
        }
    }

    /// Remove a module, returning its text
    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.files.remove(id)
    }

    /// Check if a module is cached
    pub fn contains(&self, id: &str) -> bool {
        self.files.contains_key(id)
    }

    /// Get the number of cached modules
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Get all cached module identifiers
    pub fn ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.files.keys()
    }
}

/// Compiled text per artifact
#[derive(Debug, Default, Clone)]
pub struct OutputCache {
    files: FxHashMap<ModuleId, String>,
    hits: usize,
    misses: usize,
}

impl OutputCache {
    /// Create a new empty output cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a compiled artifact, counting the lookup as a hit or miss
    pub fn get(&mut self, id: &str) -> Option<&str> {
        match self.files.get(id) {
            Some(text) => {
                self.hits += 1;
                Some(text.as_str())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Get a compiled artifact without touching the statistics
    pub fn peek(&self, id: &str) -> Option<&str> {
        self.files.get(id).map(String::as_str)
    }

    /// Remove an artifact, returning its text
    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.files.remove(id)
    }

    /// Store an emitted artifact
    pub(crate) fn insert(&mut self, id: ModuleId, text: String) {
        self.files.insert(id, text);
    }

    /// Check if an artifact is cached
    pub fn contains(&self, id: &str) -> bool {
        self.files.contains_key(id)
    }

    /// Get the number of cached artifacts
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Get all cached artifact identifiers
    pub fn ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.files.keys()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.files.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached entries
    pub entries: usize,
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
}

impl CacheStats {
    /// Get cache hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ModuleId {
        ModuleId::new(s)
    }

    #[test]
    fn test_put_reports_new_entry_as_changed() {
        let mut cache = SourceCache::new();
        assert!(cache.put(id("https://o/a.ts"), "let a = 1;".to_string()));
        assert_eq!(cache.get("https://o/a.ts"), Some("let a = 1;"));
    }

    #[test]
    fn test_put_identical_text_is_unchanged() {
        let mut cache = SourceCache::new();
        cache.put(id("https://o/a.ts"), "let a = 1;".to_string());
        assert!(!cache.put(id("https://o/a.ts"), "let a = 1;".to_string()));
    }

    #[test]
    fn test_put_different_text_overwrites() {
        let mut cache = SourceCache::new();
        cache.put(id("https://o/a.ts"), "let a = 1;".to_string());
        assert!(cache.put(id("https://o/a.ts"), "let a = 2;".to_string()));
        assert_eq!(cache.get("https://o/a.ts"), Some("let a = 2;"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_is_byte_exact() {
        let mut cache = SourceCache::new();
        cache.put(id("https://o/a.ts"), "let a = 1;".to_string());
        assert!(cache.put(id("https://o/a.ts"), "let a = 1; ".to_string()));
    }

    #[test]
    fn test_source_remove() {
        let mut cache = SourceCache::new();
        cache.put(id("https://o/a.ts"), "x".to_string());
        assert_eq!(cache.remove("https://o/a.ts"), Some("x".to_string()));
        assert!(!cache.contains("https://o/a.ts"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_output_miss_and_hit_stats() {
        let mut cache = OutputCache::new();
        assert!(cache.get("https://o/a.js").is_none());

        cache.insert(id("https://o/a.js"), "export {};".to_string());
        assert_eq!(cache.get("https://o/a.js"), Some("export {};"));
        assert_eq!(cache.get("https://o/a.js"), Some("export {};"));

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_ratio() - 0.666).abs() < 0.01);
    }

    #[test]
    fn test_output_peek_does_not_count() {
        let mut cache = OutputCache::new();
        cache.insert(id("https://o/a.js"), "x".to_string());
        assert_eq!(cache.peek("https://o/a.js"), Some("x"));
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_output_remove() {
        let mut cache = OutputCache::new();
        cache.insert(id("https://o/a.js"), "x".to_string());
        cache.remove("https://o/a.js");
        assert!(!cache.contains("https://o/a.js"));
        assert_eq!(CacheStats { entries: 0, hits: 0, misses: 0 }.hit_ratio(), 0.0);
    }
}
