//! Virtual filesystem host
//!
//! There is no real filesystem behind the compile service. The engine sees
//! the standard library and the source cache as its files, and everything it
//! writes is collected as compiled output.

use rustc_hash::FxHashMap;

use crate::cache::SourceCache;
use crate::mapper::UrlMapper;
use crate::module_id::ModuleId;
use crate::std_lib::StdLib;

/// Filesystem operations an engine may perform
pub trait CompilerHost {
    /// Whether `path` can be read
    fn file_exists(&self, path: &str) -> bool;

    /// Text of `path`, or `None` if the file is unknown
    fn read_file(&self, path: &str) -> Option<&str>;

    /// Store an emitted artifact
    fn write_file(&mut self, path: &str, text: &str);

    fn current_directory(&self) -> &str {
        ""
    }

    fn directory_exists(&self, _path: &str) -> bool {
        true
    }

    fn directories(&self, _path: &str) -> Vec<String> {
        Vec::new()
    }

    fn executing_file_path(&self) -> &str {
        ""
    }

    fn use_case_sensitive_file_names(&self) -> bool {
        true
    }

    fn new_line(&self) -> &str {
        "\n"
    }
}

/// Host backed by the standard library and the source cache.
///
/// A new `VfsHost` is built for every compilation so it always sees the
/// current cache contents. Writes are collected and handed to the
/// orchestrator, which commits them to the output cache only if the engine
/// did not suppress emission.
pub struct VfsHost<'a> {
    std_lib: &'a StdLib,
    sources: &'a SourceCache,
    mapper: &'a UrlMapper,
    writes: FxHashMap<ModuleId, String>,
}

impl<'a> VfsHost<'a> {
    /// Create a host over the given caches
    pub fn new(std_lib: &'a StdLib, sources: &'a SourceCache, mapper: &'a UrlMapper) -> Self {
        Self {
            std_lib,
            sources,
            mapper,
            writes: FxHashMap::default(),
        }
    }

    /// Artifacts written so far
    pub fn writes(&self) -> &FxHashMap<ModuleId, String> {
        &self.writes
    }

    /// Consume the host, returning everything written
    pub fn into_writes(self) -> FxHashMap<ModuleId, String> {
        self.writes
    }
}

impl CompilerHost for VfsHost<'_> {
    fn file_exists(&self, path: &str) -> bool {
        let path = self.mapper.normalize(path);
        tracing::trace!(path = %path, "file exists check");
        self.std_lib.contains(path.as_str()) || self.sources.contains(path.as_str())
    }

    fn read_file(&self, path: &str) -> Option<&str> {
        let path = self.mapper.normalize(path);
        if let Some(text) = self.std_lib.get(path.as_str()) {
            tracing::trace!(path = %path, "read lib");
            return Some(text);
        }
        if let Some(text) = self.sources.get(path.as_str()) {
            tracing::trace!(path = %path, "read source");
            return Some(text);
        }
        tracing::info!(path = %path, "missing file");
        None
    }

    fn write_file(&mut self, path: &str, text: &str) {
        let path = self.mapper.normalize(path);
        tracing::debug!(path = %path, "write file");
        self.writes.insert(path, text.to_string());
    }
}
