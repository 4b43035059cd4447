//! Compilation orchestrator
//!
//! Ties the crawler, the virtual filesystem host and the compiler engine
//! together. A request for a source module refreshes the module's import
//! graph and recompiles only when something in it changed; otherwise the
//! cached artifact is served.

use std::sync::Arc;

use tsgate_net::ModuleFetcher;

use crate::cache::{OutputCache, SourceCache};
use crate::crawler::{CrawlReport, Crawler};
use crate::diagnostics::fallback_payload;
use crate::engine::{CompileOptions, CompilerEngine};
use crate::host::VfsHost;
use crate::mapper::UrlMapper;
use crate::module_id::ModuleId;
use crate::std_lib::StdLib;

/// Serves compiled modules, recompiling on change
pub struct ModuleCompiler<F, E> {
    fetcher: Arc<F>,
    engine: E,
    mapper: UrlMapper,
    std_lib: Arc<StdLib>,
    sources: SourceCache,
    outputs: OutputCache,
    options: CompileOptions,
}

impl<F: ModuleFetcher, E: CompilerEngine> ModuleCompiler<F, E> {
    /// Create a compiler with empty caches
    pub fn new(fetcher: Arc<F>, engine: E, mapper: UrlMapper, std_lib: Arc<StdLib>) -> Self {
        Self::with_caches(
            fetcher,
            engine,
            mapper,
            std_lib,
            SourceCache::new(),
            OutputCache::new(),
        )
    }

    /// Create a compiler over existing caches
    pub fn with_caches(
        fetcher: Arc<F>,
        engine: E,
        mapper: UrlMapper,
        std_lib: Arc<StdLib>,
        sources: SourceCache,
        outputs: OutputCache,
    ) -> Self {
        Self {
            fetcher,
            engine,
            mapper,
            std_lib,
            sources,
            outputs,
            options: CompileOptions::default(),
        }
    }

    /// Compiled text to serve for `requested`, or `None` if the request is
    /// not a module this compiler handles.
    ///
    /// - Source requests (`.ts`) refresh the import graph first and recompile
    ///   if any reachable source changed.
    /// - Otherwise the cached artifact is served.
    /// - A source request with nothing cached is compiled.
    pub async fn resolve(&mut self, requested: &str) -> Option<String> {
        let requested = self.mapper.normalize(requested);
        let is_source = self.mapper.is_source_id(requested.as_str());

        if is_source {
            let report = self.crawl(&requested).await;
            if report.changed {
                return self.compile(&requested);
            }
        }

        let artifact = self.mapper.to_artifact_id(requested.as_str());
        tracing::trace!(artifact = %artifact, "compile cache check");
        if let Some(text) = self.outputs.get(artifact.as_str()) {
            tracing::info!(module = %requested, "compile cache hit");
            return Some(text.to_string());
        }

        if is_source {
            return self.compile(&requested);
        }

        None
    }

    /// Refresh the import graph of `root` into the source cache
    pub async fn crawl(&mut self, root: &ModuleId) -> CrawlReport {
        Crawler::new(Arc::clone(&self.fetcher), &mut self.sources, &self.mapper)
            .crawl(root)
            .await
    }

    /// Compile `entry` and everything it imports from the source cache.
    ///
    /// Returns the entry's compiled text, or the diagnostic fallback payload
    /// if the engine suppressed emission. The payload is never cached.
    pub fn compile(&mut self, entry: &ModuleId) -> Option<String> {
        let artifact = self.mapper.to_artifact_id(entry.as_str());
        self.outputs.remove(artifact.as_str());

        tracing::info!(module = %entry, "compiling");
        let mut host = VfsHost::new(&self.std_lib, &self.sources, &self.mapper);
        let result = self
            .engine
            .emit(std::slice::from_ref(entry), &self.options, &mut host);
        tracing::debug!(
            module = %entry,
            emit_skipped = result.emit_skipped,
            diagnostics = result.diagnostics.len(),
            "compile result"
        );

        if result.emit_skipped {
            tracing::info!(module = %entry, "emit skipped, serving diagnostics");
            return Some(fallback_payload(&result.diagnostics, &host));
        }

        for (id, text) in host.into_writes() {
            self.outputs.insert(id, text);
        }

        let compiled = self.outputs.peek(artifact.as_str()).map(str::to_string);
        if compiled.is_none() {
            tracing::warn!(
                module = %entry,
                artifact = %artifact,
                "engine emitted no output for entry"
            );
        }
        compiled
    }

    /// Source cache
    pub fn sources(&self) -> &SourceCache {
        &self.sources
    }

    /// Mutable source cache
    pub fn sources_mut(&mut self) -> &mut SourceCache {
        &mut self.sources
    }

    /// Compile output cache
    pub fn outputs(&self) -> &OutputCache {
        &self.outputs
    }

    /// Identifier mapper
    pub fn mapper(&self) -> &UrlMapper {
        &self.mapper
    }

    /// Standard library served to the engine
    pub fn std_lib(&self) -> &StdLib {
        &self.std_lib
    }

    /// Options passed to the engine
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// The compiler engine
    pub fn engine(&self) -> &E {
        &self.engine
    }
}
