//! Dependency crawler
//!
//! Fetches a root module and everything it transitively imports, refreshing
//! the source cache along the way.
//!
//! Fetches run concurrently in a [`JoinSet`]. Completed fetches are handled
//! one at a time in completion order: the text is stored, its imports are
//! mapped to source identifiers, and every identifier not seen before in this
//! crawl is spawned. A module is therefore fetched at most once per crawl,
//! and import cycles terminate.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tokio::task::JoinSet;
use tsgate_net::{FetchError, ModuleFetcher};

use crate::cache::SourceCache;
use crate::mapper::UrlMapper;
use crate::module_id::ModuleId;
use crate::scan::scan_imports;

/// Outcome of one crawl
#[derive(Debug, Default)]
pub struct CrawlReport {
    /// Some fetched text was new or differed from the cached text
    pub changed: bool,
    /// Successfully fetched modules, in completion order
    pub fetched: Vec<ModuleId>,
    /// Modules that could not be fetched
    pub failed: Vec<(ModuleId, FetchError)>,
}

impl CrawlReport {
    /// Check if every reachable module was fetched
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Crawls import graphs into a [`SourceCache`]
pub struct Crawler<'a, F> {
    fetcher: Arc<F>,
    sources: &'a mut SourceCache,
    mapper: &'a UrlMapper,
}

impl<'a, F: ModuleFetcher> Crawler<'a, F> {
    /// Create a crawler writing into `sources`
    pub fn new(fetcher: Arc<F>, sources: &'a mut SourceCache, mapper: &'a UrlMapper) -> Self {
        Self {
            fetcher,
            sources,
            mapper,
        }
    }

    /// Fetch `root` and every module reachable from it.
    ///
    /// A failed fetch leaves the previously cached text of that module in
    /// place and contributes nothing to the graph.
    pub async fn crawl(&mut self, root: &ModuleId) -> CrawlReport {
        tracing::info!(root = %root, "crawling");

        let mut report = CrawlReport::default();
        let mut seen: FxHashSet<ModuleId> = FxHashSet::default();
        let mut pending: Vec<ModuleId> = vec![root.clone()];
        let mut in_flight = JoinSet::new();

        loop {
            for id in pending.drain(..) {
                tracing::trace!(module = %id, "downloading");
                seen.insert(id.clone());
                let fetcher = Arc::clone(&self.fetcher);
                in_flight.spawn(async move {
                    let outcome = fetcher.fetch(id.as_str()).await;
                    (id, outcome)
                });
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let (id, outcome) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!(error = %e, "download task failed");
                    continue;
                }
            };

            let text = match outcome {
                Ok(text) => text,
                Err(e) => {
                    tracing::info!(module = %id, error = %e, "download failed");
                    report.failed.push((id, e));
                    continue;
                }
            };

            for import in scan_imports(&text) {
                let dep = self.mapper.to_source_id(&import.specifier, &id);
                if !seen.contains(&dep) && !pending.contains(&dep) {
                    tracing::trace!(module = %id, import = %dep, "new import");
                    pending.push(dep);
                }
            }

            if self.sources.put(id.clone(), text) {
                tracing::debug!(module = %id, "source changed");
                report.changed = true;
            }
            report.fetched.push(id);
        }

        tracing::debug!(
            root = %root,
            fetched = report.fetched.len(),
            failed = report.failed.len(),
            changed = report.changed,
            "crawl finished"
        );
        report
    }
}
