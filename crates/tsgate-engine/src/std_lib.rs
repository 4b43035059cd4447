//! Standard library declarations
//!
//! The compiler engine needs the standard declaration files (`lib.d.ts`,
//! `lib.es2015.core.d.ts`, ...) to type-check anything. They are downloaded
//! once at startup from a versioned distribution and never change afterwards.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::task::JoinSet;
use tsgate_net::{FetchError, ModuleFetcher};

/// Distribution the declaration files are downloaded from
pub const DEFAULT_LIB_ROOT: &str = "https://unpkg.com/typescript@4.0.2/";

/// Declaration files made available to the engine
pub const LIB_FILES: &[&str] = &[
    "lib.d.ts",
    "lib.dom.d.ts",
    "lib.dom.iterable.d.ts",
    "lib.es2015.collection.d.ts",
    "lib.es2015.core.d.ts",
    "lib.es2015.d.ts",
    "lib.es2015.generator.d.ts",
    "lib.es2015.iterable.d.ts",
    "lib.es2015.promise.d.ts",
    "lib.es2015.proxy.d.ts",
    "lib.es2015.reflect.d.ts",
    "lib.es2015.symbol.d.ts",
    "lib.es2015.symbol.wellknown.d.ts",
    "lib.es2016.array.include.d.ts",
    "lib.es2016.d.ts",
    "lib.es2017.d.ts",
    "lib.es2017.intl.d.ts",
    "lib.es2017.object.d.ts",
    "lib.es2017.sharedmemory.d.ts",
    "lib.es2017.string.d.ts",
    "lib.es2017.typedarrays.d.ts",
    "lib.es2018.asyncgenerator.d.ts",
    "lib.es2018.asynciterable.d.ts",
    "lib.es2018.d.ts",
    "lib.es2018.intl.d.ts",
    "lib.es2018.promise.d.ts",
    "lib.es2018.regexp.d.ts",
    "lib.es2019.array.d.ts",
    "lib.es2019.d.ts",
    "lib.es2019.object.d.ts",
    "lib.es2019.string.d.ts",
    "lib.es2019.symbol.d.ts",
    "lib.es2020.bigint.d.ts",
    "lib.es2020.d.ts",
    "lib.es2020.intl.d.ts",
    "lib.es2020.promise.d.ts",
    "lib.es2020.string.d.ts",
    "lib.es2020.symbol.wellknown.d.ts",
    "lib.es5.d.ts",
    "lib.esnext.d.ts",
    "lib.esnext.full.d.ts",
    "lib.esnext.intl.d.ts",
    "lib.esnext.promise.d.ts",
    "lib.esnext.string.d.ts",
    "lib.scripthost.d.ts",
    "lib.webworker.importscripts.d.ts",
];

/// Errors that can occur while loading the standard library
#[derive(Debug, Error)]
pub enum StdLibError {
    /// A declaration file could not be downloaded
    #[error("Failed to load {file} from {url}: {source}")]
    Fetch {
        file: String,
        url: String,
        #[source]
        source: FetchError,
    },

    /// A download task panicked or was cancelled
    #[error("Standard library download task failed: {0}")]
    Task(String),
}

/// Immutable set of standard declaration files, keyed by file name
#[derive(Debug, Default, Clone)]
pub struct StdLib {
    files: FxHashMap<String, String>,
}

impl StdLib {
    /// Create an empty standard library
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a standard library from in-memory files
    pub fn from_files<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            files: files
                .into_iter()
                .map(|(name, text)| (name.into(), text.into()))
                .collect(),
        }
    }

    /// Download `names` from `<root>lib/<name>` concurrently.
    ///
    /// Fails if any single file cannot be downloaded.
    pub async fn load<F: ModuleFetcher>(
        fetcher: Arc<F>,
        root: &str,
        names: &[String],
    ) -> Result<Self, StdLibError> {
        tracing::debug!(root, count = names.len(), "loading standard library");

        let mut downloads = JoinSet::new();
        for name in names {
            let fetcher = Arc::clone(&fetcher);
            let name = name.clone();
            let url = format!("{root}lib/{name}");
            downloads.spawn(async move {
                let outcome = fetcher.fetch(&url).await;
                (name, url, outcome)
            });
        }

        let mut files = FxHashMap::default();
        while let Some(joined) = downloads.join_next().await {
            let (file, url, outcome) = joined.map_err(|e| StdLibError::Task(e.to_string()))?;
            match outcome {
                Ok(text) => {
                    files.insert(file, text);
                }
                Err(source) => return Err(StdLibError::Fetch { file, url, source }),
            }
        }

        tracing::debug!(count = files.len(), "standard library loaded");
        Ok(Self { files })
    }

    /// Download the default file list from the default distribution
    pub async fn load_default<F: ModuleFetcher>(fetcher: Arc<F>) -> Result<Self, StdLibError> {
        let names: Vec<String> = LIB_FILES.iter().map(|s| s.to_string()).collect();
        Self::load(fetcher, DEFAULT_LIB_ROOT, &names).await
    }

    /// Get the text of a declaration file
    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    /// Check if `name` is a standard library file
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the library is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Get all file names
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}
