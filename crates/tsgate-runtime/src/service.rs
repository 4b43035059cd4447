//! Module service
//!
//! The facade a request-interception layer talks to. It owns one
//! [`ModuleCompiler`] for the lifetime of the service, so compiled output is
//! reused across requests until a source changes.

use std::sync::Arc;

use tsgate_engine::{CompilerEngine, ModuleCompiler, StdLib, UrlMapper};
use tsgate_net::{HttpFetcher, ModuleFetcher};

use crate::config::ServiceConfig;
use crate::error::RuntimeError;
use crate::logging;

/// Content type of every response
pub const JAVASCRIPT_CONTENT_TYPE: &str = "application/javascript";

/// Compiled module ready to be served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleResponse {
    pub body: String,
    pub content_type: &'static str,
}

/// Compile service for one origin
pub struct ModuleService<F, E> {
    compiler: ModuleCompiler<F, E>,
    origin: String,
    same_origin_only: bool,
}

impl<E: CompilerEngine> ModuleService<HttpFetcher, E> {
    /// Start a service that fetches modules and the standard library over HTTP
    pub async fn start(config: &ServiceConfig, engine: E) -> Result<Self, RuntimeError> {
        config.validate()?;
        let fetcher = Arc::new(HttpFetcher::new()?);
        Self::with_fetcher(config, fetcher, engine).await
    }
}

impl<F: ModuleFetcher, E: CompilerEngine> ModuleService<F, E> {
    /// Start a service on a custom fetcher.
    ///
    /// Downloads the standard library before returning; the service is not
    /// usable until every declaration file has been loaded.
    pub async fn with_fetcher(
        config: &ServiceConfig,
        fetcher: Arc<F>,
        engine: E,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        if config.init_logging {
            logging::init(config.verbosity)?;
        }

        tracing::info!(
            root = %config.std_lib.root,
            files = config.std_lib.files.len(),
            "loading standard library"
        );
        let std_lib = StdLib::load(
            Arc::clone(&fetcher),
            &config.std_lib.root,
            &config.std_lib.files,
        )
        .await?;

        let mapper = UrlMapper::new(config.origin.as_str());
        let origin = mapper.origin().unwrap_or_default().to_string();
        tracing::info!(origin = %origin, "module service ready");

        Ok(Self {
            compiler: ModuleCompiler::new(fetcher, engine, mapper, Arc::new(std_lib)),
            origin,
            same_origin_only: config.same_origin_only,
        })
    }

    /// Whether `url` is passed to the compiler at all.
    ///
    /// Every URL is, unless the service was configured to serve its own
    /// origin only.
    pub fn handles(&self, url: &str) -> bool {
        !self.same_origin_only
            || url.starts_with('/')
            || url
                .strip_prefix(self.origin.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Compiled module for `url`, or `None` to let the request pass through.
    ///
    /// Requests the compiler does not know (non-source URLs without a cached
    /// artifact) also pass through.
    pub async fn handle(&mut self, url: &str) -> Option<ModuleResponse> {
        if !self.handles(url) {
            return None;
        }

        let body = self.compiler.resolve(url).await?;
        tracing::trace!(url, bytes = body.len(), "serving");
        Some(ModuleResponse {
            body,
            content_type: JAVASCRIPT_CONTENT_TYPE,
        })
    }

    /// Origin served, without a trailing slash
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The underlying compiler
    pub fn compiler(&self) -> &ModuleCompiler<F, E> {
        &self.compiler
    }

    /// Mutable access to the underlying compiler
    pub fn compiler_mut(&mut self) -> &mut ModuleCompiler<F, E> {
        &mut self.compiler
    }
}
