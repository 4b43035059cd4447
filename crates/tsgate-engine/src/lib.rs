//! Tsgate engine
//!
//! Serves compiled output for source modules on demand, recompiling only when
//! something in the reachable import graph changed:
//! - URL mapping between source, artifact and import identifiers
//! - Import/re-export scanning
//! - Concurrent, deduplicated crawling of the import graph
//! - Source and compiled-output caches
//! - A virtual filesystem host for an external compiler engine
//! - Diagnostic fallback payloads when emission is suppressed

pub mod cache;
pub mod compiler;
pub mod crawler;
pub mod diagnostics;
pub mod engine;
pub mod host;
pub mod mapper;
pub mod module_id;
pub mod scan;
pub mod std_lib;

pub use cache::{CacheStats, OutputCache, SourceCache};
pub use compiler::ModuleCompiler;
pub use crawler::{CrawlReport, Crawler};
pub use diagnostics::{fallback_payload, DiagnosticLocation};
pub use engine::{
    CompileOptions, CompilerEngine, Diagnostic, EmitResult, MessageChain, ModuleKind, ScriptTarget,
};
pub use host::{CompilerHost, VfsHost};
pub use mapper::UrlMapper;
pub use module_id::ModuleId;
pub use scan::{scan_imports, ImportKind, ImportRef};
pub use std_lib::{StdLib, StdLibError, DEFAULT_LIB_ROOT, LIB_FILES};
