//! URL mapping
//!
//! Translates between source identifiers, compiled-artifact identifiers and
//! import specifiers:
//!
//! ```text
//! ./test      -> ./test.ts      (source)   ./test.js  (artifact)
//! ./test.ts   -> ./test.ts      (source)   ./test.js  (artifact)
//! ./test.js   -> ./test.d.ts    (source)
//! /test       -> <origin>/test.ts
//! ```

use url::Url;

use crate::module_id::ModuleId;

/// Suffix of source modules
pub const SOURCE_SUFFIX: &str = ".ts";

/// Suffix of compiled artifacts
pub const ARTIFACT_SUFFIX: &str = ".js";

/// Suffix of declaration-only modules
pub const DECLARATION_SUFFIX: &str = ".d.ts";

/// Stateless identifier mapper.
///
/// The only configuration is the origin used to qualify root-relative paths
/// (`/lib/util.ts`). Without an origin such paths are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlMapper {
    origin: Option<String>,
}

impl UrlMapper {
    /// Create a mapper that qualifies root-relative paths with `origin`
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        let origin = origin.trim_end_matches('/').to_string();
        Self {
            origin: Some(origin),
        }
    }

    /// Create a mapper with no origin
    pub fn without_origin() -> Self {
        Self::default()
    }

    /// The configured origin, without a trailing slash
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Qualify a root-relative path (`/x`) with the origin
    pub fn resolve_origin_relative(&self, path: &str) -> String {
        match &self.origin {
            Some(origin) if path.starts_with('/') => format!("{origin}{path}"),
            _ => path.to_string(),
        }
    }

    /// Canonical identifier for `path`.
    ///
    /// Root-relative paths are qualified with the origin, and anything that
    /// parses as a URL is normalized (`/a/../b` becomes `/b`). Everything
    /// else is kept as written.
    pub fn normalize(&self, path: &str) -> ModuleId {
        let path = self.resolve_origin_relative(path);
        match Url::parse(&path) {
            Ok(url) => ModuleId::new(String::from(url)),
            Err(_) => ModuleId::new(path),
        }
    }

    /// Whether `id` names a source module
    pub fn is_source_id(&self, id: &str) -> bool {
        id.ends_with(SOURCE_SUFFIX)
    }

    /// Identifier under which the compiled output of `source` is stored
    pub fn to_artifact_id(&self, source: &str) -> ModuleId {
        let source = self.normalize(source).into_string();
        let stem = source.strip_suffix(SOURCE_SUFFIX).unwrap_or(&source);
        ModuleId::new(format!("{stem}{ARTIFACT_SUFFIX}"))
    }

    /// Source identifier named by `specifier` in the module `importing`.
    ///
    /// Relative specifiers (starting with `.`) are resolved against the
    /// directory of `importing`. Anything else is assumed to be absolute
    /// already. Results are normalized like [`UrlMapper::normalize`]. A
    /// specifier that cannot be resolved is returned unresolved and fails
    /// later, when it is fetched.
    pub fn to_source_id(&self, specifier: &str, importing: &ModuleId) -> ModuleId {
        let specifier = self.resolve_origin_relative(specifier);
        let specifier = if specifier.ends_with(SOURCE_SUFFIX) {
            specifier
        } else if let Some(stem) = specifier.strip_suffix(ARTIFACT_SUFFIX) {
            format!("{stem}{DECLARATION_SUFFIX}")
        } else {
            format!("{specifier}{SOURCE_SUFFIX}")
        };

        if !specifier.starts_with('.') {
            return self.normalize(&specifier);
        }

        self.normalize(&format!("{}/../{}", importing.as_str(), specifier))
    }
}
