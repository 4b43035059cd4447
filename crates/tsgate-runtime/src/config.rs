//! Service configuration (tsgate.toml)
//!
//! ```toml
//! origin = "https://app.example"
//! verbosity = 1
//! init_logging = true
//! same_origin_only = false
//!
//! [std_lib]
//! root = "https://unpkg.com/typescript@4.0.2/"
//! files = ["lib.d.ts", "lib.es5.d.ts"]
//! ```
//!
//! Only `origin` is required.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tsgate_engine::{DEFAULT_LIB_ROOT, LIB_FILES};
use url::Url;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    Validation(String),
}

/// Compile service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Origin that root-relative module paths resolve against
    pub origin: String,

    /// Log detail: 0 = warnings only, 1 = info, 2 = debug, 3 = trace
    #[serde(default)]
    pub verbosity: u8,

    /// Install a global log subscriber at `verbosity` when the service starts.
    /// Leave off when the embedder sets up `tracing` itself.
    #[serde(default)]
    pub init_logging: bool,

    /// Pass through requests for URLs outside `origin` instead of resolving
    /// them. Off by default, so cross-origin imports are served compiled too.
    #[serde(default)]
    pub same_origin_only: bool,

    /// Standard library source
    #[serde(default)]
    pub std_lib: StdLibConfig,
}

/// Where the standard declaration files come from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StdLibConfig {
    /// Distribution root; files are fetched from `<root>lib/<name>`
    #[serde(default = "default_lib_root")]
    pub root: String,

    /// Declaration file names
    #[serde(default = "default_lib_files")]
    pub files: Vec<String>,
}

fn default_lib_root() -> String {
    DEFAULT_LIB_ROOT.to_string()
}

fn default_lib_files() -> Vec<String> {
    LIB_FILES.iter().map(|s| s.to_string()).collect()
}

impl Default for StdLibConfig {
    fn default() -> Self {
        Self {
            root: default_lib_root(),
            files: default_lib_files(),
        }
    }
}

impl ServiceConfig {
    /// Configuration with defaults for everything but the origin
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            verbosity: 0,
            init_logging: false,
            same_origin_only: false,
            std_lib: StdLibConfig::default(),
        }
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = Url::parse(&self.origin).map_err(|e| {
            ConfigError::Validation(format!("Invalid origin '{}': {}", self.origin, e))
        })?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "Origin must be an http or https URL: {}",
                self.origin
            )));
        }

        if !self.std_lib.root.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "Standard library root must end with '/': {}",
                self.std_lib.root
            )));
        }
        Url::parse(&self.std_lib.root).map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid standard library root '{}': {}",
                self.std_lib.root, e
            ))
        })?;

        let bad_name = self
            .std_lib
            .files
            .iter()
            .find(|f| f.is_empty() || f.contains('/'));
        if let Some(name) = bad_name {
            return Err(ConfigError::Validation(format!(
                "Invalid standard library file name: '{name}'"
            )));
        }

        Ok(())
    }
}
