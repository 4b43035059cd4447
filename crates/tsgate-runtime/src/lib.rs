//! Tsgate runtime
//!
//! Wires the engine into a running service:
//! - TOML configuration
//! - Log output through a `tracing` subscriber
//! - Standard library download at start-up
//! - [`ModuleService`], the entry point for a request-interception layer

pub mod config;
pub mod error;
pub mod logging;
pub mod service;

pub use config::{ConfigError, ServiceConfig, StdLibConfig};
pub use error::RuntimeError;
pub use service::{ModuleResponse, ModuleService, JAVASCRIPT_CONTENT_TYPE};
