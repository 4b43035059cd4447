//! Log output
//!
//! The engine emits `tracing` events; this installs the subscriber that
//! prints them, filtered by the configured verbosity.

use tracing::level_filters::LevelFilter;

use crate::error::RuntimeError;

/// Maximum level logged at `verbosity`
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install a global fmt subscriber for `verbosity`.
///
/// Fails if a global subscriber has already been set.
pub fn init(verbosity: u8) -> Result<(), RuntimeError> {
    tracing_subscriber::fmt()
        .with_max_level(level_for(verbosity))
        .with_target(false)
        .try_init()
        .map_err(|e| RuntimeError::Logging(e.to_string()))
}
