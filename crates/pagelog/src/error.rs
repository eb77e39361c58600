//! Demo error type.

use thiserror::Error;

/// Errors surfaced by the demo binary.
#[derive(Error, Debug)]
pub enum DemoError {
    /// Pool creation or a page operation failed.
    #[error("pool error: {0}")]
    Pool(#[from] pagelog_core::PoolError),

    /// The config file could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] pagelog_core::ConfigError),

    /// Writing the session output failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    /// A subscriber was already installed or the filter was invalid.
    #[error("logging setup failed: {0}")]
    Logging(String),
}
