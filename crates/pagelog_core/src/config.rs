//! # Pool Configuration
//!
//! Pool geometry and policies, loaded once at startup from TOML.
//!
//! ```toml
//! page_count = 6
//! page_capacity = 1024
//! buffer_alignment = 64   # optional, default 8
//! overflow = "reject"     # optional, default "truncate"
//! clear_all = "zero_fill" # optional, default "sentinel"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::memory::MIN_BUFFER_ALIGNMENT;

/// What an append does when the data does not fit in the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Write what fits and report the shorter length. Lossy.
    #[default]
    Truncate,
    /// Write nothing and return [`crate::PoolError::CapacityExceeded`].
    Reject,
}

/// How [`crate::PagePool::clear_all`] resets buffer memory.
///
/// Single-page [`crate::PagePool::clear`] always zero-fills.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    /// Force only the first two bytes of each buffer to zero. Stale bytes
    /// beyond them stay visible through the raw buffer accessors.
    #[default]
    Sentinel,
    /// Zero the full capacity of every buffer.
    ZeroFill,
}

/// Pool geometry and policies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of pages.
    pub page_count: usize,
    /// Bytes per page buffer (raised to 2 if smaller).
    pub page_capacity: usize,
    /// Alignment of every page buffer (power of two, at least 8).
    #[serde(default = "default_buffer_alignment")]
    pub buffer_alignment: usize,
    /// Append overflow behaviour.
    #[serde(default)]
    pub overflow: OverflowPolicy,
    /// Clear-all behaviour.
    #[serde(default)]
    pub clear_all: ClearPolicy,
}

const fn default_buffer_alignment() -> usize {
    MIN_BUFFER_ALIGNMENT
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(6, 1024)
    }
}

impl PoolConfig {
    /// Config with the given geometry and default policies.
    #[must_use]
    pub const fn new(page_count: usize, page_capacity: usize) -> Self {
        Self {
            page_count,
            page_capacity,
            buffer_alignment: MIN_BUFFER_ALIGNMENT,
            overflow: OverflowPolicy::Truncate,
            clear_all: ClearPolicy::Sentinel,
        }
    }

    /// Sets the buffer alignment.
    #[must_use]
    pub const fn with_buffer_alignment(mut self, alignment: usize) -> Self {
        self.buffer_alignment = alignment;
        self
    }

    /// Sets the overflow policy.
    #[must_use]
    pub const fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Sets the clear-all policy.
    #[must_use]
    pub const fn with_clear_all(mut self, clear_all: ClearPolicy) -> Self {
        self.clear_all = clear_all;
        self
    }

    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or missing fields.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not a valid config.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Errors raised while loading a [`PoolConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
