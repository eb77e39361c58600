//! # Logging Setup
//!
//! Installs a `tracing_subscriber` registry with an [`EnvFilter`]. The
//! filter comes from `RUST_LOG` when set, otherwise from the caller's
//! default directive. Output goes to stderr so it never mixes with page
//! dumps on stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::DemoError;

/// Default directive when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,pagelog_core=debug";

/// Builds the filter: `RUST_LOG` first, then `default_directive`.
///
/// # Errors
///
/// Returns [`DemoError::Logging`] if `default_directive` does not parse.
pub fn build_filter(default_directive: &str) -> Result<EnvFilter, DemoError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directive).map_err(|err| DemoError::Logging(err.to_string())),
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`DemoError::Logging`] if the directive is invalid or a global
/// subscriber is already set.
pub fn init_tracing(default_directive: &str) -> Result<(), DemoError> {
    let filter = build_filter(default_directive)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| DemoError::Logging(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_tracing("warn");
        assert!(matches!(init_tracing("warn"), Err(DemoError::Logging(_))));
    }
}
