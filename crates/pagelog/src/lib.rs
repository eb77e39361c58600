//! # Pagelog
//!
//! Process-level glue around [`pagelog_core`]:
//!
//! - `logging`: tracing subscriber setup driven by `RUST_LOG`
//! - `session`: the demo session run by `pagelog_demo`
//!
//! ```rust
//! use pagelog::{core::PoolConfig, session};
//!
//! let mut out = Vec::new();
//! session::run_demo_session(&PoolConfig::default(), &mut out)?;
//! assert!(String::from_utf8_lossy(&out).contains("Page 0: Hello, World!"));
//! # Ok::<(), pagelog::DemoError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod logging;
pub mod session;

pub use error::DemoError;
pub use pagelog_core as core;
