//! # Demo Session
//!
//! The scripted session `pagelog_demo` runs: create a pool, clear it,
//! append to pages 0 and 1, print, destroy. Output goes to any writer so
//! the session can be checked in tests.

use std::io::Write;

use pagelog_core::{diagnostics, PagePool, PoolConfig};

use crate::error::DemoError;

/// What the session left behind, captured before the pool is destroyed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// Pages in the pool.
    pub page_count: usize,
    /// Bytes per page.
    pub page_capacity: usize,
    /// Bytes consumed by every append of the session.
    pub appended: usize,
    /// Remaining capacity of page 1 at the end.
    pub page_one_remaining: usize,
}

/// Runs the demo session against a pool built from `config`.
///
/// # Errors
///
/// Pool creation errors, out-of-range pages (configs with a single page),
/// and write errors on `out`.
pub fn run_demo_session<W: Write + ?Sized>(config: &PoolConfig, out: &mut W) -> Result<SessionSummary, DemoError> {
    let mut pool = PagePool::with_config(config)?;
    writeln!(
        out,
        "Logger created successfully with {} pages of size {} bytes each.",
        pool.page_count(),
        pool.page_capacity()
    )?;

    pool.clear_all();
    let mut appended = 0;
    appended += pool.append(0, "Hello, World!")?;
    appended += pool.append(1, "Hello, World!")?;
    appended += pool.append_line(1, "This is a test line.")?;
    appended += pool.append_line(1, "This is another test line.")?;
    appended += pool.append(1, "This is a test.")?;
    tracing::debug!("session appended {} bytes", appended);
    writeln!(out, "Saved data to page 1 and 0.")?;

    diagnostics::write_page(&pool, 0, out)?;
    diagnostics::write_all(&pool, out)?;

    #[cfg(feature = "debug-dump")]
    #[allow(deprecated)]
    diagnostics::debug_dump(&pool, out)?;

    let summary = SessionSummary {
        page_count: pool.page_count(),
        page_capacity: pool.page_capacity(),
        appended,
        page_one_remaining: pool.remaining(1)?,
    };

    writeln!(out, "Destroying...")?;
    pool.destroy();
    Ok(summary)
}
