//! # Pagelog Demo
//!
//! Runs the demo session and prints the pages to stdout.
//!
//! ```bash
//! # Default pool: 6 pages of 1024 bytes
//! pagelog_demo
//!
//! # Pool from a TOML file
//! pagelog_demo crates/pagelog/pagelog.toml
//!
//! # Quieter logs
//! RUST_LOG=warn pagelog_demo
//! ```

use std::process::ExitCode;

use pagelog::core::PoolConfig;
use pagelog::{logging, session, DemoError};

fn run() -> Result<(), DemoError> {
    logging::init_tracing(logging::DEFAULT_FILTER)?;

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("loading pool config from {}", path);
            PoolConfig::from_toml_file(&path)?
        }
        None => PoolConfig::default(),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = session::run_demo_session(&config, &mut out)?;
    tracing::info!(
        "session done: {} pages x {} bytes, {} bytes appended",
        summary.page_count,
        summary.page_capacity,
        summary.appended
    );
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pagelog_demo: {err}");
            ExitCode::FAILURE
        }
    }
}
