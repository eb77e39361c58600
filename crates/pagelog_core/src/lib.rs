//! # Pagelog Core
//!
//! Fixed-capacity logging pages carved from a single allocation, for
//! targets where per-record heap allocation is not an option:
//! - One allocation per pool, sized and aligned up front
//! - Pages addressed by index, appended to in place
//! - Lossy or strict overflow, chosen by the caller
//!
//! ## Architecture Rules
//!
//! 1. **One block** - header, descriptors and buffers share one allocation
//! 2. **Pure layout** - every offset comes from `PoolLayout`, tested without memory
//! 3. **No hidden allocation** - appends copy into existing buffers only
//!
//! ## Example
//!
//! ```rust
//! use pagelog_core::{PageKind, PagePool};
//!
//! let mut pool = PagePool::create(6, 1024)?;
//! pool.append_line(0, "boot ok")?;
//! pool.set_kind(0, PageKind::Info)?;
//! assert_eq!(pool.text(0)?, "boot ok\n");
//! # Ok::<(), pagelog_core::PoolError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod memory;
pub mod pool;

pub use config::{ClearPolicy, ConfigError, OverflowPolicy, PoolConfig};
pub use error::{LayoutViolation, PoolError, PoolResult};
pub use memory::{BlockAllocator, BudgetAllocator, PoolLayout, SystemAllocator};
pub use pool::{LayoutReport, Page, PageKind, PagePool, PageRecord};
