//! # Page Pool
//!
//! The carved pool and the page buffer manager operating on it.

pub(crate) mod page;
mod page_pool;
mod verify;

pub use page::{Page, PageKind};
pub use page_pool::PagePool;
pub use verify::{LayoutReport, PageRecord};
