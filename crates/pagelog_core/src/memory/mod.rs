//! # Memory Management
//!
//! Everything that touches the pool's single block before it becomes pages.
//!
//! ## Design Philosophy
//!
//! The block is sized once, allocated once and released once:
//! - `layout` computes every offset up front, with no memory involved
//! - `alloc` obtains and owns the block through an injected allocator

mod alloc;
mod layout;

pub use alloc::{BlockAllocator, BudgetAllocator, RawBlock, SystemAllocator};
pub use layout::{
    align_up, is_aligned, PoolLayout, UnitShape, GUARD_BYTES, MIN_BUFFER_ALIGNMENT, MIN_PAGE_CAPACITY,
};
