//! # Block Allocation
//!
//! The pool never calls the global allocator directly. It is handed a
//! [`BlockAllocator`] at creation and asks it for exactly one block, which a
//! [`RawBlock`] then owns until drop.

// SAFETY: This module owns the raw pool block. Every unsafe block below is
// a direct call into an allocator with the layout that produced the pointer.
#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

/// A source of zeroed, aligned memory blocks.
///
/// Implementations stand in for the platform primitive (heap, DMA-capable
/// region, static arena). The pool makes exactly one `allocate` call per
/// creation and exactly one `deallocate` call per destruction.
pub trait BlockAllocator {
    /// Allocates a zeroed block satisfying `layout`, or `None` on failure.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Releases a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator with the
    /// same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Allocator backed by the global Rust allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl BlockAllocator for SystemAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        // SAFETY: layout has non-zero size.
        NonNull::new(unsafe { std::alloc::alloc_zeroed(layout) })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees ptr came from `allocate` with this layout.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
    }
}

/// Allocator with a fixed byte budget, modelling a small embedded heap.
///
/// Requests that would push usage past the budget fail without touching
/// the inner allocator.
///
/// # Thread Safety
///
/// NOT thread-safe, like the pool it feeds.
#[derive(Debug)]
pub struct BudgetAllocator<A: BlockAllocator = SystemAllocator> {
    inner: A,
    budget: usize,
    in_use: Cell<usize>,
}

impl BudgetAllocator<SystemAllocator> {
    /// Creates a budgeted allocator over the system allocator.
    #[must_use]
    pub const fn new(budget: usize) -> Self {
        Self::with_inner(SystemAllocator, budget)
    }
}

impl<A: BlockAllocator> BudgetAllocator<A> {
    /// Creates a budgeted allocator over `inner`.
    #[must_use]
    pub const fn with_inner(inner: A, budget: usize) -> Self {
        Self {
            inner,
            budget,
            in_use: Cell::new(0),
        }
    }

    /// Total bytes this allocator may hand out.
    #[inline]
    #[must_use]
    pub const fn budget(&self) -> usize {
        self.budget
    }

    /// Bytes currently handed out.
    #[inline]
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.in_use.get()
    }
}

impl<A: BlockAllocator> BlockAllocator for BudgetAllocator<A> {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        let in_use = self.in_use.get().checked_add(layout.size())?;
        if in_use > self.budget {
            return None;
        }
        let ptr = self.inner.allocate(layout)?;
        self.in_use.set(in_use);
        Some(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract.
        unsafe { self.inner.deallocate(ptr, layout) };
        self.in_use.set(self.in_use.get() - layout.size());
    }
}

impl<A: BlockAllocator + ?Sized> BlockAllocator for &A {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract.
        unsafe { (**self).deallocate(ptr, layout) };
    }
}

/// Exclusive owner of one allocated block.
///
/// The block is released exactly once, when the `RawBlock` is dropped.
pub struct RawBlock<A: BlockAllocator> {
    ptr: NonNull<u8>,
    layout: Layout,
    allocator: A,
}

impl<A: BlockAllocator> RawBlock<A> {
    /// Requests one block of `layout` from `allocator`.
    ///
    /// Returns `None` if the allocator refuses; nothing is held in that case.
    pub fn allocate(allocator: A, layout: Layout) -> Option<Self> {
        let ptr = allocator.allocate(layout)?;
        Some(Self { ptr, layout, allocator })
    }

    /// Base pointer of the block.
    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Base address of the block.
    #[inline]
    #[must_use]
    pub fn address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Size of the block in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.layout.size()
    }

    /// Always false: zero-sized blocks are never allocated.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    /// The allocator that owns the block.
    #[inline]
    #[must_use]
    pub const fn allocator(&self) -> &A {
        &self.allocator
    }
}

// SAFETY: the block is exclusively owned; moving the owner moves the only
// handle to it. The allocator travels with it, hence the `A: Send` bound.
unsafe impl<A: BlockAllocator + Send> Send for RawBlock<A> {}

impl<A: BlockAllocator> Drop for RawBlock<A> {
    fn drop(&mut self) {
        // SAFETY: ptr/layout are exactly what `allocate` returned and the
        // block is not reachable after drop.
        unsafe { self.allocator.deallocate(self.ptr, self.layout) };
    }
}

impl<A: BlockAllocator> std::fmt::Debug for RawBlock<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBlock")
            .field("ptr", &self.ptr)
            .field("size", &self.layout.size())
            .field("align", &self.layout.align())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_block_is_zeroed_and_aligned() {
        let layout = Layout::from_size_align(256, 64).unwrap();
        let block = RawBlock::allocate(SystemAllocator, layout).unwrap();
        assert_eq!(block.address() % 64, 0);
        assert_eq!(block.len(), 256);

        // SAFETY: the block is 256 bytes and exclusively owned here.
        let bytes = unsafe { std::slice::from_raw_parts(block.as_ptr(), block.len()) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_budget_enforced_and_released() {
        let budget = BudgetAllocator::new(1000);
        let layout = Layout::from_size_align(600, 8).unwrap();

        let first = RawBlock::allocate(&budget, layout).unwrap();
        assert_eq!(budget.in_use(), 600);
        assert!(RawBlock::allocate(&budget, layout).is_none());
        assert_eq!(budget.in_use(), 600);

        drop(first);
        assert_eq!(budget.in_use(), 0);
        assert!(RawBlock::allocate(&budget, layout).is_some());
    }
}
