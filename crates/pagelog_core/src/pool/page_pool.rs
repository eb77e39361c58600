//! # Page Pool
//!
//! One block, carved once, addressed by page index.
//!
//! ## Memory Model
//!
//! ```text
//! RawBlock ──► [PoolHeader | Desc 0 | Buf 0 | Desc 1 | Buf 1 | ... | slack]
//!                            ▲        ▲
//!                            │        └── layout.buffer_offset(i)
//!                            └─────────── layout.descriptor_offset(i)
//! ```
//!
//! Descriptors and buffers are never allocated, moved or freed one at a
//! time. Page lookup is offset arithmetic, not list traversal.

// SAFETY: This module writes descriptors and buffers into the raw pool
// block. Every pointer is derived from `PoolLayout` offsets that are
// verified in `memory::layout` tests and by `verify_layout`.
#![allow(unsafe_code)]

use std::borrow::Cow;

use crate::config::{ClearPolicy, OverflowPolicy, PoolConfig};
use crate::error::{PoolError, PoolResult};
use crate::memory::{BlockAllocator, PoolLayout, RawBlock, SystemAllocator, GUARD_BYTES};

use super::page::{Page, PageDescriptor, PageKind, PoolHeader};

/// A fixed set of text pages living in a single allocation.
///
/// # Thread Safety
///
/// NOT thread-safe. A pool may be moved to another thread, but all access
/// must come from one thread at a time (one pool per thread, or an external
/// mutex).
///
/// # Example
///
/// ```rust
/// use pagelog_core::PagePool;
///
/// let mut pool = PagePool::create(6, 1024)?;
/// assert_eq!(pool.append(0, "Hello, World!")?, 13);
/// assert_eq!(pool.append_line(1, "This is a test line.")?, 21);
/// assert_eq!(pool.text(1)?, "This is a test line.\n");
/// # Ok::<(), pagelog_core::PoolError>(())
/// ```
pub struct PagePool<A: BlockAllocator = SystemAllocator> {
    block: RawBlock<A>,
    layout: PoolLayout,
    overflow: OverflowPolicy,
    clear_all: ClearPolicy,
}

impl PagePool<SystemAllocator> {
    /// Creates a pool of `page_count` pages of `page_capacity` bytes each,
    /// with default policies, on the system allocator.
    ///
    /// A `page_capacity` of 1 is raised to 2.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidParameters`] if either argument is zero,
    /// [`PoolError::AllocationFailed`] if the block cannot be allocated.
    pub fn create(page_count: usize, page_capacity: usize) -> PoolResult<Self> {
        Self::with_config(&PoolConfig::new(page_count, page_capacity))
    }

    /// Creates a pool from a config on the system allocator.
    ///
    /// # Errors
    ///
    /// See [`PagePool::create`].
    pub fn with_config(config: &PoolConfig) -> PoolResult<Self> {
        Self::with_config_in(config, SystemAllocator)
    }
}

impl<A: BlockAllocator> PagePool<A> {
    /// Creates a pool from a config, drawing its single block from `allocator`.
    ///
    /// Either the whole block is obtained and carved, or nothing is held.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidParameters`] for rejected geometry (no memory is
    /// requested), [`PoolError::AllocationFailed`] if `allocator` refuses.
    pub fn with_config_in(config: &PoolConfig, allocator: A) -> PoolResult<Self> {
        let layout = PoolLayout::compute(config.page_count, config.page_capacity, config.buffer_alignment)?;
        let request = layout.block_layout();

        let Some(block) = RawBlock::allocate(allocator, request) else {
            tracing::warn!(
                "Page pool allocation failed: {} bytes (align {})",
                request.size(),
                request.align()
            );
            return Err(PoolError::AllocationFailed {
                size: request.size(),
                align: request.align(),
            });
        };

        let mut pool = Self {
            block,
            layout,
            overflow: config.overflow,
            clear_all: config.clear_all,
        };
        pool.carve();

        tracing::debug!(
            "Page pool created: {} pages x {} bytes, block {} bytes at {:#x}",
            layout.page_count(),
            layout.page_capacity(),
            layout.total_size(),
            pool.block.address()
        );
        Ok(pool)
    }

    /// Writes the header and every page descriptor into the fresh block.
    #[allow(clippy::cast_ptr_alignment)]
    fn carve(&mut self) {
        let base = self.block.as_ptr();
        let header = PoolHeader {
            page_capacity: self.layout.page_capacity(),
            page_count: self.layout.page_count(),
            buffer_alignment: self.layout.buffer_alignment(),
        };

        // SAFETY: offset 0 is aligned to the block alignment, which is at
        // least the header alignment, and `first_unit >= size_of::<PoolHeader>()`.
        unsafe { base.cast::<PoolHeader>().write(header) };

        for index in 0..self.layout.page_count() {
            let descriptor = PageDescriptor::new(self.layout.buffer_offset(index), self.layout.page_capacity());
            // SAFETY: the descriptor offset is aligned for `PageDescriptor`
            // and the unit lies inside the block. The buffer holds at least
            // `MIN_PAGE_CAPACITY` (2) bytes.
            unsafe {
                self.descriptor_ptr(index).write(descriptor);
                let buffer = self.buffer_ptr(index);
                buffer.write(0);
                buffer.add(1).write(0);
            }
        }
    }

    // ------------------------------------------------------------------
    // Raw access
    // ------------------------------------------------------------------

    #[allow(clippy::cast_ptr_alignment)]
    fn descriptor_ptr(&self, index: usize) -> *mut PageDescriptor {
        debug_assert!(index < self.layout.page_count());
        // SAFETY: descriptor_offset(index) is inside the block for any valid index.
        unsafe { self.block.as_ptr().add(self.layout.descriptor_offset(index)).cast() }
    }

    fn buffer_ptr(&self, index: usize) -> *mut u8 {
        debug_assert!(index < self.layout.page_count());
        // SAFETY: buffer_offset(index) is inside the block for any valid index.
        unsafe { self.block.as_ptr().add(self.layout.buffer_offset(index)) }
    }

    #[allow(clippy::cast_ptr_alignment)]
    pub(crate) fn header(&self) -> &PoolHeader {
        // SAFETY: written in `carve`, never moved.
        unsafe { &*self.block.as_ptr().cast::<PoolHeader>() }
    }

    pub(crate) fn descriptor(&self, index: usize) -> &PageDescriptor {
        // SAFETY: written in `carve`; shared borrow of self prevents writers.
        unsafe { &*self.descriptor_ptr(index) }
    }

    fn buffer(&self, index: usize) -> &[u8] {
        // SAFETY: `page_capacity` bytes starting at the buffer are inside the
        // unit and disjoint from every descriptor.
        unsafe { std::slice::from_raw_parts(self.buffer_ptr(index), self.layout.page_capacity()) }
    }

    /// Descriptor and buffer-plus-guard of one page, borrowed together.
    fn unit_mut(&mut self, index: usize) -> (&mut PageDescriptor, &mut [u8]) {
        let descriptor = self.descriptor_ptr(index);
        let storage = self.buffer_ptr(index);
        let len = self.layout.page_capacity() + GUARD_BYTES;
        // SAFETY: descriptor and buffer+guard are disjoint ranges of the same
        // unit (see `PoolLayout`), and `&mut self` makes the borrow exclusive.
        unsafe { (&mut *descriptor, std::slice::from_raw_parts_mut(storage, len)) }
    }

    fn view(&self, index: usize) -> Page<'_> {
        let descriptor = self.descriptor(index);
        Page {
            index,
            kind: descriptor.kind,
            remaining: descriptor.remaining,
            capacity: self.layout.page_capacity(),
            buffer: self.buffer(index),
        }
    }

    fn check_index(&self, index: usize) -> PoolResult<()> {
        if index < self.layout.page_count() {
            Ok(())
        } else {
            Err(PoolError::IndexOutOfRange {
                index,
                page_count: self.layout.page_count(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Number of pages.
    #[inline]
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.layout.page_count()
    }

    /// Capacity of each page buffer in bytes.
    #[inline]
    #[must_use]
    pub const fn page_capacity(&self) -> usize {
        self.layout.page_capacity()
    }

    /// Alignment of each page buffer in bytes.
    #[inline]
    #[must_use]
    pub const fn buffer_alignment(&self) -> usize {
        self.layout.buffer_alignment()
    }

    /// Size of the single allocation backing the pool.
    #[inline]
    #[must_use]
    pub const fn total_size(&self) -> usize {
        self.layout.total_size()
    }

    /// The computed block layout.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> &PoolLayout {
        &self.layout
    }

    /// Active overflow policy.
    #[inline]
    #[must_use]
    pub const fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow
    }

    /// Changes the overflow policy for subsequent appends.
    pub fn set_overflow_policy(&mut self, overflow: OverflowPolicy) {
        self.overflow = overflow;
    }

    /// Active clear-all policy.
    #[inline]
    #[must_use]
    pub const fn clear_policy(&self) -> ClearPolicy {
        self.clear_all
    }

    /// Base address of the block.
    #[inline]
    #[must_use]
    pub fn base_address(&self) -> usize {
        self.block.address()
    }

    /// The allocator the block was drawn from.
    #[inline]
    #[must_use]
    pub const fn allocator(&self) -> &A {
        self.block.allocator()
    }

    // ------------------------------------------------------------------
    // Appends
    // ------------------------------------------------------------------

    /// Appends `data` to page `index`.
    ///
    /// Returns the number of bytes consumed from the page. Under
    /// [`OverflowPolicy::Truncate`] data that does not fit is cut to the
    /// remaining space (possibly to nothing).
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`], or [`PoolError::CapacityExceeded`]
    /// under [`OverflowPolicy::Reject`].
    pub fn append(&mut self, index: usize, data: impl AsRef<[u8]>) -> PoolResult<usize> {
        self.append_with(index, data.as_ref(), None)
    }

    /// Appends `data` followed by a newline to page `index`.
    ///
    /// The newline counts against capacity and is included in the returned
    /// byte count. When truncating, one byte is kept back for it; a full page
    /// receives neither data nor newline.
    ///
    /// # Errors
    ///
    /// Same as [`PagePool::append`].
    pub fn append_line(&mut self, index: usize, data: impl AsRef<[u8]>) -> PoolResult<usize> {
        self.append_with(index, data.as_ref(), Some(b'\n'))
    }

    /// Appends the bytes of `data` up to its first NUL (or all of it).
    ///
    /// # Errors
    ///
    /// Same as [`PagePool::append`].
    pub fn append_cstr(&mut self, index: usize, data: &[u8]) -> PoolResult<usize> {
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        self.append_with(index, &data[..len], None)
    }

    /// Shared append engine: copies `data` after the current content,
    /// optionally followed by `terminator`, then writes a terminating zero.
    ///
    /// # Errors
    ///
    /// Same as [`PagePool::append`].
    pub fn append_with(&mut self, index: usize, data: &[u8], terminator: Option<u8>) -> PoolResult<usize> {
        self.check_index(index)?;
        let capacity = self.layout.page_capacity();
        let overflow = self.overflow;
        let (descriptor, storage) = self.unit_mut(index);

        let remaining = descriptor.remaining;
        let offset = capacity - remaining;
        let overhead = usize::from(terminator.is_some());
        let requested = data.len() + overhead;

        let written = if requested <= remaining {
            data.len()
        } else {
            match overflow {
                OverflowPolicy::Reject => {
                    tracing::warn!(
                        "Append to page {} rejected: {} bytes requested, {} remaining",
                        index,
                        requested,
                        remaining
                    );
                    return Err(PoolError::CapacityExceeded { requested, available: remaining });
                }
                OverflowPolicy::Truncate => {
                    let room = remaining.saturating_sub(overhead);
                    tracing::trace!("Append to page {} truncated: {} -> {} bytes", index, data.len(), room);
                    room
                }
            }
        };

        let mut end = offset + written;
        storage[offset..end].copy_from_slice(&data[..written]);
        if let Some(terminator) = terminator {
            if end < capacity {
                storage[end] = terminator;
                end += 1;
            }
        }
        // `end <= capacity`, so this lands at worst in the guard byte.
        storage[end] = 0;
        descriptor.remaining = capacity - end;

        Ok(end - offset)
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    /// Sets the kind of page `index`.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`]; no page is modified.
    pub fn set_kind(&mut self, index: usize, kind: PageKind) -> PoolResult<()> {
        self.check_index(index)?;
        self.unit_mut(index).0.kind = kind;
        Ok(())
    }

    /// Kind of page `index`.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`].
    pub fn kind(&self, index: usize) -> PoolResult<PageKind> {
        self.check_index(index)?;
        Ok(self.descriptor(index).kind)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Unused bytes of page `index`.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`].
    pub fn remaining(&self, index: usize) -> PoolResult<usize> {
        self.check_index(index)?;
        Ok(self.descriptor(index).remaining)
    }

    /// Read view of page `index`.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`].
    pub fn page(&self, index: usize) -> PoolResult<Page<'_>> {
        self.check_index(index)?;
        Ok(self.view(index))
    }

    /// Content written to page `index`.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`].
    pub fn content(&self, index: usize) -> PoolResult<&[u8]> {
        self.page(index).map(|page| page.content())
    }

    /// Content of page `index` as text (lossy UTF-8).
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`].
    pub fn text(&self, index: usize) -> PoolResult<Cow<'_, str>> {
        self.page(index).map(|page| page.text())
    }

    /// All pages in index order.
    pub fn pages(&self) -> impl Iterator<Item = Page<'_>> + '_ {
        (0..self.layout.page_count()).map(move |index| self.view(index))
    }

    /// The full `page_capacity` bytes of page `index`, including bytes past
    /// the content.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`].
    pub fn raw_buffer(&self, index: usize) -> PoolResult<&[u8]> {
        self.check_index(index)?;
        Ok(self.buffer(index))
    }

    /// Unchecked write access to the full `page_capacity` bytes of page `index`.
    ///
    /// This bypasses space accounting: `remaining` is not updated, so later
    /// appends write over whatever is put here and [`PagePool::content`]
    /// keeps reporting the old length. Keeping the two consistent is the
    /// caller's responsibility. Prefer [`PagePool::edit_page`].
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`].
    pub fn raw_buffer_mut(&mut self, index: usize) -> PoolResult<&mut [u8]> {
        self.check_index(index)?;
        let capacity = self.layout.page_capacity();
        let (_, storage) = self.unit_mut(index);
        Ok(&mut storage[..capacity])
    }

    /// Edits page `index` in place with accounting.
    ///
    /// `edit` receives the full buffer and returns the new content length,
    /// which is clamped to capacity, terminated, and written back to
    /// `remaining`. Returns the stored length.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`].
    pub fn edit_page<F>(&mut self, index: usize, edit: F) -> PoolResult<usize>
    where
        F: FnOnce(&mut [u8]) -> usize,
    {
        self.check_index(index)?;
        let capacity = self.layout.page_capacity();
        let (descriptor, storage) = self.unit_mut(index);

        let len = edit(&mut storage[..capacity]).min(capacity);
        storage[len] = 0;
        descriptor.remaining = capacity - len;
        Ok(len)
    }

    // ------------------------------------------------------------------
    // Clearing
    // ------------------------------------------------------------------

    /// Zeroes page `index` entirely and resets its remaining space and kind.
    ///
    /// # Errors
    ///
    /// [`PoolError::IndexOutOfRange`]; no page is modified.
    pub fn clear(&mut self, index: usize) -> PoolResult<()> {
        self.check_index(index)?;
        self.reset_page(index, ClearPolicy::ZeroFill);
        Ok(())
    }

    /// Resets every page according to the pool's [`ClearPolicy`].
    pub fn clear_all(&mut self) {
        let policy = self.clear_all;
        for index in 0..self.layout.page_count() {
            self.reset_page(index, policy);
        }
        tracing::trace!("Cleared {} pages ({:?})", self.layout.page_count(), policy);
    }

    fn reset_page(&mut self, index: usize, policy: ClearPolicy) {
        let capacity = self.layout.page_capacity();
        let (descriptor, storage) = self.unit_mut(index);
        match policy {
            ClearPolicy::ZeroFill => storage.fill(0),
            ClearPolicy::Sentinel => storage[..2].fill(0),
        }
        descriptor.remaining = capacity;
        descriptor.kind = PageKind::Default;
    }

    /// Releases the pool's block. Equivalent to dropping the pool.
    pub fn destroy(self) {
        tracing::debug!("Page pool destroyed: {} bytes released", self.layout.total_size());
        drop(self);
    }
}

impl<A: BlockAllocator> std::fmt::Debug for PagePool<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagePool")
            .field("page_count", &self.page_count())
            .field("page_capacity", &self.page_capacity())
            .field("buffer_alignment", &self.buffer_alignment())
            .field("overflow", &self.overflow)
            .field("clear_all", &self.clear_all)
            .field("block", &self.block)
            .finish()
    }
}
