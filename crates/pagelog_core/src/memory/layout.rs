//! # Layout Calculator
//!
//! Pure sizing and alignment arithmetic for the single pool block.
//! Nothing here touches memory; every offset the pool later writes through
//! is produced (and unit-tested) here first.
//!
//! ## Block Layout
//!
//! ```text
//! offset 0          first_unit                  first_unit + block_size
//! │                 │                           │
//! ▼                 ▼                           ▼
//! [PoolHeader][pad ][Descriptor 0][pad][Buffer 0 + guard][pad][Descriptor 1]...[slack]
//!                   ╰──────────── block_size ─────────────────╯
//! ```
//!
//! Every unit starts on the unit alignment (the larger of the descriptor
//! and buffer alignments), so descriptor `i` sits at
//! `first_unit + i * block_size` and its buffer `descriptor_span` bytes later.

use std::alloc::Layout;
use std::ops::Range;

use crate::error::{PoolError, PoolResult};
use crate::pool::page::{PageDescriptor, PoolHeader};

/// Minimum (and default) alignment of every page buffer, in bytes.
pub const MIN_BUFFER_ALIGNMENT: usize = 8;

/// Smallest page capacity a pool will carve. Smaller requests are raised.
pub const MIN_PAGE_CAPACITY: usize = 2;

/// Bytes reserved after each buffer for the string-terminating byte.
pub const GUARD_BYTES: usize = 1;

/// Rounds `value` up to the next multiple of `align` (a power of two).
#[inline]
#[must_use]
pub const fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Returns true if `address` is a multiple of `align` (a power of two).
#[inline]
#[must_use]
pub const fn is_aligned(address: usize, align: usize) -> bool {
    address & (align - 1) == 0
}

#[inline]
fn checked_align_up(value: usize, align: usize) -> Option<usize> {
    value.checked_add(align - 1).map(|v| v & !(align - 1))
}

const fn overflow() -> PoolError {
    PoolError::InvalidParameters { reason: "pool size overflows the address space" }
}

/// Size and alignment of the records carved into the block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitShape {
    /// Size of the pool header at offset 0.
    pub header_size: usize,
    /// Alignment of the pool header.
    pub header_align: usize,
    /// Size of one page descriptor.
    pub descriptor_size: usize,
    /// Alignment of one page descriptor.
    pub descriptor_align: usize,
}

impl UnitShape {
    /// Shape of the real pool records.
    #[must_use]
    pub const fn pool() -> Self {
        Self {
            header_size: std::mem::size_of::<PoolHeader>(),
            header_align: std::mem::align_of::<PoolHeader>(),
            descriptor_size: std::mem::size_of::<PageDescriptor>(),
            descriptor_align: std::mem::align_of::<PageDescriptor>(),
        }
    }
}

/// Offsets and sizes of every record in a pool block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolLayout {
    page_count: usize,
    page_capacity: usize,
    buffer_alignment: usize,
    unit_alignment: usize,
    descriptor_size: usize,
    descriptor_span: usize,
    buffer_span: usize,
    block_size: usize,
    first_unit: usize,
    total_size: usize,
    block: Layout,
}

impl PoolLayout {
    /// Computes the layout for the real pool records.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidParameters`] if `page_count` or
    /// `page_capacity` is zero, if `buffer_alignment` is not a power of two
    /// of at least [`MIN_BUFFER_ALIGNMENT`], or if the block size overflows.
    pub fn compute(
        page_count: usize,
        page_capacity: usize,
        buffer_alignment: usize,
    ) -> PoolResult<Self> {
        Self::compute_with_shape(UnitShape::pool(), page_count, page_capacity, buffer_alignment)
    }

    /// Computes the layout for an arbitrary record shape.
    ///
    /// # Errors
    ///
    /// Same as [`PoolLayout::compute`].
    pub fn compute_with_shape(
        shape: UnitShape,
        page_count: usize,
        page_capacity: usize,
        buffer_alignment: usize,
    ) -> PoolResult<Self> {
        if page_count == 0 {
            return Err(PoolError::InvalidParameters { reason: "page count must be greater than zero" });
        }
        if page_capacity == 0 {
            return Err(PoolError::InvalidParameters { reason: "page capacity must be greater than zero" });
        }
        if !buffer_alignment.is_power_of_two() || buffer_alignment < MIN_BUFFER_ALIGNMENT {
            return Err(PoolError::InvalidParameters {
                reason: "buffer alignment must be a power of two of at least 8",
            });
        }

        let page_capacity = page_capacity.max(MIN_PAGE_CAPACITY);
        let unit_alignment = shape.descriptor_align.max(buffer_alignment);
        let block_alignment = unit_alignment.max(shape.header_align);

        let descriptor_span =
            checked_align_up(shape.descriptor_size, buffer_alignment).ok_or_else(overflow)?;
        let buffer_span = page_capacity
            .checked_add(GUARD_BYTES)
            .and_then(|size| checked_align_up(size, buffer_alignment))
            .ok_or_else(overflow)?;
        let block_size = descriptor_span
            .checked_add(buffer_span)
            .and_then(|size| checked_align_up(size, unit_alignment))
            .ok_or_else(overflow)?;
        let first_unit = checked_align_up(shape.header_size, unit_alignment).ok_or_else(overflow)?;
        let total_size = page_count
            .checked_mul(block_size)
            .and_then(|units| units.checked_add(first_unit))
            .and_then(|size| size.checked_add(buffer_alignment))
            .ok_or_else(overflow)?;

        let block = Layout::from_size_align(total_size, block_alignment).map_err(|_| overflow())?;

        Ok(Self {
            page_count,
            page_capacity,
            buffer_alignment,
            unit_alignment,
            descriptor_size: shape.descriptor_size,
            descriptor_span,
            buffer_span,
            block_size,
            first_unit,
            total_size,
            block,
        })
    }

    /// Number of pages.
    #[inline]
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    /// Effective capacity of each page buffer (after the minimum is applied).
    #[inline]
    #[must_use]
    pub const fn page_capacity(&self) -> usize {
        self.page_capacity
    }

    /// Alignment of every page buffer.
    #[inline]
    #[must_use]
    pub const fn buffer_alignment(&self) -> usize {
        self.buffer_alignment
    }

    /// Alignment of every descriptor + buffer unit.
    #[inline]
    #[must_use]
    pub const fn unit_alignment(&self) -> usize {
        self.unit_alignment
    }

    /// Per-page stride: aligned descriptor plus aligned buffer.
    #[inline]
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    /// Bytes occupied by each buffer including guard and padding.
    #[inline]
    #[must_use]
    pub const fn buffer_span(&self) -> usize {
        self.buffer_span
    }

    /// Offset of the first page unit.
    #[inline]
    #[must_use]
    pub const fn first_unit(&self) -> usize {
        self.first_unit
    }

    /// Total bytes requested from the allocator.
    #[inline]
    #[must_use]
    pub const fn total_size(&self) -> usize {
        self.total_size
    }

    /// The allocation request for the whole block.
    #[inline]
    #[must_use]
    pub const fn block_layout(&self) -> Layout {
        self.block
    }

    /// Offset of descriptor `index` from the block start.
    #[inline]
    #[must_use]
    pub const fn descriptor_offset(&self, index: usize) -> usize {
        debug_assert!(index < self.page_count);
        self.first_unit + index * self.block_size
    }

    /// Offset of buffer `index` from the block start.
    #[inline]
    #[must_use]
    pub const fn buffer_offset(&self, index: usize) -> usize {
        self.descriptor_offset(index) + self.descriptor_span
    }

    /// Byte range of descriptor `index`.
    #[must_use]
    pub const fn descriptor_range(&self, index: usize) -> Range<usize> {
        let start = self.descriptor_offset(index);
        start..start + self.descriptor_size
    }

    /// Byte range of the usable buffer of page `index` (exactly `page_capacity` bytes).
    #[must_use]
    pub const fn buffer_range(&self, index: usize) -> Range<usize> {
        let start = self.buffer_offset(index);
        start..start + self.page_capacity
    }

    /// Byte range of the whole unit of page `index`.
    #[must_use]
    pub const fn unit_range(&self, index: usize) -> Range<usize> {
        let start = self.descriptor_offset(index);
        start..start + self.block_size
    }
}
