//! # Page Pool Error Types
//!
//! All errors that can occur while creating or operating a page pool.

use thiserror::Error;

/// Errors that can occur in the page pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Creation parameters were rejected before any memory was requested.
    #[error("invalid pool parameters: {reason}")]
    InvalidParameters {
        /// What was wrong with the parameters.
        reason: &'static str,
    },

    /// The block allocator could not satisfy the single pool allocation.
    #[error("allocation of {size} bytes (align {align}) failed")]
    AllocationFailed {
        /// Requested block size in bytes.
        size: usize,
        /// Requested block alignment in bytes.
        align: usize,
    },

    /// A per-page operation named a page outside `[0, page_count)`.
    #[error("page index {index} out of range (pool has {page_count} pages)")]
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// Number of pages in the pool.
        page_count: usize,
    },

    /// Strict overflow mode refused an append that does not fit.
    #[error("append of {requested} bytes exceeds remaining capacity {available}")]
    CapacityExceeded {
        /// Bytes the caller asked to consume (including any terminator).
        requested: usize,
        /// Bytes still available in the page.
        available: usize,
    },
}

/// Result type for page pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// A structural defect found by [`crate::PagePool::verify_layout`].
///
/// A correctly carved pool never produces one of these; they exist so the
/// carving invariant can be asserted in tests rather than eyeballed in a dump.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutViolation {
    /// The pool header disagrees with the pool's own layout.
    #[error("pool header mismatch: {field}")]
    HeaderMismatch {
        /// The header field that differs.
        field: &'static str,
    },

    /// A page descriptor does not sit on its required alignment.
    #[error("page {index}: descriptor at {address:#x} is misaligned")]
    MisalignedDescriptor {
        /// Page index.
        index: usize,
        /// Descriptor address.
        address: usize,
    },

    /// A page buffer does not sit on the buffer alignment.
    #[error("page {index}: buffer at {address:#x} is misaligned")]
    MisalignedBuffer {
        /// Page index.
        index: usize,
        /// Buffer address.
        address: usize,
    },

    /// The buffer recorded in a descriptor is not where the layout puts it.
    #[error("page {index}: descriptor records buffer offset {recorded}, layout expects {expected}")]
    BufferMismatch {
        /// Page index.
        index: usize,
        /// Offset stored in the descriptor.
        recorded: usize,
        /// Offset computed by the layout.
        expected: usize,
    },

    /// A page's buffer (including its guard byte) runs into the next descriptor.
    #[error("page {index}: buffer end {buffer_end:#x} overlaps next descriptor at {next_descriptor:#x}")]
    Overlap {
        /// Page index.
        index: usize,
        /// First address past the buffer and guard byte.
        buffer_end: usize,
        /// Address of the following descriptor.
        next_descriptor: usize,
    },

    /// A page extends past the end of the allocated block.
    #[error("page {index}: unit end {unit_end:#x} lies outside the block ending at {block_end:#x}")]
    OutOfBlock {
        /// Page index.
        index: usize,
        /// First address past the page unit.
        unit_end: usize,
        /// First address past the block.
        block_end: usize,
    },
}
