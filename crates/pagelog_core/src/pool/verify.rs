//! # Layout Verification
//!
//! Walks a live pool and checks the carving invariant against the real
//! addresses: every descriptor and buffer aligned, every buffer (with its
//! guard byte) ending before the next descriptor, every unit inside the block.

use crate::error::LayoutViolation;
use crate::memory::{is_aligned, BlockAllocator, GUARD_BYTES};

use super::page::PageDescriptor;
use super::PagePool;

/// Addresses and checks for one page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRecord {
    /// Page index.
    pub index: usize,
    /// Address of the page descriptor.
    pub descriptor_address: usize,
    /// Address of the page buffer, as recorded in the descriptor.
    pub buffer_address: usize,
    /// First address past the buffer capacity.
    pub buffer_end: usize,
    /// Address of the following descriptor, if any.
    pub next_descriptor: Option<usize>,
    /// Descriptor sits on its type alignment.
    pub descriptor_aligned: bool,
    /// Buffer sits on the buffer alignment.
    pub buffer_aligned: bool,
    /// Buffer plus guard runs into the next descriptor.
    pub overlaps_next: bool,
}

/// Result of walking every page of a pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutReport {
    /// Base address of the block.
    pub block_start: usize,
    /// First address past the block.
    pub block_end: usize,
    /// One record per page, in index order.
    pub pages: Vec<PageRecord>,
}

impl<A: BlockAllocator> PagePool<A> {
    /// Collects the address records of every page without judging them.
    #[must_use]
    pub fn inspect_layout(&self) -> LayoutReport {
        let block_start = self.base_address();
        let block_end = block_start + self.total_size();
        let capacity = self.page_capacity();
        let count = self.page_count();

        let descriptor_address = |index: usize| self.descriptor(index) as *const PageDescriptor as usize;

        let pages = (0..count)
            .map(|index| {
                let descriptor = self.descriptor(index);
                let address = descriptor_address(index);
                let buffer_address = block_start + descriptor.buffer_offset;
                let buffer_end = buffer_address + capacity;
                let next_descriptor = (index + 1 < count).then(|| descriptor_address(index + 1));

                PageRecord {
                    index,
                    descriptor_address: address,
                    buffer_address,
                    buffer_end,
                    next_descriptor,
                    descriptor_aligned: is_aligned(address, std::mem::align_of::<PageDescriptor>()),
                    buffer_aligned: is_aligned(buffer_address, self.buffer_alignment()),
                    overlaps_next: next_descriptor.is_some_and(|next| buffer_end + GUARD_BYTES > next),
                }
            })
            .collect();

        LayoutReport { block_start, block_end, pages }
    }

    /// Checks the carving invariant on the live block.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayoutViolation`] found.
    pub fn verify_layout(&self) -> Result<LayoutReport, LayoutViolation> {
        let header = self.header();
        if header.page_count != self.page_count() {
            return Err(LayoutViolation::HeaderMismatch { field: "page_count" });
        }
        if header.page_capacity != self.page_capacity() {
            return Err(LayoutViolation::HeaderMismatch { field: "page_capacity" });
        }
        if header.buffer_alignment != self.buffer_alignment() {
            return Err(LayoutViolation::HeaderMismatch { field: "buffer_alignment" });
        }

        let report = self.inspect_layout();
        let layout = self.layout();

        for record in &report.pages {
            let index = record.index;
            if !record.descriptor_aligned {
                return Err(LayoutViolation::MisalignedDescriptor { index, address: record.descriptor_address });
            }
            if !record.buffer_aligned {
                return Err(LayoutViolation::MisalignedBuffer { index, address: record.buffer_address });
            }

            let recorded = record.buffer_address - report.block_start;
            let expected = layout.buffer_offset(index);
            if recorded != expected {
                return Err(LayoutViolation::BufferMismatch { index, recorded, expected });
            }

            if let (true, Some(next_descriptor)) = (record.overlaps_next, record.next_descriptor) {
                return Err(LayoutViolation::Overlap {
                    index,
                    buffer_end: record.buffer_end + GUARD_BYTES,
                    next_descriptor,
                });
            }

            let unit_end = report.block_start + layout.unit_range(index).end;
            if record.descriptor_address < report.block_start || unit_end > report.block_end {
                return Err(LayoutViolation::OutOfBlock { index, unit_end, block_end: report.block_end });
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::PoolConfig;
    use crate::pool::PagePool;

    #[test]
    fn test_fresh_pool_verifies() {
        for &(count, capacity, align) in &[(6, 1024, 8), (1, 1, 8), (5, 33, 64), (16, 7, 16)] {
            let config = PoolConfig::new(count, capacity).with_buffer_alignment(align);
            let pool = PagePool::with_config(&config).unwrap();
            let report = pool.verify_layout().unwrap();

            assert_eq!(report.pages.len(), count);
            for record in &report.pages {
                assert!(record.descriptor_aligned);
                assert!(record.buffer_aligned);
                assert!(!record.overlaps_next);
                assert!(record.buffer_address >= report.block_start);
                assert!(record.buffer_end <= report.block_end);
            }
        }
    }

    #[test]
    fn test_full_pages_still_verify() {
        let mut pool = PagePool::create(3, 5).unwrap();
        for index in 0..3 {
            pool.append_line(index, "overflowing data").unwrap();
            pool.append(index, "more").unwrap();
        }
        pool.verify_layout().unwrap();
        assert!(pool.pages().all(|page| page.remaining() == 0));
    }

    #[test]
    fn test_buffers_pairwise_disjoint() {
        let pool = PagePool::create(8, 100).unwrap();
        let report = pool.inspect_layout();
        for a in &report.pages {
            for b in &report.pages {
                if a.index == b.index {
                    continue;
                }
                let disjoint = a.buffer_end <= b.descriptor_address || b.buffer_end <= a.descriptor_address;
                assert!(disjoint, "pages {} and {} overlap", a.index, b.index);
            }
        }
    }
}
