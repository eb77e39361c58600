//! # Diagnostics
//!
//! Read-only printers over a pool, plus the flush operation that drains a
//! page into a sink. None of this is on the append path.

use std::io::{self, Write};

use crate::memory::BlockAllocator;
use crate::pool::PagePool;

/// Writes `Page {i}: {text}` for page `index`.
///
/// # Errors
///
/// [`io::ErrorKind::InvalidInput`] for an out-of-range index, or any error
/// from `out`.
pub fn write_page<A, W>(pool: &PagePool<A>, index: usize, out: &mut W) -> io::Result<()>
where
    A: BlockAllocator,
    W: Write + ?Sized,
{
    let page = pool.page(index).map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    writeln!(out, "Page {}: {}", page.index(), page.text())
}

/// Writes one summary line per page, in index order.
///
/// # Errors
///
/// Any error from `out`.
pub fn write_all<A, W>(pool: &PagePool<A>, out: &mut W) -> io::Result<()>
where
    A: BlockAllocator,
    W: Write + ?Sized,
{
    for page in pool.pages() {
        writeln!(
            out,
            "Page {} [{}] remaining: {} ---[{}]---",
            page.index(),
            page.kind(),
            page.remaining(),
            page.text()
        )?;
    }
    Ok(())
}

impl<A: BlockAllocator> PagePool<A> {
    /// Prints page `index` to stdout. Out-of-range indices print nothing.
    pub fn print_page(&self, index: usize) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(err) = write_page(self, index, &mut out) {
            tracing::debug!("print_page({}) skipped: {}", index, err);
        }
    }

    /// Prints every page to stdout.
    pub fn print_all(&self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(err) = write_all(self, &mut out) {
            tracing::debug!("print_all failed: {}", err);
        }
    }

    /// Writes the content of page `index` to `out`, then clears the page.
    ///
    /// The page is only cleared once the whole content was written.
    /// Returns the number of bytes flushed.
    ///
    /// # Errors
    ///
    /// [`io::ErrorKind::InvalidInput`] for an out-of-range index, or any error
    /// from `out` (the page is left untouched).
    pub fn flush_page<W: Write + ?Sized>(&mut self, index: usize, out: &mut W) -> io::Result<usize> {
        let content = self.content(index).map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        let flushed = content.len();
        out.write_all(content)?;
        self.clear(index).map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        Ok(flushed)
    }
}

/// Writes a human-readable memory map of the pool.
///
/// Reports, per page, the descriptor and buffer addresses and flags
/// misalignment and overlap with the next descriptor. Use
/// [`PagePool::verify_layout`] for an automated check.
///
/// # Errors
///
/// Any error from `out`.
#[cfg(feature = "debug-dump")]
#[deprecated(note = "debug aid; not suitable for production call sites")]
pub fn debug_dump<A, W>(pool: &PagePool<A>, out: &mut W) -> io::Result<()>
where
    A: BlockAllocator,
    W: Write + ?Sized,
{
    tracing::warn!("debug_dump called; this output is not meant for production");

    let report = pool.inspect_layout();
    writeln!(out, "Page pool memory map")?;
    writeln!(
        out,
        "  Block         : {:#x}..{:#x} ({} bytes)",
        report.block_start,
        report.block_end,
        report.block_end - report.block_start
    )?;

    for record in &report.pages {
        writeln!(out, "Page {}", record.index)?;
        writeln!(out, "  Entry address : {:#x}", record.descriptor_address)?;
        writeln!(out, "  Buffer address: {:#x}", record.buffer_address)?;
        writeln!(out, "  Buffer end    : {:#x}", record.buffer_end)?;
        if !record.descriptor_aligned {
            writeln!(out, "  Misaligned page descriptor!")?;
        }
        if !record.buffer_aligned {
            writeln!(out, "  Misaligned buffer!")?;
        }
        if let (true, Some(next)) = (record.overlaps_next, record.next_descriptor) {
            writeln!(out, "  Overlap detected with next page!")?;
            writeln!(out, "  Buffer end: {:#x} > Next entry: {:#x}", record.buffer_end, next)?;
        }
    }
    writeln!(out, "  Dump complete: {} pages checked.", report.pages.len())
}
