//! # Pages
//!
//! The records carved into the pool block, the page classification tag and
//! the read-only page view handed to callers.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity / classification tag of a page.
///
/// Ordinal values are fixed and match the numeric levels used on the wire
/// by existing consumers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i8)]
pub enum PageKind {
    /// Error level.
    Error = -1,
    /// Unclassified.
    #[default]
    Default = 0,
    /// Informational.
    Info = 1,
    /// Debug information.
    InfoDebug = 2,
    /// Warning level.
    Warning = 3,
}

impl PageKind {
    /// All kinds in ordinal order.
    pub const ALL: [Self; 5] = [Self::Error, Self::Default, Self::Info, Self::InfoDebug, Self::Warning];

    /// Numeric level of the kind.
    #[inline]
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        self as i8
    }

    /// Short lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Default => "default",
            Self::Info => "info",
            Self::InfoDebug => "info_debug",
            Self::Warning => "warning",
        }
    }
}

impl TryFrom<i8> for PageKind {
    type Error = i8;

    fn try_from(value: i8) -> Result<Self, i8> {
        match value {
            -1 => Ok(PageKind::Error),
            0 => Ok(PageKind::Default),
            1 => Ok(PageKind::Info),
            2 => Ok(PageKind::InfoDebug),
            3 => Ok(PageKind::Warning),
            other => Err(other),
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pool header written at offset 0 of the block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub(crate) struct PoolHeader {
    pub(crate) page_capacity: usize,
    pub(crate) page_count: usize,
    pub(crate) buffer_alignment: usize,
}

/// Per-page metadata written at the start of each unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub(crate) struct PageDescriptor {
    /// Offset of this page's buffer from the block start.
    pub(crate) buffer_offset: usize,
    /// Unused bytes of the buffer.
    pub(crate) remaining: usize,
    pub(crate) kind: PageKind,
}

impl PageDescriptor {
    /// A fresh descriptor for a buffer at `buffer_offset`.
    pub(crate) const fn new(buffer_offset: usize, capacity: usize) -> Self {
        Self {
            buffer_offset,
            remaining: capacity,
            kind: PageKind::Default,
        }
    }
}

/// Read-only view of one page.
#[derive(Clone, Copy, Debug)]
pub struct Page<'a> {
    pub(crate) index: usize,
    pub(crate) kind: PageKind,
    pub(crate) remaining: usize,
    pub(crate) capacity: usize,
    pub(crate) buffer: &'a [u8],
}

impl<'a> Page<'a> {
    /// Ordinal position of the page in the pool.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Classification tag.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> PageKind {
        self.kind
    }

    /// Unused bytes.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Bytes written so far.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.capacity - self.remaining
    }

    /// True if nothing has been written since the last clear.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining == self.capacity
    }

    /// Buffer capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The written content, `capacity - remaining` bytes.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &'a [u8] {
        &self.buffer[..self.len()]
    }

    /// The written content as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.content())
    }

    /// The whole buffer, including bytes past the content.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &'a [u8] {
        self.buffer
    }
}
