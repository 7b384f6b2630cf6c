//! Source location spans.

use std::fmt;

/// Byte span inside a single source file.
///
/// Layout: 8 bytes total
/// - start: u32 - byte offset from file start
/// - end: u32 - byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(C)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Dummy span for generated code.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create from a byte range.
    ///
    /// # Panics
    /// Panics if the range exceeds `u32::MAX` bytes.
    #[inline]
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        Span {
            start: u32::try_from(range.start)
                .unwrap_or_else(|_| panic!("span start {} exceeds u32::MAX", range.start)),
            end: u32::try_from(range.end)
                .unwrap_or_else(|_| panic!("span end {} exceeds u32::MAX", range.end)),
        }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Create a point span (zero-length).
    #[inline]
    pub const fn point(offset: u32) -> Span {
        Span { start: offset, end: offset }
    }

    #[inline]
    pub fn to_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Identifies a source file registered with the unit's source map.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct FileId(pub u32);

impl FileId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A file-qualified source location. Spans are byte offsets local to their
/// file, so every AST node carries the file it came from.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Loc {
    pub file: FileId,
    pub span: Span,
}

impl Loc {
    #[inline]
    pub const fn new(file: FileId, span: Span) -> Self {
        Loc { file, span }
    }
}

// Size assertions to prevent accidental regressions
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{Loc, Span};
    crate::static_assert_size!(Span, 8);
    crate::static_assert_size!(Loc, 12);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basic() {
        let span = Span::new(10, 20);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(10, 20);
        let b = Span::new(15, 30);
        let merged = a.merge(b);
        assert_eq!(merged.start, 10);
        assert_eq!(merged.end, 30);
    }
}
