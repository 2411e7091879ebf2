//! Position and region tracking for tokens in a test data file
//!
//! Every token, separator and end-of-line marker carries the exact place it was read from.
//! The document model never recomputes these from text: once the lexer sets a position it is
//! authoritative, and edits shift positions explicitly (see
//! [`Document::set_token_text`](crate::robot::model::Document::set_token_text)).
//!
//! ## Types
//!
//! - [`Position`] - line (1-based), column (0-based, in chars) and byte offset
//! - [`Region`] - a half-open start/end pair of positions
//!
//! Lines are numbered from 1 because that is how problems are reported to users; columns
//! and offsets start at 0.

use serde::Serialize;
use std::fmt;
use std::ops::Range as ByteRange;

/// A place in the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Position reached after reading `text` starting from `self`, staying on the same line.
    pub fn advance(&self, text: &str) -> Self {
        Self {
            line: self.line,
            column: self.column + text.chars().count(),
            offset: self.offset + text.len(),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// A half-open source region `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    pub start: Position,
    pub end: Position,
}

impl Region {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Region covered by `text` when it starts at `start`.
    pub fn of_text(start: Position, text: &str) -> Self {
        Self::new(start, start.advance(text))
    }

    pub fn span(&self) -> ByteRange<usize> {
        self.start.offset..self.end.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a byte offset falls inside this region
    pub fn contains(&self, offset: usize) -> bool {
        self.start.offset <= offset && offset < self.end.offset
    }

    /// Check if two regions share at least one byte
    pub fn overlaps(&self, other: &Region) -> bool {
        self.start.offset < other.end.offset && other.start.offset < self.end.offset
    }

    /// Build a region spanning all provided regions.
    pub fn bounding_box<'a, I>(mut regions: I) -> Option<Region>
    where
        I: Iterator<Item = &'a Region>,
    {
        let first = *regions.next()?;
        Some(regions.fold(first, |acc, region| {
            Region::new(acc.start.min(region.start), acc.end.max(region.end))
        }))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_counts_chars_and_bytes() {
        let start = Position::new(3, 4, 20);
        let end = start.advance("żółw");

        assert_eq!(end.line, 3);
        assert_eq!(end.column, 8);
        assert_eq!(end.offset, 20 + "żółw".len());
    }

    #[test]
    fn test_region_of_text() {
        let region = Region::of_text(Position::new(1, 0, 0), "Library");

        assert_eq!(region.span(), 0..7);
        assert_eq!(region.len(), 7);
        assert!(region.contains(0));
        assert!(region.contains(6));
        assert!(!region.contains(7));
    }

    #[test]
    fn test_empty_region_contains_nothing() {
        let region = Region::of_text(Position::new(2, 5, 10), "");

        assert!(region.is_empty());
        assert!(!region.contains(10));
    }

    #[test]
    fn test_overlaps() {
        let a = Region::of_text(Position::new(1, 0, 0), "abcd");
        let b = Region::of_text(Position::new(1, 3, 3), "de");
        let c = Region::of_text(Position::new(1, 4, 4), "e");

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_bounding_box() {
        let regions = [
            Region::of_text(Position::new(2, 4, 14), "x"),
            Region::of_text(Position::new(1, 0, 0), "abc"),
        ];

        let bbox = Region::bounding_box(regions.iter()).unwrap();
        assert_eq!(bbox.start, Position::new(1, 0, 0));
        assert_eq!(bbox.end, Position::new(2, 5, 15));
        assert!(Region::bounding_box(std::iter::empty()).is_none());
    }
}
