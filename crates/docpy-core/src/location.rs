//! Source position types
//!
//! Positions are zero-based `(line, column)` pairs. Columns count bytes from
//! the start of their line, which matches both regex match offsets and
//! tree-sitter points.
//!
//! A [`SourceDistance`] is relative to some location. While it stays on one
//! line its columns add to the starting column; once it spans a line break
//! its columns are measured from the start of the final line instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Absolute position in a text buffer
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SourceLocation {
    /// Line number (0-based)
    pub line: usize,
    /// Byte column relative to the start of `line` (0-based)
    pub column: usize,
}

impl SourceLocation {
    pub const START: Self = Self::new(0, 0);

    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location of byte `offset` in `text`.
    ///
    /// The line is the number of `\n` bytes strictly before `offset`. Offsets
    /// past the end of `text` are clamped to its length.
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let before = &text.as_bytes()[..offset.min(text.len())];
        match before.iter().rposition(|&b| b == b'\n') {
            None => Self::new(0, before.len()),
            Some(last_nl) => Self::new(
                before.iter().filter(|&&b| b == b'\n').count(),
                before.len() - last_nl - 1,
            ),
        }
    }

    /// Byte offset of this location in `text`, or `None` when the line does
    /// not exist or the column runs past the end of the line.
    pub fn to_offset(&self, text: &str) -> Option<usize> {
        let bytes = text.as_bytes();
        let line_start = if self.line == 0 {
            0
        } else {
            bytes
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b == b'\n')
                .nth(self.line - 1)
                .map(|(i, _)| i + 1)?
        };
        let line_end = bytes[line_start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |p| line_start + p);

        let offset = line_start + self.column;
        (offset <= line_end).then_some(offset)
    }

    /// Start of the following line
    pub const fn next_line(self) -> Self {
        Self::new(self.line + 1, 0)
    }
}

impl Add<SourceDistance> for SourceLocation {
    type Output = SourceLocation;

    fn add(self, distance: SourceDistance) -> SourceLocation {
        let column = if distance.lines == 0 {
            self.column + distance.columns
        } else {
            distance.columns
        };
        SourceLocation::new(self.line + distance.lines, column)
    }
}

impl Sub for SourceLocation {
    type Output = SourceDistance;

    /// Distance from `earlier` to `self`; `earlier` must not come after `self`.
    fn sub(self, earlier: SourceLocation) -> SourceDistance {
        debug_assert!(earlier <= self, "{earlier} is after {self}");
        let lines = self.line.saturating_sub(earlier.line);
        let columns = if lines == 0 {
            self.column.saturating_sub(earlier.column)
        } else {
            self.column
        };
        SourceDistance::new(lines, columns)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Relative offset between two locations
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SourceDistance {
    /// Number of line breaks crossed
    pub lines: usize,
    /// Columns on the final line (see module docs)
    pub columns: usize,
}

impl SourceDistance {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(lines: usize, columns: usize) -> Self {
        Self { lines, columns }
    }

    pub const fn is_zero(&self) -> bool {
        self.lines == 0 && self.columns == 0
    }
}

/// Contiguous span of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: SourceLocation,
    pub length: SourceDistance,
}

impl SourceRange {
    pub const fn new(start: SourceLocation, length: SourceDistance) -> Self {
        Self { start, length }
    }

    /// Zero-length range, i.e. a pure insertion point
    pub const fn at(start: SourceLocation) -> Self {
        Self::new(start, SourceDistance::ZERO)
    }

    /// Range covering the bytes `start..end` of `text`
    #[cfg(test)]
    pub(crate) fn from_offsets(text: &str, start: usize, end: usize) -> Self {
        let start = SourceLocation::from_offset(text, start);
        let end = SourceLocation::from_offset(text, end);
        Self::new(start, end - start)
    }

    pub fn end(&self) -> SourceLocation {
        self.start + self.length
    }

    pub const fn is_empty(&self) -> bool {
        self.length.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_offset_single_line() {
        let text = "-".repeat(10);
        assert_eq!(SourceLocation::from_offset(&text, 5), SourceLocation::new(0, 5));
        assert_eq!(SourceLocation::from_offset(&text, 0), SourceLocation::new(0, 0));
        assert_eq!(SourceLocation::from_offset(&text, 10), SourceLocation::new(0, 10));
    }

    #[test]
    fn test_from_offset_multiline() {
        let cases = [
            ("\n        \n        abc\n        \n        ", SourceLocation::new(2, 8)),
            ("\nsdghgfdhhfghabc              \n\n", SourceLocation::new(1, 12)),
            ("\nabc", SourceLocation::new(1, 0)),
            ("\n\nabc", SourceLocation::new(2, 0)),
            ("\nabc\n\n", SourceLocation::new(1, 0)),
            ("\n\nabc\n\n", SourceLocation::new(2, 0)),
        ];

        for (text, expected) in cases {
            let offset = text.find("abc").unwrap();
            assert_eq!(SourceLocation::from_offset(text, offset), expected, "{text:?}");
        }
    }

    #[test]
    fn test_from_offset_at_newline() {
        let text = "ab\ncd";
        assert_eq!(SourceLocation::from_offset(text, 2), SourceLocation::new(0, 2));
        assert_eq!(SourceLocation::from_offset(text, 3), SourceLocation::new(1, 0));
        assert_eq!(SourceLocation::from_offset(text, 99), SourceLocation::new(1, 2));
    }

    #[test]
    fn test_to_offset_out_of_range() {
        let text = "ab\ncd\n";
        assert_eq!(SourceLocation::new(0, 3).to_offset(text), None);
        assert_eq!(SourceLocation::new(2, 0).to_offset(text), Some(6));
        assert_eq!(SourceLocation::new(2, 1).to_offset(text), None);
        assert_eq!(SourceLocation::new(3, 0).to_offset(text), None);
    }

    #[test]
    fn test_next_line() {
        assert_eq!(SourceLocation::new(4, 17).next_line(), SourceLocation::new(5, 0));
    }

    #[test]
    fn test_add_same_line() {
        let location = SourceLocation::new(3, 4) + SourceDistance::new(0, 6);
        assert_eq!(location, SourceLocation::new(3, 10));
    }

    #[test]
    fn test_add_across_lines_resets_column() {
        let location = SourceLocation::new(3, 4) + SourceDistance::new(2, 6);
        assert_eq!(location, SourceLocation::new(5, 6));
    }

    #[test]
    fn test_sub() {
        assert_eq!(
            SourceLocation::new(3, 10) - SourceLocation::new(3, 4),
            SourceDistance::new(0, 6)
        );
        assert_eq!(
            SourceLocation::new(5, 6) - SourceLocation::new(3, 4),
            SourceDistance::new(2, 6)
        );
        assert_eq!(
            SourceLocation::new(5, 6) - SourceLocation::new(5, 6),
            SourceDistance::ZERO
        );
    }

    #[test]
    fn test_ordering_is_line_then_column() {
        let mut locations = vec![
            SourceLocation::new(2, 0),
            SourceLocation::new(1, 9),
            SourceLocation::new(2, 1),
            SourceLocation::new(1, 0),
        ];
        locations.sort();
        assert_eq!(
            locations,
            vec![
                SourceLocation::new(1, 0),
                SourceLocation::new(1, 9),
                SourceLocation::new(2, 0),
                SourceLocation::new(2, 1),
            ]
        );
    }

    #[test]
    fn test_range_from_offsets() {
        let text = "abc\ndef\nghi";
        let range = SourceRange::from_offsets(text, 1, 9);
        assert_eq!(range.start, SourceLocation::new(0, 1));
        assert_eq!(range.length, SourceDistance::new(2, 1));
        assert_eq!(range.end(), SourceLocation::new(2, 1));
        assert!(!range.is_empty());
        assert!(SourceRange::at(SourceLocation::new(4, 2)).is_empty());
    }
}
