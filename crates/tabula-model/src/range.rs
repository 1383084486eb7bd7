use core::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::CellRef;
use crate::coord::{A1ParseError, ColumnRef, RowRef};

/// A rectangular cell region.
///
/// Ranges are normalized per axis on construction so that
/// `begin.column.value() <= end.column.value()` and
/// `begin.row.value() <= end.row.value()` always hold; reference kinds
/// travel with their coordinate when corners swap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RangeRef {
    begin: CellRef,
    end: CellRef,
}

impl RangeRef {
    /// Construct a new range, normalizing corner order per axis.
    pub fn new(a: CellRef, b: CellRef) -> Self {
        let (begin_col, end_col) = if a.column.value() <= b.column.value() {
            (a.column, b.column)
        } else {
            (b.column, a.column)
        };
        let (begin_row, end_row) = if a.row.value() <= b.row.value() {
            (a.row, b.row)
        } else {
            (b.row, a.row)
        };
        Self {
            begin: CellRef::new(begin_col, begin_row),
            end: CellRef::new(end_col, end_row),
        }
    }

    /// Top-left corner.
    #[inline]
    pub const fn begin(&self) -> CellRef {
        self.begin
    }

    /// Bottom-right corner.
    #[inline]
    pub const fn end(&self) -> CellRef {
        self.end
    }

    /// Column span: `end - begin`, NOT the inclusive column count.
    ///
    /// Enumeration below uses this span directly as its loop bound, so a
    /// range enumerates one column/row fewer than its inclusive extent.
    /// Callers rely on that arithmetic; do not "fix" it here.
    #[inline]
    pub fn width(&self) -> u32 {
        self.end.column.value() - self.begin.column.value()
    }

    /// Row span: `end - begin`, NOT the inclusive row count.
    #[inline]
    pub fn height(&self) -> u32 {
        self.end.row.value() - self.begin.row.value()
    }

    /// Returns true when both corners name the same position.
    #[inline]
    pub fn is_single_cell(&self) -> bool {
        self.begin.eq_ignoring_kind(self.end)
    }

    /// Returns true if `cell` lies within this range, bounds inclusive,
    /// ignoring reference kinds.
    pub fn contains(&self, cell: CellRef) -> bool {
        let col = cell.column.value();
        let row = cell.row.value();
        col >= self.begin.column.value()
            && col <= self.end.column.value()
            && row >= self.begin.row.value()
            && row <= self.end.row.value()
    }

    /// Returns true if `other` lies entirely within this range.
    pub fn contains_range(&self, other: &RangeRef) -> bool {
        self.contains(other.begin) && self.contains(other.end)
    }

    /// Lazy row-major enumeration of contained cells, bounded by the
    /// `width() * height()` span. Restartable: each call yields a fresh
    /// iterator. A degenerate span enumerates nothing.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> {
        let width = u64::from(self.width());
        let count = width * u64::from(self.height());
        let begin = self.begin;
        (0..count).map(move |i| {
            let col = begin.column.value() + (i % width) as u32;
            let row = begin.row.value() + (i / width) as u32;
            CellRef::new(
                ColumnRef::new_unchecked(col, begin.column.kind()),
                RowRef::new_unchecked(row, begin.row.kind()),
            )
        })
    }

    /// Lazy enumeration of contained columns, bounded by the `width()` span.
    pub fn columns(&self) -> impl Iterator<Item = ColumnRef> {
        let begin = self.begin.column;
        (0..self.width()).map(move |i| ColumnRef::new_unchecked(begin.value() + i, begin.kind()))
    }

    /// Lazy enumeration of contained rows, bounded by the `height()` span.
    pub fn rows(&self) -> impl Iterator<Item = RowRef> {
        let begin = self.begin.row;
        (0..self.height()).map(move |i| RowRef::new_unchecked(begin.value() + i, begin.kind()))
    }

    /// Parse range text: `A1..C3`, or a bare cell like `B2` for a
    /// single-cell range.
    pub fn from_text(text: &str) -> Result<Self, RangeParseError> {
        let s = text.trim();
        if s.is_empty() {
            return Err(RangeParseError::Empty);
        }

        match s.split_once("..") {
            None => {
                let cell = CellRef::from_a1(s).map_err(RangeParseError::Cell)?;
                Ok(RangeRef::new(cell, cell))
            }
            Some((a, b)) => {
                let begin = CellRef::from_a1(a).map_err(RangeParseError::Cell)?;
                let end = CellRef::from_a1(b).map_err(RangeParseError::Cell)?;
                Ok(RangeRef::new(begin, end))
            }
        }
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.begin)
        } else {
            write!(f, "{}..{}", self.begin, self.end)
        }
    }
}

// Deserialization re-normalizes so wire payloads cannot produce an
// inverted range.
#[derive(Deserialize)]
struct RawRange {
    begin: CellRef,
    end: CellRef,
}

impl<'de> Deserialize<'de> for RangeRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawRange::deserialize(deserializer)?;
        Ok(RangeRef::new(raw.begin, raw.end))
    }
}

/// Errors that can occur when parsing range text.
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseError {
    Empty,
    Cell(A1ParseError),
}

impl fmt::Display for RangeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeParseError::Empty => f.write_str("empty range text"),
            RangeParseError::Cell(e) => write!(f, "invalid cell reference in range: {e}"),
        }
    }
}

impl std::error::Error for RangeParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RangeParseError::Empty => None,
            RangeParseError::Cell(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(a1: &str) -> CellRef {
        CellRef::from_a1(a1).unwrap()
    }

    fn range(text: &str) -> RangeRef {
        RangeRef::from_text(text).unwrap()
    }

    #[test]
    fn corners_normalize_per_axis() {
        let swapped = RangeRef::new(cell("C5"), cell("A1"));
        assert_eq!(swapped, range("A1..C5"));
        assert!(swapped.begin().column.value() <= swapped.end().column.value());
        assert!(swapped.begin().row.value() <= swapped.end().row.value());

        // Mixed corners: (A5, C1) still normalizes to A1..C5.
        assert_eq!(RangeRef::new(cell("A5"), cell("C1")), range("A1..C5"));
    }

    #[test]
    fn kinds_travel_with_their_coordinate() {
        let r = RangeRef::new(cell("$C$5"), cell("A1"));
        assert_eq!(r.to_string(), "A1..$C$5");
    }

    #[test]
    fn width_and_height_are_spans() {
        let r = range("B2..D5");
        assert_eq!(r.width(), 2);
        assert_eq!(r.height(), 3);
        assert_eq!(range("B2").width(), 0);
    }

    #[test]
    fn cell_enumeration_is_bounded_by_the_span() {
        // Span semantics: B2..D5 enumerates a 2x3 block anchored at B2,
        // one column and one row short of the inclusive rectangle.
        let got: Vec<String> = range("B2..D5").cells().map(|c| c.to_a1()).collect();
        assert_eq!(got, ["B2", "C2", "B3", "C3", "B4", "C4"]);

        // Degenerate span: nothing to enumerate, and no division happens.
        assert_eq!(range("B2").cells().count(), 0);

        // Restartable: a second pass yields the same sequence.
        let r = range("B2..D5");
        let first: Vec<CellRef> = r.cells().collect();
        let second: Vec<CellRef> = r.cells().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn column_and_row_enumeration() {
        let r = range("B2..D5");
        let cols: Vec<String> = r.columns().map(|c| c.to_a1()).collect();
        assert_eq!(cols, ["B", "C"]);
        let rows: Vec<String> = r.rows().map(|x| x.to_a1()).collect();
        assert_eq!(rows, ["2", "3", "4"]);
    }

    #[test]
    fn containment_is_inclusive_and_kind_insensitive() {
        let r = range("B2..D5");
        assert!(r.contains(cell("B2")));
        assert!(r.contains(cell("D5")));
        assert!(r.contains(cell("$C$3")));
        assert!(!r.contains(cell("E5")));
        assert!(!r.contains(cell("D6")));

        assert!(r.contains_range(&range("C3..D5")));
        assert!(!r.contains_range(&range("C3..E5")));
    }

    #[test]
    fn text_roundtrip() {
        for text in ["A1..C5", "$A$1..C5", "B2"] {
            assert_eq!(range(text).to_string(), text);
        }
        assert_eq!(
            RangeRef::from_text("A1..").unwrap_err(),
            RangeParseError::Cell(A1ParseError::Empty)
        );
    }
}
