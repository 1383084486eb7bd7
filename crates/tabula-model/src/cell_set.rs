use core::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::CellRef;
use crate::range::RangeRef;
use crate::value::Cell;

/// A range together with its concrete cell contents.
///
/// Construction validates that every cell's reference falls inside the
/// declared range; all offenders are collected and reported together rather
/// than failing on the first one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeCells {
    range: RangeRef,
    cells: Vec<Cell>,
}

impl RangeCells {
    /// Validate and construct a bounded cell set.
    pub fn new(range: RangeRef, cells: Vec<Cell>) -> Result<Self, CellsOutOfRange> {
        let outside: Vec<CellRef> = cells
            .iter()
            .map(|cell| cell.reference)
            .filter(|reference| !range.contains(*reference))
            .collect();
        if !outside.is_empty() {
            return Err(CellsOutOfRange { range, outside });
        }
        Ok(Self { range, cells })
    }

    /// The declared bounds.
    #[inline]
    pub fn range(&self) -> RangeRef {
        self.range
    }

    /// The contained cells, in the order supplied.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Re-bound to `range`.
    ///
    /// An enclosing range skips re-validation (containment is transitive);
    /// any other range re-validates every cell. The receiver is returned
    /// unchanged when the range already matches.
    pub fn with_range(self, range: RangeRef) -> Result<Self, CellsOutOfRange> {
        if self.range == range {
            return Ok(self);
        }
        if range.contains_range(&self.range) {
            return Ok(Self { range, ..self });
        }
        Self::new(range, self.cells)
    }

    /// Replace the contents, re-validating against the declared range.
    pub fn with_cells(self, cells: Vec<Cell>) -> Result<Self, CellsOutOfRange> {
        if self.cells == cells {
            return Ok(self);
        }
        Self::new(self.range, cells)
    }
}

// Deserialization re-runs validation.
#[derive(Deserialize)]
struct RawRangeCells {
    range: RangeRef,
    cells: Vec<Cell>,
}

impl<'de> Deserialize<'de> for RangeCells {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawRangeCells::deserialize(deserializer)?;
        RangeCells::new(raw.range, raw.cells).map_err(serde::de::Error::custom)
    }
}

/// Validation failure naming every cell found outside the declared range.
#[derive(Debug, Clone, PartialEq)]
pub struct CellsOutOfRange {
    range: RangeRef,
    outside: Vec<CellRef>,
}

impl CellsOutOfRange {
    /// The declared range the cells were checked against.
    pub fn range(&self) -> RangeRef {
        self.range
    }

    /// Every offending reference, in input order.
    pub fn offenders(&self) -> &[CellRef] {
        &self.outside
    }
}

impl fmt::Display for CellsOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cell(s) outside range {}: ",
            self.outside.len(),
            self.range
        )?;
        for (i, reference) in self.outside.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{reference}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CellsOutOfRange {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CellValue;

    fn cell(a1: &str) -> Cell {
        Cell::new(CellRef::from_a1(a1).unwrap(), CellValue::Blank)
    }

    fn range(text: &str) -> RangeRef {
        RangeRef::from_text(text).unwrap()
    }

    #[test]
    fn collects_every_offender() {
        let err = RangeCells::new(
            range("A1..B2"),
            vec![cell("A1"), cell("C3"), cell("B2"), cell("D4")],
        )
        .unwrap_err();
        let offenders: Vec<String> = err.offenders().iter().map(|r| r.to_a1()).collect();
        assert_eq!(offenders, ["C3", "D4"]);
        assert_eq!(
            err.to_string(),
            "2 cell(s) outside range A1..B2: C3, D4"
        );
    }

    #[test]
    fn rebounding_to_an_enclosing_range_skips_validation() {
        let set = RangeCells::new(range("A1..B2"), vec![cell("A1"), cell("B2")]).unwrap();
        let grown = set.with_range(range("A1..D4")).unwrap();
        assert_eq!(grown.range(), range("A1..D4"));
        assert_eq!(grown.cells().len(), 2);
    }

    #[test]
    fn rebounding_to_a_smaller_range_revalidates() {
        let set = RangeCells::new(range("A1..C3"), vec![cell("A1"), cell("C3")]).unwrap();
        let err = set.with_range(range("A1..B2")).unwrap_err();
        assert_eq!(err.offenders(), [CellRef::from_a1("C3").unwrap()]);
    }

    #[test]
    fn unchanged_range_short_circuits() {
        let set = RangeCells::new(range("A1..B2"), vec![cell("A1")]).unwrap();
        let same = set.clone().with_range(range("A1..B2")).unwrap();
        assert_eq!(same, set);
    }
}
