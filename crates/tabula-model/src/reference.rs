use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell::CellRef;
use crate::coord::A1ParseError;
use crate::label::{looks_like_cell_reference, LabelError, LabelName};
use crate::range::{RangeParseError, RangeRef};

/// Anything a formula can point at: a cell, a label, or a range.
///
/// A closed sum; resolution and serialization match exhaustively over the
/// three variants. The derived ordering is total, with all labels sorting
/// before all cells, and all cells before all ranges; within a variant the
/// natural ordering of the payload applies.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExprRef {
    Label(LabelName),
    Cell(CellRef),
    Range(RangeRef),
}

impl ExprRef {
    /// The cell payload, if this is a cell reference.
    pub fn as_cell(&self) -> Option<CellRef> {
        match self {
            ExprRef::Cell(cell) => Some(*cell),
            _ => None,
        }
    }

    /// The label payload, if this is a label.
    pub fn as_label(&self) -> Option<&LabelName> {
        match self {
            ExprRef::Label(label) => Some(label),
            _ => None,
        }
    }

    /// The range payload, if this is a range.
    pub fn as_range(&self) -> Option<RangeRef> {
        match self {
            ExprRef::Range(range) => Some(*range),
            _ => None,
        }
    }

    /// Parse reference text: `A1..C3` is a range, `$B$2` a cell, anything
    /// else a label. Labels can never look like cell references, so the
    /// three forms do not overlap.
    pub fn from_text(text: &str) -> Result<Self, RefParseError> {
        let s = text.trim();
        if s.is_empty() {
            return Err(RefParseError::Empty);
        }
        if s.contains("..") {
            return Ok(ExprRef::Range(RangeRef::from_text(s)?));
        }
        if looks_like_cell_reference(s) {
            return Ok(ExprRef::Cell(CellRef::from_a1(s)?));
        }
        Ok(ExprRef::Label(LabelName::new(s)?))
    }
}

impl fmt::Display for ExprRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprRef::Label(label) => write!(f, "{label}"),
            ExprRef::Cell(cell) => write!(f, "{cell}"),
            ExprRef::Range(range) => write!(f, "{range}"),
        }
    }
}

impl From<CellRef> for ExprRef {
    fn from(value: CellRef) -> Self {
        ExprRef::Cell(value)
    }
}

impl From<LabelName> for ExprRef {
    fn from(value: LabelName) -> Self {
        ExprRef::Label(value)
    }
}

impl From<RangeRef> for ExprRef {
    fn from(value: RangeRef) -> Self {
        ExprRef::Range(value)
    }
}

/// Errors that can occur when parsing expression reference text.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RefParseError {
    #[error("empty reference text")]
    Empty,
    #[error("invalid cell reference: {0}")]
    Cell(#[from] A1ParseError),
    #[error("invalid range: {0}")]
    Range(#[from] RangeParseError),
    #[error("invalid label: {0}")]
    Label(#[from] LabelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ExprRef {
        ExprRef::from_text(text).unwrap()
    }

    #[test]
    fn parses_each_kind() {
        assert_eq!(
            parse("$B$2"),
            ExprRef::Cell(CellRef::from_a1("$B$2").unwrap())
        );
        assert_eq!(
            parse("A1..C3"),
            ExprRef::Range(RangeRef::from_text("A1..C3").unwrap())
        );
        assert_eq!(
            parse("Totals"),
            ExprRef::Label(LabelName::new("Totals").unwrap())
        );
    }

    #[test]
    fn text_roundtrip() {
        for text in ["B2", "$B$2", "A1..C3", "Totals", "net.sales"] {
            assert_eq!(parse(text).to_string(), text);
        }
    }

    #[test]
    fn labels_sort_before_cells_before_ranges() {
        let label = parse("zzz");
        let cell = parse("A1");
        let range = parse("A1..A2");
        assert!(label < cell);
        assert!(cell < range);

        let mut refs = vec![range.clone(), cell.clone(), label.clone()];
        refs.sort();
        assert_eq!(refs, vec![label, cell, range]);
    }

    #[test]
    fn natural_order_within_a_kind() {
        assert!(parse("alpha") < parse("beta"));
        assert!(parse("A1") < parse("B1"));
        assert!(parse("A1..B2") < parse("A1..C3"));
    }
}
