use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::cell::CellRef;

/// A minimal cell value representation.
///
/// Formula evaluation and number formatting live above this crate; the
/// addressing core only needs enough value structure for sort comparison
/// and change-set payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Blank,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Returns true for [`CellValue::Blank`].
    #[inline]
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }
}

/// An addressed cell record: a reference plus its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub reference: CellRef,
    #[serde(default)]
    pub value: CellValue,
}

impl Cell {
    /// Create a new cell.
    pub fn new(reference: CellRef, value: CellValue) -> Self {
        Self { reference, value }
    }

    /// Returns a cell at the given reference; the receiver is returned
    /// unchanged when it already matches.
    pub fn with_reference(self, reference: CellRef) -> Self {
        if self.reference == reference {
            return self;
        }
        Self { reference, ..self }
    }

    /// Returns a cell with the given value; the receiver is returned
    /// unchanged when it already matches.
    pub fn with_value(self, value: CellValue) -> Self {
        if self.value == value {
            return self;
        }
        Self { value, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_builders_short_circuit() {
        let a1 = CellRef::from_a1("A1").unwrap();
        let b2 = CellRef::from_a1("B2").unwrap();
        let cell = Cell::new(a1, CellValue::Number(1.5));
        assert_eq!(cell.clone().with_reference(a1), cell);
        assert_eq!(cell.clone().with_value(CellValue::Number(1.5)), cell);
        assert_eq!(cell.with_reference(b2).reference, b2);
    }
}
