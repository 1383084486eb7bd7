use core::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::CellRef;
use crate::range::{RangeParseError, RangeRef};

/// The set of cell ranges currently visible/loaded in a viewport.
///
/// Immutable once constructed; member ranges are deduplicated and held in
/// their natural order regardless of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ViewportWindows {
    ranges: Vec<RangeRef>,
}

impl ViewportWindows {
    /// Construct from any collection of ranges.
    pub fn new(ranges: impl IntoIterator<Item = RangeRef>) -> Self {
        let mut ranges: Vec<RangeRef> = ranges.into_iter().collect();
        ranges.sort();
        ranges.dedup();
        Self { ranges }
    }

    /// The empty window set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true when no window ranges are present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of member ranges.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Member ranges in natural order.
    #[inline]
    pub fn ranges(&self) -> &[RangeRef] {
        &self.ranges
    }

    /// Returns true when at least one member range contains `cell`
    /// (kind-insensitive, bounds inclusive).
    pub fn contains(&self, cell: CellRef) -> bool {
        self.ranges.iter().any(|range| range.contains(cell))
    }

    /// Parse comma-separated range texts; empty text is the empty set.
    pub fn from_text(text: &str) -> Result<Self, RangeParseError> {
        let s = text.trim();
        if s.is_empty() {
            return Ok(Self::empty());
        }
        let ranges = s
            .split(',')
            .map(RangeRef::from_text)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(ranges))
    }
}

impl fmt::Display for ViewportWindows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}

impl FromIterator<RangeRef> for ViewportWindows {
    fn from_iter<T: IntoIterator<Item = RangeRef>>(iter: T) -> Self {
        Self::new(iter)
    }
}

// Deserialization re-normalizes order and duplicates.
#[derive(Deserialize)]
struct RawWindows {
    ranges: Vec<RangeRef>,
}

impl<'de> Deserialize<'de> for ViewportWindows {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawWindows::deserialize(deserializer)?;
        Ok(ViewportWindows::new(raw.ranges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(text: &str) -> RangeRef {
        RangeRef::from_text(text).unwrap()
    }

    fn cell(a1: &str) -> CellRef {
        CellRef::from_a1(a1).unwrap()
    }

    #[test]
    fn order_and_duplicates_normalize() {
        let windows = ViewportWindows::new([range("C3..D4"), range("A1..B2"), range("C3..D4")]);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows.to_string(), "A1..B2,C3..D4");
    }

    #[test]
    fn containment_across_members() {
        let windows = ViewportWindows::new([range("A1..B2"), range("D4..E5")]);
        assert!(windows.contains(cell("A1")));
        assert!(windows.contains(cell("$E$5")));
        assert!(!windows.contains(cell("C3")));
        assert!(!ViewportWindows::empty().contains(cell("A1")));
    }

    #[test]
    fn text_roundtrip_with_single_cell_window() {
        for text in ["A1..B2,C3..D4", "A1..B2,E5", ""] {
            let windows = ViewportWindows::from_text(text).unwrap();
            assert_eq!(windows.to_string(), text);
        }
    }
}
