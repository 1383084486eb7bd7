use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cell::CellKey;
use crate::value::Cell;
use crate::windows::ViewportWindows;

/// A reported set of cell changes, optionally scoped to a window.
///
/// A delta with an empty window is unwindowed: it imposes no filter and
/// reports an empty window list. A windowed delta retains only cells whose
/// reference falls inside at least one window range, re-applying the filter
/// every time the cell set is replaced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Delta {
    cells: BTreeMap<CellKey, Cell>,
    window: ViewportWindows,
}

impl Delta {
    /// The empty, unwindowed delta.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Changed cells in row-major position order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Number of changed cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true when no cells changed.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The window; empty for unwindowed deltas.
    pub fn window(&self) -> &ViewportWindows {
        &self.window
    }

    /// Replace the cell set, applying the window filter.
    ///
    /// The receiver is returned unchanged when the filtered result equals
    /// the current set.
    pub fn with_cells(self, cells: impl IntoIterator<Item = Cell>) -> Self {
        let filtered = filter_cells(&self.window, cells);
        if filtered == self.cells {
            return self;
        }
        Self {
            cells: filtered,
            ..self
        }
    }

    /// Replace the window, re-filtering the current cells.
    pub fn with_window(self, window: ViewportWindows) -> Self {
        if self.window == window {
            return self;
        }
        let cells = filter_cells(&window, self.cells.into_values());
        Self { cells, window }
    }
}

fn filter_cells(
    window: &ViewportWindows,
    cells: impl IntoIterator<Item = Cell>,
) -> BTreeMap<CellKey, Cell> {
    cells
        .into_iter()
        .filter(|cell| window.is_empty() || window.contains(cell.reference))
        .map(|cell| (CellKey::from_ref(cell.reference), cell))
        .collect()
}

// Wire form carries the cells as a sequence; deserialization re-applies the
// window filter.
#[derive(Serialize, Deserialize)]
struct RawDelta {
    cells: Vec<Cell>,
    #[serde(default)]
    window: ViewportWindows,
}

impl Serialize for Delta {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        RawDelta {
            cells: self.cells.values().cloned().collect(),
            window: self.window.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Delta {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawDelta::deserialize(deserializer)?;
        Ok(Delta::empty().with_window(raw.window).with_cells(raw.cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellRef;
    use crate::value::CellValue;

    fn cell(a1: &str) -> Cell {
        Cell::new(CellRef::from_a1(a1).unwrap(), CellValue::Blank)
    }

    fn windows(text: &str) -> ViewportWindows {
        ViewportWindows::from_text(text).unwrap()
    }

    #[test]
    fn windowed_delta_filters_cells() {
        let delta = Delta::empty()
            .with_window(windows("A1..B2"))
            .with_cells([cell("A1"), cell("C3")]);
        let kept: Vec<String> = delta.cells().map(|c| c.reference.to_a1()).collect();
        assert_eq!(kept, ["A1"]);
    }

    #[test]
    fn unwindowed_delta_keeps_everything_and_reports_no_window() {
        let delta = Delta::empty().with_cells([cell("A1"), cell("C3")]);
        assert_eq!(delta.len(), 2);
        assert!(delta.window().is_empty());
    }

    #[test]
    fn filter_reapplies_on_every_replacement() {
        let delta = Delta::empty()
            .with_window(windows("A1..B2"))
            .with_cells([cell("C3")]);
        assert!(delta.is_empty());

        let refilled = delta.with_cells([cell("B2"), cell("D4")]);
        let kept: Vec<String> = refilled.cells().map(|c| c.reference.to_a1()).collect();
        assert_eq!(kept, ["B2"]);
    }

    #[test]
    fn shrinking_the_window_drops_cells() {
        let delta = Delta::empty()
            .with_window(windows("A1..D4"))
            .with_cells([cell("A1"), cell("D4")]);
        assert_eq!(delta.len(), 2);

        let shrunk = delta.with_window(windows("A1..B2"));
        let kept: Vec<String> = shrunk.cells().map(|c| c.reference.to_a1()).collect();
        assert_eq!(kept, ["A1"]);
    }

    #[test]
    fn unchanged_filtered_set_short_circuits() {
        let delta = Delta::empty()
            .with_window(windows("A1..B2"))
            .with_cells([cell("A1")]);
        let same = delta.clone().with_cells([cell("A1"), cell("C3")]);
        assert_eq!(same, delta);
    }

    #[test]
    fn absolute_references_filter_by_position() {
        let delta = Delta::empty()
            .with_window(windows("A1..B2"))
            .with_cells([cell("$A$1"), cell("$C$3")]);
        assert_eq!(delta.len(), 1);
    }
}
