use std::collections::BTreeMap;

use tabula_model::{CellRef, LabelMapping, LabelName, RangeRef};

/// Lookup and lifecycle contract for label mappings.
///
/// Lookups are synchronous and atomic from the caller's perspective; the
/// consistency guarantees of the backing store are the implementor's
/// concern. A missing label is an ordinary `None`, not an error.
pub trait LabelStore {
    /// Load the mapping for `label`, if one exists.
    fn load(&self, label: &LabelName) -> Option<LabelMapping>;

    /// Save (insert or replace) a mapping.
    fn save(&mut self, mapping: LabelMapping);

    /// Delete the mapping for `label`; returns true if one was removed.
    fn delete(&mut self, label: &LabelName) -> bool;

    /// Find up to `max` mappings whose label contains `text`
    /// (case-insensitive). Empty query text matches nothing.
    fn find_similar(&self, text: &str, max: usize) -> Vec<LabelMapping>;
}

/// Lookup and lifecycle contract for range-to-cells mappings.
///
/// `load` returns cells in a deterministic, store-defined order. The
/// resolution engine's first-cell policy follows that order; it is NOT
/// assumed to be top-left-first unless the implementor guarantees it.
pub trait RangeStore {
    /// Load the cells mapped to `range`, if any.
    fn load(&self, range: &RangeRef) -> Option<Vec<CellRef>>;

    /// Save (insert or replace) the cells for a range.
    fn save(&mut self, range: RangeRef, cells: Vec<CellRef>);

    /// Delete the mapping for `range`; returns true if one was removed.
    fn delete(&mut self, range: &RangeRef) -> bool;
}

/// In-memory [`LabelStore`] with deterministic iteration order.
#[derive(Debug, Default, Clone)]
pub struct MemoryLabelStore {
    mappings: BTreeMap<LabelName, LabelMapping>,
}

impl MemoryLabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns true when no mappings are stored.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl LabelStore for MemoryLabelStore {
    fn load(&self, label: &LabelName) -> Option<LabelMapping> {
        self.mappings.get(label).cloned()
    }

    fn save(&mut self, mapping: LabelMapping) {
        self.mappings.insert(mapping.label.clone(), mapping);
    }

    fn delete(&mut self, label: &LabelName) -> bool {
        self.mappings.remove(label).is_some()
    }

    fn find_similar(&self, text: &str, max: usize) -> Vec<LabelMapping> {
        if text.is_empty() || max == 0 {
            return Vec::new();
        }
        let needle = text.to_lowercase();
        self.mappings
            .values()
            .filter(|mapping| mapping.label.as_str().to_lowercase().contains(&needle))
            .take(max)
            .cloned()
            .collect()
    }
}

/// In-memory [`RangeStore`].
///
/// `load` returns cells in the order they were saved, which makes the
/// store-defined ordering contract visible in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryRangeStore {
    ranges: BTreeMap<RangeRef, Vec<CellRef>>,
}

impl MemoryRangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns true when no ranges are stored.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl RangeStore for MemoryRangeStore {
    fn load(&self, range: &RangeRef) -> Option<Vec<CellRef>> {
        self.ranges.get(range).cloned()
    }

    fn save(&mut self, range: RangeRef, cells: Vec<CellRef>) {
        self.ranges.insert(range, cells);
    }

    fn delete(&mut self, range: &RangeRef) -> bool {
        self.ranges.remove(range).is_some()
    }
}
