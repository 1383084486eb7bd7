use core::cmp::Ordering;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tabula_model::{Cell, CellValue, ColumnRef, RowRef};

/// Sort direction for one key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Compares two cell values for one sort key.
///
/// Values order by type first (numbers, date-times, text, booleans, then
/// blanks), and within a type by natural comparison; text comparison is
/// case-insensitive unless configured otherwise. Descending reverses the
/// whole ordering.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueComparator {
    pub direction: SortDirection,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl ValueComparator {
    /// Ascending, case-insensitive.
    pub fn ascending() -> Self {
        Self {
            direction: SortDirection::Ascending,
            case_sensitive: false,
        }
    }

    /// Descending, case-insensitive.
    pub fn descending() -> Self {
        Self {
            direction: SortDirection::Descending,
            case_sensitive: false,
        }
    }

    /// Same comparator with explicit case handling for text.
    pub fn with_case_sensitive(self, case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            ..self
        }
    }

    /// Compare two values under this key.
    pub fn compare(&self, left: &CellValue, right: &CellValue) -> Ordering {
        let forward = match (left, right) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => {
                if self.case_sensitive {
                    a.cmp(b)
                } else {
                    a.to_lowercase().cmp(&b.to_lowercase())
                }
            }
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Blank, CellValue::Blank) => Ordering::Equal,
            _ => type_rank(left).cmp(&type_rank(right)),
        };
        match self.direction {
            SortDirection::Ascending => forward,
            SortDirection::Descending => forward.reverse(),
        }
    }
}

fn type_rank(value: &CellValue) -> u8 {
    match value {
        CellValue::Number(_) => 0,
        CellValue::DateTime(_) => 1,
        CellValue::Text(_) => 2,
        CellValue::Bool(_) => 3,
        CellValue::Blank => 4,
    }
}

/// Compares two parallel value lists, each one candidate row or column
/// under a multi-key sort, using an ordered chain of per-position
/// comparators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeComparator {
    comparators: SmallVec<[ValueComparator; 4]>,
}

impl RangeComparator {
    /// Build a comparator chain; the i-th comparator applies to the i-th
    /// position of both lists.
    pub fn new(comparators: impl IntoIterator<Item = ValueComparator>) -> Self {
        Self {
            comparators: comparators.into_iter().collect(),
        }
    }

    /// Number of chained comparators.
    pub fn len(&self) -> usize {
        self.comparators.len()
    }

    /// Returns true when the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.comparators.is_empty()
    }

    /// Walk both lists in lock-step, returning at the first non-equal
    /// comparison. When either list (or the chain) runs out, the result so
    /// far stands (initially `Equal`). A length difference alone is never a
    /// tiebreak.
    pub fn compare(&self, left: &[CellValue], right: &[CellValue]) -> Ordering {
        let mut result = Ordering::Equal;
        for (i, comparator) in self.comparators.iter().enumerate() {
            let (Some(l), Some(r)) = (left.get(i), right.get(i)) else {
                break;
            };
            result = comparator.compare(l, r);
            if result != Ordering::Equal {
                break;
            }
        }
        result
    }
}

/// The original row-or-column a [`SortList`] was built from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortSource {
    Column(ColumnRef),
    Row(RowRef),
}

impl SortSource {
    /// The 0-indexed coordinate value of the original identity.
    pub fn value(&self) -> u32 {
        match self {
            SortSource::Column(column) => column.value(),
            SortSource::Row(row) => row.value(),
        }
    }
}

/// A fixed-capacity, index-settable cell container that remembers which
/// column or row it was built from.
///
/// After an external sort reorders a batch of these lists, the retained
/// identity lets the caller compute how far each column/row travelled,
/// which drives the reference-fixup pass owned by collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SortList {
    source: SortSource,
    slots: Vec<Option<Cell>>,
}

impl SortList {
    /// Create a list of `capacity` empty slots for the given source.
    pub fn new(source: SortSource, capacity: usize) -> Self {
        Self {
            source,
            slots: vec![None; capacity],
        }
    }

    /// The original identity this list was seeded with.
    pub fn source(&self) -> SortSource {
        self.source
    }

    /// Slot count fixed at construction.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Fill a slot. Panics when `index` is outside the fixed capacity.
    pub fn set(&mut self, index: usize, cell: Cell) {
        assert!(
            index < self.slots.len(),
            "slot index {index} outside capacity {}",
            self.slots.len()
        );
        self.slots[index] = Some(cell);
    }

    /// The cell at `index`, if one was set.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Slot values for comparison; unset slots read as blank.
    pub fn values(&self) -> Vec<CellValue> {
        self.slots
            .iter()
            .map(|slot| {
                slot.as_ref()
                    .map(|cell| cell.value.clone())
                    .unwrap_or_default()
            })
            .collect()
    }

    /// How far the original identity travelled if this list now occupies
    /// the column/row at coordinate value `new_value`: positive is
    /// rightward/downward.
    pub fn moved_by(&self, new_value: u32) -> i64 {
        i64::from(new_value) - i64::from(self.source.value())
    }
}
