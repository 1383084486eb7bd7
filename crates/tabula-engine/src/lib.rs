//! `tabula-engine` computes over the `tabula-model` addressing types:
//! resolving expression references through label/range stores, remapping
//! cell positions for move/paste, and multi-key sort comparison.
//!
//! The engine is computation-only: it performs no I/O of its own and holds
//! no mutable state. Its only outward calls are the synchronous store
//! lookups made during reference resolution.

mod moving;
mod resolve;
mod sort;
mod store;

pub use moving::{map_cell, move_cells, move_range};
pub use resolve::{resolve_all, resolve_one};
pub use sort::{RangeComparator, SortDirection, SortList, SortSource, ValueComparator};
pub use store::{LabelStore, MemoryLabelStore, MemoryRangeStore, RangeStore};
