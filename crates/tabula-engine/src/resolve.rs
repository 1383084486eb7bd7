use tabula_model::{CellRef, ExprRef};

use crate::store::{LabelStore, RangeStore};

/// Resolve `reference` down to a single concrete cell.
///
/// Labels are followed through the label store, ranges through the range
/// store; indirection recurses until a cell is reached. A missing label or
/// range mapping is not an error: it means "the reference currently points
/// nowhere" and yields `None`, which callers above this layer typically
/// surface as a reference-class error value.
///
/// A range resolves to the **first** cell of whatever order its store
/// returns: deterministic, but store-defined (see [`RangeStore::load`]).
///
/// Recursion terminates because label chains and range contents are
/// external data, acyclic by construction in the stores.
pub fn resolve_one(
    reference: &ExprRef,
    labels: &dyn LabelStore,
    ranges: &dyn RangeStore,
) -> Option<CellRef> {
    match reference {
        ExprRef::Cell(cell) => Some(*cell),
        ExprRef::Label(label) => match labels.load(label) {
            Some(mapping) => resolve_one(&mapping.target, labels, ranges),
            None => {
                log::debug!("label {label} has no mapping");
                None
            }
        },
        ExprRef::Range(range) => match ranges.load(range) {
            Some(cells) => cells
                .first()
                .and_then(|cell| resolve_one(&ExprRef::Cell(*cell), labels, ranges)),
            None => {
                log::debug!("range {range} has no cells");
                None
            }
        },
    }
}

/// Resolve `reference` to every concrete cell it denotes, feeding each one
/// to `consumer` in store order.
///
/// Ranges fan out across their whole stored cell list; labels recurse on
/// their target. Missing mappings contribute nothing.
pub fn resolve_all(
    reference: &ExprRef,
    labels: &dyn LabelStore,
    ranges: &dyn RangeStore,
    consumer: &mut dyn FnMut(CellRef),
) {
    match reference {
        ExprRef::Cell(cell) => consumer(*cell),
        ExprRef::Label(label) => match labels.load(label) {
            Some(mapping) => resolve_all(&mapping.target, labels, ranges, consumer),
            None => log::debug!("label {label} has no mapping"),
        },
        ExprRef::Range(range) => match ranges.load(range) {
            Some(cells) => {
                for cell in cells {
                    resolve_all(&ExprRef::Cell(cell), labels, ranges, consumer);
                }
            }
            None => log::debug!("range {range} has no cells"),
        },
    }
}
