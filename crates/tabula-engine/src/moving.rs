use tabula_model::{Cell, CellRef, RangeRef};

/// Translate a cell by `(dcol, drow)`.
///
/// Returns `None` when the unclamped result would leave the sheet on either
/// axis; the cell is dropped, never an error. A `(0, 0)` delta returns the
/// reference unchanged.
#[inline]
pub fn map_cell(cell: CellRef, dcol: i64, drow: i64) -> Option<CellRef> {
    cell.checked_add(dcol, drow)
}

/// Translate a set of cells by `(dcol, drow)`, silently dropping any cell
/// that would land outside the sheet.
pub fn move_cells(cells: impl IntoIterator<Item = Cell>, dcol: i64, drow: i64) -> Vec<Cell> {
    cells
        .into_iter()
        .filter_map(|cell| {
            let mapped = map_cell(cell.reference, dcol, drow)?;
            Some(cell.with_reference(mapped))
        })
        .collect()
}

/// Move cells from `source` into `target`'s coordinate space.
///
/// Each cell is translated by the begin-to-begin delta between the two
/// ranges. The transform is lossy: cells that translate outside the sheet's
/// absolute bounds, or outside the (possibly smaller) target range, are
/// silently discarded. Reference kinds survive on the cells that remain.
pub fn move_range(
    source: &RangeRef,
    target: &RangeRef,
    cells: impl IntoIterator<Item = Cell>,
) -> Vec<Cell> {
    let dcol = i64::from(target.begin().column.value()) - i64::from(source.begin().column.value());
    let drow = i64::from(target.begin().row.value()) - i64::from(source.begin().row.value());

    cells
        .into_iter()
        .filter_map(|cell| {
            let mapped = map_cell(cell.reference, dcol, drow)?;
            if !target.contains(mapped) {
                return None;
            }
            Some(cell.with_reference(mapped))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_model::CellValue;

    fn cell_at(a1: &str) -> Cell {
        Cell::new(CellRef::from_a1(a1).unwrap(), CellValue::Blank)
    }

    fn reference(a1: &str) -> CellRef {
        CellRef::from_a1(a1).unwrap()
    }

    fn range(text: &str) -> RangeRef {
        RangeRef::from_text(text).unwrap()
    }

    #[test]
    fn zero_delta_returns_the_same_reference() {
        let a1 = reference("A1");
        assert_eq!(map_cell(a1, 0, 0), Some(a1));
    }

    #[test]
    fn clipped_cells_are_dropped_not_errored() {
        assert_eq!(map_cell(reference("A1"), -1, 0), None);
        assert_eq!(map_cell(reference("A1"), 0, -1), None);

        let moved = move_cells([cell_at("A1"), cell_at("B2")], -1, 0);
        let kept: Vec<String> = moved.iter().map(|c| c.reference.to_a1()).collect();
        assert_eq!(kept, ["A2"]);
    }

    #[test]
    fn range_move_translates_by_the_begin_delta() {
        let moved = move_range(
            &range("A1..B2"),
            &range("C3..D4"),
            [cell_at("A1"), cell_at("B2")],
        );
        let kept: Vec<String> = moved.iter().map(|c| c.reference.to_a1()).collect();
        assert_eq!(kept, ["C3", "D4"]);
    }

    #[test]
    fn range_move_clips_to_a_smaller_target() {
        // Target is 1x1: only the cell landing on C3 survives.
        let moved = move_range(
            &range("A1..B2"),
            &range("C3"),
            [cell_at("A1"), cell_at("A2"), cell_at("B1"), cell_at("B2")],
        );
        let kept: Vec<String> = moved.iter().map(|c| c.reference.to_a1()).collect();
        assert_eq!(kept, ["C3"]);
    }

    #[test]
    fn range_move_keeps_reference_kinds() {
        let moved = move_range(&range("A1..B2"), &range("B2..C3"), [cell_at("$A$1")]);
        assert_eq!(moved[0].reference.to_a1(), "$B$2");
    }
}
