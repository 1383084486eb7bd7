use core::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::coord::{letters_to_col, A1ParseError, ColumnRef, CoordError, RefKind, RowRef};
use crate::{MAX_COLS, MAX_ROWS};

/// A reference to a single cell: a column paired with a row, each carrying
/// its own [`RefKind`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub column: ColumnRef,
    pub row: RowRef,
}

impl CellRef {
    /// Construct a new [`CellRef`].
    #[inline]
    pub const fn new(column: ColumnRef, row: RowRef) -> Self {
        Self { column, row }
    }

    /// Shift both coordinates, keeping kinds. Out-of-bounds results are an
    /// error; use [`CellRef::checked_add`] to drop instead.
    pub fn add(self, dcol: i64, drow: i64) -> Result<Self, CoordError> {
        Ok(Self {
            column: self.column.add(dcol)?,
            row: self.row.add(drow)?,
        })
    }

    /// Shift both coordinates, returning `None` when either axis would leave
    /// the sheet. `checked_add(0, 0)` returns the receiver unchanged.
    pub fn checked_add(self, dcol: i64, drow: i64) -> Option<Self> {
        Some(Self {
            column: self.column.checked_add(dcol)?,
            row: self.row.checked_add(drow)?,
        })
    }

    /// Returns a cell with the given column; the receiver is returned
    /// unchanged when it already matches.
    #[inline]
    pub fn with_column(self, column: ColumnRef) -> Self {
        if self.column == column {
            return self;
        }
        Self { column, ..self }
    }

    /// Returns a cell with the given row; the receiver is returned unchanged
    /// when it already matches.
    #[inline]
    pub fn with_row(self, row: RowRef) -> Self {
        if self.row == row {
            return self;
        }
        Self { row, ..self }
    }

    /// Both coordinates forced to [`RefKind::Relative`].
    #[inline]
    pub fn to_relative(self) -> Self {
        Self {
            column: self.column.with_kind(RefKind::Relative),
            row: self.row.with_kind(RefKind::Relative),
        }
    }

    /// Position-only equality: `A1` equals `$A$1` here. Move, sort and
    /// window logic use this; serialization keeps the kinds apart.
    #[inline]
    pub fn eq_ignoring_kind(self, other: Self) -> bool {
        self.column.eq_ignoring_kind(other.column) && self.row.eq_ignoring_kind(other.row)
    }

    /// Position-only ordering counterpart of [`CellRef::eq_ignoring_kind`]:
    /// column first, then row.
    pub fn cmp_ignoring_kind(self, other: Self) -> core::cmp::Ordering {
        self.column
            .cmp_ignoring_kind(other.column)
            .then(self.row.cmp_ignoring_kind(other.row))
    }

    /// Render as A1-style text: column text immediately followed by row text
    /// (`$A$1`, `B12`).
    pub fn to_a1(self) -> String {
        format!("{}{}", self.column, self.row)
    }

    /// Parse an A1-style reference, capturing per-axis `$` kind markers.
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(A1ParseError::Empty);
        }

        let bytes = s.as_bytes();
        let mut idx = 0usize;
        let col_kind = if bytes.first() == Some(&b'$') {
            idx += 1;
            RefKind::Absolute
        } else {
            RefKind::Relative
        };

        let col_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_alphabetic() {
            idx += 1;
        }
        if idx == col_start {
            return Err(A1ParseError::MissingColumn);
        }
        let col_str = &s[col_start..idx];

        let row_kind = if bytes.get(idx) == Some(&b'$') {
            idx += 1;
            RefKind::Absolute
        } else {
            RefKind::Relative
        };

        let row_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == row_start {
            return Err(A1ParseError::MissingRow);
        }
        if idx != bytes.len() {
            return Err(A1ParseError::TrailingCharacters);
        }

        let col = letters_to_col(col_str)?;
        if col >= MAX_COLS {
            return Err(A1ParseError::InvalidColumn);
        }
        let row_1_based: u32 = s[row_start..idx]
            .parse()
            .map_err(|_| A1ParseError::InvalidRow)?;
        if row_1_based == 0 || row_1_based > MAX_ROWS {
            return Err(A1ParseError::InvalidRow);
        }

        Ok(Self {
            column: ColumnRef::with(col, col_kind).map_err(|_| A1ParseError::InvalidColumn)?,
            row: RowRef::with(row_1_based - 1, row_kind).map_err(|_| A1ParseError::InvalidRow)?,
        })
    }
}

// Column first, then row; kinds already act as the per-axis tiebreak inside
// the coordinate orderings, keeping `Ord` consistent with `Eq`.
impl PartialOrd for CellRef {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellRef {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.column
            .cmp(&other.column)
            .then(self.row.cmp(&other.row))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

const COL_BITS: u32 = 14; // 2^14 = 16,384 columns.
const COL_MASK: u64 = (1u64 << COL_BITS) - 1;

/// Compact position key used for sparse cell maps.
///
/// The key packs a `(row, col)` pair into a `u64`:
///
/// ```text
/// key = (row << 14) | col
/// ```
///
/// Reference kinds are deliberately not part of the key: two references to
/// the same position collapse to one entry regardless of addressing mode.
/// Ordering is row-major.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(transparent)]
pub struct CellKey(u64);

impl CellKey {
    /// Encode a `(row, col)` coordinate into a compact [`CellKey`].
    #[inline]
    pub fn new(row: u32, col: u32) -> Self {
        assert!(row < MAX_ROWS, "row out of sheet bounds: {row}");
        assert!(col < MAX_COLS, "col out of sheet bounds: {col}");
        Self(((row as u64) << COL_BITS) | (col as u64))
    }

    /// Decode the row component (0-indexed).
    #[inline]
    pub const fn row(self) -> u32 {
        (self.0 >> COL_BITS) as u32
    }

    /// Decode the column component (0-indexed).
    #[inline]
    pub const fn col(self) -> u32 {
        (self.0 & COL_MASK) as u32
    }

    /// Raw packed value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Create a key from a [`CellRef`], dropping kinds.
    #[inline]
    pub fn from_ref(cell: CellRef) -> Self {
        Self::new(cell.row.value(), cell.column.value())
    }

    /// Convert to a relative-kind [`CellRef`].
    #[inline]
    pub fn to_ref(self) -> CellRef {
        CellRef::new(
            ColumnRef::new_unchecked(self.col(), RefKind::Relative),
            RowRef::new_unchecked(self.row(), RefKind::Relative),
        )
    }
}

impl<'de> Deserialize<'de> for CellKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u64::deserialize(deserializer)?;
        let row = raw >> COL_BITS;
        let col = raw & COL_MASK;

        if row >= MAX_ROWS as u64 {
            return Err(D::Error::custom(format!(
                "CellKey row out of sheet bounds: {row}"
            )));
        }
        if col >= MAX_COLS as u64 {
            return Err(D::Error::custom(format!(
                "CellKey col out of sheet bounds: {col}"
            )));
        }

        Ok(CellKey(raw))
    }
}

impl From<CellKey> for u64 {
    fn from(value: CellKey) -> Self {
        value.0
    }
}

impl From<CellRef> for CellKey {
    fn from(value: CellRef) -> Self {
        Self::from_ref(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(a1: &str) -> CellRef {
        CellRef::from_a1(a1).unwrap()
    }

    #[test]
    fn a1_roundtrip_with_kinds() {
        for text in ["A1", "$A$1", "B12", "$B12", "B$12", "XFD1048576"] {
            assert_eq!(cell(text).to_a1(), text);
        }
        assert_eq!(cell("bc32").to_a1(), "BC32");
    }

    #[test]
    fn a1_rejects_malformed_text() {
        assert_eq!(CellRef::from_a1(""), Err(A1ParseError::Empty));
        assert_eq!(CellRef::from_a1("12"), Err(A1ParseError::MissingColumn));
        assert_eq!(CellRef::from_a1("AB"), Err(A1ParseError::MissingRow));
        assert_eq!(CellRef::from_a1("A0"), Err(A1ParseError::InvalidRow));
        assert_eq!(
            CellRef::from_a1("A1X"),
            Err(A1ParseError::TrailingCharacters)
        );
        assert_eq!(CellRef::from_a1("XFE1"), Err(A1ParseError::InvalidColumn));
        assert_eq!(
            CellRef::from_a1("A1048577"),
            Err(A1ParseError::InvalidRow)
        );
    }

    #[test]
    fn checked_add_drops_at_bounds() {
        let a1 = cell("A1");
        assert_eq!(a1.checked_add(0, 0), Some(a1));
        assert_eq!(a1.checked_add(-1, 0), None);
        assert_eq!(a1.checked_add(0, -1), None);
        assert_eq!(a1.checked_add(1, 1), Some(cell("B2")));
    }

    #[test]
    fn kind_insensitive_comparison() {
        let plain = cell("C5");
        let pinned = cell("$C$5");
        assert_ne!(plain, pinned);
        assert!(plain.eq_ignoring_kind(pinned));
        assert_eq!(
            plain.cmp_ignoring_kind(pinned),
            core::cmp::Ordering::Equal
        );
        // Column dominates the ordering.
        assert!(cell("B9").cmp_ignoring_kind(cell("C1")).is_lt());
    }

    #[test]
    fn with_builders_short_circuit() {
        let c = cell("D4");
        assert_eq!(c.with_column(c.column), c);
        assert_eq!(c.with_row(c.row), c);
        assert_eq!(c.with_column(cell("E4").column), cell("E4"));
    }

    #[test]
    fn cell_key_roundtrip() {
        let key = CellKey::from_ref(cell("$B$3"));
        assert_eq!(key.row(), 2);
        assert_eq!(key.col(), 1);
        assert_eq!(key.to_ref(), cell("B3"));
    }

    #[test]
    fn cell_key_deserialize_validates_bounds() {
        let too_large = (MAX_ROWS as u64) << 14;
        let err = serde_json::from_str::<CellKey>(&too_large.to_string()).unwrap_err();
        assert!(err.to_string().contains("out of sheet bounds"));
    }
}
