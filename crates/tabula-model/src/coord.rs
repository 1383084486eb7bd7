use core::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of rows per sheet (1,048,576).
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns per sheet (16,384).
pub const MAX_COLS: u32 = 16_384;

/// Coordinates below this value are served from the precomputed caches.
const CACHE_LIMIT: u32 = 100;

/// Addressing mode of a column or row coordinate.
///
/// Absolute coordinates are fixed under copy/move and render with a `$`
/// prefix; relative coordinates shift and render bare.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    #[default]
    Relative,
    Absolute,
}

impl RefKind {
    /// Text prefix for this kind (`$` for absolute, empty for relative).
    #[inline]
    pub const fn prefix(self) -> &'static str {
        match self {
            RefKind::Relative => "",
            RefKind::Absolute => "$",
        }
    }
}

/// A reference to a single column, **0-indexed** (`value = 0` is column `A`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnRef {
    value: u32,
    kind: RefKind,
}

/// A reference to a single row, **0-indexed** (`value = 0` is row `1`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RowRef {
    value: u32,
    kind: RefKind,
}

// Deserialization re-validates bounds so wire payloads cannot smuggle in an
// out-of-range coordinate.
#[derive(Deserialize)]
struct RawCoord {
    value: u32,
    kind: RefKind,
}

impl<'de> Deserialize<'de> for ColumnRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawCoord::deserialize(deserializer)?;
        ColumnRef::with(raw.value, raw.kind).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for RowRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawCoord::deserialize(deserializer)?;
        RowRef::with(raw.value, raw.kind).map_err(serde::de::Error::custom)
    }
}

// Small coordinate values come up constantly (every viewport, every delta),
// so both kinds keep a read-only table built at compile time. The tables are
// never mutated after initialization and are safe to read unsynchronized.
static COLUMN_CACHE: [[ColumnRef; CACHE_LIMIT as usize]; 2] = build_column_cache();
static ROW_CACHE: [[RowRef; CACHE_LIMIT as usize]; 2] = build_row_cache();

const fn build_column_cache() -> [[ColumnRef; CACHE_LIMIT as usize]; 2] {
    let mut cache = [[ColumnRef {
        value: 0,
        kind: RefKind::Relative,
    }; CACHE_LIMIT as usize]; 2];
    let mut value = 0;
    while value < CACHE_LIMIT as usize {
        cache[RefKind::Relative as usize][value] = ColumnRef {
            value: value as u32,
            kind: RefKind::Relative,
        };
        cache[RefKind::Absolute as usize][value] = ColumnRef {
            value: value as u32,
            kind: RefKind::Absolute,
        };
        value += 1;
    }
    cache
}

const fn build_row_cache() -> [[RowRef; CACHE_LIMIT as usize]; 2] {
    let mut cache = [[RowRef {
        value: 0,
        kind: RefKind::Relative,
    }; CACHE_LIMIT as usize]; 2];
    let mut value = 0;
    while value < CACHE_LIMIT as usize {
        cache[RefKind::Relative as usize][value] = RowRef {
            value: value as u32,
            kind: RefKind::Relative,
        };
        cache[RefKind::Absolute as usize][value] = RowRef {
            value: value as u32,
            kind: RefKind::Absolute,
        };
        value += 1;
    }
    cache
}

impl ColumnRef {
    /// Construct a column reference, validating bounds.
    ///
    /// Values below the cache limit are returned from the precomputed table.
    pub fn with(value: u32, kind: RefKind) -> Result<Self, CoordError> {
        if value >= MAX_COLS {
            return Err(CoordError::ColumnOutOfBounds(i64::from(value)));
        }
        if value < CACHE_LIMIT {
            return Ok(COLUMN_CACHE[kind as usize][value as usize]);
        }
        Ok(Self { value, kind })
    }

    /// Invariant: `value < MAX_COLS`.
    #[inline]
    pub(crate) const fn new_unchecked(value: u32, kind: RefKind) -> Self {
        debug_assert!(value < MAX_COLS);
        Self { value, kind }
    }

    /// 0-indexed column value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.value
    }

    /// Addressing mode of this column.
    #[inline]
    pub const fn kind(self) -> RefKind {
        self.kind
    }

    /// Shift by `delta`, keeping the kind. Out-of-bounds results are an
    /// error; use [`ColumnRef::checked_add`] to drop instead.
    pub fn add(self, delta: i64) -> Result<Self, CoordError> {
        let value = i64::from(self.value) + delta;
        if value < 0 || value >= i64::from(MAX_COLS) {
            return Err(CoordError::ColumnOutOfBounds(value));
        }
        ColumnRef::with(value as u32, self.kind)
    }

    /// Shift by `delta`, returning `None` when the unclamped result would
    /// leave the sheet. `checked_add(0)` returns the receiver unchanged.
    #[inline]
    pub fn checked_add(self, delta: i64) -> Option<Self> {
        self.add(delta).ok()
    }

    /// Returns a column with the given kind; the receiver is returned
    /// unchanged when the kind already matches.
    #[inline]
    pub fn with_kind(self, kind: RefKind) -> Self {
        if self.kind == kind {
            return self;
        }
        Self { kind, ..self }
    }

    /// Value-only equality (`B` == `$B`), used by move and window logic.
    #[inline]
    pub fn eq_ignoring_kind(self, other: Self) -> bool {
        self.value == other.value
    }

    /// Value-only ordering counterpart of [`ColumnRef::eq_ignoring_kind`].
    #[inline]
    pub fn cmp_ignoring_kind(self, other: Self) -> core::cmp::Ordering {
        self.value.cmp(&other.value)
    }

    /// Render as A1-style text (`A`, `BC`, `$D`).
    pub fn to_a1(self) -> String {
        format!("{}{}", self.kind.prefix(), col_letters(self.value))
    }

    /// Parse A1-style column text (`A`, `bc`, `$D`).
    pub fn from_a1(text: &str) -> Result<Self, A1ParseError> {
        let s = text.trim();
        if s.is_empty() {
            return Err(A1ParseError::Empty);
        }
        let (kind, rest) = split_kind(s);
        if rest.is_empty() {
            return Err(A1ParseError::MissingColumn);
        }
        let value = letters_to_col(rest)?;
        if value >= MAX_COLS {
            return Err(A1ParseError::InvalidColumn);
        }
        ColumnRef::with(value, kind).map_err(|_| A1ParseError::InvalidColumn)
    }
}

impl RowRef {
    /// Construct a row reference, validating bounds.
    ///
    /// Values below the cache limit are returned from the precomputed table.
    pub fn with(value: u32, kind: RefKind) -> Result<Self, CoordError> {
        if value >= MAX_ROWS {
            return Err(CoordError::RowOutOfBounds(i64::from(value)));
        }
        if value < CACHE_LIMIT {
            return Ok(ROW_CACHE[kind as usize][value as usize]);
        }
        Ok(Self { value, kind })
    }

    /// Invariant: `value < MAX_ROWS`.
    #[inline]
    pub(crate) const fn new_unchecked(value: u32, kind: RefKind) -> Self {
        debug_assert!(value < MAX_ROWS);
        Self { value, kind }
    }

    /// 0-indexed row value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.value
    }

    /// Addressing mode of this row.
    #[inline]
    pub const fn kind(self) -> RefKind {
        self.kind
    }

    /// Shift by `delta`, keeping the kind. Out-of-bounds results are an
    /// error; use [`RowRef::checked_add`] to drop instead.
    pub fn add(self, delta: i64) -> Result<Self, CoordError> {
        let value = i64::from(self.value) + delta;
        if value < 0 || value >= i64::from(MAX_ROWS) {
            return Err(CoordError::RowOutOfBounds(value));
        }
        RowRef::with(value as u32, self.kind)
    }

    /// Shift by `delta`, returning `None` when the unclamped result would
    /// leave the sheet. `checked_add(0)` returns the receiver unchanged.
    #[inline]
    pub fn checked_add(self, delta: i64) -> Option<Self> {
        self.add(delta).ok()
    }

    /// Returns a row with the given kind; the receiver is returned unchanged
    /// when the kind already matches.
    #[inline]
    pub fn with_kind(self, kind: RefKind) -> Self {
        if self.kind == kind {
            return self;
        }
        Self { kind, ..self }
    }

    /// Value-only equality (`5` == `$5`), used by move and window logic.
    #[inline]
    pub fn eq_ignoring_kind(self, other: Self) -> bool {
        self.value == other.value
    }

    /// Value-only ordering counterpart of [`RowRef::eq_ignoring_kind`].
    #[inline]
    pub fn cmp_ignoring_kind(self, other: Self) -> core::cmp::Ordering {
        self.value.cmp(&other.value)
    }

    /// Render as A1-style text (`1`, `$12`); the stored value is 0-based,
    /// the rendered digits are 1-based.
    pub fn to_a1(self) -> String {
        format!("{}{}", self.kind.prefix(), self.value + 1)
    }

    /// Parse A1-style row text (`1`, `$12`).
    pub fn from_a1(text: &str) -> Result<Self, A1ParseError> {
        let s = text.trim();
        if s.is_empty() {
            return Err(A1ParseError::Empty);
        }
        let (kind, rest) = split_kind(s);
        if rest.is_empty() {
            return Err(A1ParseError::MissingRow);
        }
        if !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(A1ParseError::InvalidRow);
        }
        let row_1_based: u32 = rest.parse().map_err(|_| A1ParseError::InvalidRow)?;
        if row_1_based == 0 || row_1_based > MAX_ROWS {
            return Err(A1ParseError::InvalidRow);
        }
        RowRef::with(row_1_based - 1, kind).map_err(|_| A1ParseError::InvalidRow)
    }
}

// Full ordering compares the value first and uses the kind as the final
// tiebreak, so `Ord` stays consistent with `Eq` and references can key
// ordered collections. Callers that must treat `B` and `$B` as the same
// column use the `*_ignoring_kind` methods instead.
impl PartialOrd for ColumnRef {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ColumnRef {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        (self.value, self.kind).cmp(&(other.value, other.kind))
    }
}

impl PartialOrd for RowRef {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RowRef {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        (self.value, self.kind).cmp(&(other.value, other.kind))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Split a leading `$` kind marker off A1-style text.
fn split_kind(s: &str) -> (RefKind, &str) {
    match s.strip_prefix('$') {
        Some(rest) => (RefKind::Absolute, rest),
        None => (RefKind::Relative, s),
    }
}

pub(crate) fn col_letters(col: u32) -> String {
    // Columns are 1-based in A1 notation. We store 0-based internally.
    let mut n = col + 1;
    let mut out = Vec::<u8>::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).expect("column letters are always valid UTF-8")
}

pub(crate) fn letters_to_col(s: &str) -> Result<u32, A1ParseError> {
    let mut col: u32 = 0;
    for b in s.bytes() {
        if !b.is_ascii_alphabetic() {
            return Err(A1ParseError::InvalidColumn);
        }
        let v = (b.to_ascii_uppercase() - b'A') as u32 + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(v))
            .ok_or(A1ParseError::InvalidColumn)?;
    }
    if col == 0 {
        return Err(A1ParseError::InvalidColumn);
    }
    Ok(col - 1)
}

/// Errors raised by coordinate construction and arithmetic.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CoordError {
    /// The value falls outside `0..MAX_COLS`.
    ColumnOutOfBounds(i64),
    /// The value falls outside `0..MAX_ROWS`.
    RowOutOfBounds(i64),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::ColumnOutOfBounds(value) => {
                write!(f, "column {value} out of bounds (valid range 0..{MAX_COLS})")
            }
            CoordError::RowOutOfBounds(value) => {
                write!(f, "row {value} out of bounds (valid range 0..{MAX_ROWS})")
            }
        }
    }
}

impl std::error::Error for CoordError {}

/// Errors that can occur when parsing A1-style reference text.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum A1ParseError {
    Empty,
    MissingColumn,
    MissingRow,
    InvalidColumn,
    InvalidRow,
    TrailingCharacters,
}

impl fmt::Display for A1ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            A1ParseError::Empty => "empty A1 reference",
            A1ParseError::MissingColumn => "missing column in A1 reference",
            A1ParseError::MissingRow => "missing row in A1 reference",
            A1ParseError::InvalidColumn => "invalid column in A1 reference",
            A1ParseError::InvalidRow => "invalid row in A1 reference",
            A1ParseError::TrailingCharacters => "trailing characters in A1 reference",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for A1ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_bounds() {
        assert!(ColumnRef::with(MAX_COLS - 1, RefKind::Relative).is_ok());
        assert_eq!(
            ColumnRef::with(MAX_COLS, RefKind::Relative),
            Err(CoordError::ColumnOutOfBounds(i64::from(MAX_COLS)))
        );
    }

    #[test]
    fn row_bounds() {
        assert!(RowRef::with(MAX_ROWS - 1, RefKind::Absolute).is_ok());
        assert_eq!(
            RowRef::with(MAX_ROWS, RefKind::Absolute),
            Err(CoordError::RowOutOfBounds(i64::from(MAX_ROWS)))
        );
    }

    #[test]
    fn small_values_come_from_the_cache() {
        let a = ColumnRef::with(5, RefKind::Relative).unwrap();
        let b = ColumnRef::with(5, RefKind::Relative).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, COLUMN_CACHE[RefKind::Relative as usize][5]);

        let big_a = ColumnRef::with(500, RefKind::Relative).unwrap();
        let big_b = ColumnRef::with(500, RefKind::Relative).unwrap();
        assert_eq!(big_a, big_b);
        assert_eq!(big_a.value(), 500);
    }

    #[test]
    fn add_errors_at_bounds_and_checked_add_drops() {
        let a = ColumnRef::with(0, RefKind::Relative).unwrap();
        assert_eq!(a.add(-1), Err(CoordError::ColumnOutOfBounds(-1)));
        assert_eq!(a.checked_add(-1), None);
        assert_eq!(a.checked_add(0), Some(a));
        assert_eq!(a.checked_add(2).unwrap().value(), 2);

        let last = RowRef::with(MAX_ROWS - 1, RefKind::Relative).unwrap();
        assert_eq!(last.checked_add(1), None);
        assert_eq!(
            last.add(1),
            Err(CoordError::RowOutOfBounds(i64::from(MAX_ROWS)))
        );
    }

    #[test]
    fn with_kind_short_circuits() {
        let col = ColumnRef::with(3, RefKind::Absolute).unwrap();
        assert_eq!(col.with_kind(RefKind::Absolute), col);
        assert_eq!(col.with_kind(RefKind::Relative).kind(), RefKind::Relative);
        assert_eq!(col.with_kind(RefKind::Relative).value(), 3);
    }

    #[test]
    fn column_text_roundtrip() {
        for (value, kind, text) in [
            (0, RefKind::Relative, "A"),
            (25, RefKind::Relative, "Z"),
            (26, RefKind::Relative, "AA"),
            (27, RefKind::Absolute, "$AB"),
            (MAX_COLS - 1, RefKind::Relative, "XFD"),
        ] {
            let col = ColumnRef::with(value, kind).unwrap();
            assert_eq!(col.to_a1(), text);
            assert_eq!(ColumnRef::from_a1(text).unwrap(), col);
        }
        assert_eq!(
            ColumnRef::from_a1("xfe"),
            Err(A1ParseError::InvalidColumn)
        );
    }

    #[test]
    fn row_text_roundtrip() {
        for (value, kind, text) in [
            (0, RefKind::Relative, "1"),
            (11, RefKind::Absolute, "$12"),
            (MAX_ROWS - 1, RefKind::Relative, "1048576"),
        ] {
            let row = RowRef::with(value, kind).unwrap();
            assert_eq!(row.to_a1(), text);
            assert_eq!(RowRef::from_a1(text).unwrap(), row);
        }
        assert_eq!(RowRef::from_a1("0"), Err(A1ParseError::InvalidRow));
        assert_eq!(RowRef::from_a1("1048577"), Err(A1ParseError::InvalidRow));
    }

    #[test]
    fn ordering_ignores_and_respects_kind() {
        let rel = ColumnRef::with(7, RefKind::Relative).unwrap();
        let abs = ColumnRef::with(7, RefKind::Absolute).unwrap();
        assert_ne!(rel, abs);
        assert!(rel.eq_ignoring_kind(abs));
        assert_eq!(
            rel.cmp_ignoring_kind(abs),
            core::cmp::Ordering::Equal
        );
        assert!(rel < abs);
    }
}
