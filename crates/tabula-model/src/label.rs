use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reference::ExprRef;

/// Maximum length of a label in characters.
pub const LABEL_MAX_LEN: usize = 255;

/// A case-sensitive symbolic alias for a cell, another label, or a range.
///
/// Valid labels are non-empty, at most [`LABEL_MAX_LEN`] characters, start
/// with a letter or `_`, continue with letters, digits, `_` or `.`, and must
/// not look like a cell reference (`A1` can never be a label).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LabelName(String);

impl LabelName {
    /// Validate and construct a label.
    pub fn new(name: impl Into<String>) -> Result<Self, LabelError> {
        let name = name.into();
        validate_label(&name)?;
        Ok(Self(name))
    }

    /// The label text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LabelName {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LabelName> for String {
    fn from(value: LabelName) -> Self {
        value.0
    }
}

impl std::str::FromStr for LabelName {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A label→target association.
///
/// The target may itself be a label (chained) or a range; mappings are owned
/// and persisted by the external label store, not by this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMapping {
    pub label: LabelName,
    pub target: ExprRef,
}

impl LabelMapping {
    /// Construct a new mapping.
    pub fn new(label: LabelName, target: ExprRef) -> Self {
        Self { label, target }
    }

    /// Returns a mapping with the given target; the receiver is returned
    /// unchanged when it already matches.
    pub fn with_target(self, target: ExprRef) -> Self {
        if self.target == target {
            return self;
        }
        Self { target, ..self }
    }
}

/// Validation errors for labels.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("label cannot be empty")]
    Empty,
    #[error("label is too long ({len} > {max})")]
    TooLong { len: usize, max: usize },
    #[error("invalid first character {ch:?} in label (must start with a letter or '_')")]
    InvalidStartCharacter { ch: char },
    #[error("invalid character {ch:?} at index {index} in label")]
    InvalidCharacter { ch: char, index: usize },
    #[error("label cannot look like a cell reference (e.g. A1)")]
    LooksLikeCellReference,
}

/// Returns true for text shaped like an A1 cell reference: 1-3 letters
/// followed by at least one digit, nothing else.
pub(crate) fn looks_like_cell_reference(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return false;
    }

    let mut i = 0;
    if bytes[i] == b'$' {
        i += 1;
    }
    let letter_start = i;
    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
        i += 1;
    }

    // Columns are 1-3 letters (A..XFD).
    if i == letter_start || i - letter_start > 3 {
        return false;
    }

    if i < bytes.len() && bytes[i] == b'$' {
        i += 1;
    }
    let digit_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }

    digit_start != i && i == bytes.len()
}

fn validate_label(name: &str) -> Result<(), LabelError> {
    if name.is_empty() {
        return Err(LabelError::Empty);
    }

    let len = name.chars().count();
    if len > LABEL_MAX_LEN {
        return Err(LabelError::TooLong {
            len,
            max: LABEL_MAX_LEN,
        });
    }

    if looks_like_cell_reference(name) {
        return Err(LabelError::LooksLikeCellReference);
    }

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        debug_assert!(false, "name was checked non-empty but chars() yielded none");
        return Err(LabelError::Empty);
    };
    if !(first.is_alphabetic() || first == '_') {
        return Err(LabelError::InvalidStartCharacter { ch: first });
    }

    for (index, ch) in name.chars().enumerate().skip(1) {
        if !(ch.is_alphabetic() || ch.is_ascii_digit() || ch == '_' || ch == '.') {
            return Err(LabelError::InvalidCharacter { ch, index });
        }
    }

    Ok(())
}
