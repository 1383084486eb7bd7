use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell::CellRef;
use crate::coord::A1ParseError;

/// A pixel-space window anchored at a home cell.
///
/// The home reference is normalized to relative kind on construction;
/// dimensions are non-negative finite pixel counts.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ViewportRect {
    home: CellRef,
    width: f64,
    height: f64,
}

impl ViewportRect {
    /// Validate and construct a viewport rectangle.
    pub fn new(home: CellRef, width: f64, height: f64) -> Result<Self, ViewportError> {
        check_dimension(width, ViewportError::InvalidWidth)?;
        check_dimension(height, ViewportError::InvalidHeight)?;
        Ok(Self {
            home: home.to_relative(),
            width,
            height,
        })
    }

    /// The home cell (always relative kind).
    #[inline]
    pub fn home(&self) -> CellRef {
        self.home
    }

    /// Pixel width.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Pixel height.
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Point containment, **both bounds inclusive**: a point exactly on the
    /// far edge (`x == width`) still counts. Callers depend on the one-pixel
    /// overlap at the boundary.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x <= self.width && y >= 0.0 && y <= self.height
    }

    /// Parse `<home>:<width>:<height>` text.
    pub fn from_text(text: &str) -> Result<Self, ViewportParseError> {
        let fields = split_fields::<3>(text)?;
        let home = CellRef::from_a1(fields[0])?;
        let width = parse_pixels(fields[1])?;
        let height = parse_pixels(fields[2])?;
        Ok(ViewportRect::new(home, width, height)?)
    }
}

impl fmt::Display for ViewportRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f64 Display renders whole numbers without a trailing `.0`.
        write!(f, "{}:{}:{}", self.home, self.width, self.height)
    }
}

/// A scrollable pixel viewport: a home cell plus scroll offsets and
/// dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Viewport {
    home: CellRef,
    x_offset: f64,
    y_offset: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    /// Validate and construct a viewport.
    pub fn new(
        home: CellRef,
        x_offset: f64,
        y_offset: f64,
        width: f64,
        height: f64,
    ) -> Result<Self, ViewportError> {
        check_offset(x_offset)?;
        check_offset(y_offset)?;
        check_dimension(width, ViewportError::InvalidWidth)?;
        check_dimension(height, ViewportError::InvalidHeight)?;
        Ok(Self {
            home: home.to_relative(),
            x_offset,
            y_offset,
            width,
            height,
        })
    }

    /// The home cell (always relative kind).
    #[inline]
    pub fn home(&self) -> CellRef {
        self.home
    }

    /// Horizontal scroll offset in pixels.
    #[inline]
    pub fn x_offset(&self) -> f64 {
        self.x_offset
    }

    /// Vertical scroll offset in pixels.
    #[inline]
    pub fn y_offset(&self) -> f64 {
        self.y_offset
    }

    /// Pixel width.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Pixel height.
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// The window rectangle, without the scroll offsets.
    pub fn rectangle(&self) -> ViewportRect {
        ViewportRect {
            home: self.home,
            width: self.width,
            height: self.height,
        }
    }

    /// Returns a viewport with the given home; the receiver is returned
    /// unchanged when it already matches after relative normalization.
    pub fn with_home(self, home: CellRef) -> Self {
        let home = home.to_relative();
        if self.home == home {
            return self;
        }
        Self { home, ..self }
    }

    /// Returns a viewport with the given x offset; identity short-circuit
    /// on an unchanged value.
    pub fn with_x_offset(self, x_offset: f64) -> Result<Self, ViewportError> {
        check_offset(x_offset)?;
        if self.x_offset == x_offset {
            return Ok(self);
        }
        Ok(Self { x_offset, ..self })
    }

    /// Returns a viewport with the given y offset; identity short-circuit
    /// on an unchanged value.
    pub fn with_y_offset(self, y_offset: f64) -> Result<Self, ViewportError> {
        check_offset(y_offset)?;
        if self.y_offset == y_offset {
            return Ok(self);
        }
        Ok(Self { y_offset, ..self })
    }

    /// Returns a viewport with the given width; identity short-circuit on
    /// an unchanged value.
    pub fn with_width(self, width: f64) -> Result<Self, ViewportError> {
        check_dimension(width, ViewportError::InvalidWidth)?;
        if self.width == width {
            return Ok(self);
        }
        Ok(Self { width, ..self })
    }

    /// Returns a viewport with the given height; identity short-circuit on
    /// an unchanged value.
    pub fn with_height(self, height: f64) -> Result<Self, ViewportError> {
        check_dimension(height, ViewportError::InvalidHeight)?;
        if self.height == height {
            return Ok(self);
        }
        Ok(Self { height, ..self })
    }

    /// Parse `<home>:<xOffset>:<yOffset>:<width>:<height>` text.
    pub fn from_text(text: &str) -> Result<Self, ViewportParseError> {
        let fields = split_fields::<5>(text)?;
        let home = CellRef::from_a1(fields[0])?;
        let x_offset = parse_pixels(fields[1])?;
        let y_offset = parse_pixels(fields[2])?;
        let width = parse_pixels(fields[3])?;
        let height = parse_pixels(fields[4])?;
        Ok(Viewport::new(home, x_offset, y_offset, width, height)?)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.home, self.x_offset, self.y_offset, self.width, self.height
        )
    }
}

fn check_dimension(value: f64, err: fn(f64) -> ViewportError) -> Result<(), ViewportError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(err(value))
    }
}

fn check_offset(value: f64) -> Result<(), ViewportError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ViewportError::InvalidOffset(value))
    }
}

fn split_fields<const N: usize>(text: &str) -> Result<[&str; N], ViewportParseError> {
    let s = text.trim();
    if s.is_empty() {
        return Err(ViewportParseError::Empty);
    }
    let fields: Vec<&str> = s.split(':').collect();
    fields
        .try_into()
        .map_err(|fields: Vec<&str>| ViewportParseError::FieldCount {
            expected: N,
            got: fields.len(),
        })
}

fn parse_pixels(text: &str) -> Result<f64, ViewportParseError> {
    text.parse::<f64>()
        .map_err(|_| ViewportParseError::Number {
            text: text.to_string(),
        })
}

// Deserialization re-runs validation and home normalization.
#[derive(Deserialize)]
struct RawViewportRect {
    home: CellRef,
    width: f64,
    height: f64,
}

impl<'de> Deserialize<'de> for ViewportRect {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawViewportRect::deserialize(deserializer)?;
        ViewportRect::new(raw.home, raw.width, raw.height).map_err(serde::de::Error::custom)
    }
}

#[derive(Deserialize)]
struct RawViewport {
    home: CellRef,
    x_offset: f64,
    y_offset: f64,
    width: f64,
    height: f64,
}

impl<'de> Deserialize<'de> for Viewport {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawViewport::deserialize(deserializer)?;
        Viewport::new(raw.home, raw.x_offset, raw.y_offset, raw.width, raw.height)
            .map_err(serde::de::Error::custom)
    }
}

/// Validation errors for viewport construction.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum ViewportError {
    #[error("viewport width must be a finite value >= 0, got {0}")]
    InvalidWidth(f64),
    #[error("viewport height must be a finite value >= 0, got {0}")]
    InvalidHeight(f64),
    #[error("viewport offset must be finite, got {0}")]
    InvalidOffset(f64),
}

/// Errors that can occur when parsing viewport text.
#[derive(Debug, PartialEq, Error)]
pub enum ViewportParseError {
    #[error("empty viewport text")]
    Empty,
    #[error("expected {expected} ':'-separated fields, got {got}")]
    FieldCount { expected: usize, got: usize },
    #[error("invalid home cell: {0}")]
    Home(#[from] A1ParseError),
    #[error("invalid numeric field {text:?}")]
    Number { text: String },
    #[error(transparent)]
    Invalid(#[from] ViewportError),
}
