//! # formkit spec
//!
//! Values and textual grammar for the formkit grid layout.
//!
//! ## Design Goals
//!
//! 1. **Units**: Convert pixels, points, inches, millimeters, centimeters and
//!    dialog units to device pixels
//! 2. **Sizes**: Constant, component-measured and bounded track sizes
//! 3. **Tracks**: Column and row specifications with alignment and resize weight
//! 4. **Cells**: Cell constraints placing a component into a span of tracks
//! 5. **Grammar**: Compact encoded strings for tracks and cells, the stable
//!    declarative format layouts are authored in
//!
//! Parse and configuration errors are raised when a value is built or decoded,
//! never during a layout pass.

pub mod cell;
pub mod parse;
pub mod size;
pub mod track;
pub mod units;

pub use cell::{CellAlignment, CellConstraint, Insets};
pub use parse::LayoutMap;
pub use size::{BoundedSize, ComponentSize, ConstantSize, MeasureMode, Measured, ResolveContext, Size};
pub use track::{TrackAlignment, TrackSpec, TrackSpecBuilder};
pub use units::{
    ConverterConfig, DialogBaseUnits, FontKey, FontMetrics, FontMetricsSource, Unit, UnitConverter,
};

use std::fmt;
use thiserror::Error;

/// Layout axis. Columns run along the horizontal axis, rows along the vertical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Both axes, columns first.
    pub const ALL: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    /// Divisor applied to the dialog base unit along this axis.
    pub fn dialog_unit_divisor(self) -> f64 {
        match self {
            Axis::Horizontal => 4.0,
            Axis::Vertical => 8.0,
        }
    }

    /// Alignment a track gets when its encoding names none.
    pub fn default_alignment(self) -> TrackAlignment {
        match self {
            Axis::Horizontal => TrackAlignment::Fill,
            Axis::Vertical => TrackAlignment::Center,
        }
    }

    /// The perpendicular axis.
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => f.write_str("column"),
            Axis::Vertical => f.write_str("row"),
        }
    }
}

/// What went wrong while decoding an encoded string.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("empty input")]
    Empty,

    #[error("unknown alignment")]
    UnknownAlignment,

    #[error("alignment not valid on this axis")]
    MisplacedAlignment,

    #[error("unknown unit")]
    UnknownUnit,

    #[error("malformed size")]
    MalformedSize,

    #[error("invalid bounded size")]
    InvalidBounds,

    #[error("malformed resize weight")]
    MalformedWeight,

    #[error("negative resize weight")]
    NegativeWeight,

    #[error("too many parts")]
    TooManyParts,

    #[error("unknown variable")]
    UnknownVariable,

    #[error("malformed multiplier")]
    MalformedMultiplier,

    #[error("variable expansion nested too deeply")]
    ExpansionTooDeep,

    #[error("unbalanced brackets")]
    Unbalanced,

    #[error("malformed cell index")]
    MalformedIndex,

    #[error("malformed cell span")]
    MalformedSpan,

    #[error("malformed cell alignment")]
    MalformedAlignment,

    #[error("missing cell coordinate")]
    MissingCoordinate,
}

/// A malformed encoded track or cell string.
///
/// `token` is the offending substring and `position` its byte offset in the
/// decoded input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} '{token}' at position {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub token: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, token: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            token: token.into(),
            position,
        }
    }
}

/// A structurally invalid grid, track or cell.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("grid must have at least one {axis}")]
    EmptyAxis { axis: Axis },

    #[error("expected a {expected} spec, got a {found} spec")]
    AxisMismatch { expected: Axis, found: Axis },

    #[error("{axis} {index} with span {span} exceeds the {count} {axis}s of the grid")]
    CellOutOfRange {
        axis: Axis,
        index: usize,
        span: usize,
        count: usize,
    },

    #[error("{axis} index must be at least 1")]
    InvalidIndex { axis: Axis },

    #[error("{axis} span must be at least 1")]
    InvalidSpan { axis: Axis },

    #[error("insets must not be negative")]
    NegativeInsets,

    #[error("size must not be negative, got {0}")]
    NegativeSize(f64),

    #[error("resize weight must not be negative, got {0}")]
    NegativeResizeWeight(f64),

    #[error("lower bound {lower} exceeds upper bound {upper}")]
    InvertedBounds { lower: String, upper: String },

    #[error("bounded size needs a non-constant base, got {0}")]
    ConstantBoundedBase(String),

    #[error("{axis} index {index} is out of range 1..={count}")]
    TrackIndexOutOfRange {
        axis: Axis,
        index: usize,
        count: usize,
    },

    #[error("{axis} group index {index} is out of range 1..={count}")]
    GroupIndexOutOfRange {
        axis: Axis,
        index: usize,
        count: usize,
    },

    #[error("{axis} {index} is used in more than one group")]
    DuplicateGroupIndex { axis: Axis, index: usize },

    #[error("{axis} {index} holds a component")]
    TrackOccupied { axis: Axis, index: usize },

    #[error("{axis} {index} is grouped")]
    TrackGrouped { axis: Axis, index: usize },
}

/// Either kind of error an encoded layout description can produce.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Formats a number the way encoded strings spell it: `4`, `2.5`.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
