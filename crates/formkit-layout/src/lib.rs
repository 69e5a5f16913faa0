//! # formkit layout
//!
//! Grid form layout engine. Columns and rows are declared up front with a size
//! policy each; components are placed into rectangular cell spans and the
//! engine computes the preferred and minimum size of the form and the pixel
//! bounds of every component for a given container.
//!
//! ## Design Goals
//!
//! 1. **Tracks**: Constant, component-measured and bounded column and row sizes
//! 2. **Spans**: Components spanning several tracks widen them when needed
//! 3. **Groups**: Tracks forced to share the size of their widest member
//! 4. **Resizing**: Extra or missing space is shared by resize weight
//! 5. **Alignment**: Fill, leading, center and trailing placement in a cell
//!
//! The widget tree is not owned by the engine. Components are opaque handles,
//! measured and positioned through a [`ComponentHost`].

pub mod distribute;
pub mod grid;
pub mod measure_cache;

pub use formkit_spec::{
    Axis, CellAlignment, CellConstraint, ConfigurationError, ConverterConfig, FontKey,
    FontMetrics, FontMetricsSource, Insets, LayoutError, LayoutMap, MeasureMode, ParseError,
    ParseErrorKind, Size, TrackAlignment, TrackSpec, TrackSpecBuilder, Unit, UnitConverter,
};
pub use grid::{Grid, LayoutInfo, Placement};
pub use measure_cache::{CacheStats, MeasureCache};

use thiserror::Error;

/// Which size a host is asked to report for a component.
pub type MeasureKind = MeasureMode;

/// A component could not be measured. The engine treats it as zero-sized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("measurement unavailable: {reason}")]
pub struct MeasurementUnavailable {
    pub reason: String,
}

impl MeasurementUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The widget tree a grid lays out.
///
/// `C` is the host's component handle. Measurements are in pixels along the
/// given axis.
pub trait ComponentHost<C> {
    fn measure(&self, component: &C, axis: Axis, kind: MeasureKind)
        -> Result<i32, MeasurementUnavailable>;

    fn is_visible(&self, _component: &C) -> bool {
        true
    }

    fn set_bounds(&mut self, component: &C, bounds: Rect);
}

/// Rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` lies completely inside this rectangle.
    pub fn encloses(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Origin along `axis`.
    pub fn start(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Extent along `axis`.
    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// Width and height in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    pub width: i32,
    pub height: i32,
}

impl Dimension {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}
