//! Track sizes.
//!
//! A [`Size`] is one of:
//! - a constant, unit-qualified length
//! - a component size: the largest minimum or preferred size among the
//!   components confined to the track
//! - a bounded size: another size clamped by constant lower and/or upper bounds

use std::fmt;

use tracing::warn;

use crate::units::{FontKey, Unit, UnitConverter};
use crate::{format_number, Axis, ConfigurationError};

/// Which component measurement a layout pass is computing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureMode {
    /// Minimum layout size.
    Minimum,
    /// Natural (preferred) layout size, also used when arranging.
    Preferred,
}

/// Minimum and preferred size of one component along one axis, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Measured {
    pub minimum: i32,
    pub preferred: i32,
}

impl Measured {
    pub fn new(minimum: i32, preferred: i32) -> Self {
        Self { minimum, preferred }
    }

    /// The measurement `mode` asks for.
    pub fn select(&self, mode: MeasureMode) -> i32 {
        match mode {
            MeasureMode::Minimum => self.minimum,
            MeasureMode::Preferred => self.preferred,
        }
    }
}

/// Everything a size needs to resolve to pixels.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub axis: Axis,
    pub mode: MeasureMode,
    pub converter: &'a UnitConverter,
    /// Reference font for dialog units.
    pub font: &'a FontKey,
    /// Components whose span on `axis` is exactly the track being resolved.
    pub measures: &'a [Measured],
}

/// A unit-qualified constant length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSize {
    value: f64,
    unit: Unit,
}

impl ConstantSize {
    /// Zero pixels.
    pub const ZERO: ConstantSize = ConstantSize {
        value: 0.0,
        unit: Unit::Pixel,
    };

    pub fn new(value: f64, unit: Unit) -> Result<Self, ConfigurationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigurationError::NegativeSize(value));
        }
        Ok(Self { value, unit })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn to_pixels(&self, converter: &UnitConverter, axis: Axis, font: &FontKey) -> i32 {
        converter.to_pixels(self.value, self.unit, axis, font).max(0)
    }

    /// Compare two constants without a font, when their units allow it.
    fn compare(&self, other: &ConstantSize) -> Option<std::cmp::Ordering> {
        if self.unit == other.unit {
            return self.value.partial_cmp(&other.value);
        }
        let a = self.unit.inches_per_unit()? * self.value;
        let b = other.unit.inches_per_unit()? * other.value;
        a.partial_cmp(&b)
    }

    pub fn encode(&self) -> String {
        if self.value == 0.0 && self.unit == Unit::Pixel {
            return "0".to_string();
        }
        format!("{}{}", format_number(self.value), self.unit.abbreviation())
    }
}

/// Sizes measured from the components in a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentSize {
    Minimum,
    Preferred,
    /// Preferred size, except when computing the minimum layout size.
    Default,
}

impl ComponentSize {
    pub fn select(self, measured: Measured, mode: MeasureMode) -> i32 {
        match self {
            ComponentSize::Minimum => measured.minimum,
            ComponentSize::Preferred => measured.preferred,
            ComponentSize::Default => measured.select(mode),
        }
    }

    pub fn encode(self) -> &'static str {
        match self {
            ComponentSize::Minimum => "min",
            ComponentSize::Preferred => "pref",
            ComponentSize::Default => "default",
        }
    }
}

/// A size clamped by optional constant bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedSize {
    base: Box<Size>,
    lower: Option<ConstantSize>,
    upper: Option<ConstantSize>,
}

impl BoundedSize {
    /// Bound `base`. Fails when the base is constant or the bounds are
    /// comparable and inverted.
    pub fn new(
        base: Size,
        lower: Option<ConstantSize>,
        upper: Option<ConstantSize>,
    ) -> Result<Self, ConfigurationError> {
        if base.is_constant() {
            return Err(ConfigurationError::ConstantBoundedBase(base.encode()));
        }
        if let (Some(lo), Some(hi)) = (&lower, &upper) {
            if lo.compare(hi) == Some(std::cmp::Ordering::Greater) {
                return Err(ConfigurationError::InvertedBounds {
                    lower: lo.encode(),
                    upper: hi.encode(),
                });
            }
        }
        Ok(Self {
            base: Box::new(base),
            lower,
            upper,
        })
    }

    pub fn base(&self) -> &Size {
        &self.base
    }

    pub fn lower(&self) -> Option<ConstantSize> {
        self.lower
    }

    pub fn upper(&self) -> Option<ConstantSize> {
        self.upper
    }

    fn resolve(&self, ctx: &ResolveContext<'_>) -> i32 {
        let value = self.base.resolve(ctx);
        let lower = self
            .lower
            .map(|lo| lo.to_pixels(ctx.converter, ctx.axis, ctx.font));
        let upper = self
            .upper
            .map(|hi| hi.to_pixels(ctx.converter, ctx.axis, ctx.font));

        if let (Some(lo), Some(hi)) = (lower, upper) {
            if lo > hi {
                warn!(lower = lo, upper = hi, axis = %ctx.axis, "Bounded size resolved with inverted bounds");
            }
        }

        let mut value = value;
        if let Some(lo) = lower {
            value = value.max(lo);
        }
        if let Some(hi) = upper {
            value = value.min(hi);
        }
        value
    }

    pub fn encode(&self) -> String {
        let base = self.base.encode();
        match (&self.lower, &self.upper) {
            (Some(lo), Some(hi)) => format!("[{},{},{}]", lo.encode(), base, hi.encode()),
            (Some(lo), None) => format!("max({};{})", lo.encode(), base),
            (None, Some(hi)) => format!("min({};{})", base, hi.encode()),
            (None, None) => base,
        }
    }
}

/// The size policy of a track.
#[derive(Debug, Clone, PartialEq)]
pub enum Size {
    Constant(ConstantSize),
    Component(ComponentSize),
    Bounded(BoundedSize),
}

impl Size {
    pub const MINIMUM: Size = Size::Component(ComponentSize::Minimum);
    pub const PREFERRED: Size = Size::Component(ComponentSize::Preferred);
    pub const DEFAULT: Size = Size::Component(ComponentSize::Default);
    pub const ZERO: Size = Size::Constant(ConstantSize::ZERO);

    /// A constant size.
    pub fn constant(value: f64, unit: Unit) -> Result<Self, ConfigurationError> {
        ConstantSize::new(value, unit).map(Size::Constant)
    }

    /// A bounded size.
    pub fn bounded(
        base: Size,
        lower: Option<ConstantSize>,
        upper: Option<ConstantSize>,
    ) -> Result<Self, ConfigurationError> {
        BoundedSize::new(base, lower, upper).map(Size::Bounded)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Size::Constant(_))
    }

    /// Resolve to non-negative pixels.
    pub fn resolve(&self, ctx: &ResolveContext<'_>) -> i32 {
        let pixels = match self {
            Size::Constant(constant) => constant.to_pixels(ctx.converter, ctx.axis, ctx.font),
            Size::Component(kind) => ctx
                .measures
                .iter()
                .map(|measured| kind.select(*measured, ctx.mode))
                .max()
                .unwrap_or(0),
            Size::Bounded(bounded) => bounded.resolve(ctx),
        };
        pixels.max(0)
    }

    pub fn encode(&self) -> String {
        match self {
            Size::Constant(constant) => constant.encode(),
            Size::Component(kind) => kind.encode().to_string(),
            Size::Bounded(bounded) => bounded.encode(),
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<ConstantSize> for Size {
    fn from(constant: ConstantSize) -> Self {
        Size::Constant(constant)
    }
}

impl From<ComponentSize> for Size {
    fn from(kind: ComponentSize) -> Self {
        Size::Component(kind)
    }
}
