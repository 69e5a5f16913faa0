//! Unit conversion to device pixels.
//!
//! Absolute units (points, inches, millimeters, centimeters) need only the
//! screen resolution. Dialog units are relative to the dialog base units of a
//! reference font: the average character width horizontally and a height
//! derived from the font ascent vertically.
//!
//! Base units are expensive to compute (they need font metrics from the host's
//! font system), so the converter caches them per font. The cache is read-mostly:
//! lookups take the read lock, misses and invalidation take the write lock. A
//! style or theme change must call [`UnitConverter::invalidate`] (or
//! [`UnitConverter::style_changed`] for the shared instance).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::{debug, trace, warn};

use crate::Axis;

/// A length unit accepted in constant sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Device pixels.
    Pixel,
    /// Typographic points, 1/72 inch.
    Point,
    /// Inches.
    Inch,
    /// Millimeters.
    Millimeter,
    /// Centimeters.
    Centimeter,
    /// Dialog units: horizontal on columns, vertical on rows.
    DialogUnit,
    /// Horizontal dialog units on either axis.
    DialogUnitX,
    /// Vertical dialog units on either axis.
    DialogUnitY,
}

impl Unit {
    /// The suffix used in encoded sizes.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Unit::Pixel => "px",
            Unit::Point => "pt",
            Unit::Inch => "in",
            Unit::Millimeter => "mm",
            Unit::Centimeter => "cm",
            Unit::DialogUnit => "dlu",
            Unit::DialogUnitX => "dluX",
            Unit::DialogUnitY => "dluY",
        }
    }

    /// Look up a unit by its suffix, ignoring case.
    pub fn from_abbreviation(value: &str) -> Option<Self> {
        let unit = match value.to_ascii_lowercase().as_str() {
            "px" => Unit::Pixel,
            "pt" => Unit::Point,
            "in" => Unit::Inch,
            "mm" => Unit::Millimeter,
            "cm" => Unit::Centimeter,
            "dlu" => Unit::DialogUnit,
            "dlux" => Unit::DialogUnitX,
            "dluy" => Unit::DialogUnitY,
            _ => return None,
        };
        Some(unit)
    }

    /// Whether the unit converts with the resolution alone.
    pub fn is_absolute(self) -> bool {
        self.inches_per_unit().is_some()
    }

    /// Length of one unit in inches, for absolute units.
    pub fn inches_per_unit(self) -> Option<f64> {
        match self {
            Unit::Inch => Some(1.0),
            Unit::Millimeter => Some(10.0 / 254.0),
            Unit::Centimeter => Some(100.0 / 254.0),
            Unit::Point => Some(1.0 / 72.0),
            Unit::Pixel | Unit::DialogUnit | Unit::DialogUnitX | Unit::DialogUnitY => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Identity of a reference font, the cache key for dialog base units.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub family: String,
    /// Point size.
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn with_style(mut self, bold: bool, italic: bool) -> Self {
        self.bold = bold;
        self.italic = italic;
        self
    }
}

impl Default for FontKey {
    fn default() -> Self {
        Self::new("Dialog", 12)
    }
}

/// Font measurements the host's font system reports, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Average width of one character of the sample string.
    pub average_char_width: f64,
    pub ascent: f64,
}

/// Source of font metrics, usually backed by the host toolkit.
pub trait FontMetricsSource: Send + Sync {
    /// Measure `font`. `sample` is the string whose average character width
    /// should be reported. `None` when the font cannot be measured.
    fn metrics(&self, font: &FontKey, sample: &str) -> Option<FontMetrics>;
}

/// Dialog base units of a font, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialogBaseUnits {
    pub x: f64,
    pub y: f64,
}

impl DialogBaseUnits {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Derive base units from font metrics. Small fonts get their height
    /// stretched toward 15 px.
    pub fn from_metrics(metrics: FontMetrics) -> Self {
        let ascent = metrics.ascent.round();
        let height = if ascent > 14.0 {
            ascent
        } else {
            ascent + ((15.0 - ascent) / 3.0).trunc()
        };
        Self {
            x: metrics.average_char_width,
            y: height,
        }
    }

    /// The base unit along `axis`.
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

/// Unit converter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterConfig {
    /// Screen resolution in dots per inch.
    pub dpi: u32,
    /// Base units used when no font metrics are available.
    pub fallback_base_units: DialogBaseUnits,
    /// String whose average character width defines the horizontal base unit.
    pub average_width_sample: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            dpi: 96,
            fallback_base_units: DialogBaseUnits::new(6.0, 12.0),
            average_width_sample: "X".to_string(),
        }
    }
}

/// Converts unit-qualified values to pixels.
///
/// Safe to share between containers and threads.
pub struct UnitConverter {
    config: ConverterConfig,
    source: Option<Arc<dyn FontMetricsSource>>,
    base_units: RwLock<HashMap<FontKey, DialogBaseUnits>>,
}

static SHARED: OnceLock<Arc<UnitConverter>> = OnceLock::new();

impl UnitConverter {
    /// Create a converter with the default configuration and no metrics source.
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    pub fn with_config(config: ConverterConfig) -> Self {
        debug!(
            dpi = config.dpi,
            fallback_x = config.fallback_base_units.x,
            fallback_y = config.fallback_base_units.y,
            "Unit converter initialized"
        );

        Self {
            config,
            source: None,
            base_units: RwLock::new(HashMap::new()),
        }
    }

    /// Install the font metrics source used for dialog units.
    pub fn with_metrics_source(mut self, source: Arc<dyn FontMetricsSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// The process-wide converter, created on first use.
    pub fn shared() -> Arc<UnitConverter> {
        SHARED.get_or_init(|| Arc::new(UnitConverter::new())).clone()
    }

    /// Style or theme change notification for the shared converter.
    pub fn style_changed() {
        if let Some(shared) = SHARED.get() {
            shared.invalidate();
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn dpi(&self) -> u32 {
        self.config.dpi
    }

    /// Dialog base units of `font`, cached.
    pub fn dialog_base_units(&self, font: &FontKey) -> DialogBaseUnits {
        if let Ok(cache) = self.base_units.read() {
            if let Some(units) = cache.get(font) {
                return *units;
            }
        }

        let units = self.compute_base_units(font);
        if let Ok(mut cache) = self.base_units.write() {
            cache.insert(font.clone(), units);
        }
        units
    }

    fn compute_base_units(&self, font: &FontKey) -> DialogBaseUnits {
        let metrics = self
            .source
            .as_ref()
            .and_then(|source| source.metrics(font, &self.config.average_width_sample));

        match metrics {
            Some(metrics) => {
                let units = DialogBaseUnits::from_metrics(metrics);
                trace!(family = %font.family, size = font.size, x = units.x, y = units.y, "Computed dialog base units");
                units
            }
            None => {
                warn!(
                    family = %font.family,
                    size = font.size,
                    "No font metrics available, using fallback dialog base units"
                );
                self.config.fallback_base_units
            }
        }
    }

    /// Drop every cached base unit.
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.base_units.write() {
            cache.clear();
        }
        debug!("Dialog base unit cache invalidated");
    }

    /// Number of fonts with cached base units.
    pub fn cached_fonts(&self) -> usize {
        self.base_units.read().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Convert `value` in `unit` to pixels along `axis`.
    pub fn to_pixels(&self, value: f64, unit: Unit, axis: Axis, font: &FontKey) -> i32 {
        let dpi = f64::from(self.config.dpi);
        let pixels = match unit {
            Unit::Pixel => value,
            Unit::Inch => dpi * value,
            Unit::Millimeter => dpi * value * 10.0 / 254.0,
            Unit::Centimeter => dpi * value * 100.0 / 254.0,
            Unit::Point => dpi * value / 72.0,
            Unit::DialogUnit => self.dialog_pixels(value, axis, font),
            Unit::DialogUnitX => self.dialog_pixels(value, Axis::Horizontal, font),
            Unit::DialogUnitY => self.dialog_pixels(value, Axis::Vertical, font),
        };
        // Saturates at the i32 range.
        pixels.round() as i32
    }

    fn dialog_pixels(&self, value: f64, axis: Axis, font: &FontKey) -> f64 {
        let base = self.dialog_base_units(font);
        value * base.along(axis) / axis.dialog_unit_divisor()
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UnitConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitConverter")
            .field("config", &self.config)
            .field("has_metrics_source", &self.source.is_some())
            .field("cached_fonts", &self.cached_fonts())
            .finish()
    }
}
