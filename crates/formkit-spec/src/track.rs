//! Column and row specifications.
//!
//! Encoded form: `[alignment:]size[:weight]`, e.g. `right:max(50dlu;pref)`,
//! `4dlu`, `fill:pref:grow`. Lists separate tracks with commas or whitespace.

use std::fmt;

use tracing::trace;

use crate::parse::{expand_list, offset_of, parse_size, split_top_level, strip_call};
use crate::size::Size;
use crate::{format_number, Axis, ConfigurationError, LayoutMap, ParseError, ParseErrorKind};

/// How components are placed inside a track when their cell asks for the
/// track's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackAlignment {
    /// Stretch over the whole cell.
    Fill,
    /// Left for columns, top for rows.
    Leading,
    Center,
    /// Right for columns, bottom for rows.
    Trailing,
}

impl TrackAlignment {
    /// The keyword used for this alignment on `axis`.
    pub fn keyword(self, axis: Axis) -> &'static str {
        match (self, axis) {
            (TrackAlignment::Fill, _) => "fill",
            (TrackAlignment::Center, _) => "center",
            (TrackAlignment::Leading, Axis::Horizontal) => "left",
            (TrackAlignment::Leading, Axis::Vertical) => "top",
            (TrackAlignment::Trailing, Axis::Horizontal) => "right",
            (TrackAlignment::Trailing, Axis::Vertical) => "bottom",
        }
    }

    /// Parse an alignment keyword or its one-letter abbreviation.
    ///
    /// Returns `None` when `text` is no alignment keyword at all, and
    /// `MisplacedAlignment` for keywords of the other axis.
    pub fn parse(axis: Axis, text: &str) -> Option<Result<TrackAlignment, ParseErrorKind>> {
        let on = |expected: Axis, alignment: TrackAlignment| {
            if axis == expected {
                Ok(alignment)
            } else {
                Err(ParseErrorKind::MisplacedAlignment)
            }
        };

        let alignment = match text.trim().to_ascii_lowercase().as_str() {
            "fill" | "f" => Ok(TrackAlignment::Fill),
            "center" | "c" => Ok(TrackAlignment::Center),
            "default" | "d" => Ok(axis.default_alignment()),
            "left" | "l" => on(Axis::Horizontal, TrackAlignment::Leading),
            "right" | "r" => on(Axis::Horizontal, TrackAlignment::Trailing),
            "top" | "t" => on(Axis::Vertical, TrackAlignment::Leading),
            "bottom" | "b" => on(Axis::Vertical, TrackAlignment::Trailing),
            _ => return None,
        };
        Some(alignment)
    }
}

/// One column or row: alignment, size policy and resize weight.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSpec {
    axis: Axis,
    alignment: TrackAlignment,
    size: Size,
    resize_weight: f64,
}

impl TrackSpec {
    pub fn new(
        axis: Axis,
        alignment: TrackAlignment,
        size: Size,
        resize_weight: f64,
    ) -> Result<Self, ConfigurationError> {
        if !resize_weight.is_finite() || resize_weight < 0.0 {
            return Err(ConfigurationError::NegativeResizeWeight(resize_weight));
        }
        Ok(Self {
            axis,
            alignment,
            size,
            resize_weight,
        })
    }

    /// A non-growing column with the default fill alignment.
    pub fn column(size: Size) -> Self {
        Self {
            axis: Axis::Horizontal,
            alignment: Axis::Horizontal.default_alignment(),
            size,
            resize_weight: 0.0,
        }
    }

    /// A non-growing row with the default center alignment.
    pub fn row(size: Size) -> Self {
        Self {
            axis: Axis::Vertical,
            alignment: Axis::Vertical.default_alignment(),
            size,
            resize_weight: 0.0,
        }
    }

    pub fn builder(axis: Axis) -> TrackSpecBuilder {
        TrackSpecBuilder::new(axis)
    }

    pub fn to_builder(&self) -> TrackSpecBuilder {
        TrackSpecBuilder {
            axis: self.axis,
            alignment: self.alignment,
            size: self.size.clone(),
            resize_weight: self.resize_weight,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn default_alignment(&self) -> TrackAlignment {
        self.alignment
    }

    pub fn size(&self) -> &Size {
        &self.size
    }

    pub fn resize_weight(&self) -> f64 {
        self.resize_weight
    }

    pub fn can_grow(&self) -> bool {
        self.resize_weight > 0.0
    }

    /// Decode a single encoded track.
    pub fn decode(axis: Axis, text: &str) -> Result<TrackSpec, ParseError> {
        decode_token(axis, text, 0)
    }

    /// Decode a comma or whitespace separated track list.
    pub fn decode_list(axis: Axis, source: &str) -> Result<Vec<TrackSpec>, ParseError> {
        Self::decode_list_with_map(axis, source, &LayoutMap::new())
    }

    /// Decode a track list, expanding `$name` variables from `map`.
    pub fn decode_list_with_map(
        axis: Axis,
        source: &str,
        map: &LayoutMap,
    ) -> Result<Vec<TrackSpec>, ParseError> {
        let specs = expand_list(source, map)?
            .iter()
            .map(|token| decode_token(axis, &token.text, token.position))
            .collect::<Result<Vec<_>, _>>()?;
        trace!(axis = %axis, count = specs.len(), "Decoded track list");
        Ok(specs)
    }

    /// Encode in the shortest form; default alignment and zero weight are omitted.
    pub fn encode(&self) -> String {
        let mut encoded = String::new();
        if self.alignment != self.axis.default_alignment() {
            encoded.push_str(self.alignment.keyword(self.axis));
            encoded.push(':');
        }
        encoded.push_str(&self.size.encode());
        if self.resize_weight > 0.0 {
            encoded.push(':');
            encoded.push_str(&format_number(self.resize_weight));
        }
        encoded
    }

    pub fn encode_list(specs: &[TrackSpec]) -> String {
        specs
            .iter()
            .map(TrackSpec::encode)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TrackSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Builder for [`TrackSpec`].
#[derive(Debug, Clone)]
pub struct TrackSpecBuilder {
    axis: Axis,
    alignment: TrackAlignment,
    size: Size,
    resize_weight: f64,
}

impl TrackSpecBuilder {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            alignment: axis.default_alignment(),
            size: Size::DEFAULT,
            resize_weight: 0.0,
        }
    }

    pub fn alignment(mut self, alignment: TrackAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn resize_weight(mut self, weight: f64) -> Self {
        self.resize_weight = weight;
        self
    }

    pub fn build(self) -> Result<TrackSpec, ConfigurationError> {
        TrackSpec::new(self.axis, self.alignment, self.size, self.resize_weight)
    }
}

fn decode_token(axis: Axis, raw: &str, position: usize) -> Result<TrackSpec, ParseError> {
    let text = raw.trim();
    let position = position + offset_of(raw, text);
    if text.is_empty() {
        return Err(ParseError::new(ParseErrorKind::Empty, text, position));
    }
    let parts = split_top_level(text, ':');
    let at = |part: &str| position + offset_of(text, part);

    let (alignment, size, weight) = match parts[..] {
        [size] => (None, size, None),
        [first, second] => {
            let first_is_alignment = TrackAlignment::parse(axis, first).is_some();
            let first_is_size = parse_size(first, at(first)).is_ok();
            if first_is_alignment && (!first_is_size || parse_size(second, at(second)).is_ok()) {
                (Some(first), second, None)
            } else if first_is_size {
                (None, first, Some(second))
            } else {
                return Err(ParseError::new(
                    ParseErrorKind::UnknownAlignment,
                    first.trim(),
                    at(first.trim_start()),
                ));
            }
        }
        [alignment, size, weight] => (Some(alignment), size, Some(weight)),
        [_, _, _, extra, ..] => {
            return Err(ParseError::new(ParseErrorKind::TooManyParts, text, at(extra)));
        }
        [] => return Err(ParseError::new(ParseErrorKind::Empty, text, position)),
    };

    let alignment = match alignment {
        None => axis.default_alignment(),
        Some(part) => match TrackAlignment::parse(axis, part) {
            Some(Ok(alignment)) => alignment,
            Some(Err(kind)) => {
                return Err(ParseError::new(kind, part.trim(), at(part.trim_start())))
            }
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::UnknownAlignment,
                    part.trim(),
                    at(part.trim_start()),
                ))
            }
        },
    };
    let size = parse_size(size, at(size))?;
    let weight = match weight {
        None => 0.0,
        Some(part) => parse_weight(part, at(part))?,
    };

    TrackSpec::new(axis, alignment, size, weight)
        .map_err(|_| ParseError::new(ParseErrorKind::NegativeWeight, text, position))
}

/// `none`, `grow`, `grow(x)` or a plain number.
fn parse_weight(text: &str, position: usize) -> Result<f64, ParseError> {
    let source = text.trim();
    let position = position + offset_of(text, source);
    match source.to_ascii_lowercase().as_str() {
        "none" | "n" => return Ok(0.0),
        "grow" | "g" => return Ok(1.0),
        _ => {}
    }

    let number = strip_call(source, "grow")
        .or_else(|| strip_call(source, "g"))
        .unwrap_or(source)
        .trim();
    let value: f64 = number
        .parse()
        .ok()
        .filter(|value: &f64| value.is_finite())
        .ok_or_else(|| ParseError::new(ParseErrorKind::MalformedWeight, source, position))?;
    if value < 0.0 {
        return Err(ParseError::new(ParseErrorKind::NegativeWeight, source, position));
    }
    Ok(value)
}
