//! Cell constraints.
//!
//! A constraint places one component into a rectangle of grid cells and says
//! how it is aligned there. Encoded as `"col, row[, colSpan, rowSpan][, align]"`,
//! for example `"3, 5, 2, 1, fc"` or `"1, 1, right, top"`.

use std::fmt;
use std::str::FromStr;

use crate::parse::offset_of;
use crate::track::TrackAlignment;
use crate::{Axis, ConfigurationError, ParseError, ParseErrorKind};

/// Alignment of a component within its cell along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellAlignment {
    /// Use the default alignment of the first spanned track.
    #[default]
    Default,
    Fill,
    Leading,
    Center,
    Trailing,
}

impl CellAlignment {
    /// The alignment actually applied in a track whose default is `track_default`.
    pub fn resolve(self, track_default: TrackAlignment) -> TrackAlignment {
        match self {
            CellAlignment::Default => track_default,
            CellAlignment::Fill => TrackAlignment::Fill,
            CellAlignment::Leading => TrackAlignment::Leading,
            CellAlignment::Center => TrackAlignment::Center,
            CellAlignment::Trailing => TrackAlignment::Trailing,
        }
    }

    /// One-letter code on `axis`: `l c r f d` horizontally, `t c b f d` vertically.
    pub fn code(self, axis: Axis) -> char {
        match (self, axis) {
            (CellAlignment::Default, _) => 'd',
            (CellAlignment::Fill, _) => 'f',
            (CellAlignment::Center, _) => 'c',
            (CellAlignment::Leading, Axis::Horizontal) => 'l',
            (CellAlignment::Leading, Axis::Vertical) => 't',
            (CellAlignment::Trailing, Axis::Horizontal) => 'r',
            (CellAlignment::Trailing, Axis::Vertical) => 'b',
        }
    }

    fn from_code(axis: Axis, code: char) -> Option<CellAlignment> {
        match (code.to_ascii_lowercase(), axis) {
            ('d', _) => Some(CellAlignment::Default),
            ('f', _) => Some(CellAlignment::Fill),
            ('c', _) => Some(CellAlignment::Center),
            ('l', Axis::Horizontal) | ('t', Axis::Vertical) => Some(CellAlignment::Leading),
            ('r', Axis::Horizontal) | ('b', Axis::Vertical) => Some(CellAlignment::Trailing),
            _ => None,
        }
    }

    /// A one letter code or a full word.
    fn from_token(axis: Axis, token: &str) -> Option<CellAlignment> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => CellAlignment::from_code(axis, code),
            _ => CellAlignment::from_word(axis, token),
        }
    }

    fn from_word(axis: Axis, word: &str) -> Option<CellAlignment> {
        match (word.to_ascii_lowercase().as_str(), axis) {
            ("default", _) => Some(CellAlignment::Default),
            ("fill", _) => Some(CellAlignment::Fill),
            ("center", _) => Some(CellAlignment::Center),
            ("left", Axis::Horizontal) | ("top", Axis::Vertical) => Some(CellAlignment::Leading),
            ("right", Axis::Horizontal) | ("bottom", Axis::Vertical) => {
                Some(CellAlignment::Trailing)
            }
            _ => None,
        }
    }
}

/// Space kept free between a cell's edges and its component, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Insets {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        top: 0,
        left: 0,
        bottom: 0,
        right: 0,
    };

    pub fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn uniform(inset: i32) -> Self {
        Self::new(inset, inset, inset, inset)
    }

    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }

    /// Leading and trailing inset along `axis`.
    pub fn along(&self, axis: Axis) -> (i32, i32) {
        match axis {
            Axis::Horizontal => (self.left, self.right),
            Axis::Vertical => (self.top, self.bottom),
        }
    }

    fn is_negative(&self) -> bool {
        self.top < 0 || self.left < 0 || self.bottom < 0 || self.right < 0
    }
}

/// Where a component sits in the grid and how it is aligned there.
///
/// Indices are 1-based. Ranges are checked against a grid when the constraint
/// is added to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellConstraint {
    pub column: usize,
    pub row: usize,
    pub column_span: usize,
    pub row_span: usize,
    pub horizontal: CellAlignment,
    pub vertical: CellAlignment,
    pub insets: Insets,
}

impl Default for CellConstraint {
    fn default() -> Self {
        Self::xy(1, 1)
    }
}

impl CellConstraint {
    /// A single cell with default alignment and no insets.
    pub fn xy(column: usize, row: usize) -> Self {
        Self::xywh(column, row, 1, 1)
    }

    pub fn xywh(column: usize, row: usize, column_span: usize, row_span: usize) -> Self {
        Self {
            column,
            row,
            column_span,
            row_span,
            horizontal: CellAlignment::Default,
            vertical: CellAlignment::Default,
            insets: Insets::ZERO,
        }
    }

    pub fn with_span(mut self, column_span: usize, row_span: usize) -> Self {
        self.column_span = column_span;
        self.row_span = row_span;
        self
    }

    pub fn with_alignment(mut self, horizontal: CellAlignment, vertical: CellAlignment) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self
    }

    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    /// First track index on `axis`.
    pub fn index(&self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.column,
            Axis::Vertical => self.row,
        }
    }

    pub fn span(&self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.column_span,
            Axis::Vertical => self.row_span,
        }
    }

    /// Last track index on `axis`, inclusive. Saturates for spans too large
    /// for any grid.
    pub fn end(&self, axis: Axis) -> usize {
        self.index(axis)
            .saturating_add(self.span(axis))
            .saturating_sub(1)
    }

    pub fn alignment(&self, axis: Axis) -> CellAlignment {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }

    pub fn set_index(&mut self, axis: Axis, index: usize) {
        match axis {
            Axis::Horizontal => self.column = index,
            Axis::Vertical => self.row = index,
        }
    }

    pub fn set_span(&mut self, axis: Axis, span: usize) {
        match axis {
            Axis::Horizontal => self.column_span = span,
            Axis::Vertical => self.row_span = span,
        }
    }

    /// Check indices, spans and insets without a grid.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for axis in Axis::ALL {
            if self.index(axis) == 0 {
                return Err(ConfigurationError::InvalidIndex { axis });
            }
            if self.span(axis) == 0 {
                return Err(ConfigurationError::InvalidSpan { axis });
            }
        }
        if self.insets.is_negative() {
            return Err(ConfigurationError::NegativeInsets);
        }
        Ok(())
    }

    /// Validate and check that the spanned cells exist in a grid of the given size.
    pub fn check_bounds(&self, columns: usize, rows: usize) -> Result<(), ConfigurationError> {
        self.validate()?;
        for (axis, count) in [(Axis::Horizontal, columns), (Axis::Vertical, rows)] {
            if self.end(axis) > count {
                return Err(ConfigurationError::CellOutOfRange {
                    axis,
                    index: self.index(axis),
                    span: self.span(axis),
                    count,
                });
            }
        }
        Ok(())
    }

    /// Decode `"col, row[, colSpan, rowSpan][, align]"`.
    ///
    /// Insets have no encoded form and decode as zero.
    pub fn decode(source: &str) -> Result<CellConstraint, ParseError> {
        let parts: Vec<&str> = source
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();
        let at = |part: &str| offset_of(source, part);

        let (column, row) = match parts[..] {
            [column, row, ..] => (
                parse_positive(column, at(column), ParseErrorKind::MalformedIndex)?,
                parse_positive(row, at(row), ParseErrorKind::MalformedIndex)?,
            ),
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingCoordinate,
                    source.trim(),
                    source.len(),
                ))
            }
        };
        let mut constraint = CellConstraint::xy(column, row);

        let mut rest = &parts[2..];
        if let Some(&first) = rest.first() {
            if first.starts_with(|c: char| c.is_ascii_digit()) {
                let Some(&second) = rest.get(1) else {
                    return Err(ParseError::new(ParseErrorKind::MalformedSpan, first, at(first)));
                };
                constraint.column_span =
                    parse_positive(first, at(first), ParseErrorKind::MalformedSpan)?;
                constraint.row_span =
                    parse_positive(second, at(second), ParseErrorKind::MalformedSpan)?;
                rest = &rest[2..];
            }
        }

        let (horizontal, vertical) = match *rest {
            [] => (CellAlignment::Default, CellAlignment::Default),
            [single] => decode_single_alignment(single).ok_or_else(|| {
                ParseError::new(ParseErrorKind::MalformedAlignment, single, at(single))
            })?,
            [horizontal, vertical] => {
                let h = CellAlignment::from_token(Axis::Horizontal, horizontal).ok_or_else(|| {
                    ParseError::new(ParseErrorKind::MalformedAlignment, horizontal, at(horizontal))
                })?;
                let v = CellAlignment::from_token(Axis::Vertical, vertical).ok_or_else(|| {
                    ParseError::new(ParseErrorKind::MalformedAlignment, vertical, at(vertical))
                })?;
                (h, v)
            }
            [_, _, extra, ..] => {
                return Err(ParseError::new(ParseErrorKind::TooManyParts, extra, at(extra)))
            }
        };
        constraint.horizontal = horizontal;
        constraint.vertical = vertical;
        Ok(constraint)
    }

    /// Encode in the shortest form that decodes back to the same cell.
    /// Insets are not encoded.
    pub fn encode(&self) -> String {
        let mut encoded = format!("{}, {}", self.column, self.row);
        if self.column_span != 1 || self.row_span != 1 {
            encoded.push_str(&format!(", {}, {}", self.column_span, self.row_span));
        }
        if self.horizontal != CellAlignment::Default || self.vertical != CellAlignment::Default {
            encoded.push_str(", ");
            encoded.push(self.horizontal.code(Axis::Horizontal));
            encoded.push(self.vertical.code(Axis::Vertical));
        }
        encoded
    }
}

impl FromStr for CellConstraint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellConstraint::decode(s)
    }
}

impl fmt::Display for CellConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn parse_positive(text: &str, position: usize, kind: ParseErrorKind) -> Result<usize, ParseError> {
    match text.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ParseError::new(kind, text, position)),
    }
}

/// A one or two letter code, or a single alignment word.
fn decode_single_alignment(text: &str) -> Option<(CellAlignment, CellAlignment)> {
    let mut chars = text.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(h), Some(v), None) => Some((
            CellAlignment::from_code(Axis::Horizontal, h)?,
            CellAlignment::from_code(Axis::Vertical, v)?,
        )),
        (Some(code), None, None) => single_axis(
            CellAlignment::from_code(Axis::Horizontal, code),
            CellAlignment::from_code(Axis::Vertical, code),
        ),
        _ => single_axis(
            CellAlignment::from_word(Axis::Horizontal, text),
            CellAlignment::from_word(Axis::Vertical, text),
        ),
    }
}

/// Letters valid on both axes apply to both; the others set their own axis.
fn single_axis(
    horizontal: Option<CellAlignment>,
    vertical: Option<CellAlignment>,
) -> Option<(CellAlignment, CellAlignment)> {
    match (horizontal, vertical) {
        (Some(h), Some(v)) => Some((h, v)),
        (Some(h), None) => Some((h, CellAlignment::Default)),
        (None, Some(v)) => Some((CellAlignment::Default, v)),
        (None, None) => None,
    }
}
