//! Lexical layer of the encoded grammar.
//!
//! Track lists are split at top-level commas and whitespace. Whitespace next to
//! `:`, `;` or `*`, before `(`, or inside parentheses and brackets stays within
//! one token. Before tokens reach the track grammar two expansions run:
//!
//! - `$name` is replaced by the spec fragment a [`LayoutMap`] holds for `name`
//! - `n*(a, b)` repeats the sub-list `a, b` `n` times
//!
//! Sizes share one grammar between columns and rows, so it lives here too.

use std::collections::HashMap;

use crate::size::{BoundedSize, ConstantSize, Size};
use crate::units::Unit;
use crate::{ParseError, ParseErrorKind};

/// Expansion stops after this many nested variables or multipliers.
const MAX_EXPANSION_DEPTH: usize = 16;

/// Characters that glue neighbouring whitespace-separated pieces into one token.
const JOINERS: &[char] = &[':', ';', '*'];

/// One token of an encoded list and its byte offset in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub position: usize,
}

/// Named spec fragments referenced as `$name` in encoded track lists.
///
/// Names are case-insensitive. A value may itself be a list and may reference
/// other variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutMap {
    entries: HashMap<String, String>,
}

impl LayoutMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name` (without the leading `$`). Returns the previous value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.entries
            .insert(Self::key(name.as_ref()), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&Self::key(name)).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&Self::key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(name: &str) -> String {
        name.trim_start_matches('$').to_ascii_lowercase()
    }
}

/// Byte offset of `part` inside `whole`. `part` must be a subslice of `whole`.
pub(crate) fn offset_of(whole: &str, part: &str) -> usize {
    (part.as_ptr() as usize).saturating_sub(whole.as_ptr() as usize)
}

/// Split `source` at `separator`, ignoring separators nested in `()` or `[]`.
pub(crate) fn split_top_level(source: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, ch) in source.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&source[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}

/// The argument list of `name(...)`, matching `name` case-insensitively.
pub(crate) fn strip_call<'a>(source: &'a str, name: &str) -> Option<&'a str> {
    let head = source.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    source[name.len()..]
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

/// Split an encoded list into raw tokens. `base` is added to every position.
pub(crate) fn split_list(source: &str, base: usize) -> Result<Vec<Token>, ParseError> {
    let mut segments: Vec<(usize, Vec<(usize, usize)>)> = vec![(0, Vec::new())];
    let mut open: Vec<usize> = Vec::new();
    let mut piece_start: Option<usize> = None;

    fn close(
        piece_start: &mut Option<usize>,
        end: usize,
        segments: &mut [(usize, Vec<(usize, usize)>)],
    ) {
        if let (Some(start), Some(segment)) = (piece_start.take(), segments.last_mut()) {
            segment.1.push((start, end));
        }
    }

    for (i, ch) in source.char_indices() {
        match ch {
            '(' | '[' => {
                piece_start.get_or_insert(i);
                open.push(i);
            }
            ')' | ']' => {
                if open.pop().is_none() {
                    return Err(ParseError::new(ParseErrorKind::Unbalanced, ch.to_string(), base + i));
                }
                piece_start.get_or_insert(i);
            }
            ',' if open.is_empty() => {
                close(&mut piece_start, i, &mut segments);
                segments.push((i, Vec::new()));
            }
            c if c.is_whitespace() && open.is_empty() => {
                close(&mut piece_start, i, &mut segments);
            }
            _ => {
                piece_start.get_or_insert(i);
            }
        }
    }
    if let Some(&position) = open.last() {
        return Err(ParseError::new(
            ParseErrorKind::Unbalanced,
            &source[position..],
            base + position,
        ));
    }
    close(&mut piece_start, source.len(), &mut segments);

    let mut tokens = Vec::new();
    for (segment_start, pieces) in segments {
        if pieces.is_empty() {
            return Err(ParseError::new(ParseErrorKind::Empty, "", base + segment_start));
        }

        let mut merged: Vec<(usize, usize)> = Vec::new();
        for (start, end) in pieces {
            if let Some(last) = merged.last_mut() {
                let previous = &source[last.0..last.1];
                let current = &source[start..end];
                if previous.ends_with(JOINERS)
                    || current.starts_with(JOINERS)
                    || current.starts_with('(')
                {
                    last.1 = end;
                    continue;
                }
            }
            merged.push((start, end));
        }

        tokens.extend(merged.into_iter().map(|(start, end)| Token {
            text: source[start..end].to_string(),
            position: base + start,
        }));
    }
    Ok(tokens)
}

/// Split an encoded track list and expand its variables and multipliers.
pub fn expand_list(source: &str, map: &LayoutMap) -> Result<Vec<Token>, ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::Empty, source, 0));
    }
    let mut tokens = Vec::new();
    expand_into(source, 0, None, map, 0, &mut tokens)?;
    Ok(tokens)
}

fn expand_into(
    source: &str,
    base: usize,
    pinned: Option<usize>,
    map: &LayoutMap,
    depth: usize,
    out: &mut Vec<Token>,
) -> Result<(), ParseError> {
    if depth > MAX_EXPANSION_DEPTH {
        return Err(ParseError::new(
            ParseErrorKind::ExpansionTooDeep,
            source,
            pinned.unwrap_or(base),
        ));
    }

    for token in split_list(source, base)? {
        let position = pinned.unwrap_or(token.position);
        let text = token.text.trim();

        if let Some(name) = text.strip_prefix('$') {
            let value = map
                .get(name)
                .ok_or_else(|| ParseError::new(ParseErrorKind::UnknownVariable, text, position))?;
            expand_into(value, position, Some(position), map, depth + 1, out)?;
        } else if let Some(star) = text.find('*') {
            let malformed = || ParseError::new(ParseErrorKind::MalformedMultiplier, text, position);
            let count: usize = text[..star].trim().parse().map_err(|_| malformed())?;
            if count == 0 {
                return Err(malformed());
            }
            let inner = text[star + 1..]
                .trim()
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(malformed)?;
            let inner_base = token.position + offset_of(&token.text, inner);
            for _ in 0..count {
                expand_into(inner, inner_base, pinned, map, depth + 1, out)?;
            }
        } else {
            out.push(Token {
                text: text.to_string(),
                position,
            });
        }
    }
    Ok(())
}

/// Parse the size part of a track token.
pub(crate) fn parse_size(text: &str, position: usize) -> Result<Size, ParseError> {
    let source = text.trim();
    let position = position + offset_of(text, source);

    match source.to_ascii_lowercase().as_str() {
        "min" | "m" => return Ok(Size::MINIMUM),
        "pref" | "p" => return Ok(Size::PREFERRED),
        "default" | "d" => return Ok(Size::DEFAULT),
        _ => {}
    }

    if let Some(args) = strip_call(source, "max") {
        return parse_bounded_call(source, args, position, true);
    }
    if let Some(args) = strip_call(source, "min") {
        return parse_bounded_call(source, args, position, false);
    }
    if let Some(args) = source.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return parse_bracket(source, args, position);
    }
    parse_constant(source, position).map(Size::Constant)
}

/// `max(a;b)` gives a lower bound, `min(a;b)` an upper bound. Exactly one
/// argument must be constant; it becomes the bound.
fn parse_bounded_call(
    source: &str,
    args: &str,
    position: usize,
    is_lower: bool,
) -> Result<Size, ParseError> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidBounds, source, position);
    let args = split_top_level(args, ';');
    if args.len() != 2 {
        return Err(invalid());
    }

    let first = parse_size(args[0], position + offset_of(source, args[0]))?;
    let second = parse_size(args[1], position + offset_of(source, args[1]))?;
    let (base, bound) = match (first, second) {
        (Size::Constant(bound), base) if !base.is_constant() => (base, bound),
        (base, Size::Constant(bound)) if !base.is_constant() => (base, bound),
        _ => return Err(invalid()),
    };

    let (lower, upper) = if is_lower {
        (Some(bound), None)
    } else {
        (None, Some(bound))
    };
    BoundedSize::new(base, lower, upper)
        .map(Size::Bounded)
        .map_err(|_| invalid())
}

/// `[lower,base]`, `[base,upper]` or `[lower,base,upper]`.
fn parse_bracket(source: &str, args: &str, position: usize) -> Result<Size, ParseError> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidBounds, source, position);
    let parts = split_top_level(args, ',');
    let mut sizes = Vec::with_capacity(parts.len());
    for part in &parts {
        sizes.push(parse_size(part, position + offset_of(source, part))?);
    }

    let mut sizes = sizes.into_iter();
    let bounded = match (sizes.next(), sizes.next(), sizes.next(), sizes.next()) {
        (Some(Size::Constant(lower)), Some(base), None, None) if !base.is_constant() => {
            BoundedSize::new(base, Some(lower), None)
        }
        (Some(base), Some(Size::Constant(upper)), None, None) if !base.is_constant() => {
            BoundedSize::new(base, None, Some(upper))
        }
        (Some(Size::Constant(lower)), Some(base), Some(Size::Constant(upper)), None) => {
            BoundedSize::new(base, Some(lower), Some(upper))
        }
        _ => return Err(invalid()),
    };
    bounded.map(Size::Bounded).map_err(|_| invalid())
}

fn parse_constant(source: &str, position: usize) -> Result<ConstantSize, ParseError> {
    let malformed = || ParseError::new(ParseErrorKind::MalformedSize, source, position);

    let split = source
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(source.len());
    let (number, unit) = source.split_at(split);
    if number.is_empty() {
        return Err(malformed());
    }
    let value: f64 = number.parse().map_err(|_| malformed())?;

    let unit_text = unit.trim();
    if unit_text.is_empty() {
        return if value == 0.0 {
            Ok(ConstantSize::ZERO)
        } else {
            Err(malformed())
        };
    }
    let unit = Unit::from_abbreviation(unit_text).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::UnknownUnit,
            unit_text,
            position + offset_of(source, unit_text),
        )
    })?;
    ConstantSize::new(value, unit).map_err(|_| malformed())
}
