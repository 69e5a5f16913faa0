//! # Form Grid Layout
//!
//! Sizes the columns and rows of a form grid and places components in them.
//!
//! ## Overview
//!
//! A layout pass runs per axis:
//! 1. Resolve each track's size from the components confined to it
//! 2. Widen the tracks under spanning components that do not fit
//! 3. Equalize grouped tracks to the group maximum
//! 4. Grow or shrink weighted tracks to the container
//! 5. Accumulate origins and place components in their cells
//!
//! Spans and groups are each reconciled in a single sweep; a group raised in
//! step 3 does not feed back into step 2.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use formkit_spec::{
    Axis, CellConstraint, ConfigurationError, FontKey, LayoutError, LayoutMap, MeasureMode,
    Measured, ResolveContext, TrackAlignment, TrackSpec, UnitConverter,
};
use tracing::{debug, trace};

use crate::distribute;
use crate::measure_cache::{CacheStats, MeasureCache};
use crate::{ComponentHost, Dimension, MeasureKind, Rect};

/// A component and the cells it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement<C> {
    pub component: C,
    pub constraint: CellConstraint,
}

/// Track geometry computed by one layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutInfo {
    /// Left edge of each column.
    pub column_origins: Vec<i32>,
    /// Top edge of each row.
    pub row_origins: Vec<i32>,
    pub column_widths: Vec<i32>,
    pub row_heights: Vec<i32>,
    /// Sum of the column widths.
    pub width: i32,
    /// Sum of the row heights.
    pub height: i32,
}

impl LayoutInfo {
    pub fn origins(&self, axis: Axis) -> &[i32] {
        match axis {
            Axis::Horizontal => &self.column_origins,
            Axis::Vertical => &self.row_origins,
        }
    }

    pub fn sizes(&self, axis: Axis) -> &[i32] {
        match axis {
            Axis::Horizontal => &self.column_widths,
            Axis::Vertical => &self.row_heights,
        }
    }

    /// Union of the cells `constraint` spans, before insets.
    ///
    /// Returns `None` when the span is outside the measured grid.
    pub fn cell_rect(&self, constraint: &CellConstraint) -> Option<Rect> {
        let (x, width) = self.span_extent(Axis::Horizontal, constraint)?;
        let (y, height) = self.span_extent(Axis::Vertical, constraint)?;
        Some(Rect::new(x, y, width, height))
    }

    fn span_extent(&self, axis: Axis, constraint: &CellConstraint) -> Option<(i32, i32)> {
        let first = constraint.index(axis).checked_sub(1)?;
        let last = first.checked_add(constraint.span(axis))?;
        let origin = *self.origins(axis).get(first)?;
        let extent = distribute::total(self.sizes(axis).get(first..last)?);
        Some((origin, extent))
    }
}

/// A form grid: column and row specs, groups and component placements.
///
/// `C` is the host's component handle. Track and group indices are 1-based.
#[derive(Debug, Clone)]
pub struct Grid<C> {
    columns: Vec<TrackSpec>,
    rows: Vec<TrackSpec>,
    column_groups: Vec<Vec<usize>>,
    row_groups: Vec<Vec<usize>>,
    placements: Vec<Placement<C>>,
    honors_visibility: bool,
    font: FontKey,
    converter: Arc<UnitConverter>,
    cache: MeasureCache<C>,
}

impl<C: Clone + Eq + Hash> Grid<C> {
    /// Create a grid from column and row specs.
    ///
    /// Both lists must be non-empty and hold specs of the matching axis.
    pub fn new(columns: Vec<TrackSpec>, rows: Vec<TrackSpec>) -> Result<Self, ConfigurationError> {
        check_tracks(Axis::Horizontal, &columns)?;
        check_tracks(Axis::Vertical, &rows)?;

        debug!(columns = columns.len(), rows = rows.len(), "Created grid");
        Ok(Self {
            columns,
            rows,
            column_groups: Vec::new(),
            row_groups: Vec::new(),
            placements: Vec::new(),
            honors_visibility: true,
            font: FontKey::default(),
            converter: UnitConverter::shared(),
            cache: MeasureCache::new(),
        })
    }

    /// Create a grid from encoded column and row lists.
    pub fn from_specs(columns: &str, rows: &str) -> Result<Self, LayoutError> {
        Self::from_specs_with_map(columns, rows, &LayoutMap::new())
    }

    /// Create a grid from encoded lists, expanding `$name` variables from `map`.
    pub fn from_specs_with_map(
        columns: &str,
        rows: &str,
        map: &LayoutMap,
    ) -> Result<Self, LayoutError> {
        let columns = TrackSpec::decode_list_with_map(Axis::Horizontal, columns, map)?;
        let rows = TrackSpec::decode_list_with_map(Axis::Vertical, rows, map)?;
        Ok(Self::new(columns, rows)?)
    }

    /// Use `converter` instead of the shared one.
    pub fn with_converter(mut self, converter: Arc<UnitConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Reference font for dialog units.
    pub fn with_font(mut self, font: FontKey) -> Self {
        self.font = font;
        self
    }

    pub fn converter(&self) -> &Arc<UnitConverter> {
        &self.converter
    }

    pub fn font(&self) -> &FontKey {
        &self.font
    }

    // ==================== Tracks ====================

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[TrackSpec] {
        &self.columns
    }

    pub fn rows(&self) -> &[TrackSpec] {
        &self.rows
    }

    /// Column `index`, 1-based.
    pub fn column_spec(&self, index: usize) -> Option<&TrackSpec> {
        index.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    /// Row `index`, 1-based.
    pub fn row_spec(&self, index: usize) -> Option<&TrackSpec> {
        index.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    pub fn tracks(&self, axis: Axis) -> &[TrackSpec] {
        match axis {
            Axis::Horizontal => &self.columns,
            Axis::Vertical => &self.rows,
        }
    }

    fn tracks_mut(&mut self, axis: Axis) -> &mut Vec<TrackSpec> {
        match axis {
            Axis::Horizontal => &mut self.columns,
            Axis::Vertical => &mut self.rows,
        }
    }

    pub fn append_column(&mut self, spec: TrackSpec) -> Result<(), ConfigurationError> {
        self.append_track(Axis::Horizontal, spec)
    }

    pub fn append_row(&mut self, spec: TrackSpec) -> Result<(), ConfigurationError> {
        self.append_track(Axis::Vertical, spec)
    }

    /// Insert a column before column `index`. Components at or after it move
    /// right; components spanning it get wider.
    pub fn insert_column(&mut self, index: usize, spec: TrackSpec) -> Result<(), ConfigurationError> {
        self.insert_track(Axis::Horizontal, index, spec)
    }

    /// Insert a row before row `index`.
    pub fn insert_row(&mut self, index: usize, spec: TrackSpec) -> Result<(), ConfigurationError> {
        self.insert_track(Axis::Vertical, index, spec)
    }

    /// Remove column `index`.
    ///
    /// Fails when a component starts in the column or the column is grouped.
    /// Components spanning it get narrower.
    pub fn remove_column(&mut self, index: usize) -> Result<TrackSpec, ConfigurationError> {
        self.remove_track(Axis::Horizontal, index)
    }

    /// Remove row `index`.
    pub fn remove_row(&mut self, index: usize) -> Result<TrackSpec, ConfigurationError> {
        self.remove_track(Axis::Vertical, index)
    }

    fn append_track(&mut self, axis: Axis, spec: TrackSpec) -> Result<(), ConfigurationError> {
        check_axis(axis, &spec)?;
        self.tracks_mut(axis).push(spec);
        Ok(())
    }

    fn insert_track(
        &mut self,
        axis: Axis,
        index: usize,
        spec: TrackSpec,
    ) -> Result<(), ConfigurationError> {
        check_axis(axis, &spec)?;
        self.check_track_index(axis, index)?;

        self.tracks_mut(axis).insert(index - 1, spec);
        for placement in &mut self.placements {
            let constraint = &mut placement.constraint;
            if constraint.index(axis) >= index {
                constraint.set_index(axis, constraint.index(axis) + 1);
            } else if constraint.end(axis) >= index {
                constraint.set_span(axis, constraint.span(axis) + 1);
            }
        }
        for group in self.groups_mut(axis) {
            for member in group.iter_mut().filter(|member| **member >= index) {
                *member += 1;
            }
        }

        trace!("Inserted {} {}", axis, index);
        Ok(())
    }

    fn remove_track(&mut self, axis: Axis, index: usize) -> Result<TrackSpec, ConfigurationError> {
        self.check_track_index(axis, index)?;
        if self.groups(axis).iter().flatten().any(|member| *member == index) {
            return Err(ConfigurationError::TrackGrouped { axis, index });
        }
        if self
            .placements
            .iter()
            .any(|placement| placement.constraint.index(axis) == index)
        {
            return Err(ConfigurationError::TrackOccupied { axis, index });
        }
        if self.tracks(axis).len() == 1 {
            return Err(ConfigurationError::EmptyAxis { axis });
        }

        let removed = self.tracks_mut(axis).remove(index - 1);
        for placement in &mut self.placements {
            let constraint = &mut placement.constraint;
            if constraint.index(axis) > index {
                constraint.set_index(axis, constraint.index(axis) - 1);
            } else if constraint.end(axis) >= index {
                constraint.set_span(axis, constraint.span(axis) - 1);
            }
        }
        for group in self.groups_mut(axis) {
            for member in group.iter_mut().filter(|member| **member > index) {
                *member -= 1;
            }
        }

        trace!("Removed {} {}", axis, index);
        Ok(removed)
    }

    fn check_track_index(&self, axis: Axis, index: usize) -> Result<(), ConfigurationError> {
        let count = self.tracks(axis).len();
        if index == 0 || index > count {
            return Err(ConfigurationError::TrackIndexOutOfRange { axis, index, count });
        }
        Ok(())
    }

    // ==================== Groups ====================

    pub fn column_groups(&self) -> &[Vec<usize>] {
        &self.column_groups
    }

    pub fn row_groups(&self) -> &[Vec<usize>] {
        &self.row_groups
    }

    /// Replace the column groups. Each group lists 1-based column indices that
    /// share one width; a column may be in at most one group.
    pub fn set_column_groups(&mut self, groups: Vec<Vec<usize>>) -> Result<(), ConfigurationError> {
        self.set_groups(Axis::Horizontal, groups)
    }

    /// Replace the row groups.
    pub fn set_row_groups(&mut self, groups: Vec<Vec<usize>>) -> Result<(), ConfigurationError> {
        self.set_groups(Axis::Vertical, groups)
    }

    pub fn groups(&self, axis: Axis) -> &[Vec<usize>] {
        match axis {
            Axis::Horizontal => &self.column_groups,
            Axis::Vertical => &self.row_groups,
        }
    }

    fn groups_mut(&mut self, axis: Axis) -> &mut Vec<Vec<usize>> {
        match axis {
            Axis::Horizontal => &mut self.column_groups,
            Axis::Vertical => &mut self.row_groups,
        }
    }

    fn set_groups(&mut self, axis: Axis, groups: Vec<Vec<usize>>) -> Result<(), ConfigurationError> {
        let count = self.tracks(axis).len();
        let mut seen = HashSet::new();
        for &index in groups.iter().flatten() {
            if index == 0 || index > count {
                return Err(ConfigurationError::GroupIndexOutOfRange { axis, index, count });
            }
            if !seen.insert(index) {
                return Err(ConfigurationError::DuplicateGroupIndex { axis, index });
            }
        }
        *self.groups_mut(axis) = groups;
        Ok(())
    }

    // ==================== Placements ====================

    /// Place `component`. Re-adding a component replaces its constraint.
    pub fn add(&mut self, component: C, constraint: CellConstraint) -> Result<(), ConfigurationError> {
        constraint.check_bounds(self.columns.len(), self.rows.len())?;

        match self
            .placements
            .iter_mut()
            .find(|placement| placement.component == component)
        {
            Some(existing) => existing.constraint = constraint,
            None => self.placements.push(Placement {
                component,
                constraint,
            }),
        }
        Ok(())
    }

    /// Place `component` with an encoded constraint such as `"3, 5, 2, 1, fc"`.
    pub fn add_encoded(&mut self, component: C, constraint: &str) -> Result<(), LayoutError> {
        let constraint = CellConstraint::decode(constraint)?;
        Ok(self.add(component, constraint)?)
    }

    /// Remove `component`, returning its constraint.
    pub fn remove(&mut self, component: &C) -> Option<CellConstraint> {
        let position = self
            .placements
            .iter()
            .position(|placement| placement.component == *component)?;
        self.cache.forget(component);
        Some(self.placements.remove(position).constraint)
    }

    pub fn constraints(&self, component: &C) -> Option<&CellConstraint> {
        self.placements
            .iter()
            .find(|placement| placement.component == *component)
            .map(|placement| &placement.constraint)
    }

    pub fn placements(&self) -> &[Placement<C>] {
        &self.placements
    }

    // ==================== Measurement ====================

    /// Whether invisible components are measured as zero. On by default.
    pub fn set_honors_visibility(&mut self, honors: bool) {
        self.honors_visibility = honors;
    }

    pub fn honors_visibility(&self) -> bool {
        self.honors_visibility
    }

    /// Drop cached component measurements.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn is_laid_out<H>(&self, host: &H, component: &C) -> bool
    where
        H: ComponentHost<C> + ?Sized,
    {
        !self.honors_visibility || host.is_visible(component)
    }

    fn measure_kind<H>(&self, host: &H, component: &C, axis: Axis, kind: MeasureKind) -> i32
    where
        H: ComponentHost<C> + ?Sized,
    {
        if let Some(value) = self.cache.lookup(component, axis, kind) {
            return value;
        }
        match host.measure(component, axis, kind) {
            Ok(value) => {
                let value = value.max(0);
                self.cache.store(component, axis, kind, value);
                value
            }
            Err(err) => {
                debug!(axis = %axis, kind = ?kind, "{}; using 0", err);
                0
            }
        }
    }

    fn measure<H>(&self, host: &H, component: &C, axis: Axis) -> Measured
    where
        H: ComponentHost<C> + ?Sized,
    {
        if !self.is_laid_out(host, component) {
            return Measured::default();
        }
        Measured::new(
            self.measure_kind(host, component, axis, MeasureKind::Minimum),
            self.measure_kind(host, component, axis, MeasureKind::Preferred),
        )
    }

    // ==================== Layout ====================

    /// Preferred size of the whole grid.
    pub fn compute_natural_size<H>(&self, host: &H) -> Dimension
    where
        H: ComponentHost<C> + ?Sized,
    {
        self.compute_size(host, MeasureMode::Preferred)
    }

    /// Minimum size of the whole grid.
    pub fn compute_minimum_size<H>(&self, host: &H) -> Dimension
    where
        H: ComponentHost<C> + ?Sized,
    {
        self.compute_size(host, MeasureMode::Minimum)
    }

    fn compute_size<H>(&self, host: &H, mode: MeasureMode) -> Dimension
    where
        H: ComponentHost<C> + ?Sized,
    {
        let width = distribute::total(&self.track_sizes(host, Axis::Horizontal, mode));
        let height = distribute::total(&self.track_sizes(host, Axis::Vertical, mode));
        debug!(?mode, width, height, "Computed grid size");
        Dimension::new(width, height)
    }

    /// Track sizes along `axis` before any container space is applied.
    pub fn track_sizes<H>(&self, host: &H, axis: Axis, mode: MeasureMode) -> Vec<i32>
    where
        H: ComponentHost<C> + ?Sized,
    {
        let tracks = self.tracks(axis);
        let measured: Vec<Measured> = self
            .placements
            .iter()
            .map(|placement| self.measure(host, &placement.component, axis))
            .collect();

        // Step 1: Resolve each track from the components confined to it
        let mut sizes: Vec<i32> = tracks
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let confined: Vec<Measured> = self
                    .placements
                    .iter()
                    .zip(&measured)
                    .filter(|(placement, _)| {
                        placement.constraint.span(axis) == 1
                            && placement.constraint.index(axis) == i + 1
                    })
                    .map(|(_, measured)| *measured)
                    .collect();
                let ctx = ResolveContext {
                    axis,
                    mode,
                    converter: &self.converter,
                    font: &self.font,
                    measures: &confined,
                };
                let size = spec.size().resolve(&ctx);
                trace!("{} {} ({}): {}px", axis, i + 1, spec, size);
                size
            })
            .collect();

        // Step 2: Widen tracks under spanning components that do not fit
        for (placement, measured) in self.placements.iter().zip(&measured) {
            let constraint = &placement.constraint;
            if constraint.span(axis) < 2 {
                continue;
            }
            let first = constraint.index(axis) - 1;
            let range = first..first + constraint.span(axis);
            let available = distribute::total(&sizes[range.clone()]);
            let needed = measured.select(mode);
            if needed <= available {
                continue;
            }

            let weights: Vec<f64> = tracks[range.clone()]
                .iter()
                .map(TrackSpec::resize_weight)
                .collect();
            let extra = distribute::spread(needed - available, &weights);
            for (size, extra) in sizes[range].iter_mut().zip(extra) {
                *size = size.saturating_add(extra);
            }
            trace!(
                "Spanning component at {} {} needs {}px, had {}px",
                axis,
                constraint.index(axis),
                needed,
                available
            );
        }

        // Step 3: Equalize groups
        for group in self.groups(axis) {
            let max = group
                .iter()
                .filter_map(|index| sizes.get(index - 1))
                .copied()
                .max()
                .unwrap_or(0);
            for index in group {
                if let Some(size) = sizes.get_mut(index - 1) {
                    *size = max;
                }
            }
        }

        sizes
    }

    /// Track geometry for a container whose content area is `content`.
    pub fn layout_info<H>(&self, host: &H, content: Rect) -> LayoutInfo
    where
        H: ComponentHost<C> + ?Sized,
    {
        debug!(
            "Grid layout: {} columns, {} rows, {} components in {}x{}",
            self.columns.len(),
            self.rows.len(),
            self.placements.len(),
            content.width,
            content.height
        );

        let (column_origins, column_widths) = self.layout_axis(host, Axis::Horizontal, content);
        let (row_origins, row_heights) = self.layout_axis(host, Axis::Vertical, content);
        let info = LayoutInfo {
            width: distribute::total(&column_widths),
            height: distribute::total(&row_heights),
            column_origins,
            row_origins,
            column_widths,
            row_heights,
        };

        debug!("Grid layout complete: {}x{}", info.width, info.height);
        info
    }

    fn layout_axis<H>(&self, host: &H, axis: Axis, content: Rect) -> (Vec<i32>, Vec<i32>)
    where
        H: ComponentHost<C> + ?Sized,
    {
        let tracks = self.tracks(axis);
        let mut sizes = self.track_sizes(host, axis, MeasureMode::Preferred);
        let natural = distribute::total(&sizes);
        let weights: Vec<f64> = tracks.iter().map(TrackSpec::resize_weight).collect();

        // Step 4: Grow or shrink weighted tracks to the container
        let delta = content.extent(axis).saturating_sub(natural);
        if delta > 0 {
            distribute::grow(&mut sizes, &weights, delta);
        } else if delta < 0 {
            let deficit = delta.saturating_neg();
            let removed = distribute::shrink(&mut sizes, &weights, deficit);
            trace!("{} shrink: deficit {}px, removed {}px", axis, deficit, removed);
        }

        // Step 5: Accumulate origins
        let mut position = content.start(axis);
        let origins = sizes
            .iter()
            .map(|size| {
                let origin = position;
                position = position.saturating_add(*size);
                origin
            })
            .collect();
        (origins, sizes)
    }

    /// Lay out every placed component inside `content` and hand its bounds to
    /// the host.
    ///
    /// Invisible components are skipped when the grid honors visibility.
    pub fn arrange<H>(&self, host: &mut H, content: Rect)
    where
        H: ComponentHost<C> + ?Sized,
    {
        let info = self.layout_info(&*host, content);

        let bounds: Vec<(C, Rect)> = self
            .placements
            .iter()
            .filter(|placement| self.is_laid_out(&*host, &placement.component))
            .filter_map(|placement| {
                let bounds = self.component_bounds(&*host, &info, placement)?;
                trace!("Component at {}: {:?}", placement.constraint, bounds);
                Some((placement.component.clone(), bounds))
            })
            .collect();

        for (component, rect) in &bounds {
            host.set_bounds(component, *rect);
        }
    }

    fn component_bounds<H>(&self, host: &H, info: &LayoutInfo, placement: &Placement<C>) -> Option<Rect>
    where
        H: ComponentHost<C> + ?Sized,
    {
        let cell = info.cell_rect(&placement.constraint)?;
        let (x, width) = self.align(host, placement, cell, Axis::Horizontal)?;
        let (y, height) = self.align(host, placement, cell, Axis::Vertical)?;
        Some(Rect::new(x, y, width, height))
    }

    fn align<H>(
        &self,
        host: &H,
        placement: &Placement<C>,
        cell: Rect,
        axis: Axis,
    ) -> Option<(i32, i32)>
    where
        H: ComponentHost<C> + ?Sized,
    {
        let constraint = &placement.constraint;
        let track = self.tracks(axis).get(constraint.index(axis) - 1)?;
        let alignment = constraint
            .alignment(axis)
            .resolve(track.default_alignment());

        let (lead, trail) = constraint.insets.along(axis);
        let start = cell.start(axis).saturating_add(lead);
        let interior = cell
            .extent(axis)
            .saturating_sub(lead)
            .saturating_sub(trail)
            .max(0);
        if alignment == TrackAlignment::Fill {
            return Some((start, interior));
        }

        let size = self
            .measure_kind(host, &placement.component, axis, MeasureKind::Preferred)
            .min(interior);
        let offset = match alignment {
            TrackAlignment::Leading | TrackAlignment::Fill => 0,
            TrackAlignment::Center => (interior - size) / 2,
            TrackAlignment::Trailing => interior - size,
        };
        Some((start.saturating_add(offset), size))
    }
}

fn check_axis(axis: Axis, spec: &TrackSpec) -> Result<(), ConfigurationError> {
    if spec.axis() != axis {
        return Err(ConfigurationError::AxisMismatch {
            expected: axis,
            found: spec.axis(),
        });
    }
    Ok(())
}

fn check_tracks(axis: Axis, specs: &[TrackSpec]) -> Result<(), ConfigurationError> {
    if specs.is_empty() {
        return Err(ConfigurationError::EmptyAxis { axis });
    }
    specs.iter().try_for_each(|spec| check_axis(axis, spec))
}
