//! FormHost - In-memory component host.

use std::cell::Cell;
use std::collections::HashMap;

use formkit_layout::{Axis, ComponentHost, MeasureKind, MeasurementUnavailable, Rect};

#[derive(Debug, Clone, Copy)]
struct Widget {
    min: (i32, i32),
    pref: (i32, i32),
    visible: bool,
}

/// Component host keyed by widget name.
///
/// Widgets report fixed sizes. Bounds handed out by `arrange` are recorded,
/// and every measurement request is counted.
#[derive(Debug, Default)]
pub struct FormHost {
    widgets: HashMap<&'static str, Widget>,
    bounds: HashMap<&'static str, Rect>,
    measure_calls: Cell<usize>,
}

impl FormHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a widget whose minimum and preferred sizes are equal.
    pub fn widget(self, name: &'static str, width: i32, height: i32) -> Self {
        self.widget_with_min(name, (width, height), (width, height))
    }

    /// Add a widget with distinct minimum and preferred sizes.
    pub fn widget_with_min(
        mut self,
        name: &'static str,
        min: (i32, i32),
        pref: (i32, i32),
    ) -> Self {
        self.widgets.insert(
            name,
            Widget {
                min,
                pref,
                visible: true,
            },
        );
        self
    }

    pub fn set_visible(&mut self, name: &'static str, visible: bool) {
        if let Some(widget) = self.widgets.get_mut(name) {
            widget.visible = visible;
        }
    }

    /// Change a widget's preferred size.
    pub fn resize(&mut self, name: &'static str, width: i32, height: i32) {
        if let Some(widget) = self.widgets.get_mut(name) {
            widget.pref = (width, height);
        }
    }

    /// Bounds the last `arrange` gave `name`.
    pub fn bounds(&self, name: &'static str) -> Option<Rect> {
        self.bounds.get(name).copied()
    }

    pub fn measure_calls(&self) -> usize {
        self.measure_calls.get()
    }
}

impl ComponentHost<&'static str> for FormHost {
    fn measure(
        &self,
        component: &&'static str,
        axis: Axis,
        kind: MeasureKind,
    ) -> Result<i32, MeasurementUnavailable> {
        self.measure_calls.set(self.measure_calls.get() + 1);
        let widget = self
            .widgets
            .get(component)
            .ok_or_else(|| MeasurementUnavailable::new(format!("no widget named {component}")))?;
        let (width, height) = match kind {
            MeasureKind::Minimum => widget.min,
            MeasureKind::Preferred => widget.pref,
        };
        Ok(match axis {
            Axis::Horizontal => width,
            Axis::Vertical => height,
        })
    }

    fn is_visible(&self, component: &&'static str) -> bool {
        self.widgets.get(component).map_or(true, |widget| widget.visible)
    }

    fn set_bounds(&mut self, component: &&'static str, bounds: Rect) {
        self.bounds.insert(*component, bounds);
    }
}
