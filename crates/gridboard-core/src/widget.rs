//! Widget definitions for the dashboard board.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Minimum widget area in cells, enforced on every add and resize.
pub const MIN_CELLS: i32 = 4;

/// Axis-aligned rectangle in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl CellRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge, saturating at `i32::MAX`.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Exclusive bottom edge, saturating at `i32::MAX`.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Exclusive right edge, or `None` if it does not fit in an `i32`.
    pub fn checked_right(&self) -> Option<i32> {
        self.x.checked_add(self.w)
    }

    /// Exclusive bottom edge, or `None` if it does not fit in an `i32`.
    pub fn checked_bottom(&self) -> Option<i32> {
        self.y.checked_add(self.h)
    }

    /// Area in cells, saturating at `i32::MAX`.
    pub fn area(&self) -> i32 {
        self.w.saturating_mul(self.h)
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Same size, moved to a new origin.
    pub fn with_origin(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }

    /// Check whether a cell lies inside the rectangle.
    pub fn contains_cell(&self, col: i32, row: i32) -> bool {
        col >= self.x && col < self.right() && row >= self.y && row < self.bottom()
    }
}

/// Kind of content a widget displays.
///
/// The engine never looks at the kind beyond its default size; rendering is
/// left to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    LineChart,
    BarChart,
    PieChart,
    #[default]
    Metric,
    Table,
    Text,
    /// A kind written by a newer presentation layer.
    #[serde(other)]
    Unknown,
}

impl WidgetKind {
    /// Default size in cells `(w, h)` for a freshly added widget.
    pub fn default_size(self) -> (i32, i32) {
        match self {
            WidgetKind::LineChart | WidgetKind::BarChart => (6, 4),
            WidgetKind::PieChart => (4, 4),
            WidgetKind::Metric => (2, 2),
            WidgetKind::Table => (6, 5),
            WidgetKind::Text | WidgetKind::Unknown => (4, 2),
        }
    }
}

/// A rectangular widget on the board.
///
/// Fields other than geometry and kind (title, chart configuration, ...) are
/// kept in `extra` and round-trip through persistence untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(default)]
    pub kind: WidgetKind,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Widget {
    /// Create a widget with a fresh random id.
    pub fn new(kind: WidgetKind, rect: CellRect) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), kind, rect)
    }

    /// Create a widget with its kind's default size at the given origin.
    pub fn sized_for(kind: WidgetKind, x: i32, y: i32) -> Self {
        let (w, h) = kind.default_size();
        Self::new(kind, CellRect::new(x, y, w, h))
    }

    /// Create a widget with an explicit id.
    pub fn with_id(id: impl Into<String>, kind: WidgetKind, rect: CellRect) -> Self {
        Self {
            id: id.into(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            kind,
            extra: Map::new(),
        }
    }

    /// Attach a presentation-layer field.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn rect(&self) -> CellRect {
        CellRect::new(self.x, self.y, self.w, self.h)
    }

    pub fn set_rect(&mut self, rect: CellRect) {
        self.x = rect.x;
        self.y = rect.y;
        self.w = rect.w;
        self.h = rect.h;
    }

    /// Return a copy of this widget with the patch applied.
    pub fn patched(&self, patch: &WidgetPatch) -> Self {
        let mut widget = self.clone();
        if let Some(x) = patch.x {
            widget.x = x;
        }
        if let Some(y) = patch.y {
            widget.y = y;
        }
        if let Some(w) = patch.w {
            widget.w = w;
        }
        if let Some(h) = patch.h {
            widget.h = h;
        }
        if let Some(kind) = patch.kind {
            widget.kind = kind;
        }
        widget
    }
}

/// Partial update for [`Widget`]. `None` fields are left as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetPatch {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub w: Option<i32>,
    pub h: Option<i32>,
    pub kind: Option<WidgetKind>,
}

impl WidgetPatch {
    /// Move without resizing.
    pub fn move_to(x: i32, y: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Replace the whole rectangle.
    pub fn rect(rect: CellRect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            w: Some(rect.w),
            h: Some(rect.h),
            kind: None,
        }
    }

    /// Change the kind only.
    pub fn kind(kind: WidgetKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
