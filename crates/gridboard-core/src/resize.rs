//! Resize handles and the constrained resize solver.
//!
//! Each handle moves one or two edges of a widget by a signed cell delta. The
//! solver clamps the result to the grid and the minimum widget area, then
//! backs off from other widgets, so the rectangle it returns can always be
//! committed.

use crate::collision::has_collision;
use crate::grid::Grid;
use crate::widget::{CellRect, MIN_CELLS, Widget};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;

/// A resize handle on a widget's border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

/// Which end of an axis a handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    /// Left or top edge: the far edge stays fixed.
    Start,
    /// Right or bottom edge: the origin stays fixed.
    End,
}

impl ResizeHandle {
    /// All handles, corners first so they win hit tests over edges.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::NE,
        ResizeHandle::SW,
        ResizeHandle::SE,
        ResizeHandle::N,
        ResizeHandle::E,
        ResizeHandle::S,
        ResizeHandle::W,
    ];

    fn horizontal(self) -> Option<Side> {
        match self {
            ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW => Some(Side::Start),
            ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE => Some(Side::End),
            ResizeHandle::N | ResizeHandle::S => None,
        }
    }

    fn vertical(self) -> Option<Side> {
        match self {
            ResizeHandle::N | ResizeHandle::NE | ResizeHandle::NW => Some(Side::Start),
            ResizeHandle::S | ResizeHandle::SE | ResizeHandle::SW => Some(Side::End),
            ResizeHandle::E | ResizeHandle::W => None,
        }
    }

    /// Check if this is a corner handle.
    pub fn is_corner(self) -> bool {
        self.horizontal().is_some() && self.vertical().is_some()
    }

    /// Position of the handle on a widget's pixel bounds.
    pub fn anchor(self, bounds: Rect) -> Point {
        let center = bounds.center();
        let x = match self.horizontal() {
            Some(Side::Start) => bounds.x0,
            Some(Side::End) => bounds.x1,
            None => center.x,
        };
        let y = match self.vertical() {
            Some(Side::Start) => bounds.y0,
            Some(Side::End) => bounds.y1,
            None => center.y,
        };
        Point::new(x, y)
    }
}

/// Find which handle (if any) of a widget is hit at a pixel point.
pub fn hit_test_handles(grid: &Grid, rect: CellRect, point: Point, tolerance: f64) -> Option<ResizeHandle> {
    let bounds = grid.rect_to_pixels(rect);
    ResizeHandle::ALL.into_iter().find(|handle| {
        let anchor = handle.anchor(bounds);
        let dx = point.x - anchor.x;
        let dy = point.y - anchor.y;
        dx * dx + dy * dy <= tolerance * tolerance
    })
}

/// Smallest width that keeps a widget of height `h` at the minimum area.
pub fn min_width_for(h: i32) -> i32 {
    min_extent_for(h)
}

/// Smallest height that keeps a widget of width `w` at the minimum area.
pub fn min_height_for(w: i32) -> i32 {
    min_extent_for(w)
}

fn min_extent_for(other: i32) -> i32 {
    let other = other.max(1);
    (MIN_CELLS - 1) / other + 1
}

/// One axis of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: i32,
    len: i32,
}

impl Span {
    fn end(self) -> i32 {
        self.start.saturating_add(self.len)
    }

    /// Take one cell off the dragged edge.
    fn shrink(self, side: Side) -> Self {
        match side {
            Side::Start => Span { start: self.start + 1, len: self.len - 1 },
            Side::End => Span { start: self.start, len: self.len - 1 },
        }
    }

    /// Add `amount` cells on the dragged edge.
    fn grow(self, side: Side, amount: i32) -> Self {
        match side {
            Side::Start => Span {
                start: self.start.saturating_sub(amount),
                len: self.len.saturating_add(amount),
            },
            Side::End => Span { start: self.start, len: self.len.saturating_add(amount) },
        }
    }
}

/// Apply the single-edge rule to one axis.
///
/// The dragged edge moves by `delta`, the length is clamped to
/// `[min_len, room]`, then shrunk one cell at a time while `collides` holds.
/// Returns `None` if no length at or above the floor is collision-free.
fn resize_span(
    span: Span,
    side: Side,
    delta: i32,
    min_len: i32,
    limit: Option<i32>,
    collides: impl Fn(Span) -> bool,
) -> Option<Span> {
    let (requested, room) = match side {
        Side::Start => (span.len.saturating_sub(delta), span.end()),
        Side::End => (
            span.len.saturating_add(delta),
            limit.unwrap_or(i32::MAX).saturating_sub(span.start),
        ),
    };
    if room < min_len {
        return None;
    }
    let len = requested.max(min_len).min(room);
    let mut next = match side {
        Side::Start => Span { start: span.end() - len, len },
        Side::End => Span { start: span.start, len },
    };
    while collides(next) {
        if next.len <= min_len {
            return None;
        }
        next = next.shrink(side);
    }
    Some(next)
}

fn horizontal_span(rect: CellRect) -> Span {
    Span { start: rect.x, len: rect.w }
}

fn vertical_span(rect: CellRect) -> Span {
    Span { start: rect.y, len: rect.h }
}

fn compose(h: Span, v: Span) -> CellRect {
    CellRect::new(h.start, v.start, h.len, v.len)
}

/// Compute the rectangle a resize should commit.
///
/// `delta` is the pointer movement in cells `(columns, rows)`. Components
/// along an axis the handle does not drag are ignored. `others` may include
/// `widget` itself. The result is in bounds, at or above [`MIN_CELLS`] and
/// clear of every other widget; when no such rectangle follows from the
/// gesture, the widget's current rectangle is returned.
pub fn solve_resize(
    widget: &Widget,
    handle: ResizeHandle,
    delta: (i32, i32),
    others: &[Widget],
    grid: &Grid,
) -> CellRect {
    let original = widget.rect();
    let exclude = Some(widget.id.as_str());
    let collides = |rect: CellRect| has_collision(rect, others, exclude);

    let h_side = handle.horizontal();
    let v_side = handle.vertical();

    let mut h = horizontal_span(original);
    if let Some(side) = h_side {
        let v = vertical_span(original);
        match resize_span(h, side, delta.0, min_width_for(v.len), Some(grid.columns()), |s| {
            collides(compose(s, v))
        }) {
            Some(span) => h = span,
            None => return original,
        }
    }

    let mut v = vertical_span(original);
    if let Some(side) = v_side {
        let h0 = horizontal_span(original);
        match resize_span(v, side, delta.1, min_height_for(h0.len), grid.rows(), |s| {
            collides(compose(h0, s))
        }) {
            Some(span) => v = span,
            None => return original,
        }
    }

    let mut rect = compose(h, v);

    if let (Some(hs), Some(vs)) = (h_side, v_side) {
        if rect.area() < MIN_CELLS {
            match grow_limiting(rect, hs, vs, grid, &collides) {
                Some(grown) => rect = grown,
                None => {
                    log::debug!("Resize of {} blocked at minimum area", widget.id);
                    return original;
                }
            }
        }
        if collides(rect) {
            match walk_back(rect, original, hs, vs, &collides) {
                Some(resolved) => rect = resolved,
                None => return original,
            }
        }
    }

    if grid.contains(rect) && rect.area() >= MIN_CELLS && !collides(rect) {
        rect
    } else {
        log::debug!("Resize of {} rejected, keeping {:?}", widget.id, original);
        original
    }
}

/// Grow the smaller dimension (width on ties) along its dragged edge until the
/// area reaches [`MIN_CELLS`].
fn grow_limiting(
    rect: CellRect,
    h_side: Side,
    v_side: Side,
    grid: &Grid,
    collides: &impl Fn(CellRect) -> bool,
) -> Option<CellRect> {
    let h = horizontal_span(rect);
    let v = vertical_span(rect);
    let grown = if h.len <= v.len {
        compose(h.grow(h_side, min_width_for(v.len) - h.len), v)
    } else {
        compose(h, v.grow(v_side, min_height_for(h.len) - v.len))
    };
    (grid.contains(grown) && !collides(grown)).then_some(grown)
}

/// Pull grown edges back toward the original rectangle, one cell at a time,
/// until the corner region is clear.
fn walk_back(
    mut rect: CellRect,
    original: CellRect,
    h_side: Side,
    v_side: Side,
    collides: &impl Fn(CellRect) -> bool,
) -> Option<CellRect> {
    while collides(rect) {
        let grown_w = rect.w.saturating_sub(original.w);
        let grown_h = rect.h.saturating_sub(original.h);
        if grown_w <= 0 && grown_h <= 0 {
            return None;
        }
        let h = horizontal_span(rect);
        let v = vertical_span(rect);
        rect = if grown_w >= grown_h {
            compose(h.shrink(h_side), v)
        } else {
            compose(h, v.shrink(v_side))
        };
        if rect.area() < MIN_CELLS {
            return None;
        }
    }
    Some(rect)
}
