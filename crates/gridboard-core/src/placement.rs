//! Nearest free position search.
//!
//! The search walks square rings of growing Chebyshev radius around the
//! preferred cell. Rings are scanned row-major (top row left to right, then
//! the two side cells of every middle row, then the bottom row), so the
//! result depends only on the inputs.

use crate::collision::has_collision;
use crate::grid::Grid;
use crate::widget::{CellRect, Widget};

/// Offsets `(dx, dy)` with `max(|dx|, |dy|) == radius`, in row-major order.
pub fn ring_offsets(radius: i32) -> impl Iterator<Item = (i32, i32)> {
    let radius = radius.max(0);
    (-radius..=radius).flat_map(move |dy| {
        let step = if dy.abs() == radius { 1 } else { 2 * radius as usize };
        (-radius..=radius).step_by(step).map(move |dx| (dx, dy))
    })
}

/// Largest ring radius the search will visit.
///
/// This is `max(rows, columns)`, where rows is the grid's row bound or, on an
/// unbounded board, the lowest edge of any widget involved.
pub fn search_ceiling(rect: CellRect, others: &[Widget], grid: &Grid) -> i32 {
    let rows = grid.rows().unwrap_or_else(|| {
        others
            .iter()
            .map(|w| w.rect().bottom())
            .chain(std::iter::once(rect.bottom()))
            .max()
            .unwrap_or(1)
    });
    rows.max(1).max(grid.columns())
}

/// Check whether a rectangle is inside the grid and clear of other widgets.
pub fn is_free(rect: CellRect, others: &[Widget], grid: &Grid, exclude_id: Option<&str>) -> bool {
    grid.contains(rect) && !has_collision(rect, others, exclude_id)
}

/// Find the free origin nearest to `(preferred_x, preferred_y)` for `widget`.
///
/// `others` may contain `widget` itself; it is ignored by id. If no position
/// is found within the ring ceiling, the widget's current origin is returned
/// unchanged, so callers detect exhaustion by comparing input and output.
pub fn find_free_slot(
    widget: &Widget,
    preferred_x: i32,
    preferred_y: i32,
    others: &[Widget],
    grid: &Grid,
) -> (i32, i32) {
    let exclude = Some(widget.id.as_str());
    let preferred = widget.rect().with_origin(preferred_x, preferred_y);
    if is_free(preferred, others, grid, exclude) {
        return (preferred_x, preferred_y);
    }

    let ceiling = search_ceiling(preferred, others, grid);
    for radius in 1..=ceiling {
        for (dx, dy) in ring_offsets(radius) {
            let candidate =
                preferred.with_origin(preferred_x.saturating_add(dx), preferred_y.saturating_add(dy));
            if is_free(candidate, others, grid, exclude) {
                log::debug!(
                    "Placed {} at ({}, {}) after ring {}",
                    widget.id,
                    candidate.x,
                    candidate.y,
                    radius
                );
                return candidate.origin();
            }
        }
    }

    log::debug!(
        "No free slot for {} within radius {}, keeping ({}, {})",
        widget.id,
        ceiling,
        widget.x,
        widget.y
    );
    (widget.x, widget.y)
}
