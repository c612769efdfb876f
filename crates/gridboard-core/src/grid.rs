//! Grid geometry and pixel/cell conversion.

use crate::widget::CellRect;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default number of columns on a board.
pub const DEFAULT_COLUMNS: u32 = 12;
/// Default cell size in pixels.
pub const DEFAULT_CELL_SIZE: f64 = 80.0;
/// Default gap between cells in pixels.
pub const DEFAULT_GAP: f64 = 8.0;

/// Board geometry shared by every layout function.
///
/// Columns are fixed; rows are unbounded unless `max_rows` is set, in which
/// case the board is a closed rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Number of columns (always at least 1).
    pub columns: u32,
    /// Size of one cell in pixels.
    pub cell_size: f64,
    /// Gap between neighbouring cells in pixels.
    pub gap: f64,
    /// Optional number of rows. `None` lets the board grow downward.
    #[serde(default)]
    pub max_rows: Option<u32>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            cell_size: DEFAULT_CELL_SIZE,
            gap: DEFAULT_GAP,
            max_rows: None,
        }
    }
}

impl Grid {
    /// Create a grid with unbounded rows.
    pub fn new(columns: u32, cell_size: f64, gap: f64) -> Self {
        if columns == 0 {
            log::warn!("Grid created with zero columns, using one column");
        }
        Self {
            columns: columns.max(1),
            cell_size,
            gap,
            max_rows: None,
        }
    }

    /// Bound the board to a fixed number of rows.
    pub fn with_max_rows(mut self, rows: u32) -> Self {
        self.max_rows = Some(rows);
        self
    }

    /// Column count as a signed cell coordinate.
    pub fn columns(&self) -> i32 {
        i32::try_from(self.columns.max(1)).unwrap_or(i32::MAX)
    }

    /// Row bound as a signed cell coordinate, if any.
    pub fn rows(&self) -> Option<i32> {
        self.max_rows.map(|rows| i32::try_from(rows).unwrap_or(i32::MAX))
    }

    /// Distance in pixels from one cell origin to the next.
    pub fn pitch(&self) -> f64 {
        let pitch = self.cell_size + self.gap;
        if pitch > 0.0 { pitch } else { 1.0 }
    }

    /// Index of the cell containing a pixel offset along one axis.
    pub fn to_cell(&self, px: f64) -> i32 {
        (px / self.pitch()).floor() as i32
    }

    /// Pixel offset of a cell origin along one axis.
    pub fn to_pixel(&self, cell: i32) -> f64 {
        cell as f64 * self.pitch()
    }

    /// Index of the cell origin nearest to a pixel offset.
    pub fn nearest_cell(&self, px: f64) -> i32 {
        (px / self.pitch()).round() as i32
    }

    /// Cell containing a pixel point.
    pub fn point_to_cell(&self, point: Point) -> (i32, i32) {
        (self.to_cell(point.x), self.to_cell(point.y))
    }

    /// Pixel position of a cell origin.
    pub fn cell_origin(&self, col: i32, row: i32) -> Point {
        Point::new(self.to_pixel(col), self.to_pixel(row))
    }

    /// Snap a pixel point to the nearest cell origin, returned as a cell.
    pub fn snap_point(&self, point: Point) -> (i32, i32) {
        (self.nearest_cell(point.x), self.nearest_cell(point.y))
    }

    /// Convert a pixel delta to a signed cell delta (rounded per axis).
    pub fn delta_to_cells(&self, delta: Vec2) -> (i32, i32) {
        let pitch = self.pitch();
        ((delta.x / pitch).round() as i32, (delta.y / pitch).round() as i32)
    }

    /// Pixel bounds of a cell rectangle. Interior gaps are covered, the
    /// trailing gap is not.
    pub fn rect_to_pixels(&self, rect: CellRect) -> Rect {
        let origin = self.cell_origin(rect.x, rect.y);
        let width = rect.w as f64 * self.pitch() - self.gap;
        let height = rect.h as f64 * self.pitch() - self.gap;
        Rect::new(origin.x, origin.y, origin.x + width.max(0.0), origin.y + height.max(0.0))
    }

    /// Check whether a rectangle lies entirely inside the board.
    pub fn contains(&self, rect: CellRect) -> bool {
        if rect.x < 0 || rect.y < 0 {
            return false;
        }
        let (Some(right), Some(bottom)) = (rect.checked_right(), rect.checked_bottom()) else {
            return false;
        };
        right <= self.columns() && self.rows().is_none_or(|rows| bottom <= rows)
    }

    /// Check whether a pixel point lies over the board.
    pub fn contains_point(&self, point: Point) -> bool {
        let (col, row) = self.point_to_cell(point);
        if point.x < 0.0 || point.y < 0.0 || col >= self.columns() {
            return false;
        }
        match self.rows() {
            Some(rows) => row < rows,
            None => true,
        }
    }
}
