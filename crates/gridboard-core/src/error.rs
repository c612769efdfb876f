//! Error types for layout mutations and gestures.

use thiserror::Error;

/// Why a proposed widget rectangle was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryViolation {
    /// The rectangle leaves the grid (negative origin, past the last column or row).
    #[error("rectangle lies outside the grid")]
    OutOfBounds,
    /// Width or height is zero or negative.
    #[error("width and height must be at least one cell")]
    NonPositiveExtent,
    /// The rectangle covers fewer cells than the minimum widget area.
    #[error("area of {area} cells is below the minimum")]
    BelowMinArea { area: i32 },
    /// The rectangle overlaps another widget.
    #[error("overlaps widget {other}")]
    Overlaps { other: String },
}

/// Layout errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryViolation),
    #[error("Widget not found: {0}")]
    NotFound(String),
    #[error("Duplicate widget id: {0}")]
    DuplicateId(String),
    #[error("A gesture is already in progress")]
    GestureInProgress,
    #[error("No gesture in progress")]
    NoActiveGesture,
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
