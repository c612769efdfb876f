//! Gridboard Core Library
//!
//! Layout engine for dashboard boards: widgets are placed, moved and resized
//! on a coarse grid and never overlap. Geometry functions are pure and take
//! the full widget list as an argument; [`WidgetStore`] owns the layout and
//! [`DragCoordinator`] adapts pointer gestures to it.

pub mod collision;
pub mod drag;
pub mod error;
pub mod grid;
pub mod placement;
pub mod resize;
pub mod storage;
pub mod store;
pub mod widget;

pub use collision::{first_collision, has_collision, overlaps};
pub use drag::{DragCoordinator, DragState, DropOutcome, GestureKind, GesturePhase};
pub use error::{GeometryViolation, LayoutError, LayoutResult};
pub use grid::Grid;
pub use placement::find_free_slot;
pub use resize::{HANDLE_HIT_TOLERANCE, ResizeHandle, hit_test_handles, solve_resize};
pub use storage::{FileStorage, LayoutPersistence, MemoryStorage, StorageError, StorageResult};
pub use store::WidgetStore;
pub use widget::{CellRect, MIN_CELLS, Widget, WidgetKind, WidgetPatch};
