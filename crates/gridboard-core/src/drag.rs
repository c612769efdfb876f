//! Pointer gestures: moving, swapping and resizing widgets.
//!
//! The coordinator turns host pointer events (in board pixels) into calls to
//! the placement search, the resize solver and the store. Nothing is written
//! to the store until the gesture is dropped, so cancelling needs no undo.

use crate::collision::{has_collision, overlaps};
use crate::error::{LayoutError, LayoutResult};
use crate::grid::Grid;
use crate::placement::find_free_slot;
use crate::resize::{ResizeHandle, solve_resize};
use crate::store::WidgetStore;
use crate::widget::{CellRect, Widget, WidgetPatch};
use kurbo::{Point, Vec2};

/// Lifecycle of the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    /// No gesture has started yet.
    #[default]
    Idle,
    /// A widget is being dragged.
    Dragging,
    /// The last gesture ended with a drop.
    Dropped,
    /// The last gesture was cancelled.
    Cancelled,
}

/// What the active gesture does to its widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Drag the whole widget.
    Move,
    /// Drag one of the widget's resize handles.
    Resize(ResizeHandle),
}

/// State of an active gesture.
#[derive(Debug, Clone)]
pub struct DragState {
    /// The widget being manipulated.
    pub widget_id: String,
    /// Move or resize.
    pub kind: GestureKind,
    /// Pointer position where the gesture started.
    pub start_point: Point,
    /// Latest pointer position.
    pub current_point: Point,
    /// The widget's rectangle before the gesture.
    pub original: CellRect,
}

impl DragState {
    /// Get the drag delta in pixels.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }
}

/// Result of ending a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The widget moved to free space.
    Moved { id: String, from: CellRect, to: CellRect },
    /// The dragged widget and the drop target traded origins.
    Swapped { dragged: String, target: String },
    /// A swap did not fit; both widgets were placed near each other's origin.
    Relocated {
        dragged: String,
        dragged_to: CellRect,
        target: String,
        target_to: CellRect,
    },
    /// The widget was resized.
    Resized { id: String, from: CellRect, to: CellRect },
    /// The gesture ended without any change to the layout.
    Unchanged { id: String },
    /// The gesture was abandoned; the widget keeps `restored`.
    Cancelled { id: String, restored: CellRect },
}

/// Runs one pointer gesture at a time against a [`WidgetStore`].
#[derive(Debug, Clone, Default)]
pub struct DragCoordinator {
    phase: GesturePhase,
    state: Option<DragState>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// The active gesture, if any.
    pub fn state(&self) -> Option<&DragState> {
        self.state.as_ref()
    }

    /// Start dragging a widget.
    pub fn begin_move(&mut self, store: &WidgetStore, id: &str, pointer: Point) -> LayoutResult<()> {
        self.begin(store, id, GestureKind::Move, pointer)
    }

    /// Start dragging one of a widget's resize handles.
    pub fn begin_resize(
        &mut self,
        store: &WidgetStore,
        id: &str,
        handle: ResizeHandle,
        pointer: Point,
    ) -> LayoutResult<()> {
        self.begin(store, id, GestureKind::Resize(handle), pointer)
    }

    fn begin(&mut self, store: &WidgetStore, id: &str, kind: GestureKind, pointer: Point) -> LayoutResult<()> {
        if self.phase == GesturePhase::Dragging {
            return Err(LayoutError::GestureInProgress);
        }
        let widget = store.get(id).ok_or_else(|| LayoutError::NotFound(id.to_string()))?;
        log::debug!("Begin {:?} on {}", kind, id);
        self.state = Some(DragState {
            widget_id: widget.id.clone(),
            kind,
            start_point: pointer,
            current_point: pointer,
            original: widget.rect(),
        });
        self.phase = GesturePhase::Dragging;
        Ok(())
    }

    /// Track the pointer.
    pub fn update(&mut self, pointer: Point) -> LayoutResult<()> {
        let state = self.state.as_mut().ok_or(LayoutError::NoActiveGesture)?;
        state.current_point = pointer;
        Ok(())
    }

    /// Rectangle the widget would get if dropped over empty space now.
    pub fn preview(&self, store: &WidgetStore) -> Option<CellRect> {
        let state = self.state.as_ref()?;
        let widget = store.get(&state.widget_id)?;
        Some(match state.kind {
            GestureKind::Move => {
                let (x, y) = move_target(state, widget, store);
                widget.rect().with_origin(x, y)
            }
            GestureKind::Resize(handle) => resize_target(state, handle, widget, store),
        })
    }

    /// Abandon the gesture. The store is not touched.
    pub fn cancel(&mut self) -> LayoutResult<DropOutcome> {
        let state = self.state.take().ok_or(LayoutError::NoActiveGesture)?;
        self.phase = GesturePhase::Cancelled;
        log::debug!("Cancelled gesture on {}", state.widget_id);
        Ok(DropOutcome::Cancelled {
            id: state.widget_id,
            restored: state.original,
        })
    }

    /// End the gesture at `pointer` and commit the result to the store.
    ///
    /// A drop outside the board cancels the gesture.
    pub fn drop_at(&mut self, store: &mut WidgetStore, pointer: Point) -> LayoutResult<DropOutcome> {
        if !store.grid().contains_point(pointer) {
            self.update(pointer)?;
            return self.cancel();
        }

        let mut state = self.state.take().ok_or(LayoutError::NoActiveGesture)?;
        state.current_point = pointer;

        let Some(widget) = store.get(&state.widget_id).cloned() else {
            self.phase = GesturePhase::Cancelled;
            return Err(LayoutError::NotFound(state.widget_id));
        };
        self.phase = GesturePhase::Dropped;

        let outcome = match state.kind {
            GestureKind::Resize(handle) => {
                let to = resize_target(&state, handle, &widget, store);
                commit_rect(store, &widget, to)?
            }
            GestureKind::Move => {
                let (col, row) = store.grid().point_to_cell(pointer);
                let target = store
                    .iter()
                    .find(|w| w.id != widget.id && w.rect().contains_cell(col, row))
                    .cloned();
                match target {
                    Some(target) => swap(store, &widget, &target)?,
                    None => {
                        let (x, y) = move_target(&state, &widget, store);
                        commit_rect(store, &widget, widget.rect().with_origin(x, y))?
                    }
                }
            }
        };
        Ok(outcome)
    }
}

/// Snap the dragged widget's origin to the nearest cell and find free space
/// around it.
fn move_target(state: &DragState, widget: &Widget, store: &WidgetStore) -> (i32, i32) {
    let grid = store.grid();
    let origin = grid.cell_origin(state.original.x, state.original.y) + state.delta();
    let (x, y) = grid.snap_point(origin);
    find_free_slot(widget, x, y, store.list(), grid)
}

fn resize_target(state: &DragState, handle: ResizeHandle, widget: &Widget, store: &WidgetStore) -> CellRect {
    let delta = store.grid().delta_to_cells(state.delta());
    solve_resize(widget, handle, delta, store.list(), store.grid())
}

fn commit_rect(store: &mut WidgetStore, widget: &Widget, to: CellRect) -> LayoutResult<DropOutcome> {
    let from = widget.rect();
    if to == from {
        return Ok(DropOutcome::Unchanged { id: widget.id.clone() });
    }
    store.update(&widget.id, WidgetPatch::rect(to))?;
    if to.w == from.w && to.h == from.h {
        Ok(DropOutcome::Moved { id: widget.id.clone(), from, to })
    } else {
        Ok(DropOutcome::Resized { id: widget.id.clone(), from, to })
    }
}

fn swap_fits(a: CellRect, b: CellRect, others: &[Widget], grid: &Grid) -> bool {
    grid.contains(a)
        && grid.contains(b)
        && !overlaps(a, b)
        && !has_collision(a, others, None)
        && !has_collision(b, others, None)
}

/// Trade origins of two widgets, or place each near the other's origin when
/// the straight swap does not fit.
///
/// Each widget keeps its own size; only the origins move. With equal sizes
/// this exchanges the two rectangles exactly.
fn swap(store: &mut WidgetStore, dragged: &Widget, target: &Widget) -> LayoutResult<DropOutcome> {
    let grid = *store.grid();
    let others: Vec<Widget> = store
        .iter()
        .filter(|w| w.id != dragged.id && w.id != target.id)
        .cloned()
        .collect();

    let dragged_to = dragged.rect().with_origin(target.x, target.y);
    let target_to = target.rect().with_origin(dragged.x, dragged.y);
    if swap_fits(dragged_to, target_to, &others, &grid) {
        store.apply_batch(&[
            (dragged.id.as_str(), WidgetPatch::move_to(dragged_to.x, dragged_to.y)),
            (target.id.as_str(), WidgetPatch::move_to(target_to.x, target_to.y)),
        ])?;
        log::debug!("Swapped {} and {}", dragged.id, target.id);
        return Ok(DropOutcome::Swapped {
            dragged: dragged.id.clone(),
            target: target.id.clone(),
        });
    }

    log::debug!("Swap of {} and {} does not fit, relocating", dragged.id, target.id);
    let (dx, dy) = find_free_slot(dragged, target.x, target.y, &others, &grid);
    let dragged_to = dragged.rect().with_origin(dx, dy);

    let mut around = others;
    let mut placed = dragged.clone();
    placed.set_rect(dragged_to);
    around.push(placed);
    let (tx, ty) = find_free_slot(target, dragged.x, dragged.y, &around, &grid);
    let target_to = target.rect().with_origin(tx, ty);

    if dragged_to == dragged.rect() && target_to == target.rect() {
        return Ok(DropOutcome::Unchanged { id: dragged.id.clone() });
    }

    match store.apply_batch(&[
        (dragged.id.as_str(), WidgetPatch::move_to(dx, dy)),
        (target.id.as_str(), WidgetPatch::move_to(tx, ty)),
    ]) {
        Ok(()) => Ok(DropOutcome::Relocated {
            dragged: dragged.id.clone(),
            dragged_to,
            target: target.id.clone(),
            target_to,
        }),
        Err(LayoutError::InvalidGeometry(violation)) => {
            log::warn!("Rejected swap of {} and {}: {}", dragged.id, target.id, violation);
            Ok(DropOutcome::Unchanged { id: dragged.id.clone() })
        }
        Err(e) => Err(e),
    }
}
