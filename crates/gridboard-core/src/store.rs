//! Widget store: the single owner of a board's layout.

use crate::collision::first_collision;
use crate::error::{GeometryViolation, LayoutError, LayoutResult};
use crate::grid::Grid;
use crate::placement::find_free_slot;
use crate::storage::LayoutPersistence;
use crate::widget::{MIN_CELLS, Widget, WidgetPatch};
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Check a widget against the grid and every other widget in `widgets`.
///
/// The widget's own entry (matched by id) is ignored.
pub fn check_geometry(widget: &Widget, grid: &Grid, widgets: &[Widget]) -> Result<(), GeometryViolation> {
    let rect = widget.rect();
    if rect.w < 1 || rect.h < 1 {
        return Err(GeometryViolation::NonPositiveExtent);
    }
    if !grid.contains(rect) {
        return Err(GeometryViolation::OutOfBounds);
    }
    if rect.area() < MIN_CELLS {
        return Err(GeometryViolation::BelowMinArea { area: rect.area() });
    }
    if let Some(other) = first_collision(rect, widgets, Some(widget.id.as_str())) {
        return Err(GeometryViolation::Overlaps {
            other: other.id.clone(),
        });
    }
    Ok(())
}

/// Owns the canonical widget list.
///
/// Widgets are kept in creation order with an id index on the side. Every
/// mutation is validated before it is committed, so the list never holds an
/// out-of-bounds, undersized or overlapping widget. After each commit the
/// full list is handed to the persistence collaborator, if one is attached.
pub struct WidgetStore {
    grid: Grid,
    widgets: Vec<Widget>,
    index: HashMap<String, usize>,
    persistence: Option<Arc<dyn LayoutPersistence>>,
    undo_stack: Vec<Vec<Widget>>,
    redo_stack: Vec<Vec<Widget>>,
}

impl WidgetStore {
    /// Create an empty store without persistence.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            widgets: Vec::new(),
            index: HashMap::new(),
            persistence: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Create an empty store that saves through `persistence`.
    pub fn with_persistence(grid: Grid, persistence: Arc<dyn LayoutPersistence>) -> Self {
        let mut store = Self::new(grid);
        store.persistence = Some(persistence);
        store
    }

    /// Create a store seeded from `persistence.load()`.
    ///
    /// Loaded widgets that are malformed or out of bounds are dropped.
    /// Widgets that overlap an earlier one are moved to the nearest free
    /// slot, or dropped when there is none. Opening does not save.
    pub fn open(grid: Grid, persistence: Arc<dyn LayoutPersistence>) -> Self {
        let loaded = match persistence.load() {
            Ok(Some(widgets)) => widgets,
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to load layout, starting empty: {}", e);
                Vec::new()
            }
        };

        let mut store = Self::with_persistence(grid, persistence);
        let total = loaded.len();
        for widget in loaded {
            store.seed(widget);
        }
        log::info!("Loaded {} of {} widgets", store.len(), total);
        store
    }

    fn seed(&mut self, mut widget: Widget) {
        if self.index.contains_key(&widget.id) {
            log::warn!("Dropping widget with duplicate id {}", widget.id);
            return;
        }
        if let Err(GeometryViolation::Overlaps { other }) = check_geometry(&widget, &self.grid, &self.widgets) {
            let (x, y) = find_free_slot(&widget, widget.x, widget.y, &self.widgets, &self.grid);
            log::debug!("Widget {} overlaps {}, moving to ({}, {})", widget.id, other, x, y);
            widget.x = x;
            widget.y = y;
        }
        match check_geometry(&widget, &self.grid, &self.widgets) {
            Ok(()) => {
                self.index.insert(widget.id.clone(), self.widgets.len());
                self.widgets.push(widget);
            }
            Err(e) => log::warn!("Dropping widget {}: {}", widget.id, e),
        }
    }

    /// The grid this store validates against.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// All widgets in creation order.
    pub fn list(&self) -> &[Widget] {
        &self.widgets
    }

    /// Iterate over widgets in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter()
    }

    /// An owned copy of the current layout.
    pub fn snapshot(&self) -> Vec<Widget> {
        self.widgets.clone()
    }

    /// Get a widget by id.
    pub fn get(&self, id: &str) -> Option<&Widget> {
        self.index.get(id).map(|&i| &self.widgets[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Find the widget covering a cell.
    pub fn widget_at_cell(&self, col: i32, row: i32) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.rect().contains_cell(col, row))
    }

    /// Check a candidate widget against the current layout without committing.
    pub fn validate(&self, widget: &Widget) -> LayoutResult<()> {
        check_geometry(widget, &self.grid, &self.widgets)?;
        Ok(())
    }

    /// Add a widget at exactly the position it carries.
    pub fn add(&mut self, widget: Widget) -> LayoutResult<()> {
        if self.contains(&widget.id) {
            return Err(LayoutError::DuplicateId(widget.id));
        }
        self.validate(&widget)?;

        let mut next = self.widgets.clone();
        log::debug!("Adding widget {} at {:?}", widget.id, widget.rect());
        next.push(widget);
        self.commit(next);
        Ok(())
    }

    /// Add a widget at the free position nearest to the one it carries.
    ///
    /// Returns the origin it was placed at.
    pub fn place(&mut self, mut widget: Widget) -> LayoutResult<(i32, i32)> {
        let (x, y) = find_free_slot(&widget, widget.x, widget.y, &self.widgets, &self.grid);
        widget.x = x;
        widget.y = y;
        self.add(widget)?;
        Ok((x, y))
    }

    /// Apply a patch to one widget.
    pub fn update(&mut self, id: &str, patch: WidgetPatch) -> LayoutResult<()> {
        self.apply_batch(&[(id, patch)])
    }

    /// Apply several patches as one mutation.
    ///
    /// The end state is validated as a whole, so widgets may trade places.
    /// Either every patch is committed, with a single save, or none is.
    pub fn apply_batch(&mut self, patches: &[(&str, WidgetPatch)]) -> LayoutResult<()> {
        let mut next = self.widgets.clone();
        for (id, patch) in patches {
            let &i = self
                .index
                .get(*id)
                .ok_or_else(|| LayoutError::NotFound(id.to_string()))?;
            next[i] = next[i].patched(patch);
        }
        for (id, _) in patches {
            let i = self.index[*id];
            check_geometry(&next[i], &self.grid, &next)?;
        }
        self.commit(next);
        Ok(())
    }

    /// Remove a widget.
    pub fn remove(&mut self, id: &str) -> LayoutResult<Widget> {
        let &i = self
            .index
            .get(id)
            .ok_or_else(|| LayoutError::NotFound(id.to_string()))?;
        let mut next = self.widgets.clone();
        let removed = next.remove(i);
        self.commit(next);
        Ok(removed)
    }

    /// Undo the last mutation.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.widgets, previous);
        self.redo_stack.push(current);
        self.reindex();
        self.persist();
        true
    }

    /// Redo the last undone mutation.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.widgets, next);
        self.undo_stack.push(current);
        self.reindex();
        self.persist();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn commit(&mut self, next: Vec<Widget>) {
        let previous = std::mem::replace(&mut self.widgets, next);
        self.undo_stack.push(previous);
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
        self.reindex();
        self.persist();
    }

    fn reindex(&mut self) {
        self.index = self
            .widgets
            .iter()
            .enumerate()
            .map(|(i, w)| (w.id.clone(), i))
            .collect();
    }

    fn persist(&self) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(&self.widgets) {
                log::warn!("Failed to save layout: {}", e);
            }
        }
    }
}

/// Assert that every widget in the store is in bounds, at or above the
/// minimum area and clear of every other widget.
#[cfg(test)]
pub(crate) fn assert_invariants(store: &WidgetStore) {
    use crate::collision::overlaps;

    let grid = store.grid();
    let widgets = store.list();
    for (i, a) in widgets.iter().enumerate() {
        assert!(a.x >= 0 && a.y >= 0, "{a:?}");
        assert!(i64::from(a.x) + i64::from(a.w) <= i64::from(grid.columns()), "{a:?}");
        if let Some(rows) = grid.rows() {
            assert!(i64::from(a.y) + i64::from(a.h) <= i64::from(rows), "{a:?}");
        }
        assert!(i64::from(a.w) * i64::from(a.h) >= i64::from(MIN_CELLS), "{a:?}");
        for b in &widgets[i + 1..] {
            assert!(!overlaps(a.rect(), b.rect()), "{a:?} overlaps {b:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError, StorageResult};
    use crate::widget::{CellRect, WidgetKind};
    use serde_json::json;

    fn widget(id: &str, x: i32, y: i32, w: i32, h: i32) -> Widget {
        Widget::with_id(id, WidgetKind::Metric, CellRect::new(x, y, w, h))
    }

    struct FailingStorage;

    impl LayoutPersistence for FailingStorage {
        fn save(&self, _widgets: &[Widget]) -> StorageResult<()> {
            Err(StorageError::Io("disk full".to_string()))
        }

        fn load(&self) -> StorageResult<Option<Vec<Widget>>> {
            Err(StorageError::Io("unreadable".to_string()))
        }
    }

    #[test]
    fn test_add_and_list_in_creation_order() {
        let mut store = WidgetStore::new(Grid::default());
        store.add(widget("b", 4, 0, 2, 2)).unwrap();
        store.add(widget("a", 0, 0, 2, 2)).unwrap();

        let ids: Vec<_> = store.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.get("a").map(|w| w.rect()), Some(CellRect::new(0, 0, 2, 2)));
        assert_invariants(&store);
    }

    #[test]
    fn test_add_rejects_invalid_geometry() {
        let mut store = WidgetStore::new(Grid::default());
        store.add(widget("a", 0, 0, 4, 4)).unwrap();

        assert_eq!(
            store.add(widget("b", 10, 0, 4, 1)),
            Err(LayoutError::InvalidGeometry(GeometryViolation::OutOfBounds))
        );
        assert_eq!(
            store.add(widget("b", -1, 0, 4, 1)),
            Err(LayoutError::InvalidGeometry(GeometryViolation::OutOfBounds))
        );
        assert_eq!(
            store.add(widget("b", 5, 0, 0, 4)),
            Err(LayoutError::InvalidGeometry(GeometryViolation::NonPositiveExtent))
        );
        assert_eq!(
            store.add(widget("b", 5, 0, 1, 3)),
            Err(LayoutError::InvalidGeometry(GeometryViolation::BelowMinArea { area: 3 }))
        );
        assert_eq!(
            store.add(widget("b", 2, 2, 4, 4)),
            Err(LayoutError::InvalidGeometry(GeometryViolation::Overlaps {
                other: "a".to_string()
            }))
        );
        assert_eq!(store.len(), 1);
        assert_invariants(&store);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut store = WidgetStore::new(Grid::default());
        store.add(widget("a", 0, 0, 2, 2)).unwrap();
        assert_eq!(
            store.add(widget("a", 4, 0, 2, 2)),
            Err(LayoutError::DuplicateId("a".to_string()))
        );
    }

    #[test]
    fn test_place_finds_nearest_slot() {
        let mut store = WidgetStore::new(Grid::new(12, 80.0, 8.0));
        store.add(widget("a", 0, 0, 4, 4)).unwrap();

        let placed = store.place(widget("b", 2, 0, 4, 4)).unwrap();
        assert_eq!(placed, (4, 0));
        assert_eq!(store.get("b").map(|w| w.rect()), Some(CellRect::new(4, 0, 4, 4)));
        assert_invariants(&store);
    }

    #[test]
    fn test_place_fails_on_full_board() {
        let grid = Grid::new(4, 80.0, 8.0).with_max_rows(2);
        let mut store = WidgetStore::new(grid);
        store.add(widget("a", 0, 0, 2, 2)).unwrap();
        store.add(widget("b", 2, 0, 2, 2)).unwrap();

        let result = store.place(widget("c", 0, 0, 2, 2));
        assert!(matches!(result, Err(LayoutError::InvalidGeometry(_))));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_moves_and_validates() {
        let mut store = WidgetStore::new(Grid::default());
        store.add(widget("a", 0, 0, 2, 2)).unwrap();
        store.add(widget("b", 2, 0, 2, 2)).unwrap();

        store.update("a", WidgetPatch::move_to(0, 3)).unwrap();
        assert_eq!(store.get("a").map(|w| w.rect()), Some(CellRect::new(0, 3, 2, 2)));

        let err = store.update("a", WidgetPatch::move_to(3, 0));
        assert!(matches!(err, Err(LayoutError::InvalidGeometry(GeometryViolation::Overlaps { .. }))));
        assert_eq!(store.get("a").map(|w| w.rect()), Some(CellRect::new(0, 3, 2, 2)));

        assert_eq!(
            store.update("missing", WidgetPatch::move_to(0, 0)),
            Err(LayoutError::NotFound("missing".to_string()))
        );
        assert_invariants(&store);
    }

    #[test]
    fn test_extreme_geometry_is_rejected_not_wrapped() {
        let mut store = WidgetStore::new(Grid::default());
        let out = Err(LayoutError::InvalidGeometry(GeometryViolation::OutOfBounds));

        assert_eq!(store.add(widget("far", i32::MAX - 1, 0, 4, 4)), out);
        assert_eq!(store.add(widget("deep", 0, i32::MAX - 1, 4, 4)), out);
        assert_eq!(store.add(widget("wide", 0, 0, i32::MAX, 4)), out);
        assert!(store.is_empty());

        store.add(widget("a", 0, 0, 2, 2)).unwrap();
        assert_eq!(store.update("a", WidgetPatch::move_to(i32::MAX, 0)), out);
        assert_eq!(store.update("a", WidgetPatch::rect(CellRect::new(0, i32::MAX, 2, 2))), out);
        assert_eq!(store.get("a").map(|w| w.rect()), Some(CellRect::new(0, 0, 2, 2)));
        assert_invariants(&store);
    }

    #[test]
    fn test_tall_widget_area_does_not_wrap() {
        let mut store = WidgetStore::new(Grid::default());
        store.add(widget("tall", 0, 0, 12, 1 << 30)).unwrap();
        assert_eq!(store.get("tall").map(|w| w.rect().area()), Some(i32::MAX));
        assert_invariants(&store);

        let mut bounded = WidgetStore::new(Grid::default().with_max_rows(8));
        assert_eq!(
            bounded.add(widget("tall", 0, 0, 12, 1 << 30)),
            Err(LayoutError::InvalidGeometry(GeometryViolation::OutOfBounds))
        );
    }

    #[test]
    fn test_apply_batch_allows_swaps() {
        let mut store = WidgetStore::new(Grid::default());
        store.add(widget("a", 0, 0, 4, 4)).unwrap();
        store.add(widget("b", 4, 0, 4, 4)).unwrap();

        assert!(store.update("a", WidgetPatch::move_to(4, 0)).is_err());
        store
            .apply_batch(&[("a", WidgetPatch::move_to(4, 0)), ("b", WidgetPatch::move_to(0, 0))])
            .unwrap();
        assert_eq!(store.get("a").map(|w| w.rect().origin()), Some((4, 0)));
        assert_eq!(store.get("b").map(|w| w.rect().origin()), Some((0, 0)));
        assert_invariants(&store);
    }

    #[test]
    fn test_apply_batch_is_atomic() {
        let mut store = WidgetStore::new(Grid::default());
        store.add(widget("a", 0, 0, 2, 2)).unwrap();
        store.add(widget("b", 4, 0, 2, 2)).unwrap();

        let result = store.apply_batch(&[
            ("a", WidgetPatch::move_to(8, 0)),
            ("b", WidgetPatch::move_to(11, 0)),
        ]);
        assert!(result.is_err());
        assert_eq!(store.get("a").map(|w| w.rect()), Some(CellRect::new(0, 0, 2, 2)));
    }

    #[test]
    fn test_remove() {
        let mut store = WidgetStore::new(Grid::default());
        store.add(widget("a", 0, 0, 2, 2)).unwrap();
        store.add(widget("b", 2, 0, 2, 2)).unwrap();
        store.add(widget("c", 4, 0, 2, 2)).unwrap();

        let removed = store.remove("b").unwrap();
        assert_eq!(removed.id, "b");
        assert!(!store.contains("b"));
        assert_eq!(store.get("c").map(|w| w.x), Some(4));
        assert_eq!(store.remove("b"), Err(LayoutError::NotFound("b".to_string())));
    }

    #[test]
    fn test_every_mutation_saves_full_list() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = WidgetStore::with_persistence(Grid::default(), storage.clone());

        store.add(widget("a", 0, 0, 2, 2)).unwrap();
        store.add(widget("b", 2, 0, 2, 2)).unwrap();
        store.update("a", WidgetPatch::move_to(0, 2)).unwrap();
        assert!(store.update("a", WidgetPatch::move_to(2, 0)).is_err());
        store.remove("b").unwrap();

        assert_eq!(storage.save_count(), 4);
        assert_eq!(storage.last_saved(), Some(store.snapshot()));
    }

    #[test]
    fn test_save_failure_does_not_block_mutation() {
        let mut store = WidgetStore::with_persistence(Grid::default(), Arc::new(FailingStorage));
        store.add(widget("a", 0, 0, 2, 2)).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_open_seeds_from_storage() {
        let _ = env_logger::builder().is_test(true).try_init();
        let storage = Arc::new(MemoryStorage::with_layout(vec![
            widget("a", 0, 0, 4, 4).with_extra("title", json!("Sales")),
            widget("b", 2, 2, 4, 4),
            widget("c", 10, 0, 4, 4),
            widget("d", 6, 0, 1, 1),
            widget("a", 8, 8, 2, 2),
        ]));
        let store = WidgetStore::open(Grid::default(), storage.clone());

        let ids: Vec<_> = store.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.get("a").map(|w| w.extra["title"].clone()), Some(json!("Sales")));
        assert_eq!(store.get("b").map(|w| w.rect()), Some(CellRect::new(4, 0, 4, 4)));
        assert_eq!(storage.save_count(), 0);
        assert_invariants(&store);
    }

    #[test]
    fn test_open_survives_load_failure() {
        let store = WidgetStore::open(Grid::default(), Arc::new(FailingStorage));
        assert!(store.is_empty());
    }

    #[test]
    fn test_undo_redo() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = WidgetStore::with_persistence(Grid::default(), storage.clone());
        assert!(!store.can_undo());

        store.add(widget("a", 0, 0, 2, 2)).unwrap();
        store.update("a", WidgetPatch::move_to(4, 4)).unwrap();

        assert!(store.undo());
        assert_eq!(store.get("a").map(|w| w.rect()), Some(CellRect::new(0, 0, 2, 2)));
        assert!(store.can_redo());

        assert!(store.redo());
        assert_eq!(store.get("a").map(|w| w.rect()), Some(CellRect::new(4, 4, 2, 2)));

        assert!(store.undo());
        assert!(store.undo());
        assert!(store.is_empty());
        assert!(!store.undo());
        assert_eq!(storage.last_saved(), Some(vec![]));
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut store = WidgetStore::new(Grid::default());
        store.add(widget("a", 0, 0, 2, 2)).unwrap();
        store.undo();
        store.add(widget("b", 0, 0, 2, 2)).unwrap();
        assert!(!store.can_redo());
    }

    #[test]
    fn test_undo_history_is_bounded() {
        let mut store = WidgetStore::new(Grid::default());
        store.add(widget("a", 0, 0, 2, 2)).unwrap();
        for row in 1..=(MAX_UNDO_HISTORY as i32 + 10) {
            store.update("a", WidgetPatch::move_to(0, row)).unwrap();
        }
        let mut undone = 0;
        while store.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_HISTORY);
    }

    #[test]
    fn test_widget_at_cell() {
        let mut store = WidgetStore::new(Grid::default());
        store.add(widget("a", 2, 2, 2, 2)).unwrap();
        assert_eq!(store.widget_at_cell(3, 3).map(|w| w.id.as_str()), Some("a"));
        assert!(store.widget_at_cell(4, 3).is_none());
    }
}
