//! Rectangle overlap tests between widgets.

use crate::widget::{CellRect, Widget};

/// Check whether two rectangles overlap.
///
/// Intervals are open: rectangles that only share an edge or a corner do not
/// overlap.
pub fn overlaps(a: CellRect, b: CellRect) -> bool {
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}

/// Check whether `candidate` overlaps any widget in `others`, ignoring the
/// widget whose id is `exclude_id`.
pub fn has_collision(candidate: CellRect, others: &[Widget], exclude_id: Option<&str>) -> bool {
    first_collision(candidate, others, exclude_id).is_some()
}

/// Find the first widget (in list order) that `candidate` overlaps.
pub fn first_collision<'a>(
    candidate: CellRect,
    others: &'a [Widget],
    exclude_id: Option<&str>,
) -> Option<&'a Widget> {
    others
        .iter()
        .filter(|w| Some(w.id.as_str()) != exclude_id)
        .find(|w| overlaps(candidate, w.rect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;

    fn widget(id: &str, x: i32, y: i32, w: i32, h: i32) -> Widget {
        Widget::with_id(id, WidgetKind::Metric, CellRect::new(x, y, w, h))
    }

    #[test]
    fn test_overlapping_rects() {
        let a = CellRect::new(0, 0, 4, 4);
        assert!(overlaps(a, CellRect::new(2, 2, 4, 4)));
        assert!(overlaps(a, CellRect::new(1, 1, 1, 1)));
        assert!(overlaps(CellRect::new(1, 1, 1, 1), a));
    }

    #[test]
    fn test_shared_edges_do_not_overlap() {
        let a = CellRect::new(0, 0, 4, 4);
        assert!(!overlaps(a, CellRect::new(4, 0, 4, 4)));
        assert!(!overlaps(a, CellRect::new(0, 4, 4, 4)));
        assert!(!overlaps(a, CellRect::new(4, 4, 2, 2)));
    }

    #[test]
    fn test_overlap_needs_both_axes() {
        let a = CellRect::new(0, 0, 4, 4);
        assert!(!overlaps(a, CellRect::new(2, 10, 4, 4)));
        assert!(!overlaps(a, CellRect::new(10, 2, 4, 4)));
    }

    #[test]
    fn test_has_collision_excludes_self() {
        let widgets = vec![widget("a", 0, 0, 4, 4), widget("b", 4, 0, 4, 4)];
        let candidate = CellRect::new(0, 0, 4, 4);
        assert!(has_collision(candidate, &widgets, None));
        assert!(!has_collision(candidate, &widgets, Some("a")));
        assert!(has_collision(CellRect::new(3, 0, 2, 2), &widgets, Some("a")));
    }

    #[test]
    fn test_first_collision_reports_widget() {
        let widgets = vec![widget("a", 0, 0, 2, 2), widget("b", 2, 0, 2, 2)];
        let hit = first_collision(CellRect::new(1, 0, 2, 2), &widgets, None);
        assert_eq!(hit.map(|w| w.id.as_str()), Some("a"));
        assert!(first_collision(CellRect::new(0, 2, 4, 2), &widgets, None).is_none());
    }
}
