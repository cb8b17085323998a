use std::collections::HashSet;

use crate::geometry::{Bounds, Point, Size};

pub const GRID_COLUMNS: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutMetrics {
    pub margin: i32,
    pub gap: i32,
    /// Grid stride; floating panels are created at this size.
    pub cell: Size,
}

/// Floating panel ordering plus the user-drag bookkeeping that exempts a
/// panel from auto placement.
#[derive(Debug, Default)]
pub struct FloatingLayout {
    order: Vec<String>,
    manual: HashSet<String>,
    drag_markers: HashSet<String>,
}

impl FloatingLayout {
    pub fn add(&mut self, id: &str) {
        if !self.order.iter().any(|existing| existing == id) {
            self.order.push(id.to_string());
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.manual.remove(id);
        self.drag_markers.remove(id);
        let before = self.order.len();
        self.order.retain(|existing| existing != id);
        before != self.order.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.order.iter().any(|existing| existing == id)
    }

    #[cfg(test)]
    pub fn is_manual(&self, id: &str) -> bool {
        self.manual.contains(id)
    }

    pub fn mark_drag_begin(&mut self, id: &str) {
        if self.contains(id) {
            self.drag_markers.insert(id.to_string());
        }
    }

    /// Bounds the shell assigns itself must never read as the end of a drag.
    pub fn clear_drag_marker(&mut self, id: &str) {
        self.drag_markers.remove(id);
    }

    /// Returns true when this move completes a user drag and the panel just
    /// left auto layout.
    pub fn on_moved(&mut self, id: &str) -> bool {
        if !self.drag_markers.remove(id) {
            return false;
        }
        self.manual.insert(id.to_string())
    }

    /// Target positions for every auto-placed panel. Manually moved panels and
    /// panels `size_of` rejects are skipped and do not occupy a grid cell.
    pub fn plan<F>(&self, work_area: Bounds, metrics: LayoutMetrics, size_of: F) -> Vec<(String, Point)>
    where
        F: Fn(&str) -> Option<Size>,
    {
        self.order
            .iter()
            .filter(|id| !self.manual.contains(id.as_str()))
            .filter_map(|id| size_of(id).map(|size| (id, size)))
            .enumerate()
            .map(|(index, (id, size))| {
                let index = index as i32;
                let column = index % GRID_COLUMNS;
                let row = index / GRID_COLUMNS;
                let x = place_on_axis(
                    column,
                    metrics.cell.width,
                    size.width,
                    work_area.width,
                    metrics,
                );
                let y = place_on_axis(
                    row,
                    metrics.cell.height,
                    size.height,
                    work_area.height,
                    metrics,
                );
                (id.clone(), Point::new(work_area.x + x, work_area.y + y))
            })
            .collect()
    }
}

fn place_on_axis(cell: i32, stride: i32, window: i32, screen: i32, metrics: LayoutMetrics) -> i32 {
    let computed = metrics.margin + cell * (stride + metrics.gap);
    let limit = (screen - window - metrics.margin).max(metrics.margin);
    computed.min(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: LayoutMetrics = LayoutMetrics {
        margin: 20,
        gap: 10,
        cell: Size::new(400, 300),
    };
    const AREA: Bounds = Bounds::new(0, 0, 1920, 1080);

    fn uniform(_: &str) -> Option<Size> {
        Some(METRICS.cell)
    }

    fn positions(layout: &FloatingLayout, area: Bounds) -> Vec<(String, Point)> {
        layout.plan(area, METRICS, uniform)
    }

    #[test]
    fn four_panels_fill_a_two_column_grid_in_open_order() {
        let mut layout = FloatingLayout::default();
        for id in ["a", "b", "c", "d"] {
            layout.add(id);
        }

        assert_eq!(
            positions(&layout, AREA),
            vec![
                ("a".to_string(), Point::new(20, 20)),
                ("b".to_string(), Point::new(430, 20)),
                ("c".to_string(), Point::new(20, 330)),
                ("d".to_string(), Point::new(430, 330)),
            ]
        );
    }

    #[test]
    fn positions_are_clamped_inside_the_screen() {
        let mut layout = FloatingLayout::default();
        for id in ["a", "b", "c", "d", "e", "f"] {
            layout.add(id);
        }
        let small = Bounds::new(0, 0, 700, 700);

        let planned = positions(&layout, small);
        // Column 1 would start at 430 but a 400px panel must end by 680.
        assert_eq!(planned[1].1, Point::new(280, 20));
        // Row 2 would start at 640; clamped to 700 - 300 - 20.
        assert_eq!(planned[4].1, Point::new(20, 380));
    }

    #[test]
    fn clamp_never_goes_below_the_margin() {
        let mut layout = FloatingLayout::default();
        layout.add("a");
        layout.add("b");
        let tiny = Bounds::new(100, 50, 300, 200);

        let planned = positions(&layout, tiny);
        assert_eq!(planned[1].1, Point::new(120, 70));
    }

    #[test]
    fn only_a_marked_drag_makes_a_panel_manual() {
        let mut layout = FloatingLayout::default();
        layout.add("a");

        assert!(!layout.on_moved("a"));
        assert!(!layout.is_manual("a"));

        layout.mark_drag_begin("a");
        assert!(layout.on_moved("a"));
        assert!(layout.is_manual("a"));
        assert!(!layout.on_moved("a"));
    }

    #[test]
    fn manual_panels_are_skipped_and_the_rest_compact() {
        let mut layout = FloatingLayout::default();
        for id in ["a", "b", "c"] {
            layout.add(id);
        }
        layout.mark_drag_begin("a");
        layout.on_moved("a");

        let planned = positions(&layout, AREA);
        assert_eq!(
            planned,
            vec![
                ("b".to_string(), Point::new(20, 20)),
                ("c".to_string(), Point::new(430, 20)),
            ]
        );
    }

    #[test]
    fn unsized_panels_do_not_hold_a_grid_cell() {
        let mut layout = FloatingLayout::default();
        for id in ["a", "b", "c"] {
            layout.add(id);
        }

        let planned = layout.plan(AREA, METRICS, |id| (id != "a").then_some(METRICS.cell));
        assert_eq!(
            planned,
            vec![
                ("b".to_string(), Point::new(20, 20)),
                ("c".to_string(), Point::new(430, 20)),
            ]
        );
    }

    #[test]
    fn cleared_marker_turns_the_next_move_into_a_programmatic_one() {
        let mut layout = FloatingLayout::default();
        layout.add("a");
        layout.mark_drag_begin("a");

        layout.clear_drag_marker("a");
        assert!(!layout.on_moved("a"));
        assert!(!layout.is_manual("a"));
    }

    #[test]
    fn remove_purges_manual_state_and_markers() {
        let mut layout = FloatingLayout::default();
        layout.add("a");
        layout.mark_drag_begin("a");
        layout.on_moved("a");

        assert!(layout.remove("a"));
        assert!(!layout.is_manual("a"));
        assert!(!layout.contains("a"));

        layout.add("a");
        assert!(!layout.is_manual("a"));
        assert_eq!(positions(&layout, AREA).len(), 1);
    }
}
