use std::collections::HashMap;

use crate::geometry::Bounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandToggle {
    Expanded(Bounds),
    Restored(Bounds),
}

impl ExpandToggle {
    pub fn target(self) -> Bounds {
        match self {
            ExpandToggle::Expanded(bounds) | ExpandToggle::Restored(bounds) => bounds,
        }
    }
}

/// Pre-expand bounds per window id. Having an entry is what "expanded" means.
#[derive(Debug, Default)]
pub struct BoundsSnapshotStore {
    saved: HashMap<String, Bounds>,
}

impl BoundsSnapshotStore {
    pub fn toggle_expand(&mut self, id: &str, current: Bounds, work_area: Bounds) -> ExpandToggle {
        if let Some(saved) = self.saved.remove(id) {
            return ExpandToggle::Restored(saved);
        }

        self.saved.insert(id.to_string(), current);
        ExpandToggle::Expanded(work_area)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.saved.contains_key(id)
    }

    pub fn forget(&mut self, id: &str) {
        self.saved.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORK_AREA: Bounds = Bounds::new(0, 25, 1440, 875);

    #[test]
    fn expand_then_restore_returns_the_original_bounds() {
        let mut store = BoundsSnapshotStore::default();
        let original = Bounds::new(120, 80, 420, 560);

        let first = store.toggle_expand("chat", original, WORK_AREA);
        assert_eq!(first, ExpandToggle::Expanded(WORK_AREA));
        assert!(store.is_expanded("chat"));

        let second = store.toggle_expand("chat", WORK_AREA, WORK_AREA);
        assert_eq!(second, ExpandToggle::Restored(original));
        assert!(!store.is_expanded("chat"));
    }

    #[test]
    fn forget_drops_the_expanded_state() {
        let mut store = BoundsSnapshotStore::default();
        store.toggle_expand("logs", Bounds::new(0, 0, 10, 10), WORK_AREA);
        store.forget("logs");

        assert!(!store.is_expanded("logs"));
        assert!(matches!(
            store.toggle_expand("logs", Bounds::new(5, 5, 10, 10), WORK_AREA),
            ExpandToggle::Expanded(_)
        ));
    }
}
