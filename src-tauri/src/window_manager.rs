use std::sync::Arc;

use serde_json::{json, Value};

use crate::{
    bounds_snapshot::{BoundsSnapshotStore, ExpandToggle},
    floating_layout::{FloatingLayout, LayoutMetrics},
    geometry::{Bounds, Point, Size},
    icon_resolver::IconImage,
    resize_session::{ResizeDirection, ResizeFrame, ResizeSession},
    scheduler::{Clock, Millis, Scheduler},
    shell_window::{DesktopHost, ShellWindow},
    surfaces::{Placement, SurfaceKind, SurfaceSpec, DASHBOARD_WINDOW_ID, FLOATING_PANEL_SIZE},
    topmost::TopmostEnforcer,
    window_registry::{OpenOutcome, WindowRecord, WindowRegistry},
    WINDOW_CLOSED_EVENT,
};

/// Payloads of the manager's scheduled tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellTimer {
    ResizeTick,
    ResizeTimeout,
    ReassertTopmost(String),
}

#[derive(Debug, Clone, Copy)]
pub struct ManagerConfig {
    pub layout: LayoutMetrics,
    pub all_workspaces: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            layout: LayoutMetrics {
                margin: 24,
                gap: 16,
                cell: FLOATING_PANEL_SIZE,
            },
            all_workspaces: true,
        }
    }
}

/// Owns every window and all the state keyed by window id. Each mutation runs
/// on one thread, and closing a window purges it from every structure here.
pub struct WindowManager<W, H> {
    host: H,
    clock: Arc<dyn Clock>,
    icon: IconImage,
    config: ManagerConfig,
    log: fn(&str),
    registry: WindowRegistry<W>,
    scheduler: Scheduler<ShellTimer>,
    resize: ResizeSession,
    layout: FloatingLayout,
    snapshots: BoundsSnapshotStore,
    topmost: TopmostEnforcer,
}

impl<W: ShellWindow, H: DesktopHost> WindowManager<W, H> {
    pub fn new(
        host: H,
        clock: Arc<dyn Clock>,
        icon: IconImage,
        config: ManagerConfig,
        log: fn(&str),
    ) -> Self {
        Self {
            host,
            clock,
            icon,
            config,
            log,
            registry: WindowRegistry::new(),
            scheduler: Scheduler::new(),
            resize: ResizeSession::default(),
            layout: FloatingLayout::default(),
            snapshots: BoundsSnapshotStore::default(),
            topmost: TopmostEnforcer::default(),
        }
    }

    pub fn open_surface<F>(&mut self, spec: &SurfaceSpec, build: F) -> Result<OpenOutcome, String>
    where
        F: FnOnce(&SurfaceSpec, &IconImage) -> Result<W, String>,
    {
        if self.registry.take_stale(&spec.id).is_some() && self.purge_dependents(&spec.id) {
            self.apply_layout();
        }

        let icon = &self.icon;
        let outcome = self.registry.open(&spec.id, || {
            let window = build(spec, icon)?;
            Ok(WindowRecord {
                kind: spec.kind,
                window,
                pinned: spec.pinned,
                min_size: spec.min_size,
            })
        })?;

        if outcome == OpenOutcome::Focused {
            return Ok(outcome);
        }

        (self.log)(&format!("window opened: {}", spec.id));
        if spec.pinned {
            self.pin(&spec.id);
        }
        match spec.placement {
            Placement::Grid => {
                self.layout.add(&spec.id);
                self.apply_layout();
            }
            placement => self.place(&spec.id, placement),
        }
        Ok(outcome)
    }

    /// Closes the window and purges its id everywhere. Unknown ids are a no-op.
    pub fn close(&mut self, id: &str) -> bool {
        let Some(record) = self.registry.live(id) else {
            self.purge(id);
            return false;
        };
        if let Err(error) = record.window.close() {
            (self.log)(&format!("failed to close window {id}: {error}"));
        }
        self.purge(id);
        true
    }

    /// Close notification from the windowing layer. Ignored when a newer live
    /// window already holds the id.
    pub fn on_window_destroyed(&mut self, id: &str) -> bool {
        if self.registry.live(id).is_some() {
            return false;
        }
        self.purge(id).is_some()
    }

    /// Some platforms swap in a generic runtime icon during development runs
    /// unless the icon is applied again once the page is up.
    pub fn on_window_ready(&self, id: &str) {
        if self.icon.is_empty() {
            return;
        }
        if let Some(record) = self.registry.live(id) {
            if let Err(error) = record.window.set_icon(&self.icon) {
                (self.log)(&format!("failed to re-apply icon to {id}: {error}"));
            }
        }
    }

    pub fn on_focus_lost(&mut self, id: &str) {
        let Some(record) = self.registry.live(id) else {
            return;
        };
        let now = self.clock.now_millis();
        if let Err(error) =
            self.topmost
                .on_focus_lost(id, &record.window, &mut self.scheduler, now)
        {
            (self.log)(&format!("failed to refresh topmost state of {id}: {error}"));
        }
    }

    pub fn on_drag_begin(&mut self, id: &str) {
        self.layout.mark_drag_begin(id);
    }

    pub fn on_window_moved(&mut self, id: &str) {
        if self.layout.on_moved(id) {
            (self.log)(&format!("window {id} moved by user; excluded from auto layout"));
        }
    }

    pub fn set_pinned(&mut self, id: &str, pinned: bool) -> Result<(), String> {
        let record = self
            .registry
            .get_mut(id)
            .filter(|record| !record.window.is_destroyed())
            .ok_or_else(|| format!("Window '{id}' is not open."))?;
        record.pinned = pinned;

        if pinned {
            self.topmost
                .attach(id, &record.window, self.config.all_workspaces)?;
        } else {
            self.topmost
                .detach(id, &record.window, &mut self.scheduler)?;
        }
        Ok(())
    }

    /// Returns true when the window ended up expanded.
    pub fn toggle_expand(&mut self, id: &str) -> Result<bool, String> {
        let record = self
            .registry
            .live(id)
            .ok_or_else(|| format!("Window '{id}' is not open."))?;
        let current = record.window.bounds()?;
        let work_area = self
            .host
            .primary_work_area()
            .ok_or_else(|| "Primary display work area is unavailable.".to_string())?;

        let toggle = self.snapshots.toggle_expand(id, current, work_area);
        self.layout.clear_drag_marker(id);
        record.window.set_bounds(toggle.target())?;
        Ok(matches!(toggle, ExpandToggle::Expanded(_)))
    }

    pub fn minimize(&self, id: &str) -> Result<(), String> {
        let record = self
            .registry
            .live(id)
            .ok_or_else(|| format!("Window '{id}' is not open."))?;
        record.window.minimize()
    }

    /// Shows a hidden window or hides a visible one. Returns the new visibility.
    pub fn toggle_visibility(&self, id: &str) -> Result<bool, String> {
        let record = self
            .registry
            .live(id)
            .ok_or_else(|| format!("Window '{id}' is not open."))?;

        if record.window.is_visible()? {
            record.window.hide()?;
            Ok(false)
        } else {
            record.window.show()?;
            record.window.focus()?;
            Ok(true)
        }
    }

    pub fn start_resize(&mut self, id: &str, direction: ResizeDirection) -> Result<(), String> {
        self.stop_resize();

        let record = self
            .registry
            .live(id)
            .ok_or_else(|| format!("Window '{id}' is not open."))?;
        let bounds = record.window.bounds()?;
        let scale_factor = record.window.scale_factor()?;
        let cursor = self
            .host
            .cursor_position(scale_factor)
            .ok_or_else(|| "Cursor position is unavailable.".to_string())?;
        let frame = ResizeFrame {
            cursor,
            bounds,
            min_size: record.min_size,
        };

        let now = self.clock.now_millis();
        self.resize
            .begin(&mut self.scheduler, now, id, direction, frame);
        Ok(())
    }

    pub fn stop_resize(&mut self) -> bool {
        self.resize.stop(&mut self.scheduler).is_some()
    }

    #[cfg(test)]
    pub fn resize_session(&self) -> Option<&crate::resize_session::ResizeSessionState> {
        self.resize.active()
    }

    pub fn send(&self, id: &str, event: &str, payload: Value) -> bool {
        self.registry.send(id, event, payload)
    }

    pub fn window(&self, id: &str) -> Option<&W> {
        self.registry.live(id).map(|record| &record.window)
    }

    #[cfg(test)]
    pub fn is_open(&self, id: &str) -> bool {
        self.registry.live(id).is_some()
    }

    #[cfg(test)]
    pub fn is_pinned(&self, id: &str) -> bool {
        self.registry.get(id).is_some_and(|record| record.pinned) && self.topmost.is_attached(id)
    }

    #[cfg(test)]
    pub fn is_manually_placed(&self, id: &str) -> bool {
        self.layout.is_manual(id)
    }

    #[cfg(test)]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.snapshots.is_expanded(id)
    }

    pub fn next_timer_deadline(&self) -> Option<Millis> {
        self.scheduler.next_deadline()
    }

    #[cfg(test)]
    pub fn scheduled_task_count(&self) -> usize {
        self.scheduler.len()
    }

    pub fn run_due_timers(&mut self) {
        let now = self.clock.now_millis();
        while let Some(timer) = self.scheduler.pop_due(now) {
            match timer {
                ShellTimer::ResizeTick => self.on_resize_tick(),
                ShellTimer::ResizeTimeout => {
                    if let Some(session) = self.resize.stop(&mut self.scheduler) {
                        (self.log)(&format!(
                            "resize of {} hit the safety timeout without a stop signal",
                            session.window_id
                        ));
                    }
                }
                ShellTimer::ReassertTopmost(id) => {
                    let window = self.registry.live(&id).map(|record| &record.window);
                    if let Err(error) = self.topmost.on_settled(&id, window) {
                        (self.log)(&format!("failed to re-raise pinned window {id}: {error}"));
                    }
                }
            }
        }
    }

    /// Re-places every auto-laid-out floating panel.
    pub fn apply_layout(&mut self) {
        let Some(work_area) = self.host.primary_work_area() else {
            (self.log)("floating layout skipped: primary display work area is unavailable");
            return;
        };

        let registry = &self.registry;
        let snapshots = &self.snapshots;
        let plan = self.layout.plan(work_area, self.config.layout, |id| {
            if snapshots.is_expanded(id) {
                return None;
            }
            registry
                .live(id)
                .and_then(|record| record.window.bounds().ok())
                .map(|bounds| bounds.size())
        });

        for (id, position) in plan {
            let Some(record) = self.registry.live(&id) else {
                continue;
            };
            self.layout.clear_drag_marker(&id);
            if let Err(error) = record.window.set_position(position) {
                (self.log)(&format!("failed to position floating window {id}: {error}"));
            }
        }
    }

    fn on_resize_tick(&mut self) {
        let Some(session) = self.resize.active() else {
            return;
        };
        let Some(record) = self.registry.live(&session.window_id) else {
            let window_id = session.window_id.clone();
            self.resize.stop(&mut self.scheduler);
            (self.log)(&format!("resize target {window_id} is gone; session ended"));
            return;
        };
        let Some(cursor) = record
            .window
            .scale_factor()
            .ok()
            .and_then(|scale_factor| self.host.cursor_position(scale_factor))
        else {
            return;
        };

        // No focus or hit-test check: the pointer is expected to leave the
        // window while an edge is dragged outward.
        let bounds = session.bounds_for_cursor(cursor);
        self.layout.clear_drag_marker(&session.window_id);
        if let Err(error) = record.window.set_bounds(bounds) {
            (self.log)(&format!(
                "failed to apply resize bounds to {}: {error}",
                session.window_id
            ));
        }
    }

    fn pin(&mut self, id: &str) {
        let Some(record) = self.registry.live(id) else {
            return;
        };
        if let Err(error) = self
            .topmost
            .attach(id, &record.window, self.config.all_workspaces)
        {
            (self.log)(&format!("failed to pin window {id}: {error}"));
        }
    }

    fn place(&mut self, id: &str, placement: Placement) {
        let (Some(record), Some(work_area)) =
            (self.registry.live(id), self.host.primary_work_area())
        else {
            return;
        };
        let size = match record.window.bounds() {
            Ok(bounds) => bounds.size(),
            Err(error) => {
                (self.log)(&format!("failed to read bounds of {id}: {error}"));
                return;
            }
        };
        let Some(position) = placement_position(placement, work_area, size) else {
            return;
        };
        self.layout.clear_drag_marker(id);
        if let Err(error) = record.window.set_position(position) {
            (self.log)(&format!("failed to place window {id}: {error}"));
        }
    }

    fn purge(&mut self, id: &str) -> Option<SurfaceKind> {
        let record = self.registry.remove(id);
        let was_floating = self.purge_dependents(id);
        if was_floating {
            self.apply_layout();
        }

        let kind = record.map(|record| record.kind)?;
        (self.log)(&format!("window closed: {id}"));
        if kind == SurfaceKind::Floating {
            self.registry
                .send(DASHBOARD_WINDOW_ID, WINDOW_CLOSED_EVENT, json!({ "id": id }));
        }
        Some(kind)
    }

    /// Returns true when the id was part of the floating set.
    fn purge_dependents(&mut self, id: &str) -> bool {
        self.snapshots.forget(id);
        self.topmost.forget(id, &mut self.scheduler);
        if self.resize.targets(id) {
            self.resize.stop(&mut self.scheduler);
        }
        self.layout.remove(id)
    }
}

pub fn placement_position(placement: Placement, work_area: Bounds, size: Size) -> Option<Point> {
    let x = work_area.x + (work_area.width - size.width) / 2;
    match placement {
        Placement::Center => Some(Point::new(
            x,
            work_area.y + (work_area.height - size.height) / 2,
        )),
        Placement::TopCenter { offset } => Some(Point::new(x, work_area.y + offset)),
        Placement::Grid => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        resize_session::{RESIZE_SAFETY_TIMEOUT_MS, RESIZE_TICK_MS},
        surfaces::{dashboard_spec, floating_spec, loader_spec},
        test_support::{FakeHost, FakeWindow, ManualClock},
        topmost::TOPMOST_SETTLE_MS,
    };

    const WORK_AREA: Bounds = Bounds::new(0, 0, 2560, 1440);

    struct Harness {
        manager: WindowManager<FakeWindow, FakeHost>,
        host: FakeHost,
        clock: ManualClock,
    }

    impl Harness {
        fn new() -> Self {
            let host = FakeHost::new(WORK_AREA);
            let clock = ManualClock::default();
            let icon = IconImage {
                rgba: vec![255; 4],
                width: 1,
                height: 1,
            };
            let manager = WindowManager::new(
                host.clone(),
                Arc::new(clock.clone()),
                icon,
                ManagerConfig::default(),
                |_| {},
            );
            Self {
                manager,
                host,
                clock,
            }
        }

        fn open(&mut self, spec: &SurfaceSpec) -> FakeWindow {
            let window =
                FakeWindow::with_bounds(Bounds::new(0, 0, spec.size.width, spec.size.height));
            let built = window.clone();
            self.manager
                .open_surface(spec, move |_, _| Ok(built))
                .expect("open surface");
            window
        }

        fn open_panel(&mut self, id: &str) -> FakeWindow {
            self.open(&floating_spec(id, id).expect("valid id"))
        }

        fn advance(&mut self, millis: u64) {
            self.clock.advance(millis);
            self.manager.run_due_timers();
        }
    }

    fn grid_position(column: i32, row: i32) -> Point {
        let metrics = ManagerConfig::default().layout;
        Point::new(
            metrics.margin + column * (metrics.cell.width + metrics.gap),
            metrics.margin + row * (metrics.cell.height + metrics.gap),
        )
    }

    #[test]
    fn reopening_a_live_id_focuses_instead_of_building() {
        let mut harness = Harness::new();
        let window = harness.open_panel("chat");

        let outcome = harness
            .manager
            .open_surface(&floating_spec("chat", "Chat").expect("spec"), |_, _| {
                Err("factory must not run".to_string())
            })
            .expect("focus existing");

        assert_eq!(outcome, OpenOutcome::Focused);
        assert_eq!(window.state().focus_count, 1);
    }

    #[test]
    fn panels_opened_in_order_land_on_the_grid() {
        let mut harness = Harness::new();
        let windows: Vec<FakeWindow> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|id| harness.open_panel(id))
            .collect();

        let expected = [
            grid_position(0, 0),
            grid_position(1, 0),
            grid_position(0, 1),
            grid_position(1, 1),
        ];
        for (window, position) in windows.iter().zip(expected) {
            assert_eq!(window.bounds_now().position(), position);
        }
    }

    #[test]
    fn closing_a_panel_compacts_the_remaining_grid() {
        let mut harness = Harness::new();
        harness.open_panel("a");
        let b = harness.open_panel("b");
        let c = harness.open_panel("c");

        assert!(harness.manager.close("a"));

        assert_eq!(b.bounds_now().position(), grid_position(0, 0));
        assert_eq!(c.bounds_now().position(), grid_position(1, 0));
    }

    #[test]
    fn user_moved_panels_are_never_repositioned() {
        let mut harness = Harness::new();
        harness.open_panel("a");
        let b = harness.open_panel("b");
        harness.open_panel("c");

        harness.manager.on_drag_begin("b");
        b.move_to(Point::new(900, 700));
        harness.manager.on_window_moved("b");
        assert!(harness.manager.is_manually_placed("b"));

        harness.manager.close("a");
        harness.open_panel("d");
        harness.manager.close("c");
        harness.manager.apply_layout();

        assert_eq!(b.bounds_now().position(), Point::new(900, 700));
    }

    #[test]
    fn programmatic_moves_do_not_mark_a_panel_manual() {
        let mut harness = Harness::new();
        harness.open_panel("a");

        harness.manager.on_window_moved("a");
        assert!(!harness.manager.is_manually_placed("a"));
    }

    #[test]
    fn a_header_click_without_movement_does_not_survive_compaction() {
        let mut harness = Harness::new();
        harness.open_panel("a");
        let b = harness.open_panel("b");

        harness.manager.on_drag_begin("b");
        harness.manager.close("a");
        harness.manager.on_window_moved("b");

        assert_eq!(b.bounds_now().position(), grid_position(0, 0));
        assert!(!harness.manager.is_manually_placed("b"));

        harness.open_panel("c");
        harness.manager.close("c");
        assert_eq!(b.bounds_now().position(), grid_position(0, 0));
    }

    #[test]
    fn expanding_after_a_click_does_not_mark_the_panel_manual() {
        let mut harness = Harness::new();
        harness.open_panel("a");

        harness.manager.on_drag_begin("a");
        harness.manager.toggle_expand("a").expect("expand");
        harness.manager.on_window_moved("a");

        assert!(!harness.manager.is_manually_placed("a"));
    }

    #[test]
    fn expanded_panels_do_not_hold_a_grid_cell() {
        let mut harness = Harness::new();
        harness.open_panel("a");
        let b = harness.open_panel("b");
        harness.manager.toggle_expand("a").expect("expand");

        let c = harness.open_panel("c");

        assert_eq!(b.bounds_now().position(), grid_position(0, 0));
        assert_eq!(c.bounds_now().position(), grid_position(1, 0));
    }

    #[test]
    fn failed_rebuild_of_a_destroyed_window_still_purges_its_state() {
        let mut harness = Harness::new();
        let first = harness.open(&loader_spec());
        first.destroy();

        let failed = harness
            .manager
            .open_surface(&loader_spec(), |_, _| Err("webview creation failed".to_string()));
        assert!(failed.is_err());
        assert!(!harness.manager.is_open("loader"));
        assert!(!harness.manager.is_pinned("loader"));

        let second = harness.open(&loader_spec());
        assert!(harness.manager.is_pinned("loader"));
        assert_eq!(second.state().on_top_calls, vec![true]);
    }

    #[test]
    fn failed_rebuild_of_a_destroyed_panel_forgets_its_layout_state() {
        let mut harness = Harness::new();
        let panel = harness.open_panel("a");
        harness.manager.on_drag_begin("a");
        harness.manager.on_window_moved("a");
        panel.destroy();

        let failed = harness.manager.open_surface(
            &floating_spec("a", "a").expect("spec"),
            |_, _| Err("webview creation failed".to_string()),
        );
        assert!(failed.is_err());
        assert!(!harness.manager.is_manually_placed("a"));

        let reopened = harness.open_panel("a");
        assert_eq!(reopened.bounds_now().position(), grid_position(0, 0));
    }

    #[test]
    fn closing_purges_every_tracking_structure() {
        let mut harness = Harness::new();
        let panel = harness.open_panel("a");
        harness.manager.set_pinned("a", true).expect("pin");
        harness.manager.toggle_expand("a").expect("expand");
        harness.manager.on_drag_begin("a");
        harness.manager.on_window_moved("a");
        harness.manager.on_focus_lost("a");
        harness
            .manager
            .start_resize("a", ResizeDirection::parse("se").expect("direction"))
            .expect("resize");

        assert!(harness.manager.close("a"));

        assert!(panel.is_destroyed());
        assert!(!harness.manager.is_open("a"));
        assert!(!harness.manager.is_manually_placed("a"));
        assert!(!harness.manager.is_expanded("a"));
        assert!(!harness.manager.is_pinned("a"));
        assert!(harness.manager.resize_session().is_none());
        assert_eq!(harness.manager.scheduled_task_count(), 0);
    }

    #[test]
    fn externally_destroyed_windows_are_purged_on_notification() {
        let mut harness = Harness::new();
        let dashboard = harness.open(&dashboard_spec());
        let panel = harness.open_panel("a");
        harness.manager.on_drag_begin("a");
        harness.manager.on_window_moved("a");

        panel.destroy();
        assert!(harness.manager.on_window_destroyed("a"));
        assert!(!harness.manager.is_manually_placed("a"));

        let emitted = dashboard.state().emitted.clone();
        assert_eq!(
            emitted,
            vec![(WINDOW_CLOSED_EVENT.to_string(), json!({ "id": "a" }))]
        );
    }

    #[test]
    fn late_destroy_notification_keeps_a_reopened_window() {
        let mut harness = Harness::new();
        let first = harness.open_panel("a");
        first.destroy();
        let second = harness.open_panel("a");

        assert!(!harness.manager.on_window_destroyed("a"));
        assert!(harness.manager.is_open("a"));
        assert!(!second.is_destroyed());
    }

    #[test]
    fn sends_to_missing_or_destroyed_windows_are_dropped() {
        let mut harness = Harness::new();
        let panel = harness.open_panel("a");
        panel.destroy();

        assert!(!harness.manager.send("a", "ping", Value::Null));
        assert!(!harness.manager.send("nope", "ping", Value::Null));
    }

    #[test]
    fn expand_twice_restores_the_exact_bounds() {
        let mut harness = Harness::new();
        let panel = harness.open_panel("a");
        let before = panel.bounds_now();

        assert!(harness.manager.toggle_expand("a").expect("expand"));
        assert_eq!(panel.bounds_now(), WORK_AREA);
        assert!(!harness.manager.toggle_expand("a").expect("restore"));
        assert_eq!(panel.bounds_now(), before);
    }

    #[test]
    fn expanded_panels_are_left_alone_by_layout() {
        let mut harness = Harness::new();
        harness.open_panel("a");
        let b = harness.open_panel("b");
        harness.manager.toggle_expand("b").expect("expand");

        harness.manager.close("a");
        assert_eq!(b.bounds_now(), WORK_AREA);
    }

    #[test]
    fn pinned_surfaces_are_attached_once() {
        let mut harness = Harness::new();
        let loader = harness.open(&loader_spec());

        assert!(harness.manager.is_pinned("loader"));
        assert_eq!(loader.state().on_top_calls, vec![true]);
        assert!(loader.state().all_workspaces);

        harness.manager.set_pinned("loader", true).expect("pin again");
        assert_eq!(loader.state().on_top_calls, vec![true]);
    }

    #[test]
    fn focus_loss_toggles_then_raises_after_the_settle_delay() {
        let mut harness = Harness::new();
        let loader = harness.open(&loader_spec());

        harness.manager.on_focus_lost("loader");
        assert_eq!(loader.state().on_top_calls, vec![true, false, true]);
        assert_eq!(loader.state().raise_count, 0);

        harness.advance(TOPMOST_SETTLE_MS - 1);
        assert_eq!(loader.state().raise_count, 0);
        harness.advance(1);
        assert_eq!(loader.state().on_top_calls, vec![true, false, true, true]);
        assert_eq!(loader.state().raise_count, 1);
    }

    #[test]
    fn focus_loss_on_unpinned_or_destroyed_windows_is_ignored() {
        let mut harness = Harness::new();
        let panel = harness.open_panel("a");
        harness.manager.on_focus_lost("a");
        assert!(panel.state().on_top_calls.is_empty());

        let loader = harness.open(&loader_spec());
        harness.manager.on_focus_lost("loader");
        loader.destroy();
        harness.advance(TOPMOST_SETTLE_MS);
        assert_eq!(loader.state().raise_count, 0);
    }

    #[test]
    fn unpinning_cancels_a_pending_raise() {
        let mut harness = Harness::new();
        let panel = harness.open_panel("a");
        harness.manager.set_pinned("a", true).expect("pin");
        harness.manager.on_focus_lost("a");

        harness.manager.set_pinned("a", false).expect("unpin");
        harness.advance(TOPMOST_SETTLE_MS);

        assert_eq!(panel.state().raise_count, 0);
        assert!(!panel.state().always_on_top);
    }

    #[test]
    fn resize_follows_the_cursor_even_far_outside_the_window() {
        let mut harness = Harness::new();
        let panel = harness.open_panel("a");
        let start = panel.bounds_now();
        harness.host.move_cursor(Point::new(500, 500));

        harness
            .manager
            .start_resize("a", ResizeDirection::parse("se").expect("direction"))
            .expect("start");
        harness.host.move_cursor(Point::new(1_400, 900));
        harness.advance(RESIZE_TICK_MS);

        let resized = panel.bounds_now();
        assert_eq!(resized.position(), start.position());
        assert_eq!(resized.width, start.width + 900);
        assert_eq!(resized.height, start.height + 400);
    }

    #[test]
    fn resize_converts_the_cursor_with_the_window_scale_factor() {
        let mut harness = Harness::new();
        let panel = harness.open_panel("a");
        panel.state().scale_factor = Some(2.0);
        let start = panel.bounds_now();
        harness.host.move_cursor(Point::new(400, 400));

        harness
            .manager
            .start_resize("a", ResizeDirection::parse("e").expect("direction"))
            .expect("start");
        harness.host.move_cursor(Point::new(600, 400));
        harness.advance(RESIZE_TICK_MS);

        assert_eq!(panel.bounds_now().width, start.width + 100);
    }

    #[test]
    fn starting_a_second_resize_replaces_the_first() {
        let mut harness = Harness::new();
        let a = harness.open_panel("a");
        let b = harness.open_panel("b");
        let direction = ResizeDirection::parse("e").expect("direction");

        harness.manager.start_resize("a", direction).expect("start a");
        let first = harness.manager.resize_session().cloned().expect("session");
        harness.manager.start_resize("b", direction).expect("start b");

        assert_eq!(harness.manager.scheduled_task_count(), 2);
        let second = harness.manager.resize_session().cloned().expect("session");
        assert_ne!(first.tick_task, second.tick_task);
        assert_eq!(second.window_id, "b");

        let a_before = a.bounds_now();
        harness.host.move_cursor(Point::new(50, 0));
        harness.advance(RESIZE_TICK_MS);
        assert_eq!(a.bounds_now(), a_before);
        assert_eq!(b.bounds_now().width, FLOATING_PANEL_SIZE.width + 50);
    }

    #[test]
    fn resize_stops_on_request_timeout_or_destroyed_target() {
        let mut harness = Harness::new();
        let panel = harness.open_panel("a");
        let direction = ResizeDirection::parse("s").expect("direction");

        harness.manager.start_resize("a", direction).expect("start");
        assert!(harness.manager.stop_resize());
        assert_eq!(harness.manager.scheduled_task_count(), 0);

        harness.manager.start_resize("a", direction).expect("start");
        harness.advance(RESIZE_SAFETY_TIMEOUT_MS);
        assert!(harness.manager.resize_session().is_none());
        assert_eq!(harness.manager.scheduled_task_count(), 0);

        harness.manager.start_resize("a", direction).expect("start");
        panel.destroy();
        harness.advance(RESIZE_TICK_MS);
        assert!(harness.manager.resize_session().is_none());
    }

    #[test]
    fn resize_never_shrinks_below_the_minimum_size() {
        let mut harness = Harness::new();
        let panel = harness.open_panel("a");
        harness
            .manager
            .start_resize("a", ResizeDirection::parse("nw").expect("direction"))
            .expect("start");

        harness.host.move_cursor(Point::new(10_000, 10_000));
        harness.advance(RESIZE_TICK_MS);

        let spec = floating_spec("a", "a").expect("spec");
        assert_eq!(panel.bounds_now().size(), spec.min_size);
    }

    #[test]
    fn ready_surfaces_get_the_icon_again() {
        let mut harness = Harness::new();
        let loader = harness.open(&loader_spec());

        harness.manager.on_window_ready("loader");
        assert_eq!(loader.state().icon_sets, 1);
    }

    #[test]
    fn visibility_toggle_hides_and_shows_the_dashboard() {
        let mut harness = Harness::new();
        let dashboard = harness.open(&dashboard_spec());

        assert!(!harness.manager.toggle_visibility("dashboard").expect("hide"));
        assert!(!dashboard.state().visible);
        assert!(harness.manager.toggle_visibility("dashboard").expect("show"));
        assert!(dashboard.state().visible);
        assert_eq!(dashboard.state().focus_count, 1);
    }

    #[test]
    fn fixed_surfaces_are_placed_on_the_work_area() {
        let mut harness = Harness::new();
        let loader = harness.open(&loader_spec());
        let dashboard = harness.open(&dashboard_spec());

        let loader_size = loader_spec().size;
        assert_eq!(
            loader.bounds_now().position(),
            Point::new(
                (WORK_AREA.width - loader_size.width) / 2,
                (WORK_AREA.height - loader_size.height) / 2
            )
        );
        assert_eq!(dashboard.bounds_now().y, 12);
    }
}
