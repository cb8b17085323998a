//! In-memory window, host and clock used by the window logic tests.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

use serde_json::Value;

use crate::{
    geometry::{Bounds, Point},
    icon_resolver::IconImage,
    scheduler::{Clock, Millis},
    shell_window::{DesktopHost, ShellWindow},
};

#[derive(Debug, Default)]
pub struct FakeWindowState {
    pub bounds: Bounds,
    pub scale_factor: Option<f64>,
    pub destroyed: bool,
    pub visible: bool,
    pub minimized: bool,
    pub always_on_top: bool,
    pub on_top_calls: Vec<bool>,
    pub all_workspaces: bool,
    pub raise_count: usize,
    pub focus_count: usize,
    pub position_sets: usize,
    pub icon_sets: usize,
    pub emitted: Vec<(String, Value)>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeWindow(Arc<Mutex<FakeWindowState>>);

impl FakeWindow {
    pub fn with_bounds(bounds: Bounds) -> Self {
        let window = Self::default();
        {
            let mut state = window.state();
            state.bounds = bounds;
            state.visible = true;
        }
        window
    }

    pub fn state(&self) -> MutexGuard<'_, FakeWindowState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn bounds_now(&self) -> Bounds {
        self.state().bounds
    }

    pub fn destroy(&self) {
        self.state().destroyed = true;
    }

    /// Simulates the user dragging the window with the native move loop.
    pub fn move_to(&self, position: Point) {
        let mut state = self.state();
        state.bounds = state.bounds.with_position(position);
    }

    fn alive(&self) -> Result<MutexGuard<'_, FakeWindowState>, String> {
        let state = self.state();
        if state.destroyed {
            return Err("window destroyed".to_string());
        }
        Ok(state)
    }
}

impl ShellWindow for FakeWindow {
    fn is_destroyed(&self) -> bool {
        self.state().destroyed
    }

    fn bounds(&self) -> Result<Bounds, String> {
        Ok(self.alive()?.bounds)
    }

    fn scale_factor(&self) -> Result<f64, String> {
        Ok(self.alive()?.scale_factor.unwrap_or(1.0))
    }

    fn set_bounds(&self, bounds: Bounds) -> Result<(), String> {
        self.alive()?.bounds = bounds;
        Ok(())
    }

    fn set_position(&self, position: Point) -> Result<(), String> {
        let mut state = self.alive()?;
        state.bounds = state.bounds.with_position(position);
        state.position_sets += 1;
        Ok(())
    }

    fn set_always_on_top(&self, on_top: bool) -> Result<(), String> {
        let mut state = self.alive()?;
        state.always_on_top = on_top;
        state.on_top_calls.push(on_top);
        Ok(())
    }

    fn set_visible_on_all_workspaces(&self, visible: bool) -> Result<(), String> {
        self.alive()?.all_workspaces = visible;
        Ok(())
    }

    fn raise(&self) -> Result<(), String> {
        self.alive()?.raise_count += 1;
        Ok(())
    }

    fn focus(&self) -> Result<(), String> {
        self.alive()?.focus_count += 1;
        Ok(())
    }

    fn is_visible(&self) -> Result<bool, String> {
        Ok(self.alive()?.visible)
    }

    fn show(&self) -> Result<(), String> {
        self.alive()?.visible = true;
        Ok(())
    }

    fn hide(&self) -> Result<(), String> {
        self.alive()?.visible = false;
        Ok(())
    }

    fn minimize(&self) -> Result<(), String> {
        self.alive()?.minimized = true;
        Ok(())
    }

    fn close(&self) -> Result<(), String> {
        self.alive()?.destroyed = true;
        Ok(())
    }

    fn set_icon(&self, icon: &IconImage) -> Result<(), String> {
        if !icon.is_empty() {
            self.alive()?.icon_sets += 1;
        }
        Ok(())
    }

    fn emit(&self, event: &str, payload: Value) -> Result<(), String> {
        self.alive()?.emitted.push((event.to_string(), payload));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FakeHost {
    cursor: Arc<Mutex<Option<Point>>>,
    pub work_area: Option<Bounds>,
}

impl FakeHost {
    pub fn new(work_area: Bounds) -> Self {
        Self {
            cursor: Arc::new(Mutex::new(Some(Point::default()))),
            work_area: Some(work_area),
        }
    }

    /// Cursor positions are physical pixels.
    pub fn move_cursor(&self, position: Point) {
        *self.cursor.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(position);
    }
}

impl DesktopHost for FakeHost {
    fn cursor_position(&self, scale_factor: f64) -> Option<Point> {
        let cursor = (*self.cursor.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))?;
        Some(Point::new(
            (cursor.x as f64 / scale_factor).round() as i32,
            (cursor.y as f64 / scale_factor).round() as i32,
        ))
    }

    fn primary_work_area(&self) -> Option<Bounds> {
        self.work_area
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn advance(&self, millis: Millis) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Millis {
        self.0.load(Ordering::SeqCst)
    }
}
