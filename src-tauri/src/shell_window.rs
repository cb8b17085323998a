//! Seams between the window logic and the platform windowing layer.

use serde_json::Value;

use crate::{
    geometry::{Bounds, Point},
    icon_resolver::IconImage,
};

/// One on-screen surface. Every mutator may fail once the window is gone;
/// callers check [`ShellWindow::is_destroyed`] first and log anything else.
pub trait ShellWindow {
    fn is_destroyed(&self) -> bool;
    fn bounds(&self) -> Result<Bounds, String>;
    /// Ratio between physical and logical pixels on the window's current monitor.
    fn scale_factor(&self) -> Result<f64, String>;
    fn set_bounds(&self, bounds: Bounds) -> Result<(), String>;
    fn set_position(&self, position: Point) -> Result<(), String>;
    fn set_always_on_top(&self, on_top: bool) -> Result<(), String>;
    fn set_visible_on_all_workspaces(&self, visible: bool) -> Result<(), String>;
    /// Bring the surface to the very front of the stacking order.
    fn raise(&self) -> Result<(), String>;
    fn focus(&self) -> Result<(), String>;
    fn is_visible(&self) -> Result<bool, String>;
    fn show(&self) -> Result<(), String>;
    fn hide(&self) -> Result<(), String>;
    fn minimize(&self) -> Result<(), String>;
    fn close(&self) -> Result<(), String>;
    fn set_icon(&self, icon: &IconImage) -> Result<(), String>;
    fn emit(&self, event: &str, payload: Value) -> Result<(), String>;
}

/// Desktop-wide queries that do not belong to any one window.
pub trait DesktopHost {
    /// Cursor in logical pixels for a window with the given scale factor.
    fn cursor_position(&self, scale_factor: f64) -> Option<Point>;
    fn primary_work_area(&self) -> Option<Bounds>;
}
