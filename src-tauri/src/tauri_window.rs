use serde_json::Value;
use tauri::{
    image::Image, AppHandle, Emitter, EventTarget, LogicalPosition, LogicalSize, Manager,
    WebviewUrl, WebviewWindow, WebviewWindowBuilder,
};
use tauri_plugin_global_shortcut::GlobalShortcutExt;

use crate::{
    desktop_bridge::DESKTOP_BRIDGE_SCRIPT,
    geometry::{Bounds, Point},
    hotkey::ShortcutRegistrar,
    icon_resolver::IconImage,
    platform::PlatformProfile,
    shell_window::{DesktopHost, ShellWindow},
    surfaces::SurfaceSpec,
};

fn to_tauri_image(icon: &IconImage) -> Image<'static> {
    Image::new_owned(icon.rgba.clone(), icon.width, icon.height)
}

/// A window addressed by label. The native handle is looked up on every call,
/// so a destroyed window reports errors instead of touching freed state.
#[derive(Clone)]
pub(crate) struct TauriWindow {
    app_handle: AppHandle,
    label: String,
}

impl TauriWindow {
    pub(crate) fn new(app_handle: &AppHandle, label: &str) -> Self {
        Self {
            app_handle: app_handle.clone(),
            label: label.to_string(),
        }
    }

    fn handle(&self) -> Result<WebviewWindow, String> {
        self.app_handle
            .get_webview_window(&self.label)
            .ok_or_else(|| format!("Window '{}' no longer exists.", self.label))
    }

    fn call<T, F>(&self, action: &str, f: F) -> Result<T, String>
    where
        F: FnOnce(&WebviewWindow) -> tauri::Result<T>,
    {
        let window = self.handle()?;
        f(&window).map_err(|error| format!("Failed to {action} window '{}': {error}", self.label))
    }
}

impl ShellWindow for TauriWindow {
    fn is_destroyed(&self) -> bool {
        self.app_handle.get_webview_window(&self.label).is_none()
    }

    fn bounds(&self) -> Result<Bounds, String> {
        self.call("read bounds of", |window| {
            let scale = window.scale_factor()?;
            let position = window.outer_position()?.to_logical::<f64>(scale);
            let size = window.outer_size()?.to_logical::<f64>(scale);
            Ok(Bounds::new(
                position.x.round() as i32,
                position.y.round() as i32,
                size.width.round() as i32,
                size.height.round() as i32,
            ))
        })
    }

    fn scale_factor(&self) -> Result<f64, String> {
        self.call("read scale factor of", |window| window.scale_factor())
    }

    fn set_bounds(&self, bounds: Bounds) -> Result<(), String> {
        self.call("set bounds of", |window| {
            window.set_size(LogicalSize::new(bounds.width as f64, bounds.height as f64))?;
            window.set_position(LogicalPosition::new(bounds.x as f64, bounds.y as f64))
        })
    }

    fn set_position(&self, position: Point) -> Result<(), String> {
        self.call("move", |window| {
            window.set_position(LogicalPosition::new(position.x as f64, position.y as f64))
        })
    }

    fn set_always_on_top(&self, on_top: bool) -> Result<(), String> {
        self.call("set always-on-top for", |window| window.set_always_on_top(on_top))
    }

    fn set_visible_on_all_workspaces(&self, visible: bool) -> Result<(), String> {
        self.call("set workspace visibility for", |window| {
            window.set_visible_on_all_workspaces(visible)
        })
    }

    fn raise(&self) -> Result<(), String> {
        self.call("raise", |window| window.show())
    }

    fn focus(&self) -> Result<(), String> {
        self.call("focus", |window| window.set_focus())
    }

    fn is_visible(&self) -> Result<bool, String> {
        self.call("read visibility of", |window| window.is_visible())
    }

    fn show(&self) -> Result<(), String> {
        self.call("show", |window| {
            if window.is_minimized()? {
                window.unminimize()?;
            }
            window.show()
        })
    }

    fn hide(&self) -> Result<(), String> {
        self.call("hide", |window| window.hide())
    }

    fn minimize(&self) -> Result<(), String> {
        self.call("minimize", |window| window.minimize())
    }

    /// Destroys rather than requests a close, so the dashboard's hide-on-close
    /// handling only applies to closes started by the user.
    fn close(&self) -> Result<(), String> {
        self.call("close", |window| window.destroy())
    }

    fn set_icon(&self, icon: &IconImage) -> Result<(), String> {
        if icon.is_empty() {
            return Ok(());
        }
        self.call("set icon of", |window| window.set_icon(to_tauri_image(icon)))
    }

    fn emit(&self, event: &str, payload: Value) -> Result<(), String> {
        self.app_handle
            .emit_to(EventTarget::webview_window(&self.label), event, payload)
            .map_err(|error| format!("Failed to emit {event} to '{}': {error}", self.label))
    }
}

#[derive(Clone)]
pub(crate) struct TauriDesktopHost {
    app_handle: AppHandle,
}

impl TauriDesktopHost {
    pub(crate) fn new(app_handle: &AppHandle) -> Self {
        Self {
            app_handle: app_handle.clone(),
        }
    }

}

impl DesktopHost for TauriDesktopHost {
    fn cursor_position(&self, scale_factor: f64) -> Option<Point> {
        let cursor = self
            .app_handle
            .cursor_position()
            .ok()?
            .to_logical::<f64>(scale_factor);
        Some(Point::new(cursor.x.round() as i32, cursor.y.round() as i32))
    }

    fn primary_work_area(&self) -> Option<Bounds> {
        let monitor = self.app_handle.primary_monitor().ok()??;
        let scale = monitor.scale_factor();
        let area = monitor.work_area();
        let position = area.position.to_logical::<f64>(scale);
        let size = area.size.to_logical::<f64>(scale);
        Some(Bounds::new(
            position.x.round() as i32,
            position.y.round() as i32,
            size.width.round() as i32,
            size.height.round() as i32,
        ))
    }
}

/// Creates the native window for `spec`. Placement is left to the window
/// manager, which knows the work area and the floating set.
pub(crate) fn build_surface(
    app_handle: &AppHandle,
    spec: &SurfaceSpec,
    icon: &IconImage,
    profile: &PlatformProfile,
) -> Result<TauriWindow, String> {
    let mut builder =
        WebviewWindowBuilder::new(app_handle, &spec.id, WebviewUrl::App(spec.page.clone().into()))
            .title(&spec.title)
            .inner_size(spec.size.width as f64, spec.size.height as f64)
            .min_inner_size(spec.min_size.width as f64, spec.min_size.height as f64)
            .resizable(spec.resizable)
            .decorations(!spec.frameless)
            .transparent(spec.frameless)
            .skip_taskbar(spec.frameless && profile.skip_taskbar_for_panels)
            .visible(true)
            .initialization_script(DESKTOP_BRIDGE_SCRIPT);

    if !icon.is_empty() {
        builder = builder
            .icon(to_tauri_image(icon))
            .map_err(|error| format!("Failed to attach icon to '{}': {error}", spec.id))?;
    }

    #[cfg(target_os = "macos")]
    if !spec.frameless && profile.overlay_title_bar {
        builder = builder
            .title_bar_style(tauri::TitleBarStyle::Overlay)
            .hidden_title(true);
    }

    builder
        .build()
        .map_err(|error| format!("Failed to create window '{}': {error}", spec.id))?;
    Ok(TauriWindow::new(app_handle, &spec.id))
}

pub(crate) struct TauriShortcutRegistrar {
    app_handle: AppHandle,
}

impl TauriShortcutRegistrar {
    pub(crate) fn new(app_handle: &AppHandle) -> Self {
        Self {
            app_handle: app_handle.clone(),
        }
    }
}

impl ShortcutRegistrar for TauriShortcutRegistrar {
    fn register(&mut self, accelerator: &str) -> Result<(), String> {
        self.app_handle
            .global_shortcut()
            .register(accelerator)
            .map_err(|error| error.to_string())
    }

    fn unregister(&mut self, accelerator: &str) -> Result<(), String> {
        self.app_handle
            .global_shortcut()
            .unregister(accelerator)
            .map_err(|error| error.to_string())
    }
}
