use tauri::{AppHandle, Manager};

use crate::{
    shell_state::ShellState,
    shell_window::ShellWindow,
    surfaces::{self, DASHBOARD_WINDOW_ID},
    tauri_window, tray_labels, ui_dispatch,
    window_registry::OpenOutcome,
};

fn dashboard_visibility(app_handle: &AppHandle) -> Option<bool> {
    let state = app_handle.state::<ShellState>();
    state
        .with_manager(|manager| {
            manager
                .window(DASHBOARD_WINDOW_ID)
                .and_then(|window| window.is_visible().ok())
        })
        .ok()
        .flatten()
}

fn set_dashboard_visible<F>(
    app_handle: &AppHandle,
    visible: bool,
    default_shell_locale: &'static str,
    log: F,
) where
    F: Fn(&str),
{
    let state = app_handle.state::<ShellState>();
    let result = state.with_manager(|manager| {
        let window = manager
            .window(DASHBOARD_WINDOW_ID)
            .ok_or_else(|| "dashboard is not open".to_string())?;
        if visible {
            window.show()?;
            window.focus()
        } else {
            window.hide()
        }
    });

    match result {
        Ok(Ok(())) => tray_labels::update_tray_menu_labels_with_visibility(
            app_handle,
            default_shell_locale,
            Some(visible),
            log,
        ),
        Ok(Err(error)) | Err(error) => log(&format!(
            "failed to {} dashboard: {error}",
            if visible { "show" } else { "hide" }
        )),
    }
}

pub fn show_dashboard<F>(app_handle: &AppHandle, default_shell_locale: &'static str, log: F)
where
    F: Fn(&str) + Send + 'static,
{
    let dispatched = ui_dispatch::run_on_main_thread_dispatch(app_handle, "show dashboard", move |app| {
        set_dashboard_visible(app, true, default_shell_locale, log)
    });
    if let Err(error) = dispatched {
        crate::append_desktop_log(&error);
    }
}

pub fn hide_dashboard<F>(app_handle: &AppHandle, default_shell_locale: &'static str, log: F)
where
    F: Fn(&str) + Send + 'static,
{
    let dispatched = ui_dispatch::run_on_main_thread_dispatch(app_handle, "hide dashboard", move |app| {
        set_dashboard_visible(app, false, default_shell_locale, log)
    });
    if let Err(error) = dispatched {
        crate::append_desktop_log(&error);
    }
}

/// Hotkey and tray entry point. Before boot completes there is no dashboard
/// and the toggle is a logged no-op.
pub fn toggle_dashboard<F>(app_handle: &AppHandle, default_shell_locale: &'static str, log: F)
where
    F: Fn(&str) + Copy + Send + 'static,
{
    let dispatched = ui_dispatch::run_on_main_thread_dispatch(app_handle, "toggle dashboard", move |app| {
        if dashboard_visibility(app).is_none() {
            log("toggle_dashboard skipped: dashboard is not open");
            return;
        }
        let state = app.state::<ShellState>();
        match state.with_manager(|manager| manager.toggle_visibility(DASHBOARD_WINDOW_ID)) {
            Ok(Ok(visible)) => tray_labels::update_tray_menu_labels_with_visibility(
                app,
                default_shell_locale,
                Some(visible),
                log,
            ),
            Ok(Err(error)) | Err(error) => log(&format!("failed to toggle dashboard: {error}")),
        }
    });
    if let Err(error) = dispatched {
        crate::append_desktop_log(&error);
    }
}

/// Opens (or focuses) a surface. Must run on the main thread.
pub(crate) fn open_surface(
    app_handle: &AppHandle,
    spec: &surfaces::SurfaceSpec,
) -> Result<OpenOutcome, String> {
    let state = app_handle.state::<ShellState>();
    let profile = state.profile;
    state.with_manager(|manager| {
        manager.open_surface(spec, |spec, icon| {
            tauri_window::build_surface(app_handle, spec, icon, profile)
        })
    })?
}

pub(crate) fn open_setup_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str) + Send + 'static,
{
    let dispatched = ui_dispatch::run_on_main_thread_dispatch(app_handle, "open setup window", move |app| {
        if let Err(error) = open_surface(app, &surfaces::setup_spec()) {
            log(&format!("failed to open setup window: {error}"));
        }
    });
    if let Err(error) = dispatched {
        crate::append_desktop_log(&error);
    }
}
