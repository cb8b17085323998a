use tauri::{AppHandle, Manager, WebviewWindow};

use crate::{
    append_desktop_log, boot_sequence, desktop_state, resize_session::ResizeDirection,
    shell_locale,
    shell_state::{ShellState, ShellWindowManager},
    surfaces, tray_labels, ui_dispatch, window_actions,
    ServerStatus, ShellBridgeResult, DEFAULT_HOTKEY, DEFAULT_SHELL_LOCALE,
};

/// Runs `task` against the window manager on the main thread.
async fn with_manager_on_main<T, F>(
    app_handle: &AppHandle,
    task_name: &'static str,
    task: F,
) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&mut ShellWindowManager) -> Result<T, String> + Send + 'static,
{
    ui_dispatch::run_on_main_thread_with_result(app_handle, task_name, move |app| {
        app.state::<ShellState>().with_manager(task)?
    })
    .await?
}

fn log_failure(command: &str, result: Result<(), String>) -> ShellBridgeResult {
    if let Err(error) = &result {
        append_desktop_log(&format!("{command} failed: {error}"));
    }
    result.into()
}

#[tauri::command]
pub(crate) fn desktop_bridge_is_desktop_runtime() -> bool {
    true
}

#[tauri::command]
pub(crate) async fn desktop_bridge_open_window(
    app_handle: AppHandle,
    id: String,
    title: Option<String>,
) -> ShellBridgeResult {
    let spec = match surfaces::floating_spec(&id, title.as_deref().unwrap_or_default()) {
        Ok(spec) => spec,
        Err(error) => return ShellBridgeResult::failed(error),
    };

    let result = ui_dispatch::run_on_main_thread_with_result(&app_handle, "open window", move |app| {
        window_actions::open_surface(app, &spec).map(|_| ())
    })
    .await
    .and_then(|result| result);
    log_failure("open_window", result)
}

#[tauri::command]
pub(crate) async fn desktop_bridge_close_window(app_handle: AppHandle, id: String) -> ShellBridgeResult {
    let result = with_manager_on_main(&app_handle, "close window", move |manager| {
        if manager.close(&id) {
            Ok(())
        } else {
            Err(format!("Window '{id}' is not open."))
        }
    })
    .await;
    result.into()
}

#[tauri::command]
pub(crate) async fn desktop_bridge_minimize_window(
    app_handle: AppHandle,
    window: WebviewWindow,
) -> ShellBridgeResult {
    let label = window.label().to_string();
    let result = with_manager_on_main(&app_handle, "minimize window", move |manager| {
        manager.minimize(&label)
    })
    .await;
    log_failure("minimize_window", result)
}

/// Toggles between the window's own bounds and the primary work area.
#[tauri::command]
pub(crate) async fn desktop_bridge_maximize_window(
    app_handle: AppHandle,
    window: WebviewWindow,
) -> ShellBridgeResult {
    let label = window.label().to_string();
    let result = with_manager_on_main(&app_handle, "maximize window", move |manager| {
        manager.toggle_expand(&label).map(|_| ())
    })
    .await;
    log_failure("maximize_window", result)
}

#[tauri::command]
pub(crate) async fn desktop_bridge_set_window_pinned(
    app_handle: AppHandle,
    window: WebviewWindow,
    pinned: bool,
) -> ShellBridgeResult {
    let label = window.label().to_string();
    let result = with_manager_on_main(&app_handle, "set window pinned", move |manager| {
        manager.set_pinned(&label, pinned)
    })
    .await;
    log_failure("set_window_pinned", result)
}

#[tauri::command]
pub(crate) async fn desktop_bridge_start_resize(
    app_handle: AppHandle,
    window: WebviewWindow,
    direction: String,
) -> ShellBridgeResult {
    let Some(direction) = ResizeDirection::parse(&direction) else {
        return ShellBridgeResult::failed(format!("Unsupported resize direction '{direction}'."));
    };
    let label = window.label().to_string();
    let result = with_manager_on_main(&app_handle, "start resize", move |manager| {
        manager.start_resize(&label, direction)
    })
    .await;
    log_failure("start_resize", result)
}

#[tauri::command]
pub(crate) async fn desktop_bridge_stop_resize(app_handle: AppHandle) -> ShellBridgeResult {
    let result = with_manager_on_main(&app_handle, "stop resize", |manager| {
        manager.stop_resize();
        Ok(())
    })
    .await;
    result.into()
}

/// Marks the drag so the following moves exclude the window from auto
/// layout, then hands the drag to the OS outside the manager lock.
#[tauri::command]
pub(crate) async fn desktop_bridge_start_window_drag(
    app_handle: AppHandle,
    window: WebviewWindow,
) -> ShellBridgeResult {
    let label = window.label().to_string();
    let result = ui_dispatch::run_on_main_thread_with_result(&app_handle, "start window drag", move |app| {
        let state = app.state::<ShellState>();
        state.with_manager(|manager| manager.on_drag_begin(&label))?;
        let Some(window) = app.get_webview_window(&label) else {
            return Err(format!("Window '{label}' no longer exists."));
        };
        window
            .start_dragging()
            .map_err(|error| format!("Failed to start dragging '{label}': {error}"))
    })
    .await
    .and_then(|result| result);
    log_failure("start_window_drag", result)
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_server_status(app_handle: AppHandle) -> ServerStatus {
    let state = app_handle.state::<ShellState>();
    ServerStatus {
        gate: state.gate.status(),
        boot_step: state.boot_step(),
        backend_managed: state.backend.is_running(),
        api_base_url: state.endpoint.api_base_url(),
    }
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_api_base_url(app_handle: AppHandle) -> String {
    app_handle.state::<ShellState>().endpoint.api_base_url()
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_ws_base_url(app_handle: AppHandle) -> String {
    app_handle.state::<ShellState>().endpoint.ws_base_url()
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_hotkey(app_handle: AppHandle) -> String {
    let state = app_handle.state::<ShellState>();
    state
        .with_hotkey(|binding| binding.current().map(str::to_string))
        .ok()
        .flatten()
        .or_else(|| {
            state
                .root_dir
                .as_deref()
                .map(desktop_state::desktop_state_path)
                .and_then(|path| desktop_state::read_state_field(&path, desktop_state::HOTKEY_FIELD))
        })
        .unwrap_or_else(|| DEFAULT_HOTKEY.to_string())
}

/// Rebinds the global hotkey and persists the key once the OS accepted it.
#[tauri::command]
pub(crate) async fn desktop_bridge_set_hotkey(app_handle: AppHandle, key: String) -> ShellBridgeResult {
    let result = ui_dispatch::run_on_main_thread_with_result(&app_handle, "set hotkey", move |app| {
        let state = app.state::<ShellState>();
        state.with_hotkey(|binding| binding.bind(&key, append_desktop_log))??;

        let Some(root_dir) = state.root_dir.as_deref() else {
            append_desktop_log("desktop state path is unavailable; hotkey is not persisted");
            return Ok(());
        };
        let bound = key.trim();
        desktop_state::write_state_field(
            &desktop_state::desktop_state_path(root_dir),
            desktop_state::HOTKEY_FIELD,
            Some(bound),
            append_desktop_log,
        )
    })
    .await
    .and_then(|result| result);
    log_failure("set_hotkey", result)
}

/// The loader page subscribed to boot events; replays what it missed.
#[tauri::command]
pub(crate) async fn desktop_bridge_signal_loader_ready(app_handle: AppHandle) -> ShellBridgeResult {
    let result = ui_dispatch::run_on_main_thread_with_result(&app_handle, "signal loader ready", |app| {
        let replayed = app.state::<ShellState>().replay_boot_transcript()?;
        append_desktop_log(&format!("loader ready; replayed {replayed} boot events"));
        Ok(())
    })
    .await
    .and_then(|result| result);
    log_failure("signal_loader_ready", result)
}

#[tauri::command]
pub(crate) fn desktop_bridge_open_setup_window(app_handle: AppHandle) -> ShellBridgeResult {
    window_actions::open_setup_window(&app_handle, append_desktop_log);
    ShellBridgeResult::ok()
}

#[tauri::command]
pub(crate) async fn desktop_bridge_signal_setup_complete(app_handle: AppHandle) -> ShellBridgeResult {
    if app_handle.state::<ShellState>().gate.signal_setup_complete() {
        append_desktop_log("setup completed; waiting for backend health");
    }

    let closed = with_manager_on_main(&app_handle, "close setup window", |manager| {
        Ok(manager.close(surfaces::SETUP_WINDOW_ID))
    })
    .await;
    log_failure("signal_setup_complete", closed.map(|_| ()))
}

/// Skips the remaining health checks once the loader offered the override.
#[tauri::command]
pub(crate) fn desktop_bridge_override_health_gate(app_handle: AppHandle) -> ShellBridgeResult {
    let state = app_handle.state::<ShellState>();
    match state.gate.force_ready() {
        Ok(true) => {
            append_desktop_log("health gate overridden by user");
            boot_sequence::enter_ready(&app_handle);
            ShellBridgeResult::ok()
        }
        Ok(false) => ShellBridgeResult::ok(),
        Err(error) => ShellBridgeResult::failed(error),
    }
}

#[tauri::command]
pub(crate) fn desktop_bridge_set_shell_locale(
    app_handle: AppHandle,
    locale: Option<String>,
) -> ShellBridgeResult {
    let state = app_handle.state::<ShellState>();
    match shell_locale::write_cached_shell_locale(
        locale.as_deref(),
        state.root_dir.as_deref(),
        append_desktop_log,
    ) {
        Ok(()) => {
            tray_labels::update_tray_menu_labels(
                &app_handle,
                DEFAULT_SHELL_LOCALE,
                append_desktop_log,
            );
            ShellBridgeResult::ok()
        }
        Err(error) => {
            append_desktop_log(&format!("failed to persist shell locale: {error}"));
            ShellBridgeResult::failed(error)
        }
    }
}
