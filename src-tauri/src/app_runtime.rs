use tauri::{webview::PageLoadEvent, AppHandle, Manager, RunEvent, WindowEvent};
use tauri_plugin_global_shortcut::ShortcutState;

use crate::{
    append_desktop_log, append_startup_log, backend_config, boot_sequence, icon_resolver,
    logging, platform, runtime_paths, shell_state::{self, ShellState},
    surfaces::{self, DASHBOARD_WINDOW_ID},
    tray_setup, ui_dispatch, window_actions, DEFAULT_SHELL_LOCALE,
};

fn resolve_app_icon(app_handle: &AppHandle, profile: &platform::PlatformProfile) -> icon_resolver::IconImage {
    let candidates = match app_handle.path().resource_dir() {
        Ok(resource_dir) => icon_resolver::icon_candidates(&resource_dir.join("icons"), profile),
        Err(error) => {
            append_startup_log(&format!("resource directory is unavailable: {error}"));
            Vec::new()
        }
    };
    icon_resolver::resolve_icon(&candidates, icon_resolver::decode_icon_file, append_startup_log)
}

fn handle_window_event(window: &tauri::Window, event: &WindowEvent) {
    let app_handle = window.app_handle();
    let label = window.label().to_string();

    match event {
        WindowEvent::CloseRequested { api, .. } if label == DASHBOARD_WINDOW_ID => {
            let state = app_handle.state::<ShellState>();
            if state.is_quitting() {
                return;
            }
            api.prevent_close();
            window_actions::hide_dashboard(app_handle, DEFAULT_SHELL_LOCALE, append_desktop_log);
        }
        WindowEvent::Focused(false) => {
            ui_dispatch::defer_to_main_thread(app_handle, "window focus lost", move |app| {
                let state = app.state::<ShellState>();
                if let Err(error) = state.with_manager(|manager| manager.on_focus_lost(&label)) {
                    append_desktop_log(&format!("failed to handle focus loss of {label}: {error}"));
                }
            });
        }
        WindowEvent::Moved(_) => {
            ui_dispatch::defer_to_main_thread(app_handle, "window moved", move |app| {
                let state = app.state::<ShellState>();
                if let Err(error) = state.with_manager(|manager| manager.on_window_moved(&label)) {
                    append_desktop_log(&format!("failed to handle move of {label}: {error}"));
                }
            });
        }
        WindowEvent::Destroyed => {
            ui_dispatch::defer_to_main_thread(app_handle, "window destroyed", move |app| {
                let state = app.state::<ShellState>();
                if let Ok(true) = state.with_manager(|manager| manager.on_window_destroyed(&label)) {
                    append_desktop_log(&format!("window {label} destroyed"));
                }
            });
        }
        _ => {}
    }
}

fn handle_exit_requested(app_handle: &AppHandle, code: Option<i32>, api: &tauri::ExitRequestApi) {
    let state = app_handle.state::<ShellState>();
    // Closing the last window keeps the shell alive in the tray.
    if code.is_none() && !state.is_quitting() {
        api.prevent_exit();
    }
}

fn handle_exit_event(app_handle: &AppHandle) {
    let state = app_handle.state::<ShellState>();
    state.mark_quitting();
    match state.with_hotkey(|binding| binding.unbind()) {
        Ok(Ok(())) => {}
        Ok(Err(error)) | Err(error) => append_desktop_log(&format!("failed to release hotkey: {error}")),
    }
    state.backend.stop();
    append_desktop_log("desktop process exiting");
}

pub(crate) fn run() {
    append_startup_log("desktop process starting");
    if let Some(log_path) = logging::resolve_desktop_log_path() {
        append_startup_log(&format!("desktop log path: {}", log_path.display()));
    }

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            append_desktop_log("second instance launched; showing dashboard");
            window_actions::show_dashboard(app, DEFAULT_SHELL_LOCALE, append_desktop_log);
        }))
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, _shortcut, event| {
                    if event.state() != ShortcutState::Pressed {
                        return;
                    }
                    let state = app.state::<ShellState>();
                    if state.accept_hotkey_press() {
                        window_actions::toggle_dashboard(app, DEFAULT_SHELL_LOCALE, append_desktop_log);
                    }
                })
                .build(),
        )
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_is_desktop_runtime,
            crate::desktop_bridge_commands::desktop_bridge_open_window,
            crate::desktop_bridge_commands::desktop_bridge_close_window,
            crate::desktop_bridge_commands::desktop_bridge_minimize_window,
            crate::desktop_bridge_commands::desktop_bridge_maximize_window,
            crate::desktop_bridge_commands::desktop_bridge_set_window_pinned,
            crate::desktop_bridge_commands::desktop_bridge_start_resize,
            crate::desktop_bridge_commands::desktop_bridge_stop_resize,
            crate::desktop_bridge_commands::desktop_bridge_start_window_drag,
            crate::desktop_bridge_commands::desktop_bridge_get_server_status,
            crate::desktop_bridge_commands::desktop_bridge_get_api_base_url,
            crate::desktop_bridge_commands::desktop_bridge_get_ws_base_url,
            crate::desktop_bridge_commands::desktop_bridge_get_hotkey,
            crate::desktop_bridge_commands::desktop_bridge_set_hotkey,
            crate::desktop_bridge_commands::desktop_bridge_signal_loader_ready,
            crate::desktop_bridge_commands::desktop_bridge_open_setup_window,
            crate::desktop_bridge_commands::desktop_bridge_signal_setup_complete,
            crate::desktop_bridge_commands::desktop_bridge_override_health_gate,
            crate::desktop_bridge_commands::desktop_bridge_set_shell_locale,
        ])
        .on_window_event(handle_window_event)
        .on_page_load(|webview, payload| {
            if let PageLoadEvent::Finished = payload.event() {
                append_desktop_log(&format!("page-load finished: {}", payload.url()));
                let label = webview.label().to_string();
                ui_dispatch::defer_to_main_thread(webview.app_handle(), "window ready", move |app| {
                    let state = app.state::<ShellState>();
                    if let Err(error) = state.with_manager(|manager| manager.on_window_ready(&label)) {
                        append_desktop_log(&format!("failed to re-apply icon to {label}: {error}"));
                    }
                });
            }
        })
        .setup(|app| {
            let app_handle = app.handle().clone();
            let root_dir = runtime_paths::default_root_dir();
            let profile = platform::current_profile();
            append_startup_log(&format!("platform profile: {}", profile.platform.id()));
            #[cfg(target_os = "macos")]
            if !profile.show_dock_icon {
                app.set_activation_policy(tauri::ActivationPolicy::Accessory);
            }

            let config_path = backend_config::config_file_path(root_dir.as_deref());
            let endpoint =
                backend_config::load_backend_endpoint(config_path.as_deref(), append_startup_log);
            append_startup_log(&format!("backend endpoint: {}", endpoint.api_base_url()));

            let icon = resolve_app_icon(&app_handle, profile);
            app.manage(ShellState::new(&app_handle, icon, endpoint, root_dir, profile));

            if let Err(error) = tray_setup::setup_tray(&app_handle) {
                append_startup_log(&format!("failed to initialize tray: {error}"));
            }
            shell_state::spawn_timer_driver(app_handle.clone());

            if let Err(error) = window_actions::open_surface(&app_handle, &surfaces::loader_spec()) {
                append_startup_log(&format!("failed to open loader window: {error}"));
            }
            boot_sequence::launch_backend(&app_handle);
            boot_sequence::spawn_boot_sequence(app_handle);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { code, api, .. } => {
                handle_exit_requested(app_handle, code, &api);
            }
            RunEvent::Exit => handle_exit_event(app_handle),
            _ => {}
        });
}
