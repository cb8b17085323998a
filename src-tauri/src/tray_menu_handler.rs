use tauri::{AppHandle, Manager};

use crate::{
    append_desktop_log, shell_state::ShellState, tray_actions, window_actions,
    DEFAULT_SHELL_LOCALE,
};

pub fn handle_tray_menu_event(app_handle: &AppHandle, menu_id: &str) {
    match tray_actions::action_from_menu_id(menu_id) {
        Some(tray_actions::TrayMenuAction::ToggleDashboard) => {
            window_actions::toggle_dashboard(app_handle, DEFAULT_SHELL_LOCALE, append_desktop_log)
        }
        Some(tray_actions::TrayMenuAction::OpenSetup) => {
            append_desktop_log("tray requested setup window");
            window_actions::open_setup_window(app_handle, append_desktop_log);
        }
        Some(tray_actions::TrayMenuAction::Quit) => {
            let state = app_handle.state::<ShellState>();
            state.mark_quitting();
            append_desktop_log("tray quit requested, exiting desktop process");
            app_handle.exit(0);
        }
        None => {}
    }
}
