#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_runtime;
mod app_types;
mod backend_config;
mod backend_http;
mod backend_process;
mod boot_sequence;
mod bounds_snapshot;
mod desktop_bridge;
mod desktop_bridge_commands;
mod desktop_state;
mod floating_layout;
mod geometry;
mod health_gate;
mod hotkey;
mod icon_resolver;
mod logging;
mod platform;
mod resize_session;
mod runtime_paths;
mod scheduler;
mod shell_locale;
mod shell_state;
mod shell_window;
mod surfaces;
mod tauri_window;
#[cfg(test)]
mod test_support;
mod topmost;
mod tray_actions;
mod tray_labels;
mod tray_menu_handler;
mod tray_setup;
mod ui_dispatch;
mod window_actions;
mod window_manager;
mod window_registry;

pub(crate) use app_constants::*;
pub(crate) use app_types::{AtomicFlagGuard, ServerStatus, ShellBridgeResult, TrayMenuState};
pub(crate) use logging::{append_backend_log, append_desktop_log, append_startup_log};

fn main() {
    app_runtime::run();
}
