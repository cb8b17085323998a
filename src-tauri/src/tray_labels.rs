use tauri::{menu::MenuItem, AppHandle, Manager};

use crate::{
    runtime_paths, shell_locale, shell_state::ShellState, shell_window::ShellWindow,
    surfaces::DASHBOARD_WINDOW_ID, tray_actions, TrayMenuState,
};

fn set_menu_text_safe<F>(item: &MenuItem<tauri::Wry>, text: &str, item_name: &str, log: F)
where
    F: Fn(&str),
{
    if let Err(error) = item.set_text(text) {
        log(&format!(
            "failed to update tray menu text for {}: {}",
            item_name, error
        ));
    }
}

pub fn update_tray_menu_labels<F>(
    app_handle: &AppHandle,
    default_shell_locale: &'static str,
    log: F,
) where
    F: Fn(&str),
{
    update_tray_menu_labels_with_visibility(app_handle, default_shell_locale, None, log);
}

pub fn update_tray_menu_labels_with_visibility<F>(
    app_handle: &AppHandle,
    default_shell_locale: &'static str,
    visible_override: Option<bool>,
    log: F,
) where
    F: Fn(&str),
{
    let Some(tray_state) = app_handle.try_state::<TrayMenuState>() else {
        return;
    };

    let root_dir = runtime_paths::default_root_dir();
    let locale = shell_locale::resolve_shell_locale(default_shell_locale, root_dir.as_deref());
    let shell_texts = shell_locale::shell_texts_for_locale(locale);
    let effective_visible = visible_override.unwrap_or_else(|| {
        app_handle
            .try_state::<ShellState>()
            .and_then(|state| {
                state
                    .with_manager(|manager| {
                        manager
                            .window(DASHBOARD_WINDOW_ID)
                            .and_then(|window| window.is_visible().ok())
                    })
                    .ok()
                    .flatten()
            })
            .unwrap_or(false)
    });

    let toggle_label = if effective_visible {
        shell_texts.tray_hide_dashboard
    } else {
        shell_texts.tray_show_dashboard
    };

    set_menu_text_safe(
        &tray_state.toggle_item,
        toggle_label,
        tray_actions::TRAY_MENU_TOGGLE_DASHBOARD,
        &log,
    );
    set_menu_text_safe(
        &tray_state.open_setup_item,
        shell_texts.tray_open_setup,
        tray_actions::TRAY_MENU_OPEN_SETUP,
        &log,
    );
    set_menu_text_safe(
        &tray_state.quit_item,
        shell_texts.tray_quit,
        tray_actions::TRAY_MENU_QUIT,
        &log,
    );
}
