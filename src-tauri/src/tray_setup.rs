use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager,
};

use crate::{
    append_desktop_log, runtime_paths, shell_locale, tray_actions, tray_labels, tray_menu_handler,
    window_actions, TrayMenuState, DEFAULT_SHELL_LOCALE, TRAY_ID,
};

pub fn setup_tray(app_handle: &AppHandle) -> Result<(), String> {
    let root_dir = runtime_paths::default_root_dir();
    let locale = shell_locale::resolve_shell_locale(DEFAULT_SHELL_LOCALE, root_dir.as_deref());
    let shell_texts = shell_locale::shell_texts_for_locale(locale);

    // The dashboard only exists after boot, so the tray starts out offering to show it.
    let toggle_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_TOGGLE_DASHBOARD,
        shell_texts.tray_show_dashboard,
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray toggle menu item: {error}"))?;
    let open_setup_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_OPEN_SETUP,
        shell_texts.tray_open_setup,
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray setup menu item: {error}"))?;
    let quit_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_QUIT,
        shell_texts.tray_quit,
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray quit menu item: {error}"))?;
    let separator = PredefinedMenuItem::separator(app_handle)
        .map_err(|error| format!("Failed to create tray separator menu item: {error}"))?;

    let menu = Menu::with_items(
        app_handle,
        &[&toggle_item, &open_setup_item, &separator, &quit_item],
    )
    .map_err(|error| format!("Failed to build tray menu: {error}"))?;

    if !app_handle.manage(TrayMenuState {
        toggle_item: toggle_item.clone(),
        open_setup_item: open_setup_item.clone(),
        quit_item: quit_item.clone(),
    }) {
        append_desktop_log("tray menu state already exists, skipping manage");
    }

    let mut tray_builder = TrayIconBuilder::with_id(TRAY_ID)
        .menu(&menu)
        .tooltip("Kestrel")
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| {
            tray_menu_handler::handle_tray_menu_event(app, event.id().as_ref())
        })
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                tray_labels::update_tray_menu_labels(
                    tray.app_handle(),
                    DEFAULT_SHELL_LOCALE,
                    append_desktop_log,
                );
                if button == MouseButton::Left {
                    window_actions::toggle_dashboard(
                        tray.app_handle(),
                        DEFAULT_SHELL_LOCALE,
                        append_desktop_log,
                    );
                }
            }
        });

    if let Some(icon) = app_handle.default_window_icon() {
        tray_builder = tray_builder.icon(icon.clone());
    } else {
        append_desktop_log("no default window icon; tray uses the platform placeholder");
    }

    tray_builder
        .build(app_handle)
        .map_err(|error| format!("Failed to create tray icon: {error}"))?;

    tray_labels::update_tray_menu_labels(app_handle, DEFAULT_SHELL_LOCALE, append_desktop_log);
    Ok(())
}
