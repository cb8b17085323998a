pub const TRAY_MENU_TOGGLE_DASHBOARD: &str = "tray_toggle_dashboard";
pub const TRAY_MENU_OPEN_SETUP: &str = "tray_open_setup";
pub const TRAY_MENU_QUIT: &str = "tray_quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayMenuAction {
    ToggleDashboard,
    OpenSetup,
    Quit,
}

pub fn action_from_menu_id(menu_id: &str) -> Option<TrayMenuAction> {
    match menu_id {
        TRAY_MENU_TOGGLE_DASHBOARD => Some(TrayMenuAction::ToggleDashboard),
        TRAY_MENU_OPEN_SETUP => Some(TrayMenuAction::OpenSetup),
        TRAY_MENU_QUIT => Some(TrayMenuAction::Quit),
        _ => None,
    }
}
