pub(crate) const DEFAULT_SHELL_LOCALE: &str = "en-US";
pub(crate) const DEFAULT_HOTKEY: &str = "CommandOrControl+Shift+Space";
pub(crate) const DEFAULT_ROOT_DIR_NAME: &str = ".kestrel";

pub(crate) const ROOT_DIR_ENV: &str = "KESTREL_ROOT";
pub(crate) const CONFIG_PATH_ENV: &str = "KESTREL_CONFIG";
pub(crate) const BACKEND_CMD_ENV: &str = "KESTREL_BACKEND_CMD";
pub(crate) const BACKEND_CWD_ENV: &str = "KESTREL_BACKEND_CWD";
pub(crate) const LOCALE_ENV: &str = "KESTREL_DESKTOP_LOCALE";

pub(crate) const TRAY_ID: &str = "kestrel-tray";
pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";

pub(crate) const BACKEND_LOG_EVENT: &str = "backend-log";
pub(crate) const BOOT_STEP_EVENT: &str = "boot-step";
pub(crate) const BOOT_ERROR_EVENT: &str = "boot-error";
pub(crate) const BOOT_OVERRIDE_EVENT: &str = "boot-override-available";
pub(crate) const WINDOW_CLOSED_EVENT: &str = "window-closed";

/// Backend lines kept for replay when the loader page signals it is ready.
pub(crate) const BOOT_LOG_REPLAY_LIMIT: usize = 200;
pub(crate) const BACKEND_EXIT_POLL_INTERVAL_MS: u64 = 500;
