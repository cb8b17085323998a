use std::{env, path::Path};

use crate::{desktop_state, LOCALE_ENV};

#[derive(Debug, Clone, Copy)]
pub struct ShellTexts {
    pub tray_hide_dashboard: &'static str,
    pub tray_show_dashboard: &'static str,
    pub tray_open_setup: &'static str,
    pub tray_quit: &'static str,
}

pub fn shell_texts_for_locale(locale: &str) -> ShellTexts {
    if locale == "zh-CN" {
        return ShellTexts {
            tray_hide_dashboard: "隐藏面板",
            tray_show_dashboard: "显示面板",
            tray_open_setup: "打开设置",
            tray_quit: "退出 Kestrel",
        };
    }

    ShellTexts {
        tray_hide_dashboard: "Hide Dashboard",
        tray_show_dashboard: "Show Dashboard",
        tray_open_setup: "Open Setup",
        tray_quit: "Quit Kestrel",
    }
}

pub fn resolve_shell_locale(default_shell_locale: &'static str, root_dir: Option<&Path>) -> &'static str {
    if let Some(locale) = root_dir
        .map(desktop_state::desktop_state_path)
        .and_then(|path| desktop_state::read_state_field(&path, desktop_state::LOCALE_FIELD))
        .and_then(|locale| normalize_shell_locale(&locale))
    {
        return locale;
    }

    for env_key in [LOCALE_ENV, "LC_ALL", "LANG"] {
        if let Ok(value) = env::var(env_key) {
            if let Some(locale) = normalize_shell_locale(&value) {
                return locale;
            }
        }
    }

    default_shell_locale
}

pub(crate) fn normalize_shell_locale(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw == "zh-CN" {
        return Some("zh-CN");
    }
    if raw == "en-US" {
        return Some("en-US");
    }

    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("zh") {
        return Some("zh-CN");
    }
    if lowered.starts_with("en") {
        return Some("en-US");
    }
    None
}

/// Persists the locale, or clears it when it is absent or unsupported.
pub(crate) fn write_cached_shell_locale<L>(
    locale: Option<&str>,
    root_dir: Option<&Path>,
    log: L,
) -> Result<(), String>
where
    L: Fn(&str),
{
    let normalized_locale = locale.and_then(normalize_shell_locale);
    if let Some(raw_locale) = locale {
        if normalized_locale.is_none() {
            log(&format!(
                "unsupported shell locale '{raw_locale}'; clearing cached locale"
            ));
        }
    }

    let Some(root_dir) = root_dir else {
        log("shell locale state path is unavailable; skipping locale persistence");
        return Ok(());
    };

    desktop_state::write_state_field(
        &desktop_state::desktop_state_path(root_dir),
        desktop_state::LOCALE_FIELD,
        normalized_locale,
        log,
    )
}
