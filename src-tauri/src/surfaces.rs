use crate::geometry::Size;

pub const LOADER_WINDOW_ID: &str = "loader";
pub const SETUP_WINDOW_ID: &str = "setup";
pub const DASHBOARD_WINDOW_ID: &str = "dashboard";

pub const FLOATING_PANEL_SIZE: Size = Size::new(420, 560);
pub const FLOATING_PANEL_MIN_SIZE: Size = Size::new(320, 240);
const MAX_FLOATING_ID_LEN: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Loader,
    Setup,
    Dashboard,
    Floating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Center,
    TopCenter { offset: i32 },
    /// Left to the floating layout engine.
    Grid,
}

/// Everything needed to build one surface, independent of the windowing
/// backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub id: String,
    pub kind: SurfaceKind,
    pub title: String,
    pub page: String,
    pub size: Size,
    pub min_size: Size,
    pub resizable: bool,
    pub frameless: bool,
    pub pinned: bool,
    pub placement: Placement,
}

pub fn loader_spec() -> SurfaceSpec {
    SurfaceSpec {
        id: LOADER_WINDOW_ID.to_string(),
        kind: SurfaceKind::Loader,
        title: "Kestrel".to_string(),
        page: "loader.html".to_string(),
        size: Size::new(440, 300),
        min_size: Size::new(440, 300),
        resizable: false,
        frameless: true,
        pinned: true,
        placement: Placement::Center,
    }
}

pub fn setup_spec() -> SurfaceSpec {
    SurfaceSpec {
        id: SETUP_WINDOW_ID.to_string(),
        kind: SurfaceKind::Setup,
        title: "Kestrel Setup".to_string(),
        page: "setup.html".to_string(),
        size: Size::new(620, 680),
        min_size: Size::new(520, 560),
        resizable: true,
        frameless: false,
        pinned: false,
        placement: Placement::Center,
    }
}

pub fn dashboard_spec() -> SurfaceSpec {
    SurfaceSpec {
        id: DASHBOARD_WINDOW_ID.to_string(),
        kind: SurfaceKind::Dashboard,
        title: "Kestrel".to_string(),
        page: "dashboard.html".to_string(),
        size: Size::new(760, 96),
        min_size: Size::new(480, 72),
        resizable: true,
        frameless: true,
        pinned: true,
        placement: Placement::TopCenter { offset: 12 },
    }
}

pub fn floating_spec(id: &str, title: &str) -> Result<SurfaceSpec, String> {
    if !is_valid_floating_id(id) {
        return Err(format!("Invalid window id '{id}'."));
    }

    let title = match title.trim() {
        "" => id,
        trimmed => trimmed,
    };
    Ok(SurfaceSpec {
        id: id.to_string(),
        kind: SurfaceKind::Floating,
        title: title.to_string(),
        page: format!("panel.html?feature={id}"),
        size: FLOATING_PANEL_SIZE,
        min_size: FLOATING_PANEL_MIN_SIZE,
        resizable: true,
        frameless: true,
        pinned: false,
        placement: Placement::Grid,
    })
}

/// Floating ids double as window labels, so they are restricted to a safe
/// charset and may not shadow a built-in surface.
pub fn is_valid_floating_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_FLOATING_ID_LEN
        && ![LOADER_WINDOW_ID, SETUP_WINDOW_ID, DASHBOARD_WINDOW_ID].contains(&id)
        && id
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floating_ids_are_restricted() {
        assert!(is_valid_floating_id("chat"));
        assert!(is_valid_floating_id("memory-browser_2"));
        assert!(!is_valid_floating_id(""));
        assert!(!is_valid_floating_id("dashboard"));
        assert!(!is_valid_floating_id("Chat"));
        assert!(!is_valid_floating_id("../etc"));
        assert!(!is_valid_floating_id(&"x".repeat(49)));
    }

    #[test]
    fn floating_title_falls_back_to_the_id() {
        let spec = floating_spec("logs", "  ").expect("valid spec");
        assert_eq!(spec.title, "logs");
        assert_eq!(spec.page, "panel.html?feature=logs");
        assert!(floating_spec("setup", "Setup").is_err());
    }
}
