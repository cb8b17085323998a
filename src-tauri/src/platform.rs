#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
        }
    }
}

/// Per-platform window attributes, looked up once at startup instead of being
/// branched on while each surface is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    pub platform: Platform,
    /// Icon files under the icons directory, most preferred first. The
    /// universal PNG is appended by the icon resolver.
    pub icon_files: &'static [&'static str],
    /// Framed surfaces draw content under a transparent title bar.
    pub overlay_title_bar: bool,
    /// Floating panels stay out of the taskbar/dock window list.
    pub skip_taskbar_for_panels: bool,
    /// Pinned surfaces follow the user across virtual desktops and
    /// full-screen spaces.
    pub visible_on_all_workspaces: bool,
    /// Keep the application icon in the dock while only panels are open.
    pub show_dock_icon: bool,
}

const PLATFORM_PROFILES: [PlatformProfile; 3] = [
    PlatformProfile {
        platform: Platform::MacOs,
        icon_files: &["128x128@2x.png", "128x128.png"],
        overlay_title_bar: true,
        skip_taskbar_for_panels: true,
        visible_on_all_workspaces: true,
        show_dock_icon: false,
    },
    PlatformProfile {
        platform: Platform::Windows,
        icon_files: &["icon.ico", "128x128@2x.png"],
        overlay_title_bar: false,
        skip_taskbar_for_panels: true,
        visible_on_all_workspaces: false,
        show_dock_icon: true,
    },
    PlatformProfile {
        platform: Platform::Linux,
        icon_files: &["128x128@2x.png", "128x128.png", "32x32.png"],
        overlay_title_bar: false,
        skip_taskbar_for_panels: false,
        visible_on_all_workspaces: true,
        show_dock_icon: true,
    },
];

pub fn profile_for(platform: Platform) -> &'static PlatformProfile {
    PLATFORM_PROFILES
        .iter()
        .find(|profile| profile.platform == platform)
        .unwrap_or(&PLATFORM_PROFILES[2])
}

pub fn current_profile() -> &'static PlatformProfile {
    profile_for(Platform::current())
}
