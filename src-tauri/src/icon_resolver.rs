use std::path::{Path, PathBuf};

use crate::platform::PlatformProfile;

/// Always tried last, on every platform.
pub const UNIVERSAL_ICON_FILE: &str = "icon.png";

/// Decoded RGBA icon shared by every window. An empty image means no icon
/// could be loaded and windows keep whatever the runtime gives them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl IconImage {
    pub fn is_empty(&self) -> bool {
        self.rgba.is_empty() || self.width == 0 || self.height == 0
    }
}

pub fn icon_candidates(icons_dir: &Path, profile: &PlatformProfile) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = profile
        .icon_files
        .iter()
        .filter(|file| **file != UNIVERSAL_ICON_FILE)
        .map(|file| icons_dir.join(file))
        .collect();
    candidates.push(icons_dir.join(UNIVERSAL_ICON_FILE));
    candidates
}

pub fn resolve_icon<F, L>(candidates: &[PathBuf], decode: F, log: L) -> IconImage
where
    F: Fn(&Path) -> Result<IconImage, String>,
    L: Fn(&str),
{
    for candidate in candidates {
        if !candidate.is_file() {
            continue;
        }
        match decode(candidate) {
            Ok(image) if !image.is_empty() => {
                log(&format!("application icon resolved: {}", candidate.display()));
                return image;
            }
            Ok(_) => log(&format!(
                "icon candidate decoded to an empty image: {}",
                candidate.display()
            )),
            Err(error) => log(&format!(
                "failed to decode icon candidate {}: {error}",
                candidate.display()
            )),
        }
    }

    log("no usable application icon found; continuing without one");
    IconImage::default()
}

pub fn decode_icon_file(path: &Path) -> Result<IconImage, String> {
    let image = tauri::image::Image::from_path(path).map_err(|error| error.to_string())?;
    Ok(IconImage {
        rgba: image.rgba().to_vec(),
        width: image.width(),
        height: image.height(),
    })
}
