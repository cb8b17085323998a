use std::{env, path::PathBuf};

use crate::{DEFAULT_ROOT_DIR_NAME, ROOT_DIR_ENV};

/// Root of everything the shell writes: config, logs and desktop state.
pub(crate) fn default_root_dir() -> Option<PathBuf> {
    if let Ok(root) = env::var(ROOT_DIR_ENV) {
        let path = PathBuf::from(root.trim());
        if !path.as_os_str().is_empty() {
            return Some(path);
        }
    }

    home::home_dir().map(|home| home.join(DEFAULT_ROOT_DIR_NAME))
}

pub(crate) fn logs_dir() -> Option<PathBuf> {
    default_root_dir().map(|root| root.join("logs"))
}
