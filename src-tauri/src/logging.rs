use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;

use crate::{runtime_paths, DESKTOP_LOG_FILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogScope {
    Desktop,
    Startup,
    Backend,
}

impl LogScope {
    fn tag(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Startup => "startup",
            Self::Backend => "backend",
        }
    }
}

pub(crate) fn resolve_desktop_log_path() -> Option<PathBuf> {
    runtime_paths::logs_dir().map(|dir| dir.join(DESKTOP_LOG_FILE))
}

pub(crate) fn format_log_line(scope: LogScope, message: &str) -> String {
    format!(
        "[{}] [{}] {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        scope.tag(),
        message.trim_end()
    )
}

pub(crate) fn append_log_line(path: &Path, line: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create log directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| format!("Failed to open log {}: {}", path.display(), error))?;
    file.write_all(line.as_bytes())
        .map_err(|error| format!("Failed to write log {}: {}", path.display(), error))
}

fn append_scoped_log(scope: LogScope, message: &str) {
    let line = format_log_line(scope, message);
    if cfg!(debug_assertions) {
        eprint!("{line}");
    }

    let Some(path) = resolve_desktop_log_path() else {
        return;
    };
    if let Err(error) = append_log_line(&path, &line) {
        eprintln!("{error}");
    }
}

pub(crate) fn append_desktop_log(message: &str) {
    append_scoped_log(LogScope::Desktop, message);
}

pub(crate) fn append_startup_log(message: &str) {
    append_scoped_log(LogScope::Startup, message);
}

pub(crate) fn append_backend_log(message: &str) {
    append_scoped_log(LogScope::Backend, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lines_carry_scope_and_single_newline() {
        let line = format_log_line(LogScope::Backend, "listening on 8000\r\n");
        assert!(line.contains("[backend] listening on 8000\n"));
        assert!(line.ends_with("8000\n"));
    }

    #[test]
    fn append_log_line_creates_missing_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("logs").join("desktop.log");

        append_log_line(&path, "first\n").expect("first append");
        append_log_line(&path, "second\n").expect("second append");

        let written = fs::read_to_string(&path).expect("read log");
        assert_eq!(written, "first\nsecond\n");
    }
}
