use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use url::Url;

use crate::CONFIG_PATH_ENV;

pub(crate) const DEFAULT_BACKEND_HOST: &str = "127.0.0.1";
pub(crate) const DEFAULT_BACKEND_PORT: u16 = 8000;
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BackendEndpoint {
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl Default for BackendEndpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_BACKEND_HOST.to_string(),
            port: DEFAULT_BACKEND_PORT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: Option<ServerSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    host: Option<String>,
    port: Option<u16>,
}

impl BackendEndpoint {
    pub(crate) fn api_base_url(&self) -> String {
        self.base_url("http", "")
    }

    pub(crate) fn ws_base_url(&self) -> String {
        self.base_url("ws", "/ws")
    }

    pub(crate) fn health_url(&self) -> String {
        self.base_url("http", "/health")
    }

    pub(crate) fn settings_url(&self) -> String {
        self.base_url("http", "/api/settings")
    }

    fn base_url(&self, scheme: &str, path: &str) -> String {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let raw = format!("{scheme}://{host}:{}{path}", self.port);

        // Normalized through `Url`; the raw string is kept if it does not parse.
        match Url::parse(&raw) {
            Ok(url) if path.is_empty() => url.as_str().trim_end_matches('/').to_string(),
            Ok(url) => url.to_string(),
            Err(_) => raw,
        }
    }
}

pub(crate) fn config_file_path(root_dir: Option<&Path>) -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path.trim());
        if !path.as_os_str().is_empty() {
            return Some(path);
        }
    }

    root_dir.map(|root| root.join(CONFIG_FILE_NAME))
}

pub(crate) fn parse_backend_endpoint(raw: &str) -> Result<BackendEndpoint, String> {
    let parsed: ConfigFile = serde_json::from_str(raw)
        .map_err(|error| format!("Failed to parse backend config: {error}"))?;
    let server = parsed.server.unwrap_or_default();
    let defaults = BackendEndpoint::default();

    Ok(BackendEndpoint {
        host: server
            .host
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or(defaults.host),
        port: server.port.filter(|port| *port != 0).unwrap_or(defaults.port),
    })
}

/// One-shot read of the backend address. Any failure falls back to the
/// default endpoint and is reported through `log`.
pub(crate) fn load_backend_endpoint<L>(path: Option<&Path>, log: L) -> BackendEndpoint
where
    L: Fn(&str),
{
    let Some(path) = path else {
        log("backend config path is unavailable; using default endpoint");
        return BackendEndpoint::default();
    };

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            log(&format!(
                "backend config {} not found; using default endpoint",
                path.display()
            ));
            return BackendEndpoint::default();
        }
        Err(error) => {
            log(&format!(
                "failed to read backend config {}: {}; using default endpoint",
                path.display(),
                error
            ));
            return BackendEndpoint::default();
        }
    };

    parse_backend_endpoint(&raw).unwrap_or_else(|error| {
        log(&format!("{error}; using default endpoint"));
        BackendEndpoint::default()
    })
}
