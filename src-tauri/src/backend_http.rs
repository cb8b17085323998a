use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    backend_config::BackendEndpoint,
    health_gate::{HealthProbe, ProviderSettings},
};

#[derive(Debug, Default, Deserialize)]
struct HealthFailureBody {
    component: Option<String>,
    detail: Option<String>,
}

/// Turns a 503 body into `"<component>: <detail>"`, or whichever part is
/// present. Bodies that are not the structured shape yield `None`.
pub(crate) fn parse_health_failure(body: &str) -> Option<String> {
    let parsed: HealthFailureBody = serde_json::from_str(body).ok()?;
    let component = parsed
        .component
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    let detail = parsed
        .detail
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    match (component, detail) {
        (Some(component), Some(detail)) => Some(format!("{component}: {detail}")),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BackendClient {
    http: reqwest::Client,
    health_url: String,
    settings_url: String,
}

impl BackendClient {
    pub(crate) fn new(endpoint: &BackendEndpoint) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(|error| format!("Failed to build backend HTTP client: {error}"))?;
        Ok(Self {
            http,
            health_url: endpoint.health_url(),
            settings_url: endpoint.settings_url(),
        })
    }

    pub(crate) async fn probe_health(&self, timeout: Duration) -> HealthProbe {
        let response = match self.http.get(&self.health_url).timeout(timeout).send().await {
            Ok(response) => response,
            Err(error) => {
                return HealthProbe::Unreachable {
                    error: error.to_string(),
                }
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            return HealthProbe::Healthy;
        }

        let cause = if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .text()
                .await
                .ok()
                .and_then(|body| parse_health_failure(&body))
        } else {
            None
        };
        HealthProbe::NotReady {
            cause: cause.or_else(|| Some(format!("backend answered {status}"))),
        }
    }

    pub(crate) async fn fetch_settings(&self, timeout: Duration) -> Result<ProviderSettings, String> {
        let response = self
            .http
            .get(&self.settings_url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|error| format!("Failed to reach settings endpoint: {error}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Settings endpoint answered {status}"));
        }

        response
            .json::<ProviderSettings>()
            .await
            .map_err(|error| format!("Failed to decode settings response: {error}"))
    }
}
