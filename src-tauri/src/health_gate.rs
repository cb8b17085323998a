use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering},
        Mutex,
    },
    time::Duration,
};

use serde::{Deserialize, Serialize};

pub const SETTINGS_POLL_INTERVAL: Duration = Duration::from_millis(1_500);
pub const HEALTH_POLL_INTERVAL: Duration = Duration::from_millis(1_000);
pub const HEALTH_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);
/// Used until the first round trip completes, so a cold-starting backend is
/// not hammered with requests that time out one after another.
pub const COLD_START_REQUEST_TIMEOUT: Duration = Duration::from_secs(45);
pub const OVERRIDE_AFTER_FAILURES: u32 = 30;
pub const REQUIRED_MODEL_ROLES: [&str; 2] = ["chat", "utility"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GatePhase {
    WaitingForConfig = 0,
    WaitingForBackend = 1,
    Ready = 2,
}

impl GatePhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::WaitingForConfig,
            1 => Self::WaitingForBackend,
            _ => Self::Ready,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WaitingForConfig => "waitingForConfig",
            Self::WaitingForBackend => "waitingForBackend",
            Self::Ready => "ready",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProviderSettings {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub models: BTreeMap<String, Option<String>>,
}

impl ProviderSettings {
    /// A provider is chosen and at least one required role has a model.
    pub fn is_complete(&self) -> bool {
        let has_provider = self
            .provider
            .as_deref()
            .is_some_and(|provider| !provider.trim().is_empty());
        let has_model = REQUIRED_MODEL_ROLES.iter().any(|role| {
            self.models
                .get(*role)
                .and_then(Option::as_deref)
                .is_some_and(|model| !model.trim().is_empty())
        });
        has_provider && has_model
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDecision {
    Advance,
    OpenSetup,
    KeepWaiting,
    /// The gate left the config phase (or halted); the poll loop ends.
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthProbe {
    Healthy,
    /// The backend answered, but not with 200.
    NotReady { cause: Option<String> },
    /// Connection error or timeout.
    Unreachable { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthDecision {
    EnterReady,
    Waiting {
        cause: Option<String>,
        offer_override: bool,
    },
    /// The gate is already past this phase or halted.
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateStatus {
    pub phase: &'static str,
    pub ready: bool,
    pub halted: bool,
    pub error: Option<String>,
    pub last_cause: Option<String>,
    pub consecutive_failures: u32,
    pub override_available: bool,
}

/// Boot barrier between process start and the dashboard. Probe results may
/// arrive from several tasks at once; every transition is an atomic
/// compare-exchange so Ready is entered exactly once.
#[derive(Debug)]
pub struct HealthGate {
    phase: AtomicU8,
    halted: AtomicBool,
    halt_reason: Mutex<Option<String>>,
    setup_opened: AtomicBool,
    consecutive_failures: AtomicU32,
    override_offered: AtomicBool,
    warmed_up: AtomicBool,
    last_cause: Mutex<Option<String>>,
}

impl Default for HealthGate {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthGate {
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(GatePhase::WaitingForConfig as u8),
            halted: AtomicBool::new(false),
            halt_reason: Mutex::new(None),
            setup_opened: AtomicBool::new(false),
            consecutive_failures: AtomicU32::new(0),
            override_offered: AtomicBool::new(false),
            warmed_up: AtomicBool::new(false),
            last_cause: Mutex::new(None),
        }
    }

    pub fn phase(&self) -> GatePhase {
        GatePhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == GatePhase::Ready
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// Poll loops keep running only while this holds.
    pub fn is_polling(&self) -> bool {
        !self.is_halted() && !self.is_ready()
    }

    pub fn observe_settings(&self, settings: Result<ProviderSettings, String>) -> ConfigDecision {
        if self.is_halted() || self.phase() != GatePhase::WaitingForConfig {
            return ConfigDecision::Stop;
        }

        if settings.is_ok() {
            self.warmed_up.store(true, Ordering::Release);
        }

        match settings {
            Ok(settings) if settings.is_complete() => {
                if self.advance_to_backend() {
                    ConfigDecision::Advance
                } else {
                    ConfigDecision::Stop
                }
            }
            Ok(_) => {
                if self
                    .setup_opened
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    ConfigDecision::OpenSetup
                } else {
                    ConfigDecision::KeepWaiting
                }
            }
            Err(error) => {
                self.set_last_cause(Some(error));
                ConfigDecision::KeepWaiting
            }
        }
    }

    /// The setup surface reported that the configuration was written.
    pub fn signal_setup_complete(&self) -> bool {
        !self.is_halted() && self.advance_to_backend()
    }

    pub fn advance_to_backend(&self) -> bool {
        self.phase
            .compare_exchange(
                GatePhase::WaitingForConfig as u8,
                GatePhase::WaitingForBackend as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub fn observe_health(&self, probe: HealthProbe) -> HealthDecision {
        if self.is_halted() || self.phase() != GatePhase::WaitingForBackend {
            return HealthDecision::Stop;
        }

        let cause = match probe {
            HealthProbe::Healthy => {
                self.warmed_up.store(true, Ordering::Release);
                return if self.try_enter_ready() {
                    HealthDecision::EnterReady
                } else {
                    HealthDecision::Stop
                };
            }
            HealthProbe::NotReady { cause } => {
                self.warmed_up.store(true, Ordering::Release);
                self.set_last_cause(cause.clone());
                cause
            }
            // Kept for the status query only; the loader is not spammed with
            // connection errors while the backend boots.
            HealthProbe::Unreachable { error } => {
                self.set_last_cause(Some(error));
                None
            }
        };

        let failures = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
        let offer_override = failures >= OVERRIDE_AFTER_FAILURES
            && self
                .override_offered
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok();

        HealthDecision::Waiting {
            cause,
            offer_override,
        }
    }

    /// Returns true for the single caller that performed the transition.
    pub fn try_enter_ready(&self) -> bool {
        self.phase
            .compare_exchange(
                GatePhase::WaitingForBackend as u8,
                GatePhase::Ready as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Manual override offered after a long run of failures. Shares the
    /// exactly-once transition with the poll loop.
    pub fn force_ready(&self) -> Result<bool, String> {
        if self.is_halted() {
            return Err("Startup was halted by a fatal error.".to_string());
        }
        if !self.override_offered.load(Ordering::Acquire) {
            return Err("Manual override is not available yet.".to_string());
        }
        Ok(self.try_enter_ready())
    }

    /// Fatal failure before Ready. Returns true the first time only.
    pub fn halt(&self, reason: &str) -> bool {
        if self.is_ready() {
            return false;
        }
        if self
            .halted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        if let Ok(mut guard) = self.halt_reason.lock() {
            *guard = Some(reason.to_string());
        }
        true
    }

    pub fn request_timeout(&self) -> Duration {
        if self.warmed_up.load(Ordering::Acquire) {
            HEALTH_REQUEST_TIMEOUT
        } else {
            COLD_START_REQUEST_TIMEOUT
        }
    }

    pub fn status(&self) -> GateStatus {
        let phase = self.phase();
        GateStatus {
            phase: phase.as_str(),
            ready: phase == GatePhase::Ready,
            halted: self.is_halted(),
            error: self.halt_reason.lock().ok().and_then(|guard| guard.clone()),
            last_cause: self.last_cause.lock().ok().and_then(|guard| guard.clone()),
            consecutive_failures: self.consecutive_failures.load(Ordering::Acquire),
            override_available: self.override_offered.load(Ordering::Acquire),
        }
    }

    fn set_last_cause(&self, cause: Option<String>) {
        if let Ok(mut guard) = self.last_cause.lock() {
            *guard = cause;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Barrier},
        thread,
    };

    use super::*;

    fn settings(provider: &str, models: &[(&str, &str)]) -> ProviderSettings {
        ProviderSettings {
            provider: Some(provider.to_string()),
            models: models
                .iter()
                .map(|(role, model)| (role.to_string(), Some(model.to_string())))
                .collect(),
        }
    }

    fn gate_waiting_for_backend() -> HealthGate {
        let gate = HealthGate::new();
        assert!(gate.advance_to_backend());
        gate
    }

    #[test]
    fn settings_completeness_needs_provider_and_one_required_role() {
        assert!(settings("openai", &[("chat", "gpt")]).is_complete());
        assert!(settings("openai", &[("utility", "mini")]).is_complete());
        assert!(!settings("", &[("chat", "gpt")]).is_complete());
        assert!(!settings("openai", &[("embedding", "ada")]).is_complete());
        assert!(!settings("openai", &[("chat", " ")]).is_complete());
    }

    #[test]
    fn settings_parse_tolerates_null_models() {
        let parsed: ProviderSettings =
            serde_json::from_str(r#"{"provider":"local","models":{"chat":null,"utility":"m"}}"#)
                .expect("parse settings");
        assert!(parsed.is_complete());
    }

    #[test]
    fn incomplete_config_opens_setup_once_then_waits() {
        let gate = HealthGate::new();
        let incomplete = settings("", &[]);

        assert_eq!(gate.observe_settings(Ok(incomplete.clone())), ConfigDecision::OpenSetup);
        assert_eq!(gate.observe_settings(Ok(incomplete)), ConfigDecision::KeepWaiting);
        assert!(gate.signal_setup_complete());
        assert_eq!(gate.phase(), GatePhase::WaitingForBackend);
        assert_eq!(
            gate.observe_settings(Ok(settings("x", &[("chat", "y")]))),
            ConfigDecision::Stop
        );
    }

    #[test]
    fn complete_config_advances_to_backend_phase() {
        let gate = HealthGate::new();
        assert_eq!(
            gate.observe_settings(Ok(settings("openai", &[("chat", "gpt")]))),
            ConfigDecision::Advance
        );
        assert_eq!(gate.phase(), GatePhase::WaitingForBackend);
    }

    #[test]
    fn unreachable_settings_keep_waiting() {
        let gate = HealthGate::new();
        assert_eq!(
            gate.observe_settings(Err("connection refused".to_string())),
            ConfigDecision::KeepWaiting
        );
        assert_eq!(gate.phase(), GatePhase::WaitingForConfig);
        assert_eq!(gate.request_timeout(), COLD_START_REQUEST_TIMEOUT);
    }

    #[test]
    fn settings_round_trip_ends_the_cold_start_window() {
        let gate = HealthGate::new();
        gate.observe_settings(Ok(settings("", &[])));
        assert_eq!(gate.request_timeout(), HEALTH_REQUEST_TIMEOUT);
    }

    #[test]
    fn failure_cause_is_surfaced_without_changing_phase() {
        let gate = gate_waiting_for_backend();
        let decision = gate.observe_health(HealthProbe::NotReady {
            cause: Some("database: migrating".to_string()),
        });

        assert_eq!(
            decision,
            HealthDecision::Waiting {
                cause: Some("database: migrating".to_string()),
                offer_override: false,
            }
        );
        assert_eq!(gate.phase(), GatePhase::WaitingForBackend);
        assert_eq!(gate.status().last_cause.as_deref(), Some("database: migrating"));
    }

    #[test]
    fn cold_start_timeout_applies_until_first_round_trip() {
        let gate = gate_waiting_for_backend();
        assert_eq!(gate.request_timeout(), COLD_START_REQUEST_TIMEOUT);

        let decision = gate.observe_health(HealthProbe::Unreachable {
            error: "timed out".to_string(),
        });
        assert_eq!(
            decision,
            HealthDecision::Waiting {
                cause: None,
                offer_override: false,
            }
        );
        assert_eq!(gate.status().last_cause.as_deref(), Some("timed out"));
        assert_eq!(gate.request_timeout(), COLD_START_REQUEST_TIMEOUT);

        gate.observe_health(HealthProbe::NotReady { cause: None });
        assert_eq!(gate.request_timeout(), HEALTH_REQUEST_TIMEOUT);
    }

    #[test]
    fn override_is_offered_once_after_the_failure_run() {
        let gate = gate_waiting_for_backend();
        assert!(gate.force_ready().is_err());

        let offers = (0..OVERRIDE_AFTER_FAILURES + 5)
            .filter(|_| {
                matches!(
                    gate.observe_health(HealthProbe::NotReady { cause: None }),
                    HealthDecision::Waiting {
                        offer_override: true,
                        ..
                    }
                )
            })
            .count();

        assert_eq!(offers, 1);
        assert_eq!(gate.force_ready(), Ok(true));
        assert_eq!(gate.force_ready(), Ok(false));
        assert_eq!(
            gate.observe_health(HealthProbe::Healthy),
            HealthDecision::Stop
        );
    }

    #[test]
    fn halted_gate_stops_polling_and_reports_the_error() {
        let gate = gate_waiting_for_backend();
        assert!(gate.halt("backend exited with status 1"));
        assert!(!gate.halt("second failure"));

        assert!(!gate.is_polling());
        assert_eq!(gate.observe_health(HealthProbe::Healthy), HealthDecision::Stop);
        let status = gate.status();
        assert!(status.halted);
        assert_eq!(status.error.as_deref(), Some("backend exited with status 1"));
    }

    #[test]
    fn halt_after_ready_is_ignored() {
        let gate = gate_waiting_for_backend();
        assert_eq!(gate.observe_health(HealthProbe::Healthy), HealthDecision::EnterReady);
        assert!(!gate.halt("late crash"));
        assert!(gate.status().ready);
    }

    #[test]
    fn concurrent_successes_enter_ready_exactly_once() {
        let gate = Arc::new(gate_waiting_for_backend());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    gate.observe_health(HealthProbe::Healthy) == HealthDecision::EnterReady
                })
            })
            .collect();

        let entered = handles
            .into_iter()
            .map(|handle| handle.join().expect("probe thread"))
            .filter(|entered| *entered)
            .count();

        assert_eq!(entered, 1);
        assert!(gate.is_ready());
    }
}
