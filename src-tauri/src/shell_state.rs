use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use serde_json::{json, Value};
use tauri::{AppHandle, Manager};
use tokio::sync::Notify;

use crate::{
    append_desktop_log,
    backend_config::BackendEndpoint,
    backend_process::BackendProcess,
    health_gate::HealthGate,
    hotkey::{HotkeyBinding, HotkeyDebouncer},
    icon_resolver::IconImage,
    platform::PlatformProfile,
    scheduler::{Clock, SystemClock},
    surfaces::LOADER_WINDOW_ID,
    tauri_window::{TauriDesktopHost, TauriShortcutRegistrar, TauriWindow},
    ui_dispatch,
    window_manager::{ManagerConfig, WindowManager},
    BACKEND_LOG_EVENT, BOOT_ERROR_EVENT, BOOT_LOG_REPLAY_LIMIT, BOOT_OVERRIDE_EVENT,
    BOOT_STEP_EVENT,
};

pub(crate) type ShellWindowManager = WindowManager<TauriWindow, TauriDesktopHost>;

const NO_DEADLINE: u64 = u64::MAX;

/// Boot output kept for the loader page, which may subscribe only after the
/// first lines were printed.
#[derive(Debug, Default)]
pub(crate) struct BootTranscript {
    lines: VecDeque<String>,
    step: Option<String>,
    error: Option<String>,
    override_offered: bool,
}

impl BootTranscript {
    pub(crate) fn push_line(&mut self, line: String) {
        if self.lines.len() == BOOT_LOG_REPLAY_LIMIT {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Events that bring a freshly loaded loader page up to date, in order.
    pub(crate) fn replay(&self) -> Vec<(&'static str, Value)> {
        let mut events: Vec<(&'static str, Value)> = self
            .lines
            .iter()
            .map(|line| (BACKEND_LOG_EVENT, json!({ "line": line })))
            .collect();
        if let Some(step) = &self.step {
            events.push((BOOT_STEP_EVENT, json!({ "text": step })));
        }
        if self.override_offered {
            events.push((BOOT_OVERRIDE_EVENT, Value::Null));
        }
        if let Some(error) = &self.error {
            events.push((BOOT_ERROR_EVENT, json!({ "message": error })));
        }
        events
    }
}

pub(crate) struct ShellState {
    manager: Mutex<ShellWindowManager>,
    pub(crate) gate: Arc<HealthGate>,
    pub(crate) endpoint: BackendEndpoint,
    pub(crate) root_dir: Option<PathBuf>,
    pub(crate) profile: &'static PlatformProfile,
    pub(crate) backend: BackendProcess,
    clock: Arc<SystemClock>,
    hotkey: Mutex<HotkeyBinding<TauriShortcutRegistrar>>,
    debouncer: Mutex<HotkeyDebouncer>,
    transcript: Mutex<BootTranscript>,
    loader_ready: AtomicBool,
    timer_wake: Notify,
    next_deadline: AtomicU64,
    timer_dispatch_pending: AtomicBool,
    is_quitting: AtomicBool,
}

impl ShellState {
    pub(crate) fn new(
        app_handle: &AppHandle,
        icon: IconImage,
        endpoint: BackendEndpoint,
        root_dir: Option<PathBuf>,
        profile: &'static PlatformProfile,
    ) -> Self {
        let clock = Arc::new(SystemClock::new());
        let config = ManagerConfig {
            all_workspaces: profile.visible_on_all_workspaces,
            ..ManagerConfig::default()
        };
        let manager = WindowManager::new(
            TauriDesktopHost::new(app_handle),
            clock.clone(),
            icon,
            config,
            append_desktop_log,
        );

        Self {
            manager: Mutex::new(manager),
            gate: Arc::new(HealthGate::new()),
            endpoint,
            root_dir,
            profile,
            backend: BackendProcess::default(),
            clock,
            hotkey: Mutex::new(HotkeyBinding::new(TauriShortcutRegistrar::new(app_handle))),
            debouncer: Mutex::new(HotkeyDebouncer::default()),
            transcript: Mutex::new(BootTranscript::default()),
            loader_ready: AtomicBool::new(false),
            timer_wake: Notify::new(),
            next_deadline: AtomicU64::new(NO_DEADLINE),
            timer_dispatch_pending: AtomicBool::new(false),
            is_quitting: AtomicBool::new(false),
        }
    }

    /// Runs `f` against the window manager. Main thread only; handlers that
    /// may fire while this lock is held must go through
    /// [`ui_dispatch::defer_to_main_thread`].
    pub(crate) fn with_manager<R, F>(&self, f: F) -> Result<R, String>
    where
        F: FnOnce(&mut ShellWindowManager) -> R,
    {
        let mut manager = self
            .manager
            .lock()
            .map_err(|_| "Window manager lock poisoned.".to_string())?;
        let result = f(&mut manager);
        let deadline = manager.next_timer_deadline().unwrap_or(NO_DEADLINE);
        drop(manager);

        if self.next_deadline.swap(deadline, Ordering::AcqRel) != deadline {
            self.timer_wake.notify_one();
        }
        Ok(result)
    }

    pub(crate) fn with_hotkey<R, F>(&self, f: F) -> Result<R, String>
    where
        F: FnOnce(&mut HotkeyBinding<TauriShortcutRegistrar>) -> R,
    {
        let mut binding = self
            .hotkey
            .lock()
            .map_err(|_| "Hotkey lock poisoned.".to_string())?;
        Ok(f(&mut binding))
    }

    pub(crate) fn accept_hotkey_press(&self) -> bool {
        let now = self.clock.now_millis();
        self.debouncer
            .lock()
            .map(|mut debouncer| debouncer.on_key_down(now))
            .unwrap_or(false)
    }

    pub(crate) fn is_quitting(&self) -> bool {
        self.is_quitting.load(Ordering::Acquire)
    }

    pub(crate) fn mark_quitting(&self) {
        self.is_quitting.store(true, Ordering::Release);
        self.timer_wake.notify_one();
    }

    /// Records a boot event and forwards it to the loader once its page is up.
    pub(crate) fn publish_boot_event(&self, app_handle: &AppHandle, event: &'static str, payload: Value) {
        let Ok(mut transcript) = self.transcript.lock() else {
            append_desktop_log("boot transcript lock poisoned; dropping boot event");
            return;
        };
        let text = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_string);
        match event {
            BACKEND_LOG_EVENT => {
                if let Some(line) = text("line") {
                    transcript.push_line(line);
                }
            }
            BOOT_STEP_EVENT => transcript.step = text("text"),
            BOOT_ERROR_EVENT => transcript.error = text("message"),
            BOOT_OVERRIDE_EVENT => transcript.override_offered = true,
            _ => {}
        }
        // Checked under the transcript lock so a line is either replayed or
        // forwarded, never both.
        let forward = self.loader_ready.load(Ordering::Acquire);
        drop(transcript);

        if !forward {
            return;
        }
        ui_dispatch::defer_to_main_thread(app_handle, "forward boot event", move |app| {
            let state = app.state::<ShellState>();
            if let Err(error) =
                state.with_manager(|manager| manager.send(LOADER_WINDOW_ID, event, payload))
            {
                append_desktop_log(&format!("failed to forward {event} to loader: {error}"));
            }
        });
    }

    /// The loader page subscribed; replay what it missed. Main thread only.
    pub(crate) fn replay_boot_transcript(&self) -> Result<usize, String> {
        let events = {
            let transcript = self
                .transcript
                .lock()
                .map_err(|_| "Boot transcript lock poisoned.".to_string())?;
            self.loader_ready.store(true, Ordering::Release);
            transcript.replay()
        };

        let count = events.len();
        self.with_manager(|manager| {
            for (event, payload) in events {
                manager.send(LOADER_WINDOW_ID, event, payload);
            }
        })?;
        Ok(count)
    }

    pub(crate) fn boot_step(&self) -> Option<String> {
        self.transcript
            .lock()
            .ok()
            .and_then(|transcript| transcript.step.clone())
    }

    fn time_until_next_timer(&self) -> Option<Duration> {
        let deadline = self.next_deadline.load(Ordering::Acquire);
        if deadline == NO_DEADLINE {
            return None;
        }
        Some(Duration::from_millis(
            deadline.saturating_sub(self.clock.now_millis()),
        ))
    }
}

/// Sleeps until the earliest scheduled task is due, then runs due tasks on the
/// main thread. At most one such dispatch is in flight.
pub(crate) fn spawn_timer_driver(app_handle: AppHandle) {
    tauri::async_runtime::spawn(async move {
        let state = app_handle.state::<ShellState>();
        loop {
            if state.is_quitting() {
                break;
            }

            match state.time_until_next_timer() {
                None => {
                    state.timer_wake.notified().await;
                    continue;
                }
                Some(wait) if !wait.is_zero() => {
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {}
                        _ = state.timer_wake.notified() => continue,
                    }
                }
                Some(_) => {}
            }

            if !state.timer_dispatch_pending.swap(true, Ordering::AcqRel) {
                let dispatched = ui_dispatch::run_on_main_thread_dispatch(
                    &app_handle,
                    "run due timers",
                    |app| {
                        let state = app.state::<ShellState>();
                        state.timer_dispatch_pending.store(false, Ordering::Release);
                        if let Err(error) = state.with_manager(|manager| manager.run_due_timers()) {
                            append_desktop_log(&format!("failed to run due timers: {error}"));
                        }
                        // Wake the driver even when the deadline did not move.
                        state.timer_wake.notify_one();
                    },
                );
                if let Err(error) = dispatched {
                    state.timer_dispatch_pending.store(false, Ordering::Release);
                    append_desktop_log(&error);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            }
            state.timer_wake.notified().await;
        }
    });
}
