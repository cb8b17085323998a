use std::{sync::Arc, thread, time::Duration};

use serde_json::{json, Value};
use tauri::{AppHandle, Manager};

use crate::{
    append_backend_log, append_desktop_log, append_startup_log,
    backend_http::BackendClient,
    backend_process::{self, LineSink},
    desktop_state,
    health_gate::{
        ConfigDecision, GatePhase, HealthDecision, HEALTH_POLL_INTERVAL, SETTINGS_POLL_INTERVAL,
    },
    shell_state::ShellState,
    surfaces::{self, LOADER_WINDOW_ID},
    ui_dispatch, window_actions, BACKEND_CMD_ENV, BACKEND_CWD_ENV, BACKEND_EXIT_POLL_INTERVAL_MS,
    BACKEND_LOG_EVENT, BOOT_ERROR_EVENT, BOOT_OVERRIDE_EVENT, BOOT_STEP_EVENT, DEFAULT_HOTKEY,
};

pub(crate) fn report_boot_step(app_handle: &AppHandle, text: &str) {
    append_startup_log(text);
    let state = app_handle.state::<ShellState>();
    state.publish_boot_event(app_handle, BOOT_STEP_EVENT, json!({ "text": text }));
}

/// Fatal startup failure: polling stops and the loader switches to its error
/// state. Only the first failure is reported.
pub(crate) fn report_boot_error(app_handle: &AppHandle, message: &str) {
    let state = app_handle.state::<ShellState>();
    if !state.gate.halt(message) {
        append_startup_log(&format!("ignored boot error after halt/ready: {message}"));
        return;
    }
    append_startup_log(&format!("startup halted: {message}"));
    state.publish_boot_event(app_handle, BOOT_ERROR_EVENT, json!({ "message": message }));
}

/// Spawns the backend when a command is configured and watches it for an
/// early exit.
pub(crate) fn launch_backend(app_handle: &AppHandle) {
    let raw_cmd = std::env::var(BACKEND_CMD_ENV).ok();
    let raw_cwd = std::env::var(BACKEND_CWD_ENV).ok();
    let plan = match backend_process::resolve_launch_plan(raw_cmd.as_deref(), raw_cwd.as_deref()) {
        Ok(Some(plan)) => plan,
        Ok(None) => {
            append_startup_log("no backend command configured; waiting for an external backend");
            return;
        }
        Err(error) => {
            report_boot_error(app_handle, &error);
            return;
        }
    };

    report_boot_step(app_handle, "Starting backend");
    append_startup_log(&format!(
        "spawning backend: {:?}",
        backend_process::build_debug_command(&plan)
    ));

    let sink_app = app_handle.clone();
    let on_line: LineSink = Arc::new(move |line: String| {
        append_backend_log(&line);
        let state = sink_app.state::<ShellState>();
        state.publish_boot_event(&sink_app, BACKEND_LOG_EVENT, json!({ "line": line }));
    });

    let state = app_handle.state::<ShellState>();
    if let Err(error) = state.backend.spawn(&plan, on_line) {
        report_boot_error(app_handle, &error);
        return;
    }

    let watch_app = app_handle.clone();
    let spawned = thread::Builder::new()
        .name("backend-exit-watch".to_string())
        .spawn(move || watch_backend_exit(watch_app));
    if let Err(error) = spawned {
        append_startup_log(&format!("failed to start backend exit watcher: {error}"));
    }
}

fn watch_backend_exit(app_handle: AppHandle) {
    let state = app_handle.state::<ShellState>();
    loop {
        if state.is_quitting() {
            return;
        }
        match state.backend.poll_exit() {
            Ok(Some(status)) => {
                if state.gate.is_ready() || state.is_quitting() {
                    append_desktop_log(&format!("backend process exited: {status}"));
                } else {
                    report_boot_error(
                        &app_handle,
                        &format!("Backend process exited before becoming ready: {status}"),
                    );
                }
                return;
            }
            Ok(None) if !state.backend.is_running() => return,
            Ok(None) => {}
            Err(error) => {
                append_desktop_log(&error);
                return;
            }
        }
        thread::sleep(Duration::from_millis(BACKEND_EXIT_POLL_INTERVAL_MS));
    }
}

pub(crate) fn spawn_boot_sequence(app_handle: AppHandle) {
    tauri::async_runtime::spawn(async move {
        run_boot_sequence(app_handle).await;
    });
}

async fn run_boot_sequence(app_handle: AppHandle) {
    let state = app_handle.state::<ShellState>();
    let gate = Arc::clone(&state.gate);
    let client = match BackendClient::new(&state.endpoint) {
        Ok(client) => client,
        Err(error) => {
            report_boot_error(&app_handle, &error);
            return;
        }
    };

    report_boot_step(&app_handle, "Checking configuration");
    while gate.is_polling() && gate.phase() == GatePhase::WaitingForConfig {
        let settings = client.fetch_settings(gate.request_timeout()).await;
        match gate.observe_settings(settings) {
            ConfigDecision::Advance => {
                append_startup_log("configuration is complete");
                break;
            }
            ConfigDecision::OpenSetup => {
                report_boot_step(&app_handle, "Waiting for setup to finish");
                window_actions::open_setup_window(&app_handle, append_startup_log);
            }
            ConfigDecision::KeepWaiting => {}
            ConfigDecision::Stop => break,
        }
        tokio::time::sleep(SETTINGS_POLL_INTERVAL).await;
    }

    if gate.is_polling() {
        report_boot_step(&app_handle, "Waiting for backend");
    }
    while gate.is_polling() {
        let probe = client.probe_health(gate.request_timeout()).await;
        match gate.observe_health(probe) {
            HealthDecision::EnterReady => {
                enter_ready(&app_handle);
                break;
            }
            HealthDecision::Waiting {
                cause,
                offer_override,
            } => {
                if let Some(cause) = cause {
                    report_boot_step(&app_handle, &format!("Backend not ready: {cause}"));
                }
                if offer_override {
                    append_startup_log("backend still not ready; offering manual override");
                    state.publish_boot_event(&app_handle, BOOT_OVERRIDE_EVENT, Value::Null);
                }
            }
            HealthDecision::Stop => break,
        }
        tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
    }
    append_startup_log("boot polling finished");
}

/// Runs once, after the gate transitioned to Ready (by probe or override).
pub(crate) fn enter_ready(app_handle: &AppHandle) {
    report_boot_step(app_handle, "Ready");
    let dispatched = ui_dispatch::run_on_main_thread_dispatch(app_handle, "enter ready", |app| {
        let state = app.state::<ShellState>();
        if let Err(error) = state.with_manager(|manager| manager.close(LOADER_WINDOW_ID)) {
            append_desktop_log(&format!("failed to close loader: {error}"));
        }
        if let Err(error) = window_actions::open_surface(app, &surfaces::dashboard_spec()) {
            append_desktop_log(&format!("failed to open dashboard: {error}"));
        }

        let hotkey = state
            .root_dir
            .as_deref()
            .map(desktop_state::desktop_state_path)
            .and_then(|path| desktop_state::read_state_field(&path, desktop_state::HOTKEY_FIELD))
            .unwrap_or_else(|| DEFAULT_HOTKEY.to_string());
        match state.with_hotkey(|binding| binding.bind(&hotkey, append_desktop_log)) {
            Ok(Ok(())) => {}
            Ok(Err(error)) | Err(error) => append_desktop_log(&error),
        }
    });
    if let Err(error) = dispatched {
        append_desktop_log(&error);
    }
}
