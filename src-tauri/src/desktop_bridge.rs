/// Injected into every shell window before its page scripts run. Pages only
/// talk to the shell through `window.kestrelDesktop`.
pub(crate) const DESKTOP_BRIDGE_SCRIPT: &str = r#"
(() => {
  if (window.kestrelDesktop) {
    return;
  }

  const tauri = () => window.__TAURI__;
  const invoke = (command, args = {}) => tauri().core.invoke(command, args);
  const subscribe = (event, pick, handler) =>
    tauri().event.listen(event, (message) => handler(pick(message.payload || {})));

  Object.defineProperty(window, "kestrelDesktop", {
    configurable: false,
    enumerable: false,
    writable: false,
    value: Object.freeze({
      isDesktopRuntime: () => invoke("desktop_bridge_is_desktop_runtime"),
      openWindow: (id, title) => invoke("desktop_bridge_open_window", { id, title: title ?? "" }),
      closeWindow: (id) => invoke("desktop_bridge_close_window", { id }),
      minimizeWindow: () => invoke("desktop_bridge_minimize_window"),
      maximizeWindow: () => invoke("desktop_bridge_maximize_window"),
      setWindowPinned: (pinned) => invoke("desktop_bridge_set_window_pinned", { pinned: !!pinned }),
      startResize: (direction) => invoke("desktop_bridge_start_resize", { direction }),
      stopResize: () => invoke("desktop_bridge_stop_resize"),
      startWindowDrag: () => invoke("desktop_bridge_start_window_drag"),
      getServerStatus: () => invoke("desktop_bridge_get_server_status"),
      getApiBaseUrl: () => invoke("desktop_bridge_get_api_base_url"),
      getWsBaseUrl: () => invoke("desktop_bridge_get_ws_base_url"),
      getHotkey: () => invoke("desktop_bridge_get_hotkey"),
      setHotkey: (key) => invoke("desktop_bridge_set_hotkey", { key }),
      signalLoaderReady: () => invoke("desktop_bridge_signal_loader_ready"),
      openSetupWindow: () => invoke("desktop_bridge_open_setup_window"),
      signalSetupComplete: () => invoke("desktop_bridge_signal_setup_complete"),
      overrideHealthGate: () => invoke("desktop_bridge_override_health_gate"),
      setShellLocale: (locale) => invoke("desktop_bridge_set_shell_locale", { locale }),
      onBackendLog: (handler) => subscribe("backend-log", (p) => p.line, handler),
      onBootStep: (handler) => subscribe("boot-step", (p) => p.text, handler),
      onBootError: (handler) => subscribe("boot-error", (p) => p.message, handler),
      onBootOverrideAvailable: (handler) => subscribe("boot-override-available", () => undefined, handler),
      onWindowClosed: (handler) => subscribe("window-closed", (p) => p.id, handler),
    }),
  });
})();
"#;
