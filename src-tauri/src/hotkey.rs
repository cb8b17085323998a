use crate::scheduler::Millis;

pub const HOTKEY_DEBOUNCE_MS: Millis = 150;

/// Drops auto-repeat and bounce: a key-down within the debounce window of the
/// previous key-down is ignored, so a held key toggles once.
#[derive(Debug, Default)]
pub struct HotkeyDebouncer {
    last_key_down: Option<Millis>,
}

impl HotkeyDebouncer {
    pub fn on_key_down(&mut self, now: Millis) -> bool {
        let previous = self.last_key_down.replace(now);
        previous.map_or(true, |last| now.saturating_sub(last) >= HOTKEY_DEBOUNCE_MS)
    }
}

/// OS-level global shortcut registration.
pub trait ShortcutRegistrar {
    fn register(&mut self, accelerator: &str) -> Result<(), String>;
    fn unregister(&mut self, accelerator: &str) -> Result<(), String>;
}

/// At most one accelerator is registered at any time.
pub struct HotkeyBinding<R> {
    registrar: R,
    current: Option<String>,
}

impl<R: ShortcutRegistrar> HotkeyBinding<R> {
    pub fn new(registrar: R) -> Self {
        Self {
            registrar,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Swaps the registered accelerator. The previous one is always released
    /// first, even when it equals the new one, so a re-bind never stacks
    /// handlers. If the new accelerator is refused the previous one is
    /// registered again and the error returned.
    pub fn bind<L>(&mut self, accelerator: &str, log: L) -> Result<(), String>
    where
        L: Fn(&str),
    {
        let accelerator = accelerator.trim();
        if accelerator.is_empty() {
            return Err("Hotkey must not be empty.".to_string());
        }

        let previous = self.current.take();
        if let Some(previous) = previous.as_deref() {
            if let Err(error) = self.registrar.unregister(previous) {
                log(&format!("failed to unregister hotkey {previous}: {error}"));
            }
        }

        match self.registrar.register(accelerator) {
            Ok(()) => {
                self.current = Some(accelerator.to_string());
                log(&format!("hotkey bound: {accelerator}"));
                Ok(())
            }
            Err(error) => {
                if let Some(previous) = previous {
                    match self.registrar.register(&previous) {
                        Ok(()) => self.current = Some(previous),
                        Err(restore_error) => log(&format!(
                            "failed to restore hotkey {previous}: {restore_error}"
                        )),
                    }
                }
                Err(format!("Failed to register hotkey '{accelerator}': {error}"))
            }
        }
    }

    pub fn unbind(&mut self) -> Result<(), String> {
        let Some(current) = self.current.take() else {
            return Ok(());
        };
        self.registrar.unregister(&current)
    }
}
