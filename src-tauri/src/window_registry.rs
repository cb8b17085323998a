use std::collections::HashMap;

use serde_json::Value;

use crate::{geometry::Size, shell_window::ShellWindow, surfaces::SurfaceKind};

pub struct WindowRecord<W> {
    pub kind: SurfaceKind,
    pub window: W,
    pub pinned: bool,
    pub min_size: Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Created,
    Focused,
}

/// Sole owner of the window records, keyed by logical id.
pub struct WindowRegistry<W> {
    records: HashMap<String, WindowRecord<W>>,
}

impl<W: ShellWindow> WindowRegistry<W> {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Removes a record whose window was destroyed behind our back, so the
    /// caller can purge what depended on it before anything is rebuilt.
    pub fn take_stale(&mut self, id: &str) -> Option<WindowRecord<W>> {
        if self.records.get(id)?.window.is_destroyed() {
            self.records.remove(id)
        } else {
            None
        }
    }

    /// Focuses a live record, otherwise builds a new one.
    pub fn open<F>(&mut self, id: &str, factory: F) -> Result<OpenOutcome, String>
    where
        F: FnOnce() -> Result<WindowRecord<W>, String>,
    {
        if let Some(record) = self.live(id) {
            if let Err(error) = record.window.show().and_then(|()| record.window.focus()) {
                return Err(format!("failed to focus window {id}: {error}"));
            }
            return Ok(OpenOutcome::Focused);
        }

        let record = factory()?;
        self.records.insert(id.to_string(), record);
        Ok(OpenOutcome::Created)
    }

    pub fn get(&self, id: &str) -> Option<&WindowRecord<W>> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut WindowRecord<W>> {
        self.records.get_mut(id)
    }

    /// The record only if its window is still alive.
    pub fn live(&self, id: &str) -> Option<&WindowRecord<W>> {
        self.records
            .get(id)
            .filter(|record| !record.window.is_destroyed())
    }

    pub fn remove(&mut self, id: &str) -> Option<WindowRecord<W>> {
        self.records.remove(id)
    }

    /// Fire-and-forget: absent or destroyed targets are ignored.
    pub fn send(&self, id: &str, event: &str, payload: Value) -> bool {
        let Some(record) = self.live(id) else {
            return false;
        };
        record.window.emit(event, payload).is_ok()
    }
}

impl<W: ShellWindow> Default for WindowRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}
