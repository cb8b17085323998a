use std::collections::{HashMap, HashSet};

use crate::{
    scheduler::{Millis, Scheduler, TaskId},
    shell_window::ShellWindow,
    window_manager::ShellTimer,
};

/// Delay before the second, front-raising phase of re-pinning.
pub const TOPMOST_SETTLE_MS: Millis = 50;

/// Keeps pinned surfaces above everything else. Window managers drop or cache
/// a stale z-order for an always-on-top surface once it loses focus, so each
/// focus loss is answered with an immediate off/on toggle and a delayed raise.
#[derive(Debug, Default)]
pub struct TopmostEnforcer {
    attached: HashSet<String>,
    pending_raise: HashMap<String, TaskId>,
}

impl TopmostEnforcer {
    /// Idempotent: a second attach for the same id changes nothing.
    pub fn attach<W: ShellWindow>(
        &mut self,
        id: &str,
        window: &W,
        all_workspaces: bool,
    ) -> Result<bool, String> {
        if self.attached.contains(id) {
            return Ok(false);
        }
        if window.is_destroyed() {
            return Ok(false);
        }

        window.set_always_on_top(true)?;
        if all_workspaces {
            window.set_visible_on_all_workspaces(true)?;
        }
        self.attached.insert(id.to_string());
        Ok(true)
    }

    pub fn detach<W: ShellWindow>(
        &mut self,
        id: &str,
        window: &W,
        scheduler: &mut Scheduler<ShellTimer>,
    ) -> Result<bool, String> {
        self.cancel_pending(id, scheduler);
        if !self.attached.remove(id) {
            return Ok(false);
        }
        if window.is_destroyed() {
            return Ok(true);
        }

        window.set_always_on_top(false)?;
        window.set_visible_on_all_workspaces(false)?;
        Ok(true)
    }

    #[cfg(test)]
    pub fn is_attached(&self, id: &str) -> bool {
        self.attached.contains(id)
    }

    pub fn on_focus_lost<W: ShellWindow>(
        &mut self,
        id: &str,
        window: &W,
        scheduler: &mut Scheduler<ShellTimer>,
        now: Millis,
    ) -> Result<(), String> {
        if !self.attached.contains(id) || window.is_destroyed() {
            return Ok(());
        }

        // Drop the compositor's cached entry for this surface.
        window.set_always_on_top(false)?;
        window.set_always_on_top(true)?;

        self.cancel_pending(id, scheduler);
        let task = scheduler.schedule_once(
            now,
            TOPMOST_SETTLE_MS,
            ShellTimer::ReassertTopmost(id.to_string()),
        );
        self.pending_raise.insert(id.to_string(), task);
        Ok(())
    }

    pub fn on_settled<W: ShellWindow>(&mut self, id: &str, window: Option<&W>) -> Result<(), String> {
        self.pending_raise.remove(id);
        if !self.attached.contains(id) {
            return Ok(());
        }
        let Some(window) = window.filter(|window| !window.is_destroyed()) else {
            return Ok(());
        };

        window.set_always_on_top(true)?;
        window.raise()
    }

    pub fn forget(&mut self, id: &str, scheduler: &mut Scheduler<ShellTimer>) {
        self.cancel_pending(id, scheduler);
        self.attached.remove(id);
    }

    fn cancel_pending(&mut self, id: &str, scheduler: &mut Scheduler<ShellTimer>) {
        if let Some(task) = self.pending_raise.remove(id) {
            scheduler.cancel(task);
        }
    }
}
