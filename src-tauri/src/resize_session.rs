use crate::{
    geometry::{Bounds, Point, Size},
    scheduler::{Millis, Scheduler, TaskId},
    window_manager::ShellTimer,
};

pub const RESIZE_TICK_MS: Millis = 16;
pub const RESIZE_SAFETY_TIMEOUT_MS: Millis = 10_000;

/// Edges dragged by a resize gesture. Corners set two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDirection {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl ResizeDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        let (north, south, east, west) = match raw.trim().to_ascii_lowercase().as_str() {
            "n" => (true, false, false, false),
            "s" => (false, true, false, false),
            "e" => (false, false, true, false),
            "w" => (false, false, false, true),
            "ne" => (true, false, true, false),
            "nw" => (true, false, false, true),
            "se" => (false, true, true, false),
            "sw" => (false, true, false, true),
            _ => return None,
        };
        Some(Self {
            north,
            south,
            east,
            west,
        })
    }
}

/// South/east edges grow the size; north/west edges move the origin too so the
/// opposite edge stays put. Sizes never drop below `min`.
pub fn resized_bounds(reference: Bounds, delta: Point, direction: ResizeDirection, min: Size) -> Bounds {
    let mut bounds = reference;

    if direction.east {
        bounds.width = (reference.width + delta.x).max(min.width);
    }
    if direction.west {
        bounds.width = (reference.width - delta.x).max(min.width);
        bounds.x = reference.x + reference.width - bounds.width;
    }
    if direction.south {
        bounds.height = (reference.height + delta.y).max(min.height);
    }
    if direction.north {
        bounds.height = (reference.height - delta.y).max(min.height);
        bounds.y = reference.y + reference.height - bounds.height;
    }

    bounds
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSessionState {
    pub window_id: String,
    pub direction: ResizeDirection,
    pub reference_cursor: Point,
    pub reference_bounds: Bounds,
    pub min_size: Size,
    pub tick_task: TaskId,
    pub timeout_task: TaskId,
}

impl ResizeSessionState {
    pub fn bounds_for_cursor(&self, cursor: Point) -> Bounds {
        resized_bounds(
            self.reference_bounds,
            cursor.delta_from(self.reference_cursor),
            self.direction,
            self.min_size,
        )
    }
}

pub struct ResizeFrame {
    pub cursor: Point,
    pub bounds: Bounds,
    pub min_size: Size,
}

/// Holds at most one active session; beginning a new one always stops the old.
#[derive(Debug, Default)]
pub struct ResizeSession {
    active: Option<ResizeSessionState>,
}

impl ResizeSession {
    pub fn active(&self) -> Option<&ResizeSessionState> {
        self.active.as_ref()
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn begin(
        &mut self,
        scheduler: &mut Scheduler<ShellTimer>,
        now: Millis,
        window_id: &str,
        direction: ResizeDirection,
        frame: ResizeFrame,
    ) -> &ResizeSessionState {
        self.stop(scheduler);

        let tick_task = scheduler.schedule_every(now, RESIZE_TICK_MS, ShellTimer::ResizeTick);
        let timeout_task =
            scheduler.schedule_once(now, RESIZE_SAFETY_TIMEOUT_MS, ShellTimer::ResizeTimeout);
        self.active.insert(ResizeSessionState {
            window_id: window_id.to_string(),
            direction,
            reference_cursor: frame.cursor,
            reference_bounds: frame.bounds,
            min_size: frame.min_size,
            tick_task,
            timeout_task,
        })
    }

    pub fn stop(&mut self, scheduler: &mut Scheduler<ShellTimer>) -> Option<ResizeSessionState> {
        let session = self.active.take()?;
        scheduler.cancel(session.tick_task);
        scheduler.cancel(session.timeout_task);
        Some(session)
    }

    pub fn targets(&self, window_id: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|session| session.window_id == window_id)
    }
}
