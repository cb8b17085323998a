//! Cancellable one-shot and interval tasks keyed by id.
//!
//! Nothing here sleeps or spawns: a driver asks for [`Scheduler::next_deadline`],
//! waits however it likes, then drains [`Scheduler::pop_due`]. Production code
//! drives it from the async runtime with [`SystemClock`]; tests advance a
//! manual clock and drain synchronously.

use std::{collections::BTreeMap, time::Instant};

/// Milliseconds since the clock's own epoch.
pub type Millis = u64;

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> Millis;
}

#[derive(Debug)]
pub struct SystemClock {
    started_at: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> Millis {
        self.started_at.elapsed().as_millis() as Millis
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct ScheduledTask<T> {
    due: Millis,
    period: Option<Millis>,
    payload: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    tasks: BTreeMap<TaskId, ScheduledTask<T>>,
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            tasks: BTreeMap::new(),
        }
    }

    pub fn schedule_once(&mut self, now: Millis, delay: Millis, payload: T) -> TaskId {
        self.insert(now.saturating_add(delay), None, payload)
    }

    /// First run is one `period` after `now`. A zero period is bumped to 1 ms
    /// so draining always terminates.
    pub fn schedule_every(&mut self, now: Millis, period: Millis, payload: T) -> TaskId {
        let period = period.max(1);
        self.insert(now.saturating_add(period), Some(period), payload)
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.remove(&id).is_some()
    }

    #[cfg(test)]
    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.tasks.values().map(|task| task.due).min()
    }

    /// Removes the earliest due task (ties broken by creation order) and
    /// returns its payload. Interval tasks are re-armed one period after
    /// `now` rather than catching up on missed runs.
    pub fn pop_due(&mut self, now: Millis) -> Option<T> {
        let id = self
            .tasks
            .iter()
            .filter(|(_, task)| task.due <= now)
            .min_by_key(|(id, task)| (task.due, **id))
            .map(|(id, _)| *id)?;

        match self.tasks.get(&id).and_then(|task| task.period) {
            Some(period) => {
                let task = self.tasks.get_mut(&id)?;
                task.due = now.saturating_add(period);
                Some(task.payload.clone())
            }
            None => self.tasks.remove(&id).map(|task| task.payload),
        }
    }

    fn insert(&mut self, due: Millis, period: Option<Millis>, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert(
            id,
            ScheduledTask {
                due,
                period,
                payload,
            },
        );
        id
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
