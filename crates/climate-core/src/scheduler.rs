//! Cooperative task arena
//!
//! Models the single-threaded scheduler the node runs on: tasks are
//! registered once, (re)planned for a relative or absolute instant, and run to
//! completion when due. Handles are generation-checked so a task that was
//! unregistered can never be planned or run again through a stale handle,
//! even if its slot is reused.
//!
//! The scheduler never reads a clock; callers pass the current instant, which
//! keeps host tests deterministic.

use embassy_time::{Duration, Instant};
use heapless::Vec;
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("task arena is full")]
    Full,
    #[error("task handle is stale or was never registered")]
    UnknownTask,
}

/// Handle to a registered task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    slot: u8,
    generation: u16,
}

#[derive(Debug, Clone, Copy)]
struct Slot<T> {
    task: Option<T>,
    generation: u16,
    due: Option<Instant>,
}

/// Fixed-capacity arena of up to `N` tasks of kind `T`.
#[derive(Debug)]
pub struct Scheduler<T, const N: usize> {
    slots: Vec<Slot<T>, N>,
}

impl<T: Copy, const N: usize> Default for Scheduler<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> Scheduler<T, N> {
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register `task` to first run at `at`.
    pub fn register(&mut self, task: T, at: Instant) -> Result<TaskId, SchedulerError> {
        if let Some(index) = self.slots.iter().position(|s| s.task.is_none()) {
            let slot = &mut self.slots[index];
            slot.task = Some(task);
            slot.due = Some(at);
            return Ok(TaskId {
                slot: index as u8,
                generation: slot.generation,
            });
        }

        let index = self.slots.len();
        if index > u8::MAX as usize {
            return Err(SchedulerError::Full);
        }
        self.slots
            .push(Slot {
                task: Some(task),
                generation: 0,
                due: Some(at),
            })
            .map_err(|_| SchedulerError::Full)?;

        Ok(TaskId {
            slot: index as u8,
            generation: 0,
        })
    }

    /// Remove a task. Its handle becomes permanently stale.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn unregister(&mut self, id: TaskId) -> bool {
        match self.slot_mut(id) {
            Ok(slot) => {
                slot.task = None;
                slot.due = None;
                slot.generation = slot.generation.wrapping_add(1);
                true
            }
            Err(_) => false,
        }
    }

    pub fn is_registered(&self, id: TaskId) -> bool {
        self.slot(id).is_ok()
    }

    /// Plan a registered task to run at `at`, replacing any earlier plan.
    pub fn plan_absolute(&mut self, id: TaskId, at: Instant) -> Result<(), SchedulerError> {
        self.slot_mut(id)?.due = Some(at);
        Ok(())
    }

    /// Plan a registered task to run `delay` after `now`.
    pub fn plan_relative(
        &mut self,
        id: TaskId,
        now: Instant,
        delay: Duration,
    ) -> Result<(), SchedulerError> {
        self.plan_absolute(id, now + delay)
    }

    /// Plan a registered task to run as soon as the scheduler is polled.
    pub fn plan_now(&mut self, id: TaskId, now: Instant) -> Result<(), SchedulerError> {
        self.plan_absolute(id, now)
    }

    /// When `id` is planned to run next, if at all.
    pub fn due(&self, id: TaskId) -> Option<Instant> {
        self.slot(id).ok().and_then(|s| s.due)
    }

    /// Take the earliest task due at or before `now`.
    ///
    /// The task's plan is consumed: it runs again only if re-planned.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TaskId, T)> {
        let (index, _) = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.task.is_some())
            .filter_map(|(i, s)| s.due.map(|due| (i, due)))
            .filter(|(_, due)| *due <= now)
            .min_by_key(|(_, due)| *due)?;

        let slot = &mut self.slots[index];
        slot.due = None;
        let task = slot.task?;
        Some((
            TaskId {
                slot: index as u8,
                generation: slot.generation,
            },
            task,
        ))
    }

    /// Earliest planned instant across all tasks.
    pub fn next_due(&self) -> Option<Instant> {
        self.slots
            .iter()
            .filter(|s| s.task.is_some())
            .filter_map(|s| s.due)
            .min()
    }

    /// Number of tasks with a pending plan.
    pub fn pending(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.task.is_some() && s.due.is_some())
            .count()
    }

    fn slot(&self, id: TaskId) -> Result<&Slot<T>, SchedulerError> {
        self.slots
            .get(id.slot as usize)
            .filter(|s| s.task.is_some() && s.generation == id.generation)
            .ok_or(SchedulerError::UnknownTask)
    }

    fn slot_mut(&mut self, id: TaskId) -> Result<&mut Slot<T>, SchedulerError> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|s| s.task.is_some() && s.generation == id.generation)
            .ok_or(SchedulerError::UnknownTask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Job {
        A,
        B,
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_pops_earliest_due_task() {
        let mut scheduler: Scheduler<Job, 4> = Scheduler::new();
        scheduler.register(Job::A, at(200)).unwrap();
        scheduler.register(Job::B, at(100)).unwrap();

        assert!(scheduler.pop_due(at(50)).is_none());
        assert_eq!(scheduler.next_due(), Some(at(100)));
        assert_eq!(scheduler.pop_due(at(300)).map(|(_, t)| t), Some(Job::B));
        assert_eq!(scheduler.pop_due(at(300)).map(|(_, t)| t), Some(Job::A));
        assert!(scheduler.pop_due(at(300)).is_none());
    }

    #[test]
    fn test_popped_task_runs_once_per_plan() {
        let mut scheduler: Scheduler<Job, 4> = Scheduler::new();
        let id = scheduler.register(Job::A, at(0)).unwrap();

        assert!(scheduler.pop_due(at(0)).is_some());
        assert!(scheduler.pop_due(at(1000)).is_none());
        assert_eq!(scheduler.pending(), 0);

        let delay = Duration::from_millis(500);
        scheduler.plan_relative(id, at(1000), delay).unwrap();
        assert_eq!(scheduler.due(id), Some(at(1500)));
        assert_eq!(scheduler.pop_due(at(1500)).map(|(i, _)| i), Some(id));
    }

    #[test]
    fn test_unregistered_task_never_fires() {
        let mut scheduler: Scheduler<Job, 4> = Scheduler::new();
        let id = scheduler.register(Job::A, at(100)).unwrap();

        assert!(scheduler.unregister(id));
        assert!(!scheduler.unregister(id));
        assert!(!scheduler.is_registered(id));
        assert!(scheduler.pop_due(at(1000)).is_none());
        assert_eq!(
            scheduler.plan_now(id, at(1000)),
            Err(SchedulerError::UnknownTask)
        );
    }

    #[test]
    fn test_stale_handle_does_not_touch_reused_slot() {
        let mut scheduler: Scheduler<Job, 1> = Scheduler::new();
        let old = scheduler.register(Job::A, at(100)).unwrap();
        scheduler.unregister(old);

        let new = scheduler.register(Job::B, at(500)).unwrap();
        assert_ne!(old, new);
        assert_eq!(
            scheduler.plan_now(old, at(0)),
            Err(SchedulerError::UnknownTask)
        );
        assert!(!scheduler.unregister(old));
        assert_eq!(scheduler.due(new), Some(at(500)));
    }

    #[test]
    fn test_full_arena() {
        let mut scheduler: Scheduler<Job, 1> = Scheduler::new();
        scheduler.register(Job::A, at(0)).unwrap();
        assert_eq!(scheduler.register(Job::B, at(0)), Err(SchedulerError::Full));
    }
}
