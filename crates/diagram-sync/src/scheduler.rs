use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source for deferred work.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    FitView,
    ViewportRelayout,
    CountFitView,
}

/// Identifies one scheduling of a task kind. A handle goes stale as soon as
/// the kind is rescheduled or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle {
    pub kind: TaskKind,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduledTask {
    pub handle: TaskHandle,
    pub due: Instant,
}

/// Single-slot debounce scheduler: at most one pending task per kind.
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    slots: HashMap<TaskKind, ScheduledTask>,
    next_generation: u64,
}

impl Scheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slots: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Schedules `kind` to fire after `delay`, superseding any pending task
    /// of the same kind.
    pub fn schedule(&mut self, kind: TaskKind, delay: Duration) -> TaskHandle {
        self.next_generation += 1;
        let handle = TaskHandle {
            kind,
            generation: self.next_generation,
        };
        let task = ScheduledTask {
            handle,
            due: self.clock.now() + delay,
        };
        if let Some(previous) = self.slots.insert(kind, task) {
            tracing::debug!(
                "Superseded pending {:?} task (generation {})",
                kind,
                previous.handle.generation
            );
        }
        handle
    }

    pub fn cancel(&mut self, kind: TaskKind) -> Option<TaskHandle> {
        self.slots.remove(&kind).map(|task| task.handle)
    }

    pub fn is_current(&self, handle: TaskHandle) -> bool {
        self.slots
            .get(&handle.kind)
            .is_some_and(|task| task.handle == handle)
    }

    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.slots.contains_key(&kind)
    }

    pub fn has_pending(&self) -> bool {
        !self.slots.is_empty()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.slots.values().map(|task| task.due).min()
    }

    /// Removes and returns every task whose due time has passed, earliest
    /// first.
    pub fn take_due(&mut self) -> Vec<TaskHandle> {
        let now = self.clock.now();
        let mut due: Vec<ScheduledTask> = self
            .slots
            .values()
            .filter(|task| task.due <= now)
            .copied()
            .collect();
        due.sort_by_key(|task| (task.due, task.handle.generation));
        for task in &due {
            self.slots.remove(&task.handle.kind);
        }
        due.into_iter().map(|task| task.handle).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> (ManualClock, Scheduler) {
        let clock = ManualClock::new();
        let scheduler = Scheduler::new(Arc::new(clock.clone()));
        (clock, scheduler)
    }

    #[test]
    fn test_task_fires_only_after_delay() {
        let (clock, mut scheduler) = scheduler();
        scheduler.schedule(TaskKind::FitView, Duration::from_millis(120));

        clock.advance_ms(119);
        assert!(scheduler.take_due().is_empty());

        clock.advance_ms(1);
        let fired = scheduler.take_due();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, TaskKind::FitView);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_reschedule_supersedes_pending() {
        let (clock, mut scheduler) = scheduler();
        let first = scheduler.schedule(TaskKind::ViewportRelayout, Duration::from_millis(160));
        clock.advance_ms(100);
        let second = scheduler.schedule(TaskKind::ViewportRelayout, Duration::from_millis(160));

        assert!(!scheduler.is_current(first));
        assert!(scheduler.is_current(second));

        clock.advance_ms(100);
        assert!(scheduler.take_due().is_empty());
        clock.advance_ms(60);
        assert_eq!(scheduler.take_due(), vec![second]);
    }

    #[test]
    fn test_cancel_invalidates_handle() {
        let (clock, mut scheduler) = scheduler();
        let handle = scheduler.schedule(TaskKind::CountFitView, Duration::from_millis(380));
        assert_eq!(scheduler.cancel(TaskKind::CountFitView), Some(handle));
        assert!(!scheduler.is_current(handle));

        clock.advance_ms(1_000);
        assert!(scheduler.take_due().is_empty());
    }

    #[test]
    fn test_due_tasks_fire_in_due_order() {
        let (clock, mut scheduler) = scheduler();
        scheduler.schedule(TaskKind::CountFitView, Duration::from_millis(380));
        scheduler.schedule(TaskKind::FitView, Duration::from_millis(120));
        scheduler.schedule(TaskKind::ViewportRelayout, Duration::from_millis(160));
        assert_eq!(
            scheduler.next_due(),
            Some(scheduler.now() + Duration::from_millis(120))
        );

        clock.advance_ms(400);
        let kinds: Vec<TaskKind> = scheduler.take_due().iter().map(|h| h.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TaskKind::FitView,
                TaskKind::ViewportRelayout,
                TaskKind::CountFitView
            ]
        );
    }
}
