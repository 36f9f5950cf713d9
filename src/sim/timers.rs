//! Deferred actions polled by the simulation clock
//!
//! Every delayed behavior (settle detonation, actor spawn, flyer respawn,
//! reload) is a `ScheduledTask` record checked at the start of each tick.
//! Tasks remember the scheduler generation they were created in; `shutdown`
//! advances the generation so nothing scheduled before teardown can fire.

/// What a timer does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Runner and Flyer enter from the left
    SpawnActors,
    /// Pointer has rested long enough to detonate under it
    SettleDetonation,
    /// Flyer comes back after being shot down
    RespawnFlyer,
    /// Crash sequence finished, hand the session back to the host
    Reload,
}

/// A single pending timer
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    /// Tick at (or after) which the task fires
    pub fire_at: u64,
    pub cancelled: bool,
    pub action: TimerAction,
    generation: u32,
}

/// Pending timers for one session
#[derive(Debug, Clone)]
pub struct Scheduler {
    tasks: Vec<ScheduledTask>,
    generation: u32,
    live: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            generation: 0,
            live: true,
        }
    }

    /// Whether the scheduler still accepts and fires tasks
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Queue `action` to fire at tick `fire_at`. Ignored after shutdown.
    pub fn schedule(&mut self, fire_at: u64, action: TimerAction) {
        if !self.live {
            return;
        }
        self.tasks.push(ScheduledTask {
            fire_at,
            cancelled: false,
            action,
            generation: self.generation,
        });
    }

    /// Cancel any pending `action` and schedule it again (debounce)
    pub fn reschedule(&mut self, fire_at: u64, action: TimerAction) {
        self.cancel(action);
        self.schedule(fire_at, action);
    }

    /// Cancel every pending task with this action. Returns true if any was pending.
    pub fn cancel(&mut self, action: TimerAction) -> bool {
        let mut found = false;
        for task in self.tasks.iter_mut().filter(|t| t.action == action && !t.cancelled) {
            task.cancelled = true;
            found = true;
        }
        found
    }

    /// Whether a live, uncancelled task with this action is waiting
    pub fn is_pending(&self, action: TimerAction) -> bool {
        self.live
            && self
                .tasks
                .iter()
                .any(|t| t.action == action && !t.cancelled && t.generation == self.generation)
    }

    /// Tick at which the pending `action` fires, if any
    pub fn fire_at(&self, action: TimerAction) -> Option<u64> {
        self.tasks
            .iter()
            .filter(|t| t.action == action && !t.cancelled && t.generation == self.generation)
            .map(|t| t.fire_at)
            .min()
    }

    /// Number of waiting tasks with this action
    pub fn pending_count_of(&self, action: TimerAction) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.action == action && !t.cancelled && t.generation == self.generation)
            .count()
    }

    /// Cancel everything and refuse new work
    pub fn shutdown(&mut self) {
        for task in &mut self.tasks {
            task.cancelled = true;
        }
        self.generation = self.generation.wrapping_add(1);
        self.live = false;
    }

    /// Remove and return the actions due at `now`, earliest first.
    /// Cancelled or stale tasks are dropped without firing.
    pub fn take_due(&mut self, now: u64) -> Vec<TimerAction> {
        if !self.live {
            self.tasks.clear();
            return Vec::new();
        }

        let generation = self.generation;
        let mut due: Vec<ScheduledTask> = Vec::new();
        self.tasks.retain(|t| {
            if t.cancelled || t.generation != generation {
                return false;
            }
            if t.fire_at <= now {
                due.push(t.clone());
                return false;
            }
            true
        });
        due.sort_by_key(|t| t.fire_at);
        due.into_iter().map(|t| t.action).collect()
    }

    /// Number of tasks still waiting (cancelled ones excluded)
    pub fn pending_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| !t.cancelled && t.generation == self.generation)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_tasks_fire_once_in_order() {
        let mut s = Scheduler::new();
        s.schedule(10, TimerAction::Reload);
        s.schedule(5, TimerAction::RespawnFlyer);

        assert!(s.take_due(4).is_empty());
        assert_eq!(
            s.take_due(10),
            vec![TimerAction::RespawnFlyer, TimerAction::Reload]
        );
        assert!(s.take_due(100).is_empty());
    }

    #[test]
    fn test_reschedule_replaces_pending() {
        let mut s = Scheduler::new();
        s.schedule(15, TimerAction::SettleDetonation);
        s.reschedule(21, TimerAction::SettleDetonation);

        assert!(s.take_due(15).is_empty());
        assert_eq!(s.fire_at(TimerAction::SettleDetonation), Some(21));
        assert_eq!(s.take_due(21), vec![TimerAction::SettleDetonation]);
        assert!(!s.is_pending(TimerAction::SettleDetonation));
    }

    #[test]
    fn test_shutdown_makes_everything_inert() {
        let mut s = Scheduler::new();
        s.schedule(1, TimerAction::Reload);
        s.schedule(2, TimerAction::SpawnActors);
        s.shutdown();

        assert!(!s.is_live());
        assert!(!s.is_pending(TimerAction::Reload));
        assert!(s.take_due(1000).is_empty());

        s.schedule(3, TimerAction::RespawnFlyer);
        assert_eq!(s.pending_count(), 0);
        assert!(s.take_due(1000).is_empty());
    }

    #[test]
    fn test_cancel_reports_pending() {
        let mut s = Scheduler::new();
        assert!(!s.cancel(TimerAction::RespawnFlyer));
        s.schedule(3, TimerAction::RespawnFlyer);
        assert!(s.cancel(TimerAction::RespawnFlyer));
        assert!(s.take_due(3).is_empty());
    }
}
