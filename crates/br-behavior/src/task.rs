//! `Task` hooks and the `Timed<T>` lifecycle helper.
//!
//! A concrete behavior implements [`Task`] (its private state plus the six
//! hooks) and is wrapped in [`Timed`], which owns the status, the entry
//! condition, and the duration window:
//!
//! ```rust,ignore
//! let stroll = Timed::new(RandomStroll::new(1.0))
//!     .with_duration(150, 250);
//! brain.add(Activity::Idle, 2, stroll);
//! ```

use tracing::trace;

use br_core::Tick;

use crate::{Behavior, BrainContext, EntryCondition, Status};

/// Duration window used when a task does not set one.
pub const DEFAULT_DURATION: u64 = 60;

/// The hooks of one leaf behavior.
///
/// Only [`Timed`] calls these, and only from the public transitions.
pub trait Task: Send {
    fn name(&self) -> &str;

    /// Memory preconditions, read once when the task is wrapped.
    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new()
    }

    /// Extra start check run after the entry condition holds.
    fn check_extra_start_conditions(&mut self, _ctx: &mut BrainContext<'_>) -> bool {
        true
    }

    /// Whether a running task may keep going.  The default stops it on the
    /// first tick after it started.
    fn can_still_use(&self, _ctx: &BrainContext<'_>) -> bool {
        false
    }

    /// Whether the duration window has run out.
    fn timed_out(&self, tick: Tick, end_tick: Tick) -> bool {
        tick > end_tick
    }

    fn start(&mut self, _ctx: &mut BrainContext<'_>) {}

    fn tick(&mut self, _ctx: &mut BrainContext<'_>) {}

    fn stop(&mut self, _ctx: &mut BrainContext<'_>) {}
}

// ── Timed ─────────────────────────────────────────────────────────────────────

/// Lifecycle wrapper turning a [`Task`] into a [`Behavior`].
pub struct Timed<T: Task> {
    task:         T,
    entry:        EntryCondition,
    min_duration: u64,
    max_duration: u64,
    status:       Status,
    started_at:   Tick,
    end_tick:     Tick,
}

impl<T: Task> Timed<T> {
    pub fn new(task: T) -> Self {
        let entry = task.entry_condition();
        Self {
            task,
            entry,
            min_duration: DEFAULT_DURATION,
            max_duration: DEFAULT_DURATION,
            status: Status::Stopped,
            started_at: Tick::ZERO,
            end_tick: Tick::ZERO,
        }
    }

    /// Set the duration window; each start samples uniformly in `[min, max]`.
    ///
    /// # Panics
    /// Panics if `min > max`.
    pub fn with_duration(mut self, min: u64, max: u64) -> Self {
        assert!(min <= max, "min_duration {min} exceeds max_duration {max} for {}", self.task.name());
        self.min_duration = min;
        self.max_duration = max;
        self
    }

    /// Fixed duration of `ticks`.
    pub fn with_fixed_duration(self, ticks: u64) -> Self {
        self.with_duration(ticks, ticks)
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn task_mut(&mut self) -> &mut T {
        &mut self.task
    }

    pub fn entry_condition(&self) -> &EntryCondition {
        &self.entry
    }

    pub fn started_at(&self) -> Tick {
        self.started_at
    }

    pub fn end_tick(&self) -> Tick {
        self.end_tick
    }

    pub fn duration_window(&self) -> (u64, u64) {
        (self.min_duration, self.max_duration)
    }

    /// Box as a trait object for brain registration.
    pub fn boxed(self) -> Box<dyn Behavior>
    where
        T: 'static,
    {
        Box::new(self)
    }
}

impl<T: Task> Behavior for Timed<T> {
    fn name(&self) -> &str {
        self.task.name()
    }

    fn status(&self) -> Status {
        self.status
    }

    fn try_start(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        if self.status != Status::Stopped {
            return false;
        }
        if !self.entry.is_satisfied(ctx.memory()) {
            return false;
        }
        if !self.task.check_extra_start_conditions(ctx) {
            return false;
        }
        self.status = Status::Running;
        let duration = ctx.rng.between_inclusive(self.min_duration, self.max_duration);
        self.started_at = ctx.tick;
        self.end_tick = ctx.tick + duration;
        trace!(agent = %ctx.agent, behavior = self.task.name(), duration, "behavior started");
        self.task.start(ctx);
        true
    }

    fn tick_or_stop(&mut self, ctx: &mut BrainContext<'_>) {
        if self.status != Status::Running {
            return;
        }
        if self.task.timed_out(ctx.tick, self.end_tick) || !self.task.can_still_use(ctx) {
            self.do_stop(ctx);
        } else {
            self.task.tick(ctx);
        }
    }

    fn do_stop(&mut self, ctx: &mut BrainContext<'_>) {
        if self.status == Status::Stopped {
            return;
        }
        self.status = Status::Stopped;
        trace!(agent = %ctx.agent, behavior = self.task.name(), "behavior stopped");
        self.task.stop(ctx);
    }
}
