//! One-shot triggers.
//!
//! A trigger does all its work inside the start attempt and never holds a
//! `Running` state.  [`OneShot`] adapts a trigger to [`Behavior`]; a brain
//! therefore offers it a start every tick its activity is active.

use crate::{Behavior, BrainContext, OrderPolicy, RunningPolicy, ShufflingList, Status};

pub trait Trigger: Send {
    fn name(&self) -> &str;

    /// Fire once.  Returns `true` if the trigger did something.
    fn trigger(&mut self, ctx: &mut BrainContext<'_>) -> bool;

    fn one_shot(self) -> OneShot<Self>
    where
        Self: Sized,
    {
        OneShot::new(self)
    }
}

// ── FnTrigger ─────────────────────────────────────────────────────────────────

pub struct FnTrigger<F> {
    name: &'static str,
    f:    F,
}

impl<F> Trigger for FnTrigger<F>
where
    F: FnMut(&mut BrainContext<'_>) -> bool + Send,
{
    fn name(&self) -> &str {
        self.name
    }

    fn trigger(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        (self.f)(ctx)
    }
}

/// A trigger from a closure.
pub fn trigger_fn<F>(name: &'static str, f: F) -> FnTrigger<F>
where
    F: FnMut(&mut BrainContext<'_>) -> bool + Send,
{
    FnTrigger { name, f }
}

// ── OneShot ───────────────────────────────────────────────────────────────────

/// A [`Behavior`] that is always `Stopped`; each start attempt fires the
/// trigger.
pub struct OneShot<T: Trigger> {
    trigger: T,
}

impl<T: Trigger> OneShot<T> {
    pub fn new(trigger: T) -> Self {
        Self { trigger }
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn boxed(self) -> Box<dyn Behavior>
    where
        T: 'static,
    {
        Box::new(self)
    }
}

impl<T: Trigger> Behavior for OneShot<T> {
    fn name(&self) -> &str {
        self.trigger.name()
    }

    fn status(&self) -> Status {
        Status::Stopped
    }

    fn try_start(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        self.trigger.trigger(ctx)
    }

    fn tick_or_stop(&mut self, _ctx: &mut BrainContext<'_>) {}

    fn do_stop(&mut self, _ctx: &mut BrainContext<'_>) {}
}

// ── TriggerGate ───────────────────────────────────────────────────────────────

/// Fires triggers in (optionally shuffled) order until one succeeds under
/// `RunOne`, or all have been fired under `TryAll`.
pub struct TriggerGate {
    name:     String,
    order:    OrderPolicy,
    running:  RunningPolicy,
    triggers: ShufflingList<Box<dyn Trigger>>,
}

impl TriggerGate {
    pub fn new(
        name:     impl Into<String>,
        order:    OrderPolicy,
        running:  RunningPolicy,
        triggers: Vec<(Box<dyn Trigger>, u32)>,
    ) -> Self {
        Self {
            name: name.into(),
            order,
            running,
            triggers: triggers.into_iter().collect(),
        }
    }

    /// Weighted random pick of one trigger that fires.
    pub fn one_shuffled(name: impl Into<String>, triggers: Vec<(Box<dyn Trigger>, u32)>) -> Self {
        Self::new(name, OrderPolicy::Shuffled, RunningPolicy::RunOne, triggers)
    }

    /// Fire every trigger in order.
    pub fn try_all_ordered(name: impl Into<String>, triggers: Vec<(Box<dyn Trigger>, u32)>) -> Self {
        Self::new(name, OrderPolicy::Ordered, RunningPolicy::TryAll, triggers)
    }

    pub fn boxed(self) -> Box<dyn Behavior> {
        Box::new(self)
    }
}

impl Behavior for TriggerGate {
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> Status {
        Status::Stopped
    }

    fn try_start(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        if self.order == OrderPolicy::Shuffled {
            self.triggers.shuffle(ctx.rng);
        }
        let mut fired = false;
        for trigger in self.triggers.iter_mut() {
            if trigger.trigger(ctx) {
                fired = true;
                if self.running == RunningPolicy::RunOne {
                    break;
                }
            }
        }
        fired
    }

    fn tick_or_stop(&mut self, _ctx: &mut BrainContext<'_>) {}

    fn do_stop(&mut self, _ctx: &mut BrainContext<'_>) {}
}
