//! Integer cooldown counters.

use br_behavior::{BrainContext, EntryCondition, Task, Timed};
use br_core::Tick;
use br_memory::MemoryModule;

/// Decrements an `i32` cooldown memory once per tick and erases it once it
/// reads zero.
///
/// A cooldown of `n` reaches 0 after `n` ticks and is erased on the next
/// check.
pub struct CountDownCooldownTicks {
    module: MemoryModule<i32>,
}

impl CountDownCooldownTicks {
    pub fn new(module: MemoryModule<i32>) -> Self {
        Self { module }
    }

    pub fn timed(module: MemoryModule<i32>) -> Timed<Self> {
        Timed::new(Self::new(module))
    }

    fn remaining(&self, ctx: &BrainContext<'_>) -> Option<i32> {
        ctx.memory().get(self.module).copied()
    }
}

impl Task for CountDownCooldownTicks {
    fn name(&self) -> &str {
        self.module.name()
    }

    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new().present(self.module)
    }

    fn can_still_use(&self, ctx: &BrainContext<'_>) -> bool {
        self.remaining(ctx).is_some_and(|n| n > 0)
    }

    fn timed_out(&self, _tick: Tick, _end_tick: Tick) -> bool {
        false
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>) {
        if let Some(n) = self.remaining(ctx) {
            ctx.memory_mut().set(self.module, n - 1);
        }
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.memory_mut().erase(self.module);
    }
}
