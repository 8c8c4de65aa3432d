//! Sleeping, waking, and bed play.

use br_behavior::{trigger_fn, BrainContext, EntryCondition, Task, Timed, Trigger};
use br_core::{BlockPos, Tick};
use br_memory::catalog::{HOME, LAST_SLEPT, LAST_WOKEN, NEAREST_BED, WALK_TARGET};
use br_memory::WalkTarget;
use br_schedule::Activity;
use br_world::{BlockKind, WorldCommand};

use crate::movement::horizontal_manhattan;

// ── SleepInBed ────────────────────────────────────────────────────────────────

/// Ticks after waking before the agent may lie down again.
pub const WAKE_GRACE_TICKS: u64 = 100;
/// Ticks after leaving a bed before the next attempt.
pub const RETRY_AFTER_STOP: u64 = 40;

/// Lie down in the home bed while the `Rest` activity is active.
///
/// Requires `HOME` to be set, the agent within 2 blocks of it, the bed free,
/// and at least [`WAKE_GRACE_TICKS`] since the agent last woke.  The task
/// never times out; it ends when the activity changes or the agent leaves
/// the bed.
#[derive(Default)]
pub struct SleepInBed {
    next_ok: Tick,
}

impl SleepInBed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timed() -> Timed<Self> {
        Timed::new(Self::new())
    }

    fn home(ctx: &BrainContext<'_>) -> Option<BlockPos> {
        ctx.memory().get(HOME).copied()
    }
}

impl Task for SleepInBed {
    fn name(&self) -> &str {
        "sleep_in_bed"
    }

    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new()
            .registered(HOME)
            .registered(LAST_WOKEN)
            .registered(LAST_SLEPT)
    }

    fn check_extra_start_conditions(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        let Some(home) = Self::home(ctx) else { return false };
        let Some(me) = ctx.info().filter(|e| e.alive) else { return false };
        if me.sleeping.is_some() || ctx.tick < self.next_ok {
            return false;
        }
        if let Some(&woken) = ctx.memory().get(LAST_WOKEN) {
            if ctx.tick.since(woken) < WAKE_GRACE_TICKS {
                return false;
            }
        }
        home.closer_to_center_than(me.position, 2.0) && ctx.world.block_at(home) == (BlockKind::Bed { occupied: false })
    }

    fn can_still_use(&self, ctx: &BrainContext<'_>) -> bool {
        let Some(home) = Self::home(ctx) else { return false };
        ctx.activity == Some(Activity::Rest) && ctx.info().is_some_and(|e| e.sleeping == Some(home))
    }

    fn timed_out(&self, _tick: Tick, _end_tick: Tick) -> bool {
        false
    }

    fn start(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(bed) = Self::home(ctx) else { return };
        let (agent, now) = (ctx.agent, ctx.tick);
        ctx.issue(WorldCommand::StartSleeping { agent, bed });
        ctx.memory_mut().set(LAST_SLEPT, now);
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        if ctx.info().is_some_and(|e| e.sleeping.is_some()) {
            let (agent, now) = (ctx.agent, ctx.tick);
            ctx.issue(WorldCommand::StopSleeping { agent });
            ctx.memory_mut().set(LAST_WOKEN, now);
        }
        self.next_ok = ctx.tick + RETRY_AFTER_STOP;
    }
}

// ── WakeUp ────────────────────────────────────────────────────────────────────

/// Get out of bed once `Rest` is no longer active.
pub fn wake_up() -> impl Trigger {
    trigger_fn("wake_up", |ctx| {
        if ctx.activity == Some(Activity::Rest) || !ctx.info().is_some_and(|e| e.sleeping.is_some()) {
            return false;
        }
        let (agent, now) = (ctx.agent, ctx.tick);
        ctx.issue(WorldCommand::StopSleeping { agent });
        let store = ctx.memory_mut();
        if store.is_registered(LAST_WOKEN.id()) {
            store.set(LAST_WOKEN, now);
        }
        true
    })
}

// ── JumpOnBed ─────────────────────────────────────────────────────────────────

/// Ticks a baby gets to reach the bed.
pub const TIME_TO_REACH_BED: u32 = 100;
/// Minimum jumps per session; a random 0..5 is added.
pub const MIN_JUMPS: u32 = 5;
/// Ticks between two jumps.
pub const JUMP_INTERVAL: u64 = 5;

/// Babies walk to the nearest bed and bounce on it.
pub struct JumpOnBed {
    speed:           f32,
    bed:             Option<BlockPos>,
    time_to_reach:   u32,
    remaining_jumps: u32,
    next_jump:       Tick,
}

impl JumpOnBed {
    pub fn new(speed: f32) -> Self {
        Self { speed, bed: None, time_to_reach: 0, remaining_jumps: 0, next_jump: Tick::ZERO }
    }

    pub fn timed(speed: f32) -> Timed<Self> {
        Timed::new(Self::new(speed)).with_duration(200, 200)
    }

    fn on_bed(&self, ctx: &BrainContext<'_>) -> bool {
        match (self.bed, ctx.position()) {
            (Some(bed), Some(me)) => horizontal_manhattan(bed, me.block_pos()) == 0,
            _ => false,
        }
    }

    pub fn remaining_jumps(&self) -> u32 {
        self.remaining_jumps
    }
}

impl Task for JumpOnBed {
    fn name(&self) -> &str {
        "jump_on_bed"
    }

    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new().present(NEAREST_BED).absent(WALK_TARGET)
    }

    fn check_extra_start_conditions(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        if !ctx.info().is_some_and(|e| e.is_baby()) {
            return false;
        }
        self.bed = ctx.memory().get(NEAREST_BED).copied();
        self.bed.is_some_and(|bed| ctx.world.block_at(bed).is_bed())
    }

    fn can_still_use(&self, ctx: &BrainContext<'_>) -> bool {
        let Some(bed) = self.bed else { return false };
        if !ctx.world.block_at(bed).is_bed() || !ctx.info().is_some_and(|e| e.is_baby()) {
            return false;
        }
        if self.on_bed(ctx) {
            self.remaining_jumps > 0
        } else {
            self.time_to_reach > 0
        }
    }

    fn start(&mut self, ctx: &mut BrainContext<'_>) {
        self.time_to_reach = TIME_TO_REACH_BED;
        self.remaining_jumps = MIN_JUMPS + ctx.rng.gen_range(0..5);
        self.next_jump = ctx.tick;
        if let Some(bed) = self.bed {
            ctx.memory_mut().set(WALK_TARGET, WalkTarget::new(bed, self.speed, 0));
        }
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>) {
        if !self.on_bed(ctx) {
            self.time_to_reach = self.time_to_reach.saturating_sub(1);
            return;
        }
        if ctx.tick >= self.next_jump {
            let agent = ctx.agent;
            ctx.issue(WorldCommand::Jump { agent });
            self.remaining_jumps = self.remaining_jumps.saturating_sub(1);
            self.next_jump = ctx.tick + JUMP_INTERVAL;
        }
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.memory_mut().erase(WALK_TARGET);
        self.bed = None;
        self.time_to_reach = 0;
        self.remaining_jumps = 0;
    }
}
