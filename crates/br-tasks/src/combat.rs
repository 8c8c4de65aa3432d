//! Target selection and attacks.
//!
//! # Crossbow phases
//!
//! ```text
//!   Uncharged ──StartCharging──▶ Charging ──(charge time)──▶ Charged
//!       ▲                                                      │
//!       └──ShootProjectile◀── ReadyToAttack ◀──(20..40 ticks)──┘
//! ```
//!
//! The phase is private state of the task and independent of its outer
//! `Running`/`Stopped` status.

use tracing::debug;

use br_behavior::{absent, declare, present, registered, BrainContext, EntryCondition, Task, Timed, Trigger};
use br_core::{AgentId, Tick};
use br_memory::catalog::{
    ATTACK_COOLING_DOWN, ATTACK_TARGET, CANT_REACH_WALK_TARGET_SINCE, LOOK_TARGET, NEAREST_LIVING_ENTITIES,
    WALK_TARGET,
};
use br_memory::{PositionTracker, WalkTarget};
use br_world::{EntityKind, WorldCommand};

use crate::movement::distance_to;

/// Beyond this distance an attack target is dropped.
pub const FOLLOW_RANGE: f64 = 32.0;
/// Ticks of failing to reach the target after which it is dropped.
pub const GIVE_UP_REACHING_TICKS: u64 = 200;

// ── Target selection ──────────────────────────────────────────────────────────

/// Attack the closest sensed living entity whose kind passes `filter`.
pub fn start_attacking(filter: fn(EntityKind) -> bool) -> impl Trigger {
    declare(
        "start_attacking",
        (absent(ATTACK_TARGET), present(NEAREST_LIVING_ENTITIES), registered(CANT_REACH_WALK_TARGET_SINCE)),
        move |ctx, (target, nearest, cant_reach)| {
            let found = nearest
                .get()
                .iter()
                .copied()
                .find(|&id| id != ctx.agent && ctx.world.entity(id).is_some_and(|e| e.alive && filter(e.kind)));
            let Some(victim) = found else { return false };
            target.set(ctx, victim);
            cant_reach.erase(ctx);
            debug!(agent = %ctx.agent, %victim, "attack target set");
            true
        },
    )
}

/// Drop an attack target that died, wandered off, or could not be reached
/// for too long.
pub fn stop_attacking_if_target_invalid() -> impl Trigger {
    declare(
        "stop_attacking_if_target_invalid",
        (present(ATTACK_TARGET), registered(CANT_REACH_WALK_TARGET_SINCE)),
        |ctx, (target, cant_reach)| {
            let victim = *target.get();
            let in_range = distance_to(ctx, victim).is_some_and(|d| d <= FOLLOW_RANGE);
            let tired = cant_reach
                .get()
                .is_some_and(|&since| ctx.tick.since(since) > GIVE_UP_REACHING_TICKS);
            if in_range && !tired {
                return false;
            }
            target.erase(ctx);
            debug!(agent = %ctx.agent, %victim, "attack target dropped");
            true
        },
    )
}

/// Walk toward the attack target while it is farther than `reach` blocks.
pub fn approach_attack_target(speed: f32, reach: f64) -> impl Trigger {
    declare(
        "approach_attack_target",
        (present(ATTACK_TARGET), registered(WALK_TARGET), registered(LOOK_TARGET)),
        move |ctx, (target, walk, look)| {
            let victim = *target.get();
            let Some(d) = distance_to(ctx, victim) else { return false };
            look.set(ctx, PositionTracker::Entity(victim));
            if d > reach {
                walk.set(ctx, WalkTarget::new(victim, speed, 0));
            } else if walk.get().is_some() {
                walk.erase(ctx);
            }
            true
        },
    )
}

// ── MeleeAttack ───────────────────────────────────────────────────────────────

/// Hit the attack target when it is within `reach`, then cool down.
pub fn melee_attack(reach: f64, damage: f32, cooldown_ticks: u64) -> impl Trigger {
    declare(
        "melee_attack",
        (present(ATTACK_TARGET), absent(ATTACK_COOLING_DOWN)),
        move |ctx, (target, cooling)| {
            let victim = *target.get();
            if !distance_to(ctx, victim).is_some_and(|d| d <= reach) {
                return false;
            }
            let attacker = ctx.agent;
            if let Some(at) = ctx.world.position(victim) {
                ctx.issue(WorldCommand::LookAt { agent: attacker, target: at });
            }
            ctx.issue(WorldCommand::Attack { attacker, target: victim, damage });
            cooling.set_with_expiry(ctx, true, cooldown_ticks);
            true
        },
    )
}

// ── CrossbowAttack ────────────────────────────────────────────────────────────

/// Crossbow shooting range in blocks.
pub const CROSSBOW_RANGE: f64 = 16.0;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum CrossbowState {
    #[default]
    Uncharged,
    Charging,
    Charged,
    ReadyToAttack,
}

/// Charge, wait, and shoot at the attack target for as long as it stays in
/// range.
#[derive(Default)]
pub struct CrossbowAttack {
    state:        CrossbowState,
    charged_at:   Tick,
    attack_delay: u32,
}

impl CrossbowAttack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timed() -> Timed<Self> {
        Timed::new(Self::new()).with_duration(1_200, 1_200)
    }

    pub fn state(&self) -> CrossbowState {
        self.state
    }

    fn target(ctx: &BrainContext<'_>) -> Option<AgentId> {
        ctx.memory().get(ATTACK_TARGET).copied()
    }

    fn in_range(ctx: &BrainContext<'_>) -> bool {
        Self::target(ctx)
            .and_then(|t| distance_to(ctx, t))
            .is_some_and(|d| d <= CROSSBOW_RANGE)
    }
}

impl Task for CrossbowAttack {
    fn name(&self) -> &str {
        "crossbow_attack"
    }

    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new().present(ATTACK_TARGET)
    }

    fn check_extra_start_conditions(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        Self::in_range(ctx)
    }

    fn can_still_use(&self, ctx: &BrainContext<'_>) -> bool {
        Self::in_range(ctx)
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(victim) = Self::target(ctx) else { return };
        let agent = ctx.agent;
        if let Some(at) = ctx.world.position(victim) {
            ctx.issue(WorldCommand::LookAt { agent, target: at });
        }
        match self.state {
            CrossbowState::Uncharged => {
                ctx.issue(WorldCommand::StartCharging { agent });
                self.charged_at = ctx.tick + u64::from(ctx.world.charge_duration(agent));
                self.state = CrossbowState::Charging;
            }
            CrossbowState::Charging => {
                if ctx.tick >= self.charged_at {
                    self.attack_delay = 20 + ctx.rng.gen_range(0..20);
                    self.state = CrossbowState::Charged;
                }
            }
            CrossbowState::Charged => {
                self.attack_delay = self.attack_delay.saturating_sub(1);
                if self.attack_delay == 0 {
                    self.state = CrossbowState::ReadyToAttack;
                }
            }
            CrossbowState::ReadyToAttack => {
                ctx.issue(WorldCommand::ShootProjectile { shooter: agent, target: victim });
                self.state = CrossbowState::Uncharged;
            }
        }
    }

    fn stop(&mut self, _ctx: &mut BrainContext<'_>) {
        self.state = CrossbowState::Uncharged;
        self.attack_delay = 0;
    }
}
