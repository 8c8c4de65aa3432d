//! Panic: entering it, running away, and calming down.

use tracing::debug;

use br_behavior::{absent, declare, registered, trigger_fn, BrainContext, Trigger};
use br_core::{AgentId, Vec3};
use br_memory::catalog::{
    BREED_TARGET, HURT_BY_ENTITY, IS_PANICKING, LOOK_TARGET, NEAREST_HOSTILE, WALK_TARGET,
};
use br_memory::{MemoryStatus, WalkTarget};
use br_schedule::Activity;

/// Blocks a fleeing agent tries to put between itself and the danger.
pub const FLEE_DISTANCE: f64 = 8.0;

/// Whatever the agent is afraid of: its last attacker, else the nearest
/// hostile (when `hostiles` is set).
fn danger(ctx: &BrainContext<'_>, hostiles: bool) -> Option<AgentId> {
    let store = ctx.memory();
    let hurt = store
        .has(HURT_BY_ENTITY.id(), MemoryStatus::Present)
        .then(|| store.get(HURT_BY_ENTITY).copied())
        .flatten();
    let hostile = (hostiles && store.has(NEAREST_HOSTILE.id(), MemoryStatus::Present))
        .then(|| store.get(NEAREST_HOSTILE).copied())
        .flatten();
    hurt.or(hostile)
}

/// Switch to `Panic` when hurt (or, with `hostiles`, when a hostile is
/// sensed).  Drops walk, look, and breed targets and sets `IS_PANICKING`.
pub fn panic_trigger(hostiles: bool) -> impl Trigger {
    trigger_fn("panic_trigger", move |ctx| {
        if ctx.activity == Some(Activity::Panic) || danger(ctx, hostiles).is_none() {
            return false;
        }
        let store = ctx.memory_mut();
        for key in [WALK_TARGET.key(), LOOK_TARGET.key(), BREED_TARGET.key()] {
            if store.is_registered(key.id) {
                store.erase_key(key);
            }
        }
        if store.is_registered(IS_PANICKING.id()) {
            store.set(IS_PANICKING, true);
        }
        ctx.request_activity(Activity::Panic);
        debug!(agent = %ctx.agent, "panicking");
        true
    })
}

/// Leave `Panic` for `resume` once nothing is threatening the agent.
pub fn calm_down(resume: Activity, hostiles: bool) -> impl Trigger {
    trigger_fn("calm_down", move |ctx| {
        if danger(ctx, hostiles).is_some() {
            return false;
        }
        let store = ctx.memory_mut();
        for key in [HURT_BY_ENTITY.key(), IS_PANICKING.key()] {
            if store.is_registered(key.id) {
                store.erase_key(key);
            }
        }
        ctx.request_activity(resume);
        debug!(agent = %ctx.agent, %resume, "calmed down");
        true
    })
}

/// Walk [`FLEE_DISTANCE`] blocks directly away from the danger.
pub fn flee(speed: f32, hostiles: bool) -> impl Trigger {
    declare(
        "flee",
        (absent(WALK_TARGET), registered(HURT_BY_ENTITY)),
        move |ctx, (walk, _hurt)| {
            let Some(threat) = danger(ctx, hostiles) else { return false };
            let (Some(me), Some(from)) = (ctx.position(), ctx.world.position(threat)) else {
                return false;
            };
            let away = Vec3::new(me.x - from.x, 0.0, me.z - from.z);
            let away = if away.length() < 1e-6 { Vec3::new(1.0, 0.0, 0.0) } else { away.normalize() };
            walk.set(ctx, WalkTarget::new(me.add(away.scale(FLEE_DISTANCE)).block_pos(), speed, 0));
            true
        },
    )
}
