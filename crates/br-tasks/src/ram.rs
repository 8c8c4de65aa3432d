//! Goat ramming.
//!
//! `PrepareRam` picks a victim, walks to a run-up spot in line with it, and
//! after standing there for [`PREPARE_TICKS`] stores the victim's position in
//! `RAM_TARGET`.  `RamTarget` then charges at the stored point and knocks
//! back whatever it hits.  Stopping the charge starts `RAM_COOLDOWN_TICKS`.

use tracing::debug;

use br_behavior::{BrainContext, EntryCondition, Task, Timed};
use br_core::{AgentId, BlockPos, Vec3};
use br_memory::catalog::{
    LOOK_TARGET, NEAREST_LIVING_ENTITIES, RAM_COOLDOWN_TICKS, RAM_TARGET, WALK_TARGET,
};
use br_memory::{PositionTracker, WalkTarget};
use br_world::{EntityKind, WorldCommand};

use crate::movement::horizontal_manhattan;

/// Closest and farthest distance at which a victim can be picked.
pub const MIN_RAM_DISTANCE: f64 = 4.0;
pub const MAX_RAM_DISTANCE: f64 = 16.0;
/// Ticks spent standing at the run-up spot before charging.
pub const PREPARE_TICKS: u32 = 40;
/// Distance at which a charge connects.
pub const RAM_HIT_DISTANCE: f64 = 1.5;
pub const RAM_DAMAGE: f32 = 2.0;
pub const RAM_KNOCKBACK: f64 = 2.5;

fn rammable(kind: EntityKind) -> bool {
    kind != EntityKind::Goat
}

// ── PrepareRam ────────────────────────────────────────────────────────────────

pub struct PrepareRam {
    speed:    f32,
    victim:   Option<AgentId>,
    run_up:   Option<BlockPos>,
    waited:   u32,
    prepared: bool,
}

impl PrepareRam {
    pub fn new(speed: f32) -> Self {
        Self { speed, victim: None, run_up: None, waited: 0, prepared: false }
    }

    pub fn timed(speed: f32) -> Timed<Self> {
        Timed::new(Self::new(speed)).with_duration(160, 160)
    }

    pub fn victim(&self) -> Option<AgentId> {
        self.victim
    }

    /// The block [`MIN_RAM_DISTANCE`] away from the victim on the goat's side.
    fn run_up_spot(me: Vec3, victim: Vec3) -> BlockPos {
        let away = Vec3::new(me.x - victim.x, 0.0, me.z - victim.z).normalize();
        victim.add(away.scale(MIN_RAM_DISTANCE)).block_pos()
    }
}

impl Task for PrepareRam {
    fn name(&self) -> &str {
        "prepare_ram"
    }

    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new()
            .absent(RAM_COOLDOWN_TICKS)
            .absent(RAM_TARGET)
            .present(NEAREST_LIVING_ENTITIES)
            .registered(WALK_TARGET)
            .registered(LOOK_TARGET)
    }

    fn check_extra_start_conditions(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        let Some(me) = ctx.position() else { return false };
        let Some(nearest) = ctx.memory().get(NEAREST_LIVING_ENTITIES) else { return false };
        self.victim = nearest.iter().copied().find(|&id| {
            ctx.world.entity(id).is_some_and(|e| {
                let d = e.position.distance(me);
                e.alive && rammable(e.kind) && (MIN_RAM_DISTANCE..=MAX_RAM_DISTANCE).contains(&d)
            })
        });
        self.victim.is_some()
    }

    fn can_still_use(&self, ctx: &BrainContext<'_>) -> bool {
        !self.prepared && self.victim.is_some_and(|v| ctx.world.is_alive(v))
    }

    fn start(&mut self, ctx: &mut BrainContext<'_>) {
        let (Some(victim), Some(me)) = (self.victim, ctx.position()) else { return };
        let Some(at) = ctx.world.position(victim) else { return };
        let spot = Self::run_up_spot(me, at);
        self.run_up = Some(spot);
        self.waited = 0;
        self.prepared = false;
        let store = ctx.memory_mut();
        store.set(WALK_TARGET, WalkTarget::new(spot, self.speed, 0));
        store.set(LOOK_TARGET, PositionTracker::Entity(victim));
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>) {
        let (Some(victim), Some(spot)) = (self.victim, self.run_up) else { return };
        ctx.memory_mut().set(LOOK_TARGET, PositionTracker::Entity(victim));
        let at_spot = ctx.position().is_some_and(|p| horizontal_manhattan(p.block_pos(), spot) <= 1);
        if !at_spot {
            return;
        }
        self.waited += 1;
        if self.waited < PREPARE_TICKS {
            return;
        }
        if let Some(target) = ctx.world.position(victim) {
            ctx.memory_mut().set(RAM_TARGET, target);
            let agent = ctx.agent;
            if let Some(me) = ctx.position() {
                ctx.issue(WorldCommand::PlaySound { at: me, sound: "goat.prepare_ram" });
            }
            debug!(%agent, %victim, "ram prepared");
        }
        self.prepared = true;
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        let store = ctx.memory_mut();
        // Once prepared, WALK_TARGET belongs to the charge.
        if !self.prepared {
            store.erase(WALK_TARGET);
        }
        store.erase(LOOK_TARGET);
        self.victim = None;
        self.run_up = None;
        self.waited = 0;
        self.prepared = false;
    }
}

// ── RamTarget ─────────────────────────────────────────────────────────────────

/// Charge at `RAM_TARGET`; the first non-goat in reach is hit and knocked
/// back.
pub struct RamTarget {
    speed:    f32,
    cooldown: (u64, u64),
    done:     bool,
}

impl RamTarget {
    /// `cooldown` is the inclusive window `RAM_COOLDOWN_TICKS` is drawn from
    /// when the charge ends.
    pub fn new(speed: f32, cooldown: (u64, u64)) -> Self {
        Self { speed, cooldown, done: false }
    }

    pub fn timed(speed: f32, cooldown: (u64, u64)) -> Timed<Self> {
        Timed::new(Self::new(speed, cooldown)).with_duration(200, 200)
    }
}

impl Task for RamTarget {
    fn name(&self) -> &str {
        "ram_target"
    }

    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new()
            .present(RAM_TARGET)
            .absent(RAM_COOLDOWN_TICKS)
            .registered(WALK_TARGET)
    }

    fn can_still_use(&self, ctx: &BrainContext<'_>) -> bool {
        !self.done && ctx.memory().has_value(RAM_TARGET) && ctx.memory().has_value(WALK_TARGET)
    }

    fn start(&mut self, ctx: &mut BrainContext<'_>) {
        self.done = false;
        let Some(&target) = ctx.memory().get(RAM_TARGET) else { return };
        ctx.memory_mut().set(WALK_TARGET, WalkTarget::new(target.block_pos(), self.speed, 0));
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(me) = ctx.position() else { return };
        let agent = ctx.agent;
        let hit = ctx
            .world
            .entities_near(me, RAM_HIT_DISTANCE)
            .into_iter()
            .find(|&id| id != agent && ctx.world.entity(id).is_some_and(|e| rammable(e.kind)));
        if let Some(victim) = hit {
            let direction = ctx.world.position(victim).map_or(Vec3::ZERO, |p| p.sub(me));
            ctx.issue(WorldCommand::Attack { attacker: agent, target: victim, damage: RAM_DAMAGE });
            ctx.issue(WorldCommand::Knockback { target: victim, direction, strength: RAM_KNOCKBACK });
            ctx.issue(WorldCommand::PlaySound { at: me, sound: "goat.ram_impact" });
            debug!(%agent, %victim, "ram hit");
            self.done = true;
            return;
        }
        let arrived = ctx
            .memory()
            .get(RAM_TARGET)
            .is_some_and(|t| horizontal_manhattan(t.block_pos(), me.block_pos()) == 0);
        if arrived {
            self.done = true;
        }
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        let (min, max) = self.cooldown;
        let cooldown = ctx.rng.between_inclusive(min, max);
        let store = ctx.memory_mut();
        store.erase(RAM_TARGET);
        store.erase(WALK_TARGET);
        store.set(RAM_COOLDOWN_TICKS, i32::try_from(cooldown).unwrap_or(i32::MAX));
        self.done = false;
    }
}
