//! Two-agent behaviors that lock a partner.
//!
//! Both sides of a pair hold a reference to each other in the same memory
//! module (`BREED_TARGET` or `INTERACTION_TARGET`).  The lock is written into
//! both stores when the initiator starts and erased from both when it stops;
//! a partner whose module is not `Absent` cannot be picked.

use tracing::debug;

use br_behavior::{BrainContext, EntryCondition, Task, Timed};
use br_core::{AgentId, ItemId, Tick};
use br_memory::catalog::{BREED_TARGET, INTERACTION_TARGET, LOOK_TARGET, NEAREST_LIVING_ENTITIES, WALK_TARGET};
use br_memory::{MemoryModule, MemoryStatus, PositionTracker, WalkTarget};
use br_world::{EntityKind, WorldCommand};

use crate::movement::{distance_to, walk_and_look_at};

// ── Lock helpers ──────────────────────────────────────────────────────────────

/// Whether `other` has a store and its `module` is empty.
fn is_free(ctx: &BrainContext<'_>, module: MemoryModule<AgentId>, other: AgentId) -> bool {
    ctx.memory_of(other)
        .is_some_and(|store| store.has(module.id(), MemoryStatus::Absent))
}

/// Write the reciprocal references.
pub(crate) fn pair(ctx: &mut BrainContext<'_>, module: MemoryModule<AgentId>, partner: AgentId) {
    let me = ctx.agent;
    ctx.memory_mut().set(module, partner);
    if let Some(store) = ctx.memory_of_mut(partner).filter(|s| s.is_registered(module.id())) {
        store.set(module, me);
    }
    debug!(agent = %me, %partner, module = module.name(), "paired");
}

/// Erase whichever side still points at the other.
pub(crate) fn unpair(ctx: &mut BrainContext<'_>, module: MemoryModule<AgentId>, partner: AgentId) {
    let me = ctx.agent;
    if ctx.memory().is_value(module, &partner) {
        ctx.memory_mut().erase(module);
    }
    if let Some(store) = ctx.memory_of_mut(partner) {
        if store.is_value(module, &me) {
            store.erase(module);
        }
    }
    debug!(agent = %me, %partner, module = module.name(), "unpaired");
}

/// Whether both sides still point at each other.
fn is_paired(ctx: &BrainContext<'_>, module: MemoryModule<AgentId>, partner: AgentId) -> bool {
    ctx.memory().is_value(module, &partner)
        && ctx.memory_of(partner).is_some_and(|store| store.is_value(module, &ctx.agent))
}

/// First sensed entity accepted by `accept` whose lock is free.
fn find_partner(
    ctx:    &BrainContext<'_>,
    module: MemoryModule<AgentId>,
    accept: impl Fn(&BrainContext<'_>, AgentId) -> bool,
) -> Option<AgentId> {
    let nearest = ctx.memory().get(NEAREST_LIVING_ENTITIES)?;
    nearest
        .iter()
        .copied()
        .find(|&id| id != ctx.agent && accept(ctx, id) && is_free(ctx, module, id))
}

// ── AnimalMakeLove ────────────────────────────────────────────────────────────

/// Distance at which partners can produce a child.
pub const BREED_DISTANCE: f64 = 3.0;
/// Breeding cooldown set on both parents, in ticks.
pub const BREED_COOLDOWN: i32 = 6_000;

/// Pair with a breedable adult of the same kind, walk together, and spawn a
/// baby once the spawn time has come.
pub struct AnimalMakeLove {
    kind:     EntityKind,
    speed:    f32,
    partner:  Option<AgentId>,
    spawn_at: Tick,
    bred:     bool,
}

impl AnimalMakeLove {
    pub fn new(kind: EntityKind, speed: f32) -> Self {
        Self { kind, speed, partner: None, spawn_at: Tick::ZERO, bred: false }
    }

    pub fn timed(kind: EntityKind, speed: f32) -> Timed<Self> {
        Timed::new(Self::new(kind, speed)).with_duration(60, 110)
    }

    pub fn partner(&self) -> Option<AgentId> {
        self.partner
    }
}

impl Task for AnimalMakeLove {
    fn name(&self) -> &str {
        "animal_make_love"
    }

    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new()
            .absent(BREED_TARGET)
            .present(NEAREST_LIVING_ENTITIES)
            .registered(WALK_TARGET)
            .registered(LOOK_TARGET)
    }

    fn check_extra_start_conditions(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        if !ctx.info().is_some_and(|e| e.kind == self.kind && e.can_breed()) {
            return false;
        }
        let kind = self.kind;
        self.partner = find_partner(ctx, BREED_TARGET, |ctx, id| {
            ctx.world.entity(id).is_some_and(|e| e.kind == kind && e.can_breed())
        });
        self.partner.is_some()
    }

    fn can_still_use(&self, ctx: &BrainContext<'_>) -> bool {
        let Some(partner) = self.partner else { return false };
        !self.bred
            && is_paired(ctx, BREED_TARGET, partner)
            && ctx.info().is_some_and(|e| e.can_breed())
            && ctx.world.entity(partner).is_some_and(|e| e.can_breed())
    }

    fn start(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(partner) = self.partner else { return };
        pair(ctx, BREED_TARGET, partner);
        walk_and_look_at(ctx, partner, self.speed, 0);
        let me = ctx.agent;
        if let Some(store) = ctx.memory_of_mut(partner) {
            if store.is_registered(WALK_TARGET.id()) && store.is_registered(LOOK_TARGET.id()) {
                store.set(WALK_TARGET, WalkTarget::new(me, self.speed, 0));
                store.set(LOOK_TARGET, PositionTracker::Entity(me));
            }
        }
        self.spawn_at = ctx.tick + 60 + ctx.rng.gen_range(0..50);
        self.bred = false;
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(partner) = self.partner else { return };
        walk_and_look_at(ctx, partner, self.speed, 0);
        if ctx.tick < self.spawn_at {
            return;
        }
        if !distance_to(ctx, partner).is_some_and(|d| d <= BREED_DISTANCE) {
            return;
        }
        let Some(at) = ctx.position() else { return };
        let agent = ctx.agent;
        ctx.issue(WorldCommand::SpawnEntity { kind: self.kind, at, baby: true });
        ctx.issue(WorldCommand::SetAge { agent, age: BREED_COOLDOWN });
        ctx.issue(WorldCommand::SetAge { agent: partner, age: BREED_COOLDOWN });
        debug!(%agent, %partner, kind = %self.kind, "bred");
        self.bred = true;
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        if let Some(partner) = self.partner.take() {
            unpair(ctx, BREED_TARGET, partner);
        }
        let store = ctx.memory_mut();
        store.erase(WALK_TARGET);
        store.erase(LOOK_TARGET);
        self.spawn_at = Tick::ZERO;
    }
}

// ── TradeWithVillager ─────────────────────────────────────────────────────────

/// Distance within which two villagers can trade.
pub const TRADE_RANGE: f64 = 5.0;
/// Ticks between two item throws.
pub const THROW_INTERVAL: u64 = 20;

/// Pair with a nearby free villager and hand it an item every
/// [`THROW_INTERVAL`] ticks.
pub struct TradeWithVillager {
    item:       ItemId,
    partner:    Option<AgentId>,
    next_throw: Tick,
}

impl TradeWithVillager {
    pub fn new(item: ItemId) -> Self {
        Self { item, partner: None, next_throw: Tick::ZERO }
    }

    pub fn timed(item: ItemId) -> Timed<Self> {
        Timed::new(Self::new(item)).with_duration(60, 100)
    }

    pub fn partner(&self) -> Option<AgentId> {
        self.partner
    }
}

impl Task for TradeWithVillager {
    fn name(&self) -> &str {
        "trade_with_villager"
    }

    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new()
            .absent(INTERACTION_TARGET)
            .present(NEAREST_LIVING_ENTITIES)
            .registered(LOOK_TARGET)
    }

    fn check_extra_start_conditions(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        if !ctx.info().is_some_and(|e| e.alive && !e.is_baby()) {
            return false;
        }
        self.partner = find_partner(ctx, INTERACTION_TARGET, |ctx, id| {
            ctx.world
                .entity(id)
                .is_some_and(|e| e.kind == EntityKind::Villager && !e.is_baby())
                && distance_to(ctx, id).is_some_and(|d| d <= TRADE_RANGE)
        });
        self.partner.is_some()
    }

    fn can_still_use(&self, ctx: &BrainContext<'_>) -> bool {
        let Some(partner) = self.partner else { return false };
        is_paired(ctx, INTERACTION_TARGET, partner) && distance_to(ctx, partner).is_some_and(|d| d <= TRADE_RANGE)
    }

    fn start(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(partner) = self.partner else { return };
        pair(ctx, INTERACTION_TARGET, partner);
        ctx.memory_mut().set(LOOK_TARGET, PositionTracker::Entity(partner));
        self.next_throw = ctx.tick + THROW_INTERVAL;
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(partner) = self.partner else { return };
        ctx.memory_mut().set(LOOK_TARGET, PositionTracker::Entity(partner));
        if ctx.tick >= self.next_throw {
            let from = ctx.agent;
            ctx.issue(WorldCommand::ThrowItem { from, to: partner, item: self.item });
            self.next_throw = ctx.tick + THROW_INTERVAL;
        }
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        if let Some(partner) = self.partner.take() {
            unpair(ctx, INTERACTION_TARGET, partner);
        }
        ctx.memory_mut().erase(LOOK_TARGET);
    }
}
