//! Sensors feeding the memory modules the behaviors read.

use br_behavior::{BrainContext, Sensor};
use br_core::BlockPos;
use br_memory::catalog::{HURT_BY_ENTITY, NEAREST_BED, NEAREST_HOSTILE, NEAREST_LIVING_ENTITIES};
use br_memory::ModuleKey;

/// Radius of the living-entity scan.
pub const LIVING_SCAN_RANGE: f64 = 16.0;
/// A hostile closer than this is remembered as `NEAREST_HOSTILE`.
pub const HOSTILE_RANGE: f64 = 12.0;
/// Horizontal radius of the bed scan.
pub const BED_SCAN_RANGE: i32 = 16;
/// Ticks `HURT_BY_ENTITY` is remembered after the last hit.
pub const HURT_MEMORY_TICKS: u64 = 100;

// ── NearestLivingEntitiesSensor ───────────────────────────────────────────────

/// Living entities within [`LIVING_SCAN_RANGE`], closest first, plus the
/// nearest hostile among them.
#[derive(Default)]
pub struct NearestLivingEntitiesSensor;

impl Sensor for NearestLivingEntitiesSensor {
    fn name(&self) -> &str {
        "nearest_living_entities"
    }

    fn produces(&self) -> Vec<ModuleKey> {
        vec![NEAREST_LIVING_ENTITIES.key(), NEAREST_HOSTILE.key()]
    }

    fn sense(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(me) = ctx.position() else { return };
        let agent = ctx.agent;
        let nearest: Vec<_> = ctx
            .world
            .entities_near(me, LIVING_SCAN_RANGE)
            .into_iter()
            .filter(|&id| id != agent)
            .collect();
        let hostile = nearest.iter().copied().find(|&id| {
            ctx.world
                .entity(id)
                .is_some_and(|e| e.kind.is_hostile() && e.position.closer_than(me, HOSTILE_RANGE))
        });
        let store = ctx.memory_mut();
        store.set_optional(NEAREST_LIVING_ENTITIES, (!nearest.is_empty()).then_some(nearest));
        store.set_optional(NEAREST_HOSTILE, hostile);
    }
}

// ── NearestBedSensor ──────────────────────────────────────────────────────────

/// The closest bed block within [`BED_SCAN_RANGE`], claimed or not.
#[derive(Default)]
pub struct NearestBedSensor;

impl Sensor for NearestBedSensor {
    fn name(&self) -> &str {
        "nearest_bed"
    }

    fn produces(&self) -> Vec<ModuleKey> {
        vec![NEAREST_BED.key()]
    }

    fn sense(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(me) = ctx.position() else { return };
        let center = me.block_pos();
        let mut best: Option<(i64, BlockPos)> = None;
        for dx in -BED_SCAN_RANGE..=BED_SCAN_RANGE {
            for dz in -BED_SCAN_RANGE..=BED_SCAN_RANGE {
                for dy in -1..=1 {
                    let pos = center.offset(dx, dy, dz);
                    if !ctx.world.block_at(pos).is_bed() {
                        continue;
                    }
                    let d = pos.dist_sqr(center);
                    if best.is_none_or(|(bd, _)| d < bd) {
                        best = Some((d, pos));
                    }
                }
            }
        }
        ctx.memory_mut().set_optional(NEAREST_BED, best.map(|(_, pos)| pos));
    }
}

// ── HurtBySensor ──────────────────────────────────────────────────────────────

/// Remembers the last attacker for [`HURT_MEMORY_TICKS`] whenever the
/// agent's health drops.
#[derive(Default)]
pub struct HurtBySensor {
    last_health: Option<f32>,
}

impl Sensor for HurtBySensor {
    fn name(&self) -> &str {
        "hurt_by"
    }

    fn produces(&self) -> Vec<ModuleKey> {
        vec![HURT_BY_ENTITY.key()]
    }

    fn scan_rate(&self) -> u64 {
        1
    }

    fn sense(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(me) = ctx.info() else { return };
        let hurt = self.last_health.is_some_and(|h| me.health < h);
        self.last_health = Some(me.health);
        if !hurt {
            return;
        }
        if let Some(attacker) = ctx.world.last_attacker(ctx.agent).filter(|&a| ctx.world.is_alive(a)) {
            ctx.memory_mut().set_with_expiry(HURT_BY_ENTITY, attacker, HURT_MEMORY_TICKS);
        }
    }
}
