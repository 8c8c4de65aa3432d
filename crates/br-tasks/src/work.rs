//! Farming.

use br_behavior::{BrainContext, EntryCondition, Task, Timed};
use br_core::{BlockPos, Tick};
use br_memory::catalog::{LAST_WORKED_AT_POI, LOOK_TARGET, WALK_TARGET};
use br_memory::WalkTarget;
use br_world::{BlockKind, WorldCommand};

use crate::movement::horizontal_manhattan;

/// Horizontal radius scanned for farm work.
pub const FARM_SCAN_RADIUS: i32 = 4;
/// Ticks a harvesting session lasts at most.
pub const MAX_WORK_TICKS: u32 = 200;
/// Ticks to wait after a session before starting another.
pub const REST_BETWEEN_SESSIONS: u64 = 40;

/// Walk between nearby farm cells, harvesting mature crops and planting
/// empty farmland.  Harvested cells are replanted in the same tick.
pub struct HarvestFarmland {
    speed:   f32,
    target:  Option<BlockPos>,
    worked:  u32,
    next_ok: Tick,
}

impl HarvestFarmland {
    pub fn new(speed: f32) -> Self {
        Self { speed, target: None, worked: 0, next_ok: Tick::ZERO }
    }

    pub fn timed(speed: f32) -> Timed<Self> {
        Timed::new(Self::new(speed)).with_duration(200, 200)
    }

    fn is_workable(block: BlockKind) -> bool {
        block == BlockKind::Farmland || block.is_mature_crop()
    }

    /// A random workable cell around the agent.
    fn pick_target(ctx: &mut BrainContext<'_>) -> Option<BlockPos> {
        let center = ctx.position()?.block_pos();
        let mut cells = Vec::new();
        for dx in -FARM_SCAN_RADIUS..=FARM_SCAN_RADIUS {
            for dz in -FARM_SCAN_RADIUS..=FARM_SCAN_RADIUS {
                for dy in -1..=1 {
                    let pos = center.offset(dx, dy, dz);
                    if Self::is_workable(ctx.world.block_at(pos)) {
                        cells.push(pos);
                    }
                }
            }
        }
        ctx.rng.choose(&cells).copied()
    }

    fn aim(&mut self, ctx: &mut BrainContext<'_>, target: Option<BlockPos>) {
        self.target = target;
        let store = ctx.memory_mut();
        match target {
            Some(pos) => {
                store.set(WALK_TARGET, WalkTarget::new(pos, self.speed, 0));
                store.set(LOOK_TARGET, pos.into());
            }
            None => {
                store.erase(WALK_TARGET);
                store.erase(LOOK_TARGET);
            }
        }
    }
}

impl Task for HarvestFarmland {
    fn name(&self) -> &str {
        "harvest_farmland"
    }

    fn entry_condition(&self) -> EntryCondition {
        EntryCondition::new()
            .registered(WALK_TARGET)
            .registered(LOOK_TARGET)
            .registered(LAST_WORKED_AT_POI)
    }

    fn check_extra_start_conditions(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        if ctx.tick < self.next_ok || ctx.info().is_none_or(|e| e.is_baby()) {
            return false;
        }
        self.target = Self::pick_target(ctx);
        self.target.is_some()
    }

    fn can_still_use(&self, _ctx: &BrainContext<'_>) -> bool {
        self.target.is_some() && self.worked < MAX_WORK_TICKS
    }

    fn start(&mut self, ctx: &mut BrainContext<'_>) {
        self.worked = 0;
        self.aim(ctx, self.target);
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>) {
        self.worked += 1;
        let Some(pos) = self.target else { return };
        let Some(me) = ctx.position() else { return };
        if horizontal_manhattan(me.block_pos(), pos) > 1 {
            return;
        }
        let block = ctx.world.block_at(pos);
        if block.is_mature_crop() {
            ctx.issue(WorldCommand::SetBlock { pos, block: BlockKind::Crop { age: 0 } });
            ctx.issue(WorldCommand::PlaySound { at: me, sound: "crop.harvest" });
        } else if block == BlockKind::Farmland {
            ctx.issue(WorldCommand::SetBlock { pos, block: BlockKind::Crop { age: 0 } });
            ctx.issue(WorldCommand::PlaySound { at: me, sound: "crop.plant" });
        }
        let now = ctx.tick;
        ctx.memory_mut().set(LAST_WORKED_AT_POI, now);
        let next = Self::pick_target(ctx).filter(|&p| p != pos);
        self.aim(ctx, next);
    }

    fn stop(&mut self, ctx: &mut BrainContext<'_>) {
        self.aim(ctx, None);
        self.worked = 0;
        self.next_ok = ctx.tick + REST_BETWEEN_SESSIONS;
    }
}
