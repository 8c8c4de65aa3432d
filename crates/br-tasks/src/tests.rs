//! Unit tests for br-tasks.
//!
//! Tasks are driven directly through `Behavior`; the archetype tests run whole
//! brains against a `FlatWorld`.

use br_behavior::{Brain, BrainContext};
use br_core::{AgentId, AgentRng, Tick, Vec3};
use br_memory::{MemoryBank, MemoryLayout, MemoryStore};
use br_world::{EntityKind, FlatWorld, World, WorldCommand};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A flat world plus one memory store per spawned entity.
struct Harness {
    world:    FlatWorld,
    bank:     MemoryBank,
    rng:      AgentRng,
    commands: Vec<WorldCommand>,
}

impl Harness {
    fn new() -> Self {
        Self { world: FlatWorld::new(5), bank: MemoryBank::new(0), rng: AgentRng::from_seed(9), commands: Vec::new() }
    }

    fn spawn(&mut self, kind: EntityKind, x: f64, z: f64, layout: &MemoryLayout) -> AgentId {
        let id = self.world.spawn(kind, Vec3::new(x, 64.0, z));
        self.bank.install(id, layout.instantiate());
        id
    }

    fn spawn_baby(&mut self, kind: EntityKind, x: f64, z: f64, layout: &MemoryLayout) -> AgentId {
        let id = self.world.spawn_baby(kind, Vec3::new(x, 64.0, z));
        self.bank.install(id, layout.instantiate());
        id
    }

    fn ctx(&mut self, agent: AgentId, tick: u64) -> BrainContext<'_> {
        self.bank.advance_all(Tick(tick));
        BrainContext::new(
            Tick(tick),
            tick % br_core::DAY_LENGTH_TICKS,
            agent,
            &self.world,
            &mut self.bank,
            &mut self.rng,
            &mut self.commands,
        )
    }

    fn store(&self, agent: AgentId) -> &MemoryStore {
        self.bank.store(agent)
    }

    fn store_mut(&mut self, agent: AgentId) -> &mut MemoryStore {
        self.bank.store_mut(agent)
    }

    /// Apply and return the queued commands.
    fn flush(&mut self) -> Vec<WorldCommand> {
        let commands = std::mem::take(&mut self.commands);
        for command in &commands {
            self.world.apply(command.clone());
        }
        commands
    }

    /// One full tick of `brain` for `agent`, including world stepping.
    fn run(&mut self, brain: &mut Brain, agent: AgentId, tick: u64) -> Vec<WorldCommand> {
        brain.tick(&mut self.ctx(agent, tick));
        let commands = self.flush();
        self.world.step(Tick(tick));
        commands
    }
}

fn has_command(commands: &[WorldCommand], label: &str) -> bool {
    commands.iter().any(|c| c.label() == label)
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod movement_tests {
    use br_behavior::{Behavior, Status, Trigger};
    use br_core::BlockPos;
    use br_memory::catalog::{CANT_REACH_WALK_TARGET_SINCE, LOOK_TARGET, NEAREST_LIVING_ENTITIES, WALK_TARGET};
    use br_memory::{PositionTracker, WalkTarget};

    use super::*;
    use crate::movement::{random_stroll, set_entity_look_target, set_walk_target_from_look_target, STROLL_SPREAD};
    use crate::{LookAtTargetSink, MoveToTargetSink};

    fn layout() -> MemoryLayout {
        MemoryLayout::new()
            .with(WALK_TARGET)
            .with(LOOK_TARGET)
            .with(CANT_REACH_WALK_TARGET_SINCE)
            .with(NEAREST_LIVING_ENTITIES)
    }

    #[test]
    fn move_sink_walks_to_target_and_clears_it() {
        let mut h = Harness::new();
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout());
        let goal = BlockPos::new(5, 64, 0);
        h.store_mut(v).set(WALK_TARGET, WalkTarget::new(goal, 1.0, 0));

        let mut sink = MoveToTargetSink::timed();
        assert!(sink.try_start(&mut h.ctx(v, 0)));
        assert!(has_command(&h.flush(), "move_to"));

        for t in 1..60 {
            h.world.step(Tick(t));
            sink.tick_or_stop(&mut h.ctx(v, t));
            h.flush();
            if sink.status() == Status::Stopped {
                break;
            }
        }
        assert_eq!(sink.status(), Status::Stopped);
        assert_eq!(h.world.position(v).map(Vec3::block_pos), Some(goal));
        assert!(!h.store(v).has_value(WALK_TARGET));
    }

    #[test]
    fn move_sink_records_unreachable_target() {
        let mut h = Harness::new();
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout());
        h.world.add_obstacle(BlockPos::new(1, 64, 0));
        h.store_mut(v).set(WALK_TARGET, WalkTarget::new(BlockPos::new(5, 64, 0), 1.0, 0));

        let mut sink = MoveToTargetSink::timed();
        assert!(!sink.try_start(&mut h.ctx(v, 7)));
        assert!(!h.store(v).has_value(WALK_TARGET));
        assert_eq!(h.store(v).get(CANT_REACH_WALK_TARGET_SINCE), Some(&Tick(7)));
    }

    #[test]
    fn look_sink_turns_until_target_dies() {
        let mut h = Harness::new();
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout());
        let cow = h.spawn(EntityKind::Cow, 4.5, 0.5, &MemoryLayout::new());
        h.store_mut(v).set(LOOK_TARGET, PositionTracker::Entity(cow));

        let mut sink = LookAtTargetSink::timed();
        assert!(sink.try_start(&mut h.ctx(v, 0)));
        sink.tick_or_stop(&mut h.ctx(v, 1));
        h.flush();
        assert_eq!(h.world.look_target(v), Some(Vec3::new(4.5, 64.0, 0.5)));

        h.world.kill(cow).unwrap();
        sink.tick_or_stop(&mut h.ctx(v, 2));
        assert_eq!(sink.status(), Status::Stopped);
        assert!(!h.store(v).has_value(LOOK_TARGET));
    }

    #[test]
    fn random_stroll_stays_within_spread() {
        let mut h = Harness::new();
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout());
        let mut stroll = random_stroll(0.5);
        for t in 0..50 {
            h.store_mut(v).erase(WALK_TARGET);
            if stroll.trigger(&mut h.ctx(v, t)) {
                let walk = *h.store(v).get(WALK_TARGET).unwrap();
                let PositionTracker::Block(pos) = walk.target else { panic!("stroll targets a block") };
                assert!(pos.x.abs() <= STROLL_SPREAD && pos.z.abs() <= STROLL_SPREAD);
            }
        }
    }

    #[test]
    fn look_target_picks_closest_matching_kind() {
        let mut h = Harness::new();
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout());
        let goat = h.spawn(EntityKind::Goat, 2.5, 0.5, &MemoryLayout::new());
        let player = h.spawn(EntityKind::Player, 4.5, 0.5, &MemoryLayout::new());
        h.store_mut(v).set(NEAREST_LIVING_ENTITIES, vec![goat, player]);

        let mut pick = set_entity_look_target(|k| k == EntityKind::Player, 8.0);
        assert!(pick.trigger(&mut h.ctx(v, 0)));
        assert_eq!(h.store(v).get(LOOK_TARGET), Some(&PositionTracker::Entity(player)));
        // Already looking: the absent query blocks a second pick.
        assert!(!pick.trigger(&mut h.ctx(v, 1)));
    }

    #[test]
    fn walk_target_follows_look_target_once() {
        let mut h = Harness::new();
        let cat = h.spawn(EntityKind::Cat, 0.5, 0.5, &layout());
        let player = h.spawn(EntityKind::Player, 6.5, 0.5, &MemoryLayout::new());
        let mut follow = set_walk_target_from_look_target(0.5, 2);
        assert!(!follow.trigger(&mut h.ctx(cat, 0)));

        h.store_mut(cat).set(LOOK_TARGET, PositionTracker::Entity(player));
        assert!(follow.trigger(&mut h.ctx(cat, 1)));
        let walk = *h.store(cat).get(WALK_TARGET).unwrap();
        assert_eq!(walk.target, PositionTracker::Entity(player));
        assert_eq!(walk.close_enough, 2);
        assert!(!follow.trigger(&mut h.ctx(cat, 2)));
    }
}

// ── Cooldowns ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cooldown_tests {
    use br_behavior::{Behavior, Status};
    use br_memory::catalog::RAM_COOLDOWN_TICKS;

    use super::*;
    use crate::CountDownCooldownTicks;

    #[test]
    fn counts_down_then_erases() {
        let mut h = Harness::new();
        let g = h.spawn(EntityKind::Goat, 0.5, 0.5, &MemoryLayout::new().with(RAM_COOLDOWN_TICKS));
        h.store_mut(g).set(RAM_COOLDOWN_TICKS, 5);

        let mut cd = CountDownCooldownTicks::timed(RAM_COOLDOWN_TICKS);
        assert!(cd.try_start(&mut h.ctx(g, 0)));
        for t in 1..=5 {
            cd.tick_or_stop(&mut h.ctx(g, t));
            assert_eq!(h.store(g).get(RAM_COOLDOWN_TICKS), Some(&(5 - t as i32)));
        }
        assert_eq!(cd.status(), Status::Running);

        cd.tick_or_stop(&mut h.ctx(g, 6));
        assert_eq!(cd.status(), Status::Stopped);
        assert!(!h.store(g).has_value(RAM_COOLDOWN_TICKS));
    }

    #[test]
    fn does_not_start_without_cooldown() {
        let mut h = Harness::new();
        let g = h.spawn(EntityKind::Goat, 0.5, 0.5, &MemoryLayout::new().with(RAM_COOLDOWN_TICKS));
        let mut cd = CountDownCooldownTicks::timed(RAM_COOLDOWN_TICKS);
        assert!(!cd.try_start(&mut h.ctx(g, 0)));
    }
}

// ── POIs ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod poi_tests {
    use br_behavior::Trigger;
    use br_core::BlockPos;
    use br_memory::catalog::HOME;
    use br_world::{BlockKind, PoiKind};

    use super::*;
    use crate::poi::MAX_RETRY_DELAY;
    use crate::{AcquirePoi, Backoff, ValidateNearbyPoi};

    const BED: BlockPos = BlockPos::new(3, 64, 0);

    fn village() -> (Harness, AgentId) {
        let mut h = Harness::new();
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &MemoryLayout::new().with(HOME));
        h.world.set_block(BED, BlockKind::Bed { occupied: false });
        (h, v)
    }

    #[test]
    fn backoff_grows_linearly_with_jitter_and_caps() {
        let mut rng = AgentRng::from_seed(3);
        let mut b = Backoff::new(Tick(0), &mut rng);
        assert!((40..80).contains(&b.delay()));
        assert_eq!(b.next_attempt(), Tick(b.delay()));

        let mut previous = b.delay();
        for i in 1..20u64 {
            b.mark_attempt(Tick(i * 10), &mut rng);
            let d = b.delay();
            assert!(d <= MAX_RETRY_DELAY);
            assert!(d == MAX_RETRY_DELAY || (40..80).contains(&(d - previous)));
            previous = d;
        }
        assert_eq!(b.delay(), MAX_RETRY_DELAY);
        assert!(b.is_still_valid(Tick(190 + MAX_RETRY_DELAY - 1)));
        assert!(!b.is_still_valid(Tick(190 + MAX_RETRY_DELAY)));
    }

    #[test]
    fn acquires_reachable_poi() {
        let (mut h, v) = village();
        let mut acquire = AcquirePoi::new(PoiKind::Home, HOME, false);
        assert!(acquire.trigger(&mut h.ctx(v, 0)));
        assert_eq!(h.store(v).get(HOME), Some(&BED));
        h.flush();
        assert_eq!(h.world.poi_owner(BED), Some(v));
    }

    #[test]
    fn unreachable_poi_is_parked_behind_backoff() {
        let (mut h, v) = village();
        h.world.add_obstacle(BlockPos::new(1, 64, 0));
        let mut acquire = AcquirePoi::new(PoiKind::Home, HOME, false);

        assert!(!acquire.trigger(&mut h.ctx(v, 0)));
        let first = acquire.retries()[&BED].delay();
        assert!((40..80).contains(&first));

        assert!(!acquire.trigger(&mut h.ctx(v, 100)));
        assert!(acquire.retries()[&BED].delay() >= first + 40);
        assert!(!h.store(v).has_value(HOME));
    }

    #[test]
    fn adults_only_skips_babies() {
        let mut h = Harness::new();
        let baby = h.spawn_baby(EntityKind::Villager, 0.5, 0.5, &MemoryLayout::new().with(HOME));
        h.world.set_block(BED, BlockKind::Bed { occupied: false });
        let mut acquire = AcquirePoi::new(PoiKind::Home, HOME, true);
        assert!(!acquire.trigger(&mut h.ctx(baby, 0)));
    }

    #[test]
    fn vanished_poi_is_forgotten_and_released() {
        let (mut h, v) = village();
        h.store_mut(v).set(HOME, BED);
        h.world.assign_poi(BED, v).unwrap();
        let mut validate = ValidateNearbyPoi::new(PoiKind::Home, HOME);
        assert!(!validate.trigger(&mut h.ctx(v, 0)));

        h.world.set_block(BED, BlockKind::Workstation);
        assert!(validate.trigger(&mut h.ctx(v, 1)));
        assert!(!h.store(v).has_value(HOME));
        assert!(has_command(&h.flush(), "release_poi"));
        assert_eq!(h.world.poi_owner(BED), None);
    }
}

// ── Pairing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pairing_tests {
    use br_behavior::{Behavior, Status, Timed};
    use br_core::ItemId;
    use br_memory::catalog::{BREED_TARGET, INTERACTION_TARGET, LOOK_TARGET, NEAREST_LIVING_ENTITIES, WALK_TARGET};

    use super::*;
    use crate::pairing::BREED_COOLDOWN;
    use crate::{AnimalMakeLove, TradeWithVillager};

    fn goat_layout() -> MemoryLayout {
        MemoryLayout::new()
            .with(BREED_TARGET)
            .with(WALK_TARGET)
            .with(LOOK_TARGET)
            .with(NEAREST_LIVING_ENTITIES)
    }

    #[test]
    fn breeding_locks_both_sides_and_unlocks_on_stop() {
        let mut h = Harness::new();
        let a = h.spawn(EntityKind::Goat, 0.5, 0.5, &goat_layout());
        let b = h.spawn(EntityKind::Goat, 2.5, 0.5, &goat_layout());
        h.store_mut(a).set(NEAREST_LIVING_ENTITIES, vec![b]);

        let mut love = AnimalMakeLove::timed(EntityKind::Goat, 0.5);
        assert!(love.try_start(&mut h.ctx(a, 0)));
        assert_eq!(h.store(a).get(BREED_TARGET), Some(&b));
        assert_eq!(h.store(b).get(BREED_TARGET), Some(&a));

        love.do_stop(&mut h.ctx(a, 1));
        assert!(!h.store(a).has_value(BREED_TARGET));
        assert!(!h.store(b).has_value(BREED_TARGET));
    }

    #[test]
    fn locked_partner_cannot_be_picked() {
        let mut h = Harness::new();
        let a = h.spawn(EntityKind::Goat, 0.5, 0.5, &goat_layout());
        let b = h.spawn(EntityKind::Goat, 2.5, 0.5, &goat_layout());
        let c = h.spawn(EntityKind::Goat, 1.5, 2.5, &goat_layout());
        h.store_mut(b).set(BREED_TARGET, c);
        h.store_mut(a).set(NEAREST_LIVING_ENTITIES, vec![b]);

        let mut love = AnimalMakeLove::timed(EntityKind::Goat, 0.5);
        assert!(!love.try_start(&mut h.ctx(a, 0)));
        assert_eq!(h.store(b).get(BREED_TARGET), Some(&c));
    }

    #[test]
    fn breeding_spawns_a_baby_and_sets_cooldowns() {
        let mut h = Harness::new();
        let a = h.spawn(EntityKind::Cow, 0.5, 0.5, &goat_layout());
        let b = h.spawn(EntityKind::Cow, 2.5, 0.5, &goat_layout());
        h.store_mut(a).set(NEAREST_LIVING_ENTITIES, vec![b]);

        let mut love = Timed::new(AnimalMakeLove::new(EntityKind::Cow, 0.5)).with_fixed_duration(200);
        assert!(love.try_start(&mut h.ctx(a, 0)));
        for t in 1..=120 {
            love.tick_or_stop(&mut h.ctx(a, t));
            h.flush();
            if love.status() == Status::Stopped {
                break;
            }
        }
        assert_eq!(love.status(), Status::Stopped);
        assert_eq!(h.world.entity_count(), 3);
        let baby = h.world.entity(AgentId(2)).unwrap();
        assert!(baby.is_baby());
        assert_eq!(baby.kind, EntityKind::Cow);
        assert_eq!(h.world.entity(a).unwrap().age, BREED_COOLDOWN);
        assert_eq!(h.world.entity(b).unwrap().age, BREED_COOLDOWN);
        assert!(!h.store(b).has_value(BREED_TARGET));
    }

    #[test]
    fn trading_throws_items_to_partner() {
        let layout = MemoryLayout::new()
            .with(INTERACTION_TARGET)
            .with(LOOK_TARGET)
            .with(NEAREST_LIVING_ENTITIES);
        let mut h = Harness::new();
        let a = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout);
        let b = h.spawn(EntityKind::Villager, 2.5, 0.5, &layout);
        h.store_mut(a).set(NEAREST_LIVING_ENTITIES, vec![b]);

        let mut trade = TradeWithVillager::timed(ItemId(7));
        assert!(trade.try_start(&mut h.ctx(a, 0)));
        assert_eq!(h.store(b).get(INTERACTION_TARGET), Some(&a));

        for t in 1..=20 {
            trade.tick_or_stop(&mut h.ctx(a, t));
            h.flush();
        }
        assert_eq!(h.world.inventory(b), &[ItemId(7)]);

        trade.do_stop(&mut h.ctx(a, 21));
        assert!(!h.store(a).has_value(INTERACTION_TARGET));
        assert!(!h.store(b).has_value(INTERACTION_TARGET));
    }
}

// ── Rest ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rest_tests {
    use br_behavior::{Behavior, Status, Trigger};
    use br_core::BlockPos;
    use br_memory::catalog::{HOME, LAST_SLEPT, LAST_WOKEN, NEAREST_BED, WALK_TARGET};
    use br_schedule::Activity;
    use br_world::BlockKind;

    use super::*;
    use crate::rest::wake_up;
    use crate::{JumpOnBed, SleepInBed};

    const BED: BlockPos = BlockPos::new(1, 64, 0);

    fn sleeper() -> (Harness, AgentId) {
        let mut h = Harness::new();
        let layout = MemoryLayout::new().with(HOME).with(LAST_SLEPT).with(LAST_WOKEN);
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout);
        h.world.set_block(BED, BlockKind::Bed { occupied: false });
        (h, v)
    }

    fn resting(h: &mut Harness, v: AgentId, tick: u64) -> BrainContext<'_> {
        let mut ctx = h.ctx(v, tick);
        ctx.activity = Some(Activity::Rest);
        ctx
    }

    #[test]
    fn registered_but_unset_home_blocks_sleep() {
        let (mut h, v) = sleeper();
        let mut sleep = SleepInBed::timed();
        assert!(!sleep.try_start(&mut resting(&mut h, v, 0)));
        assert!(h.commands.is_empty());
    }

    #[test]
    fn sleeps_in_home_bed_and_wakes_when_rest_ends() {
        let (mut h, v) = sleeper();
        h.store_mut(v).set(HOME, BED);
        let mut sleep = SleepInBed::timed();

        assert!(sleep.try_start(&mut resting(&mut h, v, 1)));
        assert_eq!(h.store(v).get(LAST_SLEPT), Some(&Tick(1)));
        h.flush();
        assert_eq!(h.world.entity(v).unwrap().sleeping, Some(BED));
        assert_eq!(h.world.block_at(BED), BlockKind::Bed { occupied: true });

        sleep.tick_or_stop(&mut resting(&mut h, v, 2));
        assert_eq!(sleep.status(), Status::Running);

        // Rest is over.
        sleep.tick_or_stop(&mut h.ctx(v, 3));
        assert_eq!(sleep.status(), Status::Stopped);
        assert_eq!(h.store(v).get(LAST_WOKEN), Some(&Tick(3)));
        h.flush();
        assert_eq!(h.world.entity(v).unwrap().sleeping, None);

        assert!(!sleep.try_start(&mut resting(&mut h, v, 50)));
        assert!(sleep.try_start(&mut resting(&mut h, v, 103)));
    }

    #[test]
    fn occupied_or_distant_bed_blocks_sleep() {
        let (mut h, v) = sleeper();
        h.store_mut(v).set(HOME, BED);
        h.world.set_block(BED, BlockKind::Bed { occupied: true });
        let mut sleep = SleepInBed::timed();
        assert!(!sleep.try_start(&mut resting(&mut h, v, 0)));

        h.world.set_block(BED, BlockKind::Bed { occupied: false });
        h.world.teleport(v, Vec3::new(9.5, 64.0, 0.5)).unwrap();
        assert!(!sleep.try_start(&mut resting(&mut h, v, 1)));
    }

    #[test]
    fn wake_up_gets_sleepers_out_of_bed_outside_rest() {
        let (mut h, v) = sleeper();
        h.world.apply(WorldCommand::StartSleeping { agent: v, bed: BED });
        let mut wake = wake_up();
        assert!(!wake.trigger(&mut resting(&mut h, v, 0)));

        let mut ctx = h.ctx(v, 1);
        ctx.activity = Some(Activity::Work);
        assert!(wake.trigger(&mut ctx));
        assert!(has_command(&h.flush(), "stop_sleeping"));
        assert_eq!(h.store(v).get(LAST_WOKEN), Some(&Tick(1)));
    }

    #[test]
    fn babies_jump_on_beds() {
        let mut h = Harness::new();
        let layout = MemoryLayout::new().with(NEAREST_BED).with(WALK_TARGET);
        let baby = h.spawn_baby(EntityKind::Villager, 0.5, 0.5, &layout);
        let adult = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout);
        let bed = BlockPos::new(0, 64, 0);
        h.world.set_block(bed, BlockKind::Bed { occupied: false });
        h.store_mut(baby).set(NEAREST_BED, bed);
        h.store_mut(adult).set(NEAREST_BED, bed);

        let mut adult_jump = JumpOnBed::timed(0.5);
        assert!(!adult_jump.try_start(&mut h.ctx(adult, 0)));

        let mut jump = JumpOnBed::timed(0.5);
        assert!(jump.try_start(&mut h.ctx(baby, 0)));
        let planned = jump.task().remaining_jumps();
        assert!((5..10).contains(&planned));
        for t in 1..100 {
            jump.tick_or_stop(&mut h.ctx(baby, t));
            h.flush();
        }
        assert_eq!(jump.status(), Status::Stopped);
        assert_eq!(h.world.jumps(baby), planned);
    }
}

// ── Work ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod work_tests {
    use br_behavior::{Behavior, Status};
    use br_core::BlockPos;
    use br_memory::catalog::{LAST_WORKED_AT_POI, LOOK_TARGET, WALK_TARGET};
    use br_world::{BlockKind, CROP_MAX_AGE};

    use super::*;
    use crate::HarvestFarmland;

    #[test]
    fn harvests_and_replants_mature_crop() {
        let mut h = Harness::new();
        let layout = MemoryLayout::new().with(WALK_TARGET).with(LOOK_TARGET).with(LAST_WORKED_AT_POI);
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout);
        let crop = BlockPos::new(1, 64, 0);
        h.world.set_block(crop, BlockKind::Crop { age: CROP_MAX_AGE });

        let mut work = HarvestFarmland::timed(0.5);
        assert!(work.try_start(&mut h.ctx(v, 0)));
        assert!(h.store(v).has_value(WALK_TARGET));

        work.tick_or_stop(&mut h.ctx(v, 1));
        assert_eq!(h.store(v).get(LAST_WORKED_AT_POI), Some(&Tick(1)));
        h.flush();
        assert_eq!(h.world.block_at(crop), BlockKind::Crop { age: 0 });
        assert!(h.world.sounds().contains(&"crop.harvest"));

        work.tick_or_stop(&mut h.ctx(v, 2));
        assert_eq!(work.status(), Status::Stopped);
        assert!(!h.store(v).has_value(WALK_TARGET));
    }

    #[test]
    fn nothing_to_do_without_farmland() {
        let mut h = Harness::new();
        let layout = MemoryLayout::new().with(WALK_TARGET).with(LOOK_TARGET).with(LAST_WORKED_AT_POI);
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout);
        h.world.set_block(BlockPos::new(1, 64, 0), BlockKind::Crop { age: 2 });
        let mut work = HarvestFarmland::timed(0.5);
        assert!(!work.try_start(&mut h.ctx(v, 0)));
    }
}

// ── Combat ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod combat_tests {
    use br_behavior::{Behavior, Status, Trigger};
    use br_memory::catalog::{
        ATTACK_COOLING_DOWN, ATTACK_TARGET, CANT_REACH_WALK_TARGET_SINCE, NEAREST_LIVING_ENTITIES,
    };

    use super::*;
    use crate::combat::{melee_attack, start_attacking, stop_attacking_if_target_invalid};
    use crate::{CrossbowAttack, CrossbowState};

    fn layout() -> MemoryLayout {
        MemoryLayout::new()
            .with(ATTACK_TARGET)
            .with(ATTACK_COOLING_DOWN)
            .with(NEAREST_LIVING_ENTITIES)
            .with(CANT_REACH_WALK_TARGET_SINCE)
    }

    #[test]
    fn picks_target_hits_and_cools_down() {
        let mut h = Harness::new();
        let p = h.spawn(EntityKind::Pillager, 0.5, 0.5, &layout());
        let goat = h.spawn(EntityKind::Goat, 1.0, 0.5, &MemoryLayout::new());
        let v = h.spawn(EntityKind::Villager, 1.5, 0.5, &MemoryLayout::new());
        h.store_mut(p).set(NEAREST_LIVING_ENTITIES, vec![goat, v]);

        let mut pick = start_attacking(|k| k == EntityKind::Villager);
        assert!(pick.trigger(&mut h.ctx(p, 0)));
        assert_eq!(h.store(p).get(ATTACK_TARGET), Some(&v));

        let mut melee = melee_attack(2.0, 3.0, 20);
        assert!(melee.trigger(&mut h.ctx(p, 0)));
        assert!(!melee.trigger(&mut h.ctx(p, 10)));
        assert!(melee.trigger(&mut h.ctx(p, 25)));
        h.flush();
        assert_eq!(h.world.entity(v).unwrap().health, 14.0);
    }

    #[test]
    fn dead_target_is_dropped() {
        let mut h = Harness::new();
        let p = h.spawn(EntityKind::Pillager, 0.5, 0.5, &layout());
        let v = h.spawn(EntityKind::Villager, 5.5, 0.5, &MemoryLayout::new());
        h.store_mut(p).set(ATTACK_TARGET, v);

        let mut check = stop_attacking_if_target_invalid();
        assert!(!check.trigger(&mut h.ctx(p, 0)));
        h.world.kill(v).unwrap();
        assert!(check.trigger(&mut h.ctx(p, 1)));
        assert!(!h.store(p).has_value(ATTACK_TARGET));
    }

    #[test]
    fn crossbow_cycles_through_phases() {
        let mut h = Harness::new();
        let p = h.spawn(EntityKind::Pillager, 0.5, 0.5, &layout());
        let v = h.spawn(EntityKind::Villager, 8.5, 0.5, &MemoryLayout::new());
        h.store_mut(p).set(ATTACK_TARGET, v);

        let mut bow = CrossbowAttack::timed();
        assert!(bow.try_start(&mut h.ctx(p, 0)));
        assert_eq!(bow.task().state(), CrossbowState::Uncharged);

        bow.tick_or_stop(&mut h.ctx(p, 1));
        assert_eq!(bow.task().state(), CrossbowState::Charging);
        assert!(has_command(&h.flush(), "start_charging"));
        assert!(h.world.is_charging(p));

        let charged_at = 1 + u64::from(h.world.charge_duration(p));
        for t in 2..charged_at {
            bow.tick_or_stop(&mut h.ctx(p, t));
            assert_eq!(bow.task().state(), CrossbowState::Charging);
        }
        bow.tick_or_stop(&mut h.ctx(p, charged_at));
        assert_eq!(bow.task().state(), CrossbowState::Charged);

        let mut t = charged_at;
        while bow.task().state() == CrossbowState::Charged {
            t += 1;
            bow.tick_or_stop(&mut h.ctx(p, t));
        }
        assert_eq!(bow.task().state(), CrossbowState::ReadyToAttack);
        assert!((20..40).contains(&(t - charged_at)));

        h.flush();
        bow.tick_or_stop(&mut h.ctx(p, t + 1));
        assert!(has_command(&h.flush(), "shoot_projectile"));
        assert_eq!(bow.task().state(), CrossbowState::Uncharged);
    }

    #[test]
    fn crossbow_resets_when_target_leaves_range() {
        let mut h = Harness::new();
        let p = h.spawn(EntityKind::Pillager, 0.5, 0.5, &layout());
        let v = h.spawn(EntityKind::Villager, 8.5, 0.5, &MemoryLayout::new());
        h.store_mut(p).set(ATTACK_TARGET, v);

        let mut bow = CrossbowAttack::timed();
        bow.try_start(&mut h.ctx(p, 0));
        bow.tick_or_stop(&mut h.ctx(p, 1));
        h.world.teleport(v, Vec3::new(40.5, 64.0, 0.5)).unwrap();
        bow.tick_or_stop(&mut h.ctx(p, 2));
        assert_eq!(bow.status(), Status::Stopped);
        assert_eq!(bow.task().state(), CrossbowState::Uncharged);
    }
}

// ── Ram ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod ram_tests {
    use br_behavior::{Behavior, Status};
    use br_memory::catalog::{
        LOOK_TARGET, NEAREST_LIVING_ENTITIES, RAM_COOLDOWN_TICKS, RAM_TARGET, WALK_TARGET,
    };

    use super::*;
    use crate::ram::PREPARE_TICKS;
    use crate::{PrepareRam, RamTarget};

    fn layout() -> MemoryLayout {
        MemoryLayout::new()
            .with(RAM_TARGET)
            .with(RAM_COOLDOWN_TICKS)
            .with(NEAREST_LIVING_ENTITIES)
            .with(WALK_TARGET)
            .with(LOOK_TARGET)
    }

    #[test]
    fn prepare_then_ram() {
        let mut h = Harness::new();
        let g = h.spawn(EntityKind::Goat, 0.5, 0.5, &layout());
        let cow = h.spawn(EntityKind::Cow, 6.5, 0.5, &MemoryLayout::new());
        h.store_mut(g).set(NEAREST_LIVING_ENTITIES, vec![cow]);

        let mut prepare = PrepareRam::timed(1.0);
        assert!(prepare.try_start(&mut h.ctx(g, 0)));
        assert_eq!(prepare.task().victim(), Some(cow));
        let spot = *h.store(g).get(WALK_TARGET).unwrap();
        assert_eq!(spot, br_memory::WalkTarget::new(br_core::BlockPos::new(2, 64, 0), 1.0, 0));

        h.world.teleport(g, Vec3::new(2.5, 64.0, 0.5)).unwrap();
        for t in 1..=u64::from(PREPARE_TICKS) {
            prepare.tick_or_stop(&mut h.ctx(g, t));
        }
        assert_eq!(h.store(g).get(RAM_TARGET), Some(&Vec3::new(6.5, 64.0, 0.5)));
        assert!(has_command(&h.flush(), "play_sound"));

        let mut ram = RamTarget::timed(1.0, (600, 6_000));
        assert!(ram.try_start(&mut h.ctx(g, 41)));
        prepare.tick_or_stop(&mut h.ctx(g, 42));
        assert_eq!(prepare.status(), Status::Stopped);
        assert!(h.store(g).has_value(WALK_TARGET));

        h.world.teleport(g, Vec3::new(5.5, 64.0, 0.5)).unwrap();
        ram.tick_or_stop(&mut h.ctx(g, 42));
        h.flush();
        assert_eq!(h.world.entity(cow).unwrap().health, 8.0);
        assert!(h.world.position(cow).unwrap().x > 6.5);
        assert!(h.world.sounds().contains(&"goat.ram_impact"));

        ram.tick_or_stop(&mut h.ctx(g, 43));
        assert_eq!(ram.status(), Status::Stopped);
        assert!(!h.store(g).has_value(RAM_TARGET));
        let cooldown = *h.store(g).get(RAM_COOLDOWN_TICKS).unwrap();
        assert!((600..=6_000).contains(&cooldown));
    }

    #[test]
    fn goats_are_never_victims() {
        let mut h = Harness::new();
        let g = h.spawn(EntityKind::Goat, 0.5, 0.5, &layout());
        let other = h.spawn(EntityKind::Goat, 6.5, 0.5, &MemoryLayout::new());
        h.store_mut(g).set(NEAREST_LIVING_ENTITIES, vec![other]);
        let mut prepare = PrepareRam::timed(1.0);
        assert!(!prepare.try_start(&mut h.ctx(g, 0)));
    }
}

// ── Panic ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod panic_tests {
    use br_behavior::Trigger;
    use br_memory::catalog::{HURT_BY_ENTITY, IS_PANICKING, LOOK_TARGET, NEAREST_HOSTILE, WALK_TARGET};
    use br_memory::{PositionTracker, WalkTarget};
    use br_schedule::Activity;

    use super::*;
    use crate::panic::{calm_down, flee, panic_trigger};

    fn layout() -> MemoryLayout {
        MemoryLayout::new()
            .with(WALK_TARGET)
            .with(LOOK_TARGET)
            .with(HURT_BY_ENTITY)
            .with(NEAREST_HOSTILE)
            .with(IS_PANICKING)
    }

    #[test]
    fn hostile_triggers_panic_and_clears_targets() {
        let mut h = Harness::new();
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout());
        let p = h.spawn(EntityKind::Pillager, 5.5, 0.5, &MemoryLayout::new());
        h.store_mut(v).set(WALK_TARGET, WalkTarget::new(p, 0.5, 0));
        h.store_mut(v).set(LOOK_TARGET, PositionTracker::Entity(p));

        let mut trigger = panic_trigger(true);
        assert!(!trigger.trigger(&mut h.ctx(v, 0)));

        h.store_mut(v).set(NEAREST_HOSTILE, p);
        let mut ctx = h.ctx(v, 1);
        assert!(trigger.trigger(&mut ctx));
        assert_eq!(ctx.requested_activity, Some(Activity::Panic));
        drop(ctx);
        assert!(!h.store(v).has_value(WALK_TARGET));
        assert!(!h.store(v).has_value(LOOK_TARGET));
        assert_eq!(h.store(v).get(IS_PANICKING), Some(&true));

        let mut ctx = h.ctx(v, 2);
        ctx.activity = Some(Activity::Panic);
        assert!(!trigger.trigger(&mut ctx));
    }

    #[test]
    fn passive_panic_ignores_hostiles() {
        let mut h = Harness::new();
        let cow = h.spawn(EntityKind::Cow, 0.5, 0.5, &layout());
        let p = h.spawn(EntityKind::Pillager, 5.5, 0.5, &MemoryLayout::new());
        h.store_mut(cow).set(NEAREST_HOSTILE, p);
        assert!(!panic_trigger(false).trigger(&mut h.ctx(cow, 0)));

        h.store_mut(cow).set(HURT_BY_ENTITY, p);
        assert!(panic_trigger(false).trigger(&mut h.ctx(cow, 1)));
    }

    #[test]
    fn flee_runs_directly_away() {
        let mut h = Harness::new();
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout());
        let p = h.spawn(EntityKind::Pillager, 5.5, 0.5, &MemoryLayout::new());
        h.store_mut(v).set(HURT_BY_ENTITY, p);

        assert!(flee(0.75, false).trigger(&mut h.ctx(v, 0)));
        let walk = *h.store(v).get(WALK_TARGET).unwrap();
        let PositionTracker::Block(to) = walk.target else { panic!("flee targets a block") };
        assert_eq!((to.x, to.z), (-8, 0));
    }

    #[test]
    fn calm_down_resumes_once_safe() {
        let mut h = Harness::new();
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout());
        let p = h.spawn(EntityKind::Pillager, 5.5, 0.5, &MemoryLayout::new());
        h.store_mut(v).set(IS_PANICKING, true);
        h.store_mut(v).set_with_expiry(HURT_BY_ENTITY, p, 10);

        let mut calm = calm_down(Activity::Idle, false);
        assert!(!calm.trigger(&mut h.ctx(v, 5)));

        let mut ctx = h.ctx(v, 10);
        assert!(calm.trigger(&mut ctx));
        assert_eq!(ctx.requested_activity, Some(Activity::Idle));
        drop(ctx);
        assert!(!h.store(v).has_value(IS_PANICKING));
    }
}

// ── Sensors ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sensor_tests {
    use br_behavior::Sensor;
    use br_core::BlockPos;
    use br_memory::catalog::{HURT_BY_ENTITY, NEAREST_BED, NEAREST_HOSTILE, NEAREST_LIVING_ENTITIES};
    use br_world::BlockKind;

    use super::*;
    use crate::sensors::HURT_MEMORY_TICKS;
    use crate::{HurtBySensor, NearestBedSensor, NearestLivingEntitiesSensor};

    #[test]
    fn nearest_living_excludes_self_and_finds_hostile() {
        let mut h = Harness::new();
        let layout = MemoryLayout::new().with(NEAREST_LIVING_ENTITIES).with(NEAREST_HOSTILE);
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &layout);
        let cat = h.spawn(EntityKind::Cat, 2.5, 0.5, &MemoryLayout::new());
        let p = h.spawn(EntityKind::Pillager, 5.5, 0.5, &MemoryLayout::new());
        h.spawn(EntityKind::Cow, 30.5, 0.5, &MemoryLayout::new());

        let mut sensor = NearestLivingEntitiesSensor;
        sensor.sense(&mut h.ctx(v, 0));
        assert_eq!(h.store(v).get(NEAREST_LIVING_ENTITIES), Some(&vec![cat, p]));
        assert_eq!(h.store(v).get(NEAREST_HOSTILE), Some(&p));

        h.world.kill(p).unwrap();
        h.world.kill(cat).unwrap();
        sensor.sense(&mut h.ctx(v, 20));
        assert!(!h.store(v).has_value(NEAREST_LIVING_ENTITIES));
        assert!(!h.store(v).has_value(NEAREST_HOSTILE));
    }

    #[test]
    fn nearest_bed_prefers_closest() {
        let mut h = Harness::new();
        let v = h.spawn_baby(EntityKind::Villager, 0.5, 0.5, &MemoryLayout::new().with(NEAREST_BED));
        h.world.set_block(BlockPos::new(10, 64, 0), BlockKind::Bed { occupied: false });
        h.world.set_block(BlockPos::new(3, 64, 3), BlockKind::Bed { occupied: true });
        NearestBedSensor.sense(&mut h.ctx(v, 0));
        assert_eq!(h.store(v).get(NEAREST_BED), Some(&BlockPos::new(3, 64, 3)));
    }

    #[test]
    fn hurt_by_is_remembered_for_a_while() {
        let mut h = Harness::new();
        let v = h.spawn(EntityKind::Villager, 0.5, 0.5, &MemoryLayout::new().with(HURT_BY_ENTITY));
        let p = h.spawn(EntityKind::Pillager, 3.5, 0.5, &MemoryLayout::new());

        let mut sensor = HurtBySensor::default();
        sensor.sense(&mut h.ctx(v, 0));
        assert!(!h.store(v).has_value(HURT_BY_ENTITY));

        h.world.hurt(v, p, 2.0).unwrap();
        sensor.sense(&mut h.ctx(v, 1));
        assert_eq!(h.store(v).get(HURT_BY_ENTITY), Some(&p));

        sensor.sense(&mut h.ctx(v, 2));
        assert!(h.store(v).has_value(HURT_BY_ENTITY));
        h.bank.advance_all(Tick(1 + HURT_MEMORY_TICKS));
        assert!(!h.store(v).has_value(HURT_BY_ENTITY));
    }
}

// ── Archetypes ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod archetype_tests {
    use br_core::BlockPos;
    use br_memory::catalog::{HOME, IS_PANICKING, RAM_COOLDOWN_TICKS, RAM_TARGET};
    use br_schedule::Activity;
    use br_world::BlockKind;

    use super::*;
    use crate::archetype::{self, Archetype};

    fn install(h: &mut Harness, kind: EntityKind, x: f64, z: f64, archetype: &Archetype) -> AgentId {
        h.spawn(kind, x, z, &archetype.layout)
    }

    #[test]
    fn every_archetype_builds_with_a_complete_layout() {
        let all = [
            archetype::villager(),
            archetype::baby_villager(),
            archetype::goat(),
            archetype::pillager(),
            archetype::cat(),
            archetype::cow(),
        ];
        for built in all {
            let a = built.unwrap();
            for key in a.brain.required_keys() {
                assert!(a.layout.contains(key), "{} missing from layout", key.name);
            }
            assert!(a.brain.behavior_count() > 0);
        }
    }

    #[test]
    fn villager_claims_home_and_survives_a_day_slice() {
        let mut h = Harness::new();
        let mut a = archetype::villager().unwrap();
        let v = install(&mut h, EntityKind::Villager, 0.5, 0.5, &a);
        let bed = BlockPos::new(4, 64, 0);
        h.world.set_block(bed, BlockKind::Bed { occupied: false });
        h.world.set_block(BlockPos::new(-4, 64, 0), BlockKind::Workstation);
        h.world.set_block(BlockPos::new(-3, 64, 1), BlockKind::Farmland);

        for t in 0..400 {
            h.run(&mut a.brain, v, t);
        }
        assert_eq!(h.store(v).get(HOME), Some(&bed));
        assert_eq!(h.world.poi_owner(bed), Some(v));
        assert!(h.world.is_alive(v));
    }

    #[test]
    fn villager_panics_near_a_pillager() {
        let mut h = Harness::new();
        let mut a = archetype::villager().unwrap();
        let v = install(&mut h, EntityKind::Villager, 0.5, 0.5, &a);
        h.world.spawn(EntityKind::Pillager, Vec3::new(6.5, 64.0, 0.5));

        let mut panicked = false;
        for t in 0..40 {
            h.run(&mut a.brain, v, t);
            panicked |= a.brain.active_activity() == Some(Activity::Panic)
                && h.store(v).get(IS_PANICKING) == Some(&true);
        }
        assert!(panicked);
    }

    #[test]
    fn goat_rams_a_nearby_cow() {
        let mut h = Harness::new();
        let mut a = archetype::goat().unwrap();
        let g = install(&mut h, EntityKind::Goat, 0.5, 0.5, &a);
        let cow = h.world.spawn(EntityKind::Cow, Vec3::new(8.5, 64.0, 0.5));

        let rammed_at = (0..300).find(|&t| {
            h.run(&mut a.brain, g, t);
            h.world.entity(cow).is_some_and(|c| c.health < 10.0)
        });
        let Some(t) = rammed_at else { panic!("goat never rammed") };
        assert!(h.world.sounds().contains(&"goat.ram_impact"));

        // The charge stops on the next tick and starts the cooldown, which
        // sends the goat back to idling one tick later.
        h.run(&mut a.brain, g, t + 1);
        assert!(h.store(g).has_value(RAM_COOLDOWN_TICKS));
        h.run(&mut a.brain, g, t + 2);
        assert_eq!(a.brain.active_activity(), Some(Activity::Idle));
        assert!(!h.store(g).has_value(RAM_TARGET));
    }
}
