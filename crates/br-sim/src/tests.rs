//! Integration tests for br-sim.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use br_behavior::{trigger_fn, Brain, BrainContext, OneShot, Task, Timed};
use br_core::{AgentId, BlockPos, CoreError, SimConfig, Tick, Vec3};
use br_memory::catalog::{ATTACK_COOLING_DOWN, NEAREST_LIVING_ENTITIES, RAM_COOLDOWN_TICKS};
use br_memory::{MemoryBank, MemoryLayout};
use br_schedule::Activity;
use br_tasks::{archetype, NearestLivingEntitiesSensor};
use br_world::{BlockKind, EntityKind, FlatWorld, World, WorldCommand};

use crate::{NoopObserver, SimBuilder, SimError, SimObserver, TickSummary};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        total_ticks,
        seed:                  42,
        day_length_ticks:      24_000,
        start_day_time:        0,
        output_interval_ticks: 0,
    }
}

fn world_with(kinds: &[EntityKind]) -> FlatWorld {
    let mut world = FlatWorld::new(3);
    for (i, &kind) in kinds.iter().enumerate() {
        world.spawn(kind, Vec3::new(i as f64 * 3.0 + 0.5, 64.0, 0.5));
    }
    world
}

/// A single-activity brain running `task` forever.
fn task_brain<T: Task + 'static>(task: T) -> Brain {
    Brain::builder()
        .add(Activity::Idle, 0, Timed::new(task).with_fixed_duration(1_000_000))
        .default_activity(Activity::Idle)
        .build()
        .unwrap()
}

/// A brain whose only behavior fires `f` on every tick.
fn trigger_brain<F>(f: F) -> Brain
where
    F: FnMut(&mut BrainContext<'_>) -> bool + Send + 'static,
{
    Brain::builder()
        .add(Activity::Idle, 0, OneShot::new(trigger_fn("probe", f)))
        .default_activity(Activity::Idle)
        .build()
        .unwrap()
}

/// Counts ticks and stops.
struct Counter {
    ticks: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl Task for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    fn can_still_use(&self, _ctx: &BrainContext<'_>) -> bool {
        true
    }

    fn tick(&mut self, _ctx: &mut BrainContext<'_>) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&mut self, _ctx: &mut BrainContext<'_>) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct Recorder {
    starts:    Vec<Tick>,
    summaries: Vec<TickSummary>,
    snapshots: Vec<(Tick, usize, usize)>,
    end:       Option<Tick>,
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, tick: Tick) {
        self.starts.push(tick);
    }

    fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
        self.summaries.push(*summary);
    }

    fn on_snapshot(&mut self, tick: Tick, brains: &[Option<br_behavior::Brain>], memories: &MemoryBank) {
        let with_brain = brains.iter().filter(|b| b.is_some()).count();
        self.snapshots.push((tick, with_brain, memories.len()));
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.end = Some(final_tick);
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_brainless_world() {
        let world = world_with(&[EntityKind::Cow, EntityKind::Player]);
        let sim = SimBuilder::new(test_config(10), world).build().unwrap();
        assert_eq!(sim.brains.len(), 2);
        assert!(sim.brains.iter().all(Option::is_none));
        assert_eq!(sim.memories.len(), 2);
        assert_eq!(sim.rngs.len(), 2);
        assert_eq!(sim.clock.current_tick, Tick::ZERO);
    }

    #[test]
    fn brain_for_missing_entity_errors() {
        let world = world_with(&[EntityKind::Cow]);
        let result = SimBuilder::new(test_config(10), world)
            .brain(AgentId(3), MemoryLayout::new(), trigger_brain(|_| false))
            .build();
        assert!(matches!(result, Err(SimError::AgentOutOfRange { agent: AgentId(3), count: 1 })));
    }

    #[test]
    fn second_brain_for_same_agent_errors() {
        let world = world_with(&[EntityKind::Cow]);
        let result = SimBuilder::new(test_config(10), world)
            .brain(AgentId(0), MemoryLayout::new(), trigger_brain(|_| false))
            .brain(AgentId(0), MemoryLayout::new(), trigger_brain(|_| false))
            .build();
        assert!(matches!(result, Err(SimError::DuplicateBrain(AgentId(0)))));
    }

    #[test]
    fn zero_day_length_errors() {
        let mut config = test_config(10);
        config.day_length_ticks = 0;
        let result = SimBuilder::new(config, world_with(&[])).build();
        assert!(matches!(result, Err(SimError::Core(CoreError::Config(_)))));
    }

    #[test]
    fn layout_extended_with_sensor_outputs() {
        let brain = Brain::builder()
            .add(Activity::Idle, 0, OneShot::new(trigger_fn("noop", |_| false)))
            .default_activity(Activity::Idle)
            .sensor(NearestLivingEntitiesSensor)
            .build()
            .unwrap();
        let world = world_with(&[EntityKind::Cow, EntityKind::Cow]);
        let sim = SimBuilder::new(test_config(10), world)
            .brain(AgentId(0), MemoryLayout::new(), brain)
            .build()
            .unwrap();
        let store = sim.memory(AgentId(0)).unwrap();
        assert!(store.is_registered(NEAREST_LIVING_ENTITIES.id()));
        // The brainless cow keeps an empty store.
        assert!(sim.memory(AgentId(1)).unwrap().is_empty());
        assert!(sim.brain(AgentId(0)).is_some());
        assert!(sim.brain(AgentId(1)).is_none());
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn runs_to_end_tick() {
        let mut config = test_config(50);
        config.output_interval_ticks = 10;
        let world = world_with(&[EntityKind::Cow, EntityKind::Cow]);
        let mut sim = SimBuilder::new(config, world)
            .brain(AgentId(1), MemoryLayout::new(), trigger_brain(|_| false))
            .build()
            .unwrap();

        let mut rec = Recorder::default();
        sim.run(&mut rec);

        assert_eq!(rec.starts.len(), 50);
        assert_eq!(rec.starts.first(), Some(&Tick(0)));
        assert_eq!(rec.end, Some(Tick(50)));
        assert_eq!(sim.clock.current_tick, Tick(50));
        let snapshot_ticks: Vec<u64> = rec.snapshots.iter().map(|s| s.0 .0).collect();
        assert_eq!(snapshot_ticks, vec![0, 10, 20, 30, 40]);
        assert!(rec.snapshots.iter().all(|&(_, brains, stores)| brains == 1 && stores == 2));
        assert!(rec.summaries.iter().all(|s| s.brains_ticked == 1));
    }

    #[test]
    fn run_ticks_ignores_end_tick() {
        let world = world_with(&[EntityKind::Cow]);
        let mut sim = SimBuilder::new(test_config(5), world).build().unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(8, &mut rec);
        assert_eq!(sim.clock.current_tick, Tick(8));
        assert_eq!(rec.starts.len(), 8);
        assert_eq!(rec.end, None);
    }

    #[test]
    fn summary_reports_day_time() {
        let mut config = test_config(20);
        config.start_day_time = 23_990;
        let mut sim = SimBuilder::new(config, world_with(&[])).build().unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec);
        assert_eq!(rec.summaries[0].day_time, 23_990);
        assert_eq!(rec.summaries[15].day_time, 5);
    }

    #[test]
    fn later_agents_see_earlier_commands_in_same_tick() {
        let bell = BlockPos::new(5, 64, 5);
        let seen = Arc::new(AtomicBool::new(false));
        let seen_in = Arc::clone(&seen);

        let builder = trigger_brain(move |ctx| {
            ctx.issue(WorldCommand::SetBlock { pos: bell, block: BlockKind::Bell });
            true
        });
        let watcher = trigger_brain(move |ctx| {
            if ctx.tick == Tick::ZERO && ctx.world.block_at(bell) == BlockKind::Bell {
                seen_in.store(true, Ordering::SeqCst);
            }
            false
        });

        let world = world_with(&[EntityKind::Villager, EntityKind::Villager]);
        let mut sim = SimBuilder::new(test_config(1), world)
            .brain(AgentId(0), MemoryLayout::new(), builder)
            .brain(AgentId(1), MemoryLayout::new(), watcher)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec);

        assert!(seen.load(Ordering::SeqCst));
        assert_eq!(rec.summaries[0].commands, 1);
    }

    #[test]
    fn partner_reads_respect_expiry_in_same_tick() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = Arc::clone(&seen);

        let reader = trigger_brain(move |ctx| {
            let cooling = ctx
                .memory_of(AgentId(1))
                .is_some_and(|store| store.get(ATTACK_COOLING_DOWN).is_some());
            seen_in.lock().unwrap().push((ctx.tick.0, cooling));
            false
        });
        let writer = trigger_brain(|ctx| {
            if ctx.tick == Tick::ZERO {
                ctx.memory_mut().set_with_expiry(ATTACK_COOLING_DOWN, true, 1);
            }
            false
        });

        let layout = MemoryLayout::new().with(ATTACK_COOLING_DOWN);
        let world = world_with(&[EntityKind::Villager, EntityKind::Villager]);
        let mut sim = SimBuilder::new(test_config(3), world)
            .brain(AgentId(0), layout.clone(), reader)
            .brain(AgentId(1), layout, writer)
            .build()
            .unwrap();
        sim.run(&mut NoopObserver);

        // Written after agent 0 ran on tick 0, gone by tick 1.
        assert_eq!(*seen.lock().unwrap(), vec![(0, false), (1, false), (2, false)]);
    }

    #[test]
    fn partner_writes_expire_on_the_writer_clock() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = Arc::clone(&seen);

        let writer = trigger_brain(|ctx| {
            if ctx.tick == Tick(5) {
                if let Some(store) = ctx.memory_of_mut(AgentId(1)) {
                    store.set_with_expiry(ATTACK_COOLING_DOWN, true, 2);
                }
            }
            false
        });
        let owner = trigger_brain(move |ctx| {
            if ctx.memory().has_value(ATTACK_COOLING_DOWN) {
                seen_in.lock().unwrap().push(ctx.tick.0);
            }
            false
        });

        let layout = MemoryLayout::new().with(ATTACK_COOLING_DOWN);
        let world = world_with(&[EntityKind::Villager, EntityKind::Villager]);
        let mut sim = SimBuilder::new(test_config(10), world)
            .brain(AgentId(0), layout.clone(), writer)
            .brain(AgentId(1), layout, owner)
            .build()
            .unwrap();
        sim.run(&mut NoopObserver);

        assert_eq!(*seen.lock().unwrap(), vec![5, 6]);
    }

    #[test]
    fn dead_agent_is_stopped_once() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));
        let brain = task_brain(Counter { ticks: Arc::clone(&ticks), stops: Arc::clone(&stops) });

        let world = world_with(&[EntityKind::Cow]);
        let mut sim = SimBuilder::new(test_config(100), world)
            .brain(AgentId(0), MemoryLayout::new(), brain)
            .build()
            .unwrap();

        let mut rec = Recorder::default();
        sim.run_ticks(5, &mut rec);
        assert_eq!(sim.brain(AgentId(0)).unwrap().running_behaviors(), vec!["counter".to_string()]);
        assert_eq!(rec.summaries[4].running_behaviors, 1);

        sim.world.kill(AgentId(0)).unwrap();
        let ticked_before = ticks.load(Ordering::SeqCst);
        sim.run_ticks(10, &mut rec);

        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(ticks.load(Ordering::SeqCst), ticked_before);
        assert!(sim.brain(AgentId(0)).unwrap().running_behaviors().is_empty());
        assert!(rec.summaries[5..].iter().all(|s| s.brains_ticked == 0));
    }

    #[test]
    fn spawned_entities_stay_brainless() {
        let fired = Arc::new(AtomicBool::new(false));
        let fired_in = Arc::clone(&fired);
        let spawner = trigger_brain(move |ctx| {
            if fired_in.swap(true, Ordering::SeqCst) {
                return false;
            }
            ctx.issue(WorldCommand::SpawnEntity {
                kind: EntityKind::Cow,
                at:   Vec3::new(9.5, 64.0, 0.5),
                baby: true,
            });
            true
        });

        let world = world_with(&[EntityKind::Cow]);
        let mut sim = SimBuilder::new(test_config(20), world)
            .brain(AgentId(0), MemoryLayout::new(), spawner)
            .build()
            .unwrap();
        sim.run(&mut NoopObserver);

        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(sim.world.entity_count(), 2);
        assert_eq!(sim.brains.len(), 1);
        assert!(sim.brain(AgentId(1)).is_none());
    }
}

// ── Archetypes under the driver ───────────────────────────────────────────────

#[cfg(test)]
mod archetype_tests {
    use super::*;

    fn goat_and_cow(seed: u64) -> crate::Sim<FlatWorld> {
        let mut world = FlatWorld::new(11);
        let goat = world.spawn(EntityKind::Goat, Vec3::new(0.5, 64.0, 0.5));
        world.spawn(EntityKind::Cow, Vec3::new(10.5, 64.0, 0.5));
        let a = archetype::goat().unwrap();
        let mut config = test_config(600);
        config.seed = seed;
        SimBuilder::new(config, world).brain(goat, a.layout, a.brain).build().unwrap()
    }

    #[test]
    fn goat_rams_brainless_cow() {
        let mut sim = goat_and_cow(42);
        let cow = AgentId(1);
        let hit = (0..600).any(|_| {
            sim.run_ticks(1, &mut NoopObserver);
            sim.world.entity(cow).is_some_and(|c| c.health < 10.0)
        });
        assert!(hit, "goat never rammed");
        sim.run_ticks(2, &mut NoopObserver);
        assert!(sim.memory(AgentId(0)).unwrap().has_value(RAM_COOLDOWN_TICKS));
    }

    #[test]
    fn same_seed_same_run() {
        let trace = |seed: u64| {
            let mut sim = goat_and_cow(seed);
            let log = Arc::new(Mutex::new(Vec::new()));
            struct Positions<'a>(&'a Mutex<Vec<usize>>);
            impl SimObserver for Positions<'_> {
                fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
                    self.0.lock().unwrap().push(summary.commands);
                }
            }
            sim.run(&mut Positions(&log));
            let commands = log.lock().unwrap().clone();
            let positions: Vec<_> = (0..2).map(|i| sim.world.position(AgentId(i))).collect();
            (commands, positions)
        };
        assert_eq!(trace(7), trace(7));
    }

    #[test]
    fn villager_day_runs_with_bed() {
        let mut world = FlatWorld::new(5);
        let villager = world.spawn(EntityKind::Villager, Vec3::new(0.5, 64.0, 0.5));
        world.set_block(BlockPos::new(4, 64, 0), BlockKind::Bed { occupied: false });
        let a = archetype::villager().unwrap();
        let mut sim = SimBuilder::new(test_config(400), world)
            .brain(villager, a.layout, a.brain)
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec);

        assert_eq!(rec.summaries.len(), 400);
        assert!(rec.summaries.iter().all(|s| s.brains_ticked == 1));
        assert!(rec.summaries.iter().any(|s| s.commands > 0));
        assert_eq!(sim.world.poi_owner(BlockPos::new(4, 64, 0)), Some(villager));
    }
}
