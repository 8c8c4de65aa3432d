//! village: a small settlement for the brain_sim framework.
//!
//! Three villagers with beds, job sites and a farm plot share a field with
//! goats, cows, a cat and an idle player.  A pillager camps west of the
//! village.  Brain snapshots and tick summaries are written to
//! `output/village/`.
//!
//! `RUST_LOG=debug cargo run -p village` shows activity switches and POI
//! claims.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use br_behavior::Brain;
use br_core::{AgentId, BlockPos, SimConfig, Tick, Vec3};
use br_memory::MemoryBank;
use br_memory::catalog::HOME;
use br_output::{CsvWriter, OutputWriter, TraceObserver};
use br_sim::{SimBuilder, SimObserver, TickSummary};
use br_tasks::archetype::{self, Archetype};
use br_world::{BlockKind, EntityKind, FlatWorld, World, CROP_MAX_AGE};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                  u64 = 42;
const SIM_DAYS:              u64 = 1;
const DAY_LENGTH_TICKS:      u64 = 24_000;
const OUTPUT_INTERVAL_TICKS: u64 = 500;
const OUTPUT_DIR:            &str = "output/village";

// ── Village layout ────────────────────────────────────────────────────────────

fn build_world() -> Result<(FlatWorld, Vec<(AgentId, Archetype)>)> {
    let mut world = FlatWorld::new(SEED);
    let mut brains = Vec::new();

    for (i, x) in [-6, 0, 6].into_iter().enumerate() {
        world.set_block(BlockPos::new(x, 64, 8), BlockKind::Bed { occupied: false });
        world.set_block(BlockPos::new(x, 64, -8), BlockKind::Workstation);
        let v = world.spawn(EntityKind::Villager, Vec3::new(x as f64 + 0.5, 64.0, 0.5 + i as f64));
        brains.push((v, archetype::villager()?));
    }
    world.set_block(BlockPos::new(0, 64, 0), BlockKind::Bell);

    for x in -8..=-4 {
        for z in -12..=-10 {
            let block = if (x + z) % 2 == 0 { BlockKind::Crop { age: CROP_MAX_AGE } } else { BlockKind::Farmland };
            world.set_block(BlockPos::new(x, 64, z), block);
        }
    }

    let baby = world.spawn_baby(EntityKind::Villager, Vec3::new(2.5, 64.0, 2.5));
    brains.push((baby, archetype::baby_villager()?));

    for (kind, x, z) in [(EntityKind::Goat, 20.5, 4.5), (EntityKind::Goat, 22.5, 6.5)] {
        let g = world.spawn(kind, Vec3::new(x, 64.0, z));
        brains.push((g, archetype::goat()?));
    }
    for (x, z) in [(14.5, -6.5), (16.5, -5.5)] {
        let c = world.spawn(EntityKind::Cow, Vec3::new(x, 64.0, z));
        brains.push((c, archetype::cow()?));
    }
    let cat = world.spawn(EntityKind::Cat, Vec3::new(-2.5, 64.0, 4.5));
    brains.push((cat, archetype::cat()?));

    let pillager = world.spawn(EntityKind::Pillager, Vec3::new(-30.5, 64.0, 0.5));
    brains.push((pillager, archetype::pillager()?));

    // Brainless.
    world.spawn(EntityKind::Player, Vec3::new(4.5, 64.0, -3.5));

    Ok((world, brains))
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Writes the trace and tallies time spent per activity.
struct VillageObserver<W: OutputWriter> {
    inner:          TraceObserver<W>,
    activity_ticks: BTreeMap<String, u64>,
    commands:       usize,
}

impl<W: OutputWriter> SimObserver for VillageObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        self.commands += summary.commands;
        self.inner.on_tick_end(tick, summary);
    }

    fn on_snapshot(&mut self, tick: Tick, brains: &[Option<Brain>], memories: &MemoryBank) {
        for brain in brains.iter().flatten() {
            let name = brain.active_activity().map_or_else(|| "none".to_string(), |a| a.to_string());
            *self.activity_ticks.entry(name).or_default() += OUTPUT_INTERVAL_TICKS;
        }
        self.inner.on_snapshot(tick, brains, memories);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // 1. Village.
    let (world, brains) = build_world()?;
    info!(entities = world.entity_count(), brains = brains.len(), "village built");

    // 2. Sim.
    let config = SimConfig {
        total_ticks:           SIM_DAYS * DAY_LENGTH_TICKS,
        seed:                  SEED,
        day_length_ticks:      DAY_LENGTH_TICKS,
        start_day_time:        0,
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
    };
    let mut builder = SimBuilder::new(config.clone(), world);
    for (agent, a) in brains {
        builder = builder.brain(agent, a.layout, a.brain);
    }
    let mut sim = builder.build()?;

    // 3. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = VillageObserver {
        inner:          TraceObserver::new(writer),
        activity_ticks: BTreeMap::new(),
        commands:       0,
    };

    // 4. Run.
    let t0 = Instant::now();
    sim.run(&mut obs);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    println!("Simulation complete in {:.3} s ({} ticks)", elapsed.as_secs_f64(), config.total_ticks);
    println!("  world commands applied : {}", obs.commands);
    let housed = (0..sim.world.entity_count())
        .filter(|&i| sim.memory(AgentId(i as u32)).is_some_and(|m| m.has_value(HOME)))
        .count();
    println!("  agents with a home     : {housed}");
    println!();
    println!("{:<10} {:>12}", "Activity", "Brain-ticks");
    println!("{}", "-".repeat(23));
    for (activity, ticks) in &obs.activity_ticks {
        println!("{activity:<10} {ticks:>12}");
    }
    println!();

    println!("{:<12} {:<10} {:<6} {:<8} {}", "Agent", "Kind", "Alive", "Activity", "Running");
    println!("{}", "-".repeat(60));
    for id in 0..sim.world.entity_count() {
        let agent = AgentId(id as u32);
        let Some(info) = sim.world.entity(agent) else { continue };
        let (activity, running) = match sim.brain(agent) {
            Some(brain) => (
                brain.active_activity().map_or_else(|| "-".to_string(), |a| a.to_string()),
                brain.running_behaviors().join(", "),
            ),
            None => ("-".to_string(), String::new()),
        };
        println!("{:<12} {:<10} {:<6} {:<8} {}", agent.to_string(), format!("{:?}", info.kind), info.alive, activity, running);
    }

    Ok(())
}
