//! The `Sim` struct and its tick loop.

use tracing::{debug, trace};

use br_behavior::{Brain, BrainContext};
use br_core::{AgentId, AgentRng, SimClock, SimConfig, Tick};
use br_memory::{MemoryBank, MemoryStore};
use br_world::{World, WorldCommand};

use crate::{SimObserver, TickSummary};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<W>` owns the world, every agent's memory store, brain and RNG, and
/// drives the tick loop:
///
/// 1. For each agent with a brain, ascending `AgentId`:
///    - **dead**: stop every running behavior, once;
///    - **alive**: [`Brain::tick`] against a fresh [`BrainContext`], then
///      apply the commands it issued, in issue order.
/// 2. [`World::step`] moves entities and grows babies.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<W: World> {
    /// Global configuration (total ticks, seed, day length, …).
    pub config: SimConfig,

    /// Simulation clock: tracks the current tick and the day time.
    pub clock: SimClock,

    /// The world every brain reads and every command is applied to.
    pub world: W,

    /// Every entity's memory store, indexed by `AgentId`.  Entities without
    /// a brain hold an empty store.
    pub memories: MemoryBank,

    /// Brains indexed by `AgentId`; `None` for brainless entities.
    pub brains: Vec<Option<Brain>>,

    /// Per-agent deterministic RNGs, parallel to `brains`.
    pub rngs: Vec<AgentRng>,

    /// Reused command buffer, drained after every brain tick.
    commands: Vec<WorldCommand>,

    /// Agents whose behaviors were already stopped after death.
    stopped: Vec<bool>,
}

impl<W: World> Sim<W> {
    pub(crate) fn new(
        config:   SimConfig,
        world:    W,
        memories: MemoryBank,
        brains:   Vec<Option<Brain>>,
    ) -> Self {
        let rngs = (0..brains.len())
            .map(|i| AgentRng::new(config.seed, AgentId(i as u32)))
            .collect();
        let stopped = vec![false; brains.len()];
        Self {
            clock: config.make_clock(),
            config,
            world,
            memories,
            brains,
            rngs,
            commands: Vec::new(),
            stopped,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    /// `agent`'s brain, if it has one.
    pub fn brain(&self, agent: AgentId) -> Option<&Brain> {
        self.brains.get(agent.index()).and_then(Option::as_ref)
    }

    /// `agent`'s memory store, if the bank has a slot for it.
    pub fn memory(&self, agent: AgentId) -> Option<&MemoryStore> {
        self.memories.get(agent)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let summary = self.process_tick(now);
        observer.on_tick_end(now, &summary);
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(now, &self.brains, &self.memories);
        }
        self.clock.advance();
    }

    fn process_tick(&mut self, now: Tick) -> TickSummary {
        let day_time = self.clock.day_time_at(now);
        let mut summary = TickSummary { tick: now, day_time, ..TickSummary::default() };
        // Every store reaches `now` before the first brain runs.
        let evicted = self.memories.advance_all(now);
        trace!(tick = now.0, evicted, "memories swept");

        for idx in 0..self.brains.len() {
            let Some(brain) = self.brains[idx].as_mut() else { continue };
            let agent = AgentId(idx as u32);
            let alive = self.world.is_alive(agent);
            if !alive && self.stopped[idx] {
                continue;
            }

            {
                let mut ctx = BrainContext::new(
                    now,
                    day_time,
                    agent,
                    &self.world,
                    &mut self.memories,
                    &mut self.rngs[idx],
                    &mut self.commands,
                );
                if alive {
                    brain.tick(&mut ctx);
                    summary.brains_ticked += 1;
                    summary.running_behaviors += brain.running_behaviors().len();
                } else {
                    brain.stop_all(&mut ctx);
                    self.stopped[idx] = true;
                    debug!(%agent, tick = now.0, "agent died; behaviors stopped");
                }
            }

            summary.commands += self.commands.len();
            for command in self.commands.drain(..) {
                trace!(%agent, command = command.label(), "apply");
                self.world.apply(command);
            }
        }

        self.world.step(now);
        summary
    }
}
