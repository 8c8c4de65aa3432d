//! Simulation observer trait for progress reporting and data collection.

use br_behavior::Brain;
use br_core::Tick;
use br_memory::MemoryBank;

/// Counters for one finished tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct TickSummary {
    pub tick:              Tick,
    pub day_time:          u64,
    /// Living agents whose brain ran.
    pub brains_ticked:     usize,
    /// Running leaf behaviors summed over all brains, after the tick.
    pub running_behaviors: usize,
    /// World commands applied.
    pub commands:          usize,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {} brains, {} running", summary.brains_ticked, summary.running_behaviors);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any brain runs.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick, after the world stepped.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called every `config.output_interval_ticks` ticks.
    ///
    /// `brains` is indexed by `AgentId`; entities without a brain hold
    /// `None`.
    fn on_snapshot(&mut self, _tick: Tick, _brains: &[Option<Brain>], _memories: &MemoryBank) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
