//! `TraceObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use tracing::warn;

use br_behavior::Brain;
use br_core::{AgentId, Tick};
use br_memory::MemoryBank;
use br_sim::{SimObserver, TickSummary};

use crate::row::{BrainSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes brain snapshots and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct TraceObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> TraceObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "trace write failed");
                self.last_error = Some(e);
            }
        }
    }
}

/// One row per agent that has a brain.
pub fn snapshot_rows(tick: Tick, brains: &[Option<Brain>], memories: &MemoryBank) -> Vec<BrainSnapshotRow> {
    brains
        .iter()
        .enumerate()
        .filter_map(|(i, brain)| {
            let brain = brain.as_ref()?;
            let agent = AgentId(i as u32);
            Some(BrainSnapshotRow {
                agent_id: agent.0,
                tick:     tick.0,
                activity: brain.active_activity().map(|a| a.to_string()).unwrap_or_default(),
                running:  brain.running_behaviors(),
                memories: memories.get(agent).map(|s| s.present_names()).unwrap_or_default(),
            })
        })
        .collect()
}

impl<W: OutputWriter> SimObserver for TraceObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
        let row = TickSummaryRow {
            tick:              tick.0,
            day_time:          summary.day_time,
            brains_ticked:     summary.brains_ticked as u64,
            running_behaviors: summary.running_behaviors as u64,
            commands:          summary.commands as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, brains: &[Option<Brain>], memories: &MemoryBank) {
        let rows = snapshot_rows(tick, brains, memories);
        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
