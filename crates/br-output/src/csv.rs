//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `brain_snapshots.csv`
//! - `tick_summaries.csv`
//!
//! List columns (`running`, `memories`) are joined with
//! [`LIST_SEPARATOR`].

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::row::LIST_SEPARATOR;
use crate::writer::OutputWriter;
use crate::{BrainSnapshotRow, OutputResult, TickSummaryRow};

pub const SNAPSHOT_FILE: &str = "brain_snapshots.csv";
pub const SUMMARY_FILE: &str = "tick_summaries.csv";

/// Writes a brain trace to two CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join(SNAPSHOT_FILE))?;
        snapshots.write_record(["agent_id", "tick", "activity", "running", "memories"])?;

        let mut summaries = Writer::from_path(dir.join(SUMMARY_FILE))?;
        summaries.write_record(["tick", "day_time", "brains_ticked", "running_behaviors", "commands"])?;

        Ok(Self {
            snapshots,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[BrainSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                row.activity.clone(),
                row.running.join(LIST_SEPARATOR),
                row.memories.join(LIST_SEPARATOR),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.day_time.to_string(),
            row.brains_ticked.to_string(),
            row.running_behaviors.to_string(),
            row.commands.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
