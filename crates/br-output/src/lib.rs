//! `br-output`: brain trace writers for the brain_sim framework.
//!
//! | Backend | Files created                                  |
//! |---------|------------------------------------------------|
//! | CSV     | `brain_snapshots.csv`, `tick_summaries.csv`    |
//!
//! Writers implement [`OutputWriter`] and are driven by [`TraceObserver`],
//! which implements `br_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use br_output::{CsvWriter, TraceObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = TraceObserver::new(writer);
//! sim.run(&mut obs);
//! if let Some(e) = obs.take_error() { eprintln!("output error: {e}"); }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::TraceObserver;
pub use row::{BrainSnapshotRow, TickSummaryRow};
pub use writer::OutputWriter;
