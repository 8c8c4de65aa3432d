//! Plain data row types written by output backends.

/// Separator between names in the list columns.
pub const LIST_SEPARATOR: &str = ";";

/// One agent's brain at a given tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrainSnapshotRow {
    pub agent_id: u32,
    pub tick:     u64,
    /// Current non-core activity; empty if none.
    pub activity: String,
    /// Running leaf behaviors, in slot order.
    pub running:  Vec<String>,
    /// Modules holding a live value, sorted.
    pub memories: Vec<&'static str>,
}

/// Counters for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:              u64,
    pub day_time:          u64,
    pub brains_ticked:     u64,
    pub running_behaviors: u64,
    pub commands:          u64,
}
