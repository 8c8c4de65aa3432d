//! The `Behavior` trait, its `Status`, and memory entry conditions.

use br_memory::{MemoryModule, MemoryStatus, MemoryStore, ModuleKey};

use crate::BrainContext;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum Status {
    #[default]
    Stopped,
    Running,
}

// ── EntryCondition ────────────────────────────────────────────────────────────

/// Memory preconditions that must all hold for a behavior to start.
#[derive(Clone, Debug, Default)]
pub struct EntryCondition {
    requirements: Vec<(ModuleKey, MemoryStatus)>,
}

impl EntryCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn present<T>(self, module: MemoryModule<T>) -> Self {
        self.require(module.key(), MemoryStatus::Present)
    }

    pub fn absent<T>(self, module: MemoryModule<T>) -> Self {
        self.require(module.key(), MemoryStatus::Absent)
    }

    pub fn registered<T>(self, module: MemoryModule<T>) -> Self {
        self.require(module.key(), MemoryStatus::Registered)
    }

    pub fn require(mut self, key: ModuleKey, status: MemoryStatus) -> Self {
        self.push(key, status);
        self
    }

    pub fn push(&mut self, key: ModuleKey, status: MemoryStatus) {
        self.requirements.push((key, status));
    }

    pub fn is_satisfied(&self, store: &MemoryStore) -> bool {
        self.requirements.iter().all(|&(key, status)| store.has(key.id, status))
    }

    pub fn keys(&self) -> impl Iterator<Item = ModuleKey> + '_ {
        self.requirements.iter().map(|&(k, _)| k)
    }

    pub fn requirements(&self) -> &[(ModuleKey, MemoryStatus)] {
        &self.requirements
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

// ── Behavior ──────────────────────────────────────────────────────────────────

/// A resumable unit of work with a start/tick/stop lifecycle.
///
/// Implementors guarantee:
///
/// - `try_start` does nothing and returns `false` unless `Stopped`.
/// - `tick_or_stop` does nothing unless `Running`.
/// - `do_stop` does nothing when already `Stopped`.
///
/// Leaf behaviors get all of this from [`Timed`][crate::Timed]; combinators
/// implement it directly.
pub trait Behavior: Send {
    fn name(&self) -> &str;

    fn status(&self) -> Status;

    /// Attempt to start.  Returns `true` if the behavior started.
    fn try_start(&mut self, ctx: &mut BrainContext<'_>) -> bool;

    /// Tick, or stop if the behavior can no longer continue.
    fn tick_or_stop(&mut self, ctx: &mut BrainContext<'_>);

    /// Stop now.
    fn do_stop(&mut self, ctx: &mut BrainContext<'_>);

    /// Append the names of the running leaf behaviors under this node.
    fn collect_running(&self, out: &mut Vec<String>) {
        if self.status() == Status::Running {
            out.push(self.name().to_owned());
        }
    }

    #[inline]
    fn is_running(&self) -> bool {
        self.status() == Status::Running
    }
}

impl std::fmt::Debug for dyn Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?})", self.name(), self.status())
    }
}
