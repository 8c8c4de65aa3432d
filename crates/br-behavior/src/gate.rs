//! `GateBehavior` and `RunOne`: combinators over child behaviors.
//!
//! A gate is `Running` exactly while at least one child runs.  Once the last
//! child stops, the gate stops itself and erases its cleanup set.  A gate
//! whose `try_start` starts no child stays `Stopped` and erases nothing.

use tracing::trace;

use br_memory::ModuleKey;

use crate::{Behavior, BrainContext, EntryCondition, ShufflingList, Status};

/// Order in which children are offered a start.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OrderPolicy {
    /// Insertion order.
    Ordered,
    /// Weighted shuffle on every `try_start`.
    Shuffled,
}

/// How many children a start attempt may start.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RunningPolicy {
    /// Stop at the first child that starts.
    RunOne,
    /// Offer a start to every stopped child.
    TryAll,
}

pub struct GateBehavior {
    name:     String,
    entry:    EntryCondition,
    cleanup:  Vec<ModuleKey>,
    order:    OrderPolicy,
    running:  RunningPolicy,
    children: ShufflingList<Box<dyn Behavior>>,
    status:   Status,
}

impl GateBehavior {
    pub fn new(
        name:     impl Into<String>,
        entry:    EntryCondition,
        cleanup:  Vec<ModuleKey>,
        order:    OrderPolicy,
        running:  RunningPolicy,
        children: Vec<(Box<dyn Behavior>, u32)>,
    ) -> Self {
        Self {
            name: name.into(),
            entry,
            cleanup,
            order,
            running,
            children: children.into_iter().collect(),
            status: Status::Stopped,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = &dyn Behavior> + '_ {
        self.children.iter().map(|c| c.as_ref())
    }

    pub fn running_children(&self) -> usize {
        self.children.iter().filter(|c| c.is_running()).count()
    }

    pub fn cleanup(&self) -> &[ModuleKey] {
        &self.cleanup
    }

    fn erase_cleanup(&self, ctx: &mut BrainContext<'_>) {
        let store = ctx.memory_mut();
        for &key in &self.cleanup {
            store.erase_key(key);
        }
    }
}

impl Behavior for GateBehavior {
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> Status {
        self.status
    }

    fn try_start(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        if self.status != Status::Stopped || !self.entry.is_satisfied(ctx.memory()) {
            return false;
        }
        if self.order == OrderPolicy::Shuffled {
            self.children.shuffle(ctx.rng);
        }
        let mut started = false;
        for child in self.children.iter_mut() {
            if child.status() != Status::Stopped {
                continue;
            }
            if child.try_start(ctx) {
                started = true;
                if self.running == RunningPolicy::RunOne {
                    break;
                }
            }
        }
        // One-shot children fire without running; the gate only runs while a
        // child does.
        if started && self.running_children() > 0 {
            self.status = Status::Running;
            trace!(agent = %ctx.agent, gate = %self.name, "gate started");
        }
        started
    }

    fn tick_or_stop(&mut self, ctx: &mut BrainContext<'_>) {
        if self.status != Status::Running {
            return;
        }
        for child in self.children.iter_mut() {
            if child.is_running() {
                child.tick_or_stop(ctx);
            }
        }
        if self.running_children() == 0 {
            self.do_stop(ctx);
        }
    }

    fn do_stop(&mut self, ctx: &mut BrainContext<'_>) {
        if self.status == Status::Stopped {
            return;
        }
        self.status = Status::Stopped;
        for child in self.children.iter_mut() {
            if child.is_running() {
                child.do_stop(ctx);
            }
        }
        self.erase_cleanup(ctx);
        trace!(agent = %ctx.agent, gate = %self.name, "gate stopped");
    }

    fn collect_running(&self, out: &mut Vec<String>) {
        for child in self.children.iter() {
            child.collect_running(out);
        }
    }
}

// ── RunOne ────────────────────────────────────────────────────────────────────

/// A gate with no entry condition and no cleanup that starts one randomly
/// picked child (weighted) per activation.
pub struct RunOne(GateBehavior);

impl RunOne {
    pub fn new(children: Vec<(Box<dyn Behavior>, u32)>) -> Self {
        Self::named("run_one", children)
    }

    pub fn named(name: impl Into<String>, children: Vec<(Box<dyn Behavior>, u32)>) -> Self {
        RunOne(GateBehavior::new(
            name,
            EntryCondition::new(),
            Vec::new(),
            OrderPolicy::Shuffled,
            RunningPolicy::RunOne,
            children,
        ))
    }

    pub fn gate(&self) -> &GateBehavior {
        &self.0
    }
}

impl Behavior for RunOne {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn status(&self) -> Status {
        self.0.status()
    }

    fn try_start(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        self.0.try_start(ctx)
    }

    fn tick_or_stop(&mut self, ctx: &mut BrainContext<'_>) {
        self.0.tick_or_stop(ctx)
    }

    fn do_stop(&mut self, ctx: &mut BrainContext<'_>) {
        self.0.do_stop(ctx)
    }

    fn collect_running(&self, out: &mut Vec<String>) {
        self.0.collect_running(out)
    }
}
