//! `Brain`: activity-scoped behavior scheduling for one agent.
//!
//! # Tick order
//!
//! ```text
//! 1. sweep expired memories
//! 2. run due sensors
//! 3. update the active activity (first-valid list, then schedule)
//! 4. tick_or_stop every behavior that was Running when the tick began
//! 5. try_start every Stopped behavior of an active activity not ticked in 4
//! 6. apply an activity switch requested by a behavior, if any
//! ```
//!
//! Steps 4 and 5 partition the behaviors, so each one sees at most one
//! transition (and therefore one hook) per tick.  Within each step behaviors
//! run in ascending priority, then activity, then registration order.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use br_core::Tick;
use br_memory::{MemoryLayout, MemoryStore, ModuleKey};
use br_schedule::{Activity, Schedule};

use crate::{
    Behavior, BehaviorError, BehaviorResult, BrainContext, EntryCondition, ScheduledSensor, Sensor, Status,
};

/// Ticks between two schedule lookups.
pub const SCHEDULE_CHECK_INTERVAL: u64 = 20;

struct Slot {
    priority: u32,
    activity: Activity,
    behavior: Box<dyn Behavior>,
}

pub struct Brain {
    slots:               Vec<Slot>,
    requirements:        BTreeMap<Activity, EntryCondition>,
    erase_on_exit:       BTreeMap<Activity, Vec<ModuleKey>>,
    core:                BTreeSet<Activity>,
    active:              BTreeSet<Activity>,
    default_activity:    Activity,
    schedule:            Schedule,
    first_valid:         Vec<Activity>,
    sensors:             Vec<ScheduledSensor>,
    last_schedule_check: Option<Tick>,
    ran_this_tick:       Vec<bool>,
}

impl Brain {
    pub fn builder() -> BrainBuilder {
        BrainBuilder::default()
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    pub fn tick(&mut self, ctx: &mut BrainContext<'_>) {
        let now = ctx.tick;
        ctx.memory_mut().advance(now);

        for sensor in &mut self.sensors {
            sensor.tick(ctx);
        }

        self.update_activity(ctx);
        ctx.activity = self.active_activity();

        self.ran_this_tick.clear();
        self.ran_this_tick.extend(self.slots.iter().map(|s| s.behavior.is_running()));

        for (slot, &ran) in self.slots.iter_mut().zip(&self.ran_this_tick) {
            if ran {
                slot.behavior.tick_or_stop(ctx);
            }
        }

        for (slot, &ran) in self.slots.iter_mut().zip(&self.ran_this_tick) {
            if !ran && self.active.contains(&slot.activity) && slot.behavior.status() == Status::Stopped {
                slot.behavior.try_start(ctx);
            }
        }

        if let Some(requested) = ctx.requested_activity.take() {
            self.set_active_activity_if_possible(requested, ctx.memory_mut());
            ctx.activity = self.active_activity();
        }
    }

    /// Stop every running behavior (agent died or was removed).
    pub fn stop_all(&mut self, ctx: &mut BrainContext<'_>) {
        for slot in &mut self.slots {
            if slot.behavior.is_running() {
                slot.behavior.do_stop(ctx);
            }
        }
    }

    // ── Activities ────────────────────────────────────────────────────────

    fn update_activity(&mut self, ctx: &mut BrainContext<'_>) {
        let store = ctx.memories.store_mut(ctx.agent);

        if let Some(&first) = self.first_valid.iter().find(|&&a| self.requirements_met(a, store)) {
            self.set_active(first, store);
            return;
        }

        let schedule_due = self
            .last_schedule_check
            .is_none_or(|last| ctx.tick.since(last) >= SCHEDULE_CHECK_INTERVAL);
        if !self.schedule.is_empty() && schedule_due {
            self.last_schedule_check = Some(ctx.tick);
            if let Some(scheduled) = self.schedule.activity_at(ctx.day_time) {
                if !self.active.contains(&scheduled) {
                    self.set_active_activity_if_possible(scheduled, store);
                }
            }
            return;
        }

        if let Some(current) = self.active_activity() {
            if !self.requirements_met(current, store) {
                self.set_active(self.default_activity, store);
            }
        }
    }

    /// `true` if `activity` has no requirements or all of them hold.
    pub fn requirements_met(&self, activity: Activity, store: &MemoryStore) -> bool {
        self.requirements
            .get(&activity)
            .is_none_or(|cond| cond.is_satisfied(store))
    }

    /// Switch to `activity` if its requirements hold, else to the default.
    /// Returns whether `activity` was entered.
    pub fn set_active_activity_if_possible(&mut self, activity: Activity, store: &mut MemoryStore) -> bool {
        if self.requirements_met(activity, store) {
            self.set_active(activity, store);
            true
        } else {
            self.set_active(self.default_activity, store);
            false
        }
    }

    /// Enter the first activity of `candidates` whose requirements hold.
    pub fn set_active_activity_to_first_valid(
        &mut self,
        candidates: &[Activity],
        store:      &mut MemoryStore,
    ) -> Option<Activity> {
        let found = candidates.iter().copied().find(|&a| self.requirements_met(a, store))?;
        self.set_active(found, store);
        Some(found)
    }

    fn set_active(&mut self, activity: Activity, store: &mut MemoryStore) {
        if self.active.contains(&activity) {
            return;
        }
        let previous = self.active_activity();
        for left in self.active.iter().filter(|a| !self.core.contains(*a)) {
            if let Some(keys) = self.erase_on_exit.get(left) {
                for &key in keys {
                    store.erase_key(key);
                }
            }
        }
        self.active.clear();
        self.active.extend(self.core.iter().copied());
        self.active.insert(activity);
        debug!(from = ?previous, to = %activity, "activity switch");
    }

    /// The one non-core active activity.
    pub fn active_activity(&self) -> Option<Activity> {
        self.active.iter().copied().find(|a| !self.core.contains(a))
    }

    pub fn is_active(&self, activity: Activity) -> bool {
        self.active.contains(&activity)
    }

    pub fn default_activity(&self) -> Activity {
        self.default_activity
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    // ── Introspection ─────────────────────────────────────────────────────

    /// Names of running leaf behaviors in tick order.
    pub fn running_behaviors(&self) -> Vec<String> {
        let mut out = Vec::new();
        for slot in &self.slots {
            slot.behavior.collect_running(&mut out);
        }
        out
    }

    pub fn behavior_count(&self) -> usize {
        self.slots.len()
    }

    /// Every activity with at least one behavior.
    pub fn activities(&self) -> BTreeSet<Activity> {
        self.slots.iter().map(|s| s.activity).collect()
    }

    pub fn sensor_names(&self) -> Vec<&str> {
        self.sensors.iter().map(|s| s.sensor().name()).collect()
    }

    /// Modules the brain itself reads or erases: activity requirements,
    /// erase-on-exit sets, and sensor outputs.
    pub fn required_keys(&self) -> Vec<ModuleKey> {
        let mut keys: Vec<ModuleKey> = self.requirements.values().flat_map(|c| c.keys()).collect();
        keys.extend(self.erase_on_exit.values().flatten().copied());
        for s in &self.sensors {
            keys.extend(s.sensor().produces());
        }
        keys
    }

    /// Declare [`required_keys`](Self::required_keys) in `layout`.
    pub fn extend_layout(&self, layout: &mut MemoryLayout) {
        layout.extend(self.required_keys());
    }
}

// ── BrainBuilder ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct BrainBuilder {
    slots:            Vec<Slot>,
    requirements:     BTreeMap<Activity, EntryCondition>,
    erase_on_exit:    BTreeMap<Activity, Vec<ModuleKey>>,
    core:             BTreeSet<Activity>,
    default_activity: Option<Activity>,
    schedule:         Option<Schedule>,
    first_valid:      Vec<Activity>,
    sensors:          Vec<Box<dyn Sensor>>,
}

impl BrainBuilder {
    /// Mark `activity` as always active.
    pub fn core_activity(mut self, activity: Activity) -> Self {
        self.core.insert(activity);
        self
    }

    pub fn add(self, activity: Activity, priority: u32, behavior: impl Behavior + 'static) -> Self {
        self.add_boxed(activity, priority, Box::new(behavior))
    }

    pub fn add_boxed(mut self, activity: Activity, priority: u32, behavior: Box<dyn Behavior>) -> Self {
        self.slots.push(Slot { priority, activity, behavior });
        self
    }

    /// Register `behaviors` under `activity` with priorities counting up from
    /// `first_priority`.
    pub fn activity(mut self, activity: Activity, first_priority: u32, behaviors: Vec<Box<dyn Behavior>>) -> Self {
        for (i, behavior) in behaviors.into_iter().enumerate() {
            self.slots.push(Slot { priority: first_priority + i as u32, activity, behavior });
        }
        self
    }

    /// Memory conditions that must hold while `activity` is active.
    pub fn requirements(mut self, activity: Activity, condition: EntryCondition) -> Self {
        self.requirements.insert(activity, condition);
        self
    }

    /// Modules erased when the brain leaves `activity`.
    pub fn erase_on_exit(mut self, activity: Activity, keys: Vec<ModuleKey>) -> Self {
        self.erase_on_exit.entry(activity).or_default().extend(keys);
        self
    }

    pub fn default_activity(mut self, activity: Activity) -> Self {
        self.default_activity = Some(activity);
        self
    }

    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Activities checked every tick, in order; the first whose requirements
    /// hold becomes active.
    pub fn first_valid(mut self, activities: Vec<Activity>) -> Self {
        self.first_valid = activities;
        self
    }

    pub fn sensor(mut self, sensor: impl Sensor + 'static) -> Self {
        self.sensors.push(Box::new(sensor));
        self
    }

    pub fn build(self) -> BehaviorResult<Brain> {
        let default_activity = self.default_activity.ok_or(BehaviorError::NoDefaultActivity)?;
        if self.core.contains(&default_activity) {
            return Err(BehaviorError::CoreDefault(default_activity));
        }

        let known: BTreeSet<Activity> = self.slots.iter().map(|s| s.activity).collect();
        let schedule = self.schedule.unwrap_or_else(Schedule::empty);
        let referenced = std::iter::once(default_activity)
            .chain(self.first_valid.iter().copied())
            .chain(schedule.entries().iter().map(|e| e.activity));
        for activity in referenced {
            if !known.contains(&activity) {
                return Err(BehaviorError::UnknownActivity(activity));
            }
        }

        let mut slots = self.slots;
        slots.sort_by_key(|s| (s.priority, s.activity));

        let mut active = self.core.clone();
        active.insert(default_activity);

        Ok(Brain {
            slots,
            requirements: self.requirements,
            erase_on_exit: self.erase_on_exit,
            core: self.core,
            active,
            default_activity,
            schedule,
            first_valid: self.first_valid,
            sensors: self.sensors.into_iter().map(ScheduledSensor::new).collect(),
            last_schedule_check: None,
            ran_this_tick: Vec::new(),
        })
    }
}
