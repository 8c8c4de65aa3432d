//! Type-erased, expiring per-agent memory store.
//!
//! # Design
//!
//! Each declared module owns one slot in an `FxHashMap<MemoryId, Entry>`.  A
//! filled slot holds a `Box<dyn Any + Send + Sync>` and an optional absolute
//! expiry tick.  Reads downcast to the module's declared type, so a value can
//! never be observed as the wrong type.
//!
//! # Expiry
//!
//! A value written with `set_with_expiry(m, v, n)` at tick `t` expires at
//! `t + n`: it is visible for ticks `t ..= t + n - 1`, measured against the
//! store's own clock.  [`MemoryStore::advance`] moves that clock and drops
//! expired values.  The sim sweeps the whole bank with
//! [`MemoryBank::advance_all`](crate::MemoryBank::advance_all) once per tick
//! before any brain runs, so reads of a partner's store see the same tick.

use std::any::Any;

use rustc_hash::FxHashMap;

use br_core::{MemoryId, Tick};

use crate::{MemoryModule, MemoryStatus, ModuleKey};

// ── Slots ─────────────────────────────────────────────────────────────────────

struct Slot {
    value:      Box<dyn Any + Send + Sync>,
    expires_at: Option<Tick>,
}

impl Slot {
    #[inline]
    fn is_live(&self, now: Tick) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

struct Entry {
    name: &'static str,
    slot: Option<Slot>,
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

/// One agent's blackboard.
///
/// Build it from a [`MemoryLayout`][crate::MemoryLayout]; modules cannot be
/// added to a running agent except through [`register`](Self::register),
/// which the builder uses while assembling the layout.
#[derive(Default)]
pub struct MemoryStore {
    entries: FxHashMap<MemoryId, Entry>,
    now:     Tick,
}

impl MemoryStore {
    /// A store with no declared modules (brainless entities).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Declare a module.  Declaring the same module twice is a no-op and
    /// leaves its current value untouched.
    pub fn register(&mut self, key: ModuleKey) {
        self.entries
            .entry(key.id)
            .or_insert(Entry { name: key.name, slot: None });
    }

    #[inline]
    pub fn is_registered(&self, id: MemoryId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of declared modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The tick this store considers "now" for expiry checks.
    #[inline]
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Move the store's clock to `now` and drop every expired value.
    ///
    /// Returns how many values were evicted.  Calling twice with the same
    /// tick is harmless.
    pub fn advance(&mut self, now: Tick) -> usize {
        self.now = now;
        let mut evicted = 0;
        for entry in self.entries.values_mut() {
            if entry.slot.as_ref().is_some_and(|s| !s.is_live(now)) {
                entry.slot = None;
                evicted += 1;
            }
        }
        evicted
    }

    // ── Typed access ──────────────────────────────────────────────────────

    /// Current value of `module`, or `None` when empty or expired.
    ///
    /// # Panics
    /// Panics if `module` is not declared for this agent.
    pub fn get<T: Send + Sync + 'static>(&self, module: MemoryModule<T>) -> Option<&T> {
        let now = self.now;
        let slot = self.entry(module.key()).slot.as_ref()?;
        if !slot.is_live(now) {
            return None;
        }
        Some(downcast_ref(slot, module))
    }

    /// Mutable access to the current value, for in-place updates.
    ///
    /// # Panics
    /// Panics if `module` is not declared for this agent.
    pub fn get_mut<T: Send + Sync + 'static>(&mut self, module: MemoryModule<T>) -> Option<&mut T> {
        let now = self.now;
        let slot = self.entry_mut(module.key()).slot.as_mut()?;
        if !slot.is_live(now) {
            return None;
        }
        match slot.value.downcast_mut::<T>() {
            Some(v) => Some(v),
            None => type_mismatch(module.key()),
        }
    }

    /// Overwrite with no expiry.
    pub fn set<T: Send + Sync + 'static>(&mut self, module: MemoryModule<T>, value: T) {
        self.entry_mut(module.key()).slot = Some(Slot { value: Box::new(value), expires_at: None });
    }

    /// Overwrite with an expiry `ticks` after the store's current tick.
    pub fn set_with_expiry<T: Send + Sync + 'static>(
        &mut self,
        module: MemoryModule<T>,
        value:  T,
        ticks:  u64,
    ) {
        let expires_at = Some(self.now + ticks);
        self.entry_mut(module.key()).slot = Some(Slot { value: Box::new(value), expires_at });
    }

    /// `Some(v)` behaves like [`set`](Self::set); `None` erases.
    pub fn set_optional<T: Send + Sync + 'static>(&mut self, module: MemoryModule<T>, value: Option<T>) {
        match value {
            Some(v) => self.set(module, v),
            None => self.erase(module),
        }
    }

    /// Force the slot to absent, regardless of expiry.
    pub fn erase<T>(&mut self, module: MemoryModule<T>) {
        self.entry_mut(module.key()).slot = None;
    }

    /// Type-erased erase used by cleanup sets.
    pub fn erase_key(&mut self, key: ModuleKey) {
        self.entry_mut(key).slot = None;
    }

    /// Remove and return the current value.
    pub fn take<T: Send + Sync + 'static>(&mut self, module: MemoryModule<T>) -> Option<T> {
        let now = self.now;
        let slot = self.entry_mut(module.key()).slot.take()?;
        if !slot.is_live(now) {
            return None;
        }
        match slot.value.downcast::<T>() {
            Ok(v) => Some(*v),
            Err(_) => type_mismatch(module.key()),
        }
    }

    /// `true` if the slot currently holds a live value.
    #[inline]
    pub fn has_value<T>(&self, module: MemoryModule<T>) -> bool {
        self.has(module.id(), MemoryStatus::Present)
    }

    /// `true` if the slot holds exactly `value`.
    pub fn is_value<T: PartialEq + Send + Sync + 'static>(&self, module: MemoryModule<T>, value: &T) -> bool {
        self.get(module).is_some_and(|v| v == value)
    }

    /// Tick at which the current value expires, if it has an expiry.
    pub fn expiry_of<T>(&self, module: MemoryModule<T>) -> Option<Tick> {
        let now = self.now;
        self.entry(module.key())
            .slot
            .as_ref()
            .filter(|s| s.is_live(now))
            .and_then(|s| s.expires_at)
    }

    // ── Type-erased queries ───────────────────────────────────────────────

    /// Check one entry-condition requirement.
    ///
    /// Undeclared modules never satisfy any status, `Registered` included.
    pub fn has(&self, id: MemoryId, status: MemoryStatus) -> bool {
        let Some(entry) = self.entries.get(&id) else {
            return false;
        };
        let live = entry.slot.as_ref().is_some_and(|s| s.is_live(self.now));
        match status {
            MemoryStatus::Registered => true,
            MemoryStatus::Present => live,
            MemoryStatus::Absent => !live,
        }
    }

    /// Names of modules currently holding a live value, sorted.
    pub fn present_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .entries
            .values()
            .filter(|e| e.slot.as_ref().is_some_and(|s| s.is_live(self.now)))
            .map(|e| e.name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Every declared module, sorted by id.
    pub fn registered_keys(&self) -> Vec<ModuleKey> {
        let mut keys: Vec<ModuleKey> = self
            .entries
            .iter()
            .map(|(&id, e)| ModuleKey { id, name: e.name })
            .collect();
        keys.sort_unstable_by_key(|k| k.id);
        keys
    }

    /// Erase every value, keeping the declarations.
    pub fn clear(&mut self) {
        for entry in self.entries.values_mut() {
            entry.slot = None;
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn entry(&self, key: ModuleKey) -> &Entry {
        match self.entries.get(&key.id) {
            Some(e) => e,
            None => undeclared(key),
        }
    }

    fn entry_mut(&mut self, key: ModuleKey) -> &mut Entry {
        match self.entries.get_mut(&key.id) {
            Some(e) => e,
            None => undeclared(key),
        }
    }
}

fn downcast_ref<T: 'static>(slot: &Slot, module: MemoryModule<T>) -> &T {
    match slot.value.downcast_ref::<T>() {
        Some(v) => v,
        None => type_mismatch(module.key()),
    }
}

#[cold]
fn undeclared(key: ModuleKey) -> ! {
    panic!("memory module `{}` (#{}) is not declared for this agent", key.name, key.id.0)
}

#[cold]
fn type_mismatch(key: ModuleKey) -> ! {
    panic!("memory module `{}` (#{}) holds a value of a different type; two modules share an id", key.name, key.id.0)
}
