//! Declarative memory-query triggers.
//!
//! A declared trigger pairs a tuple of memory queries with a callback.  The
//! queries are checked first; the callback only runs when every one of them
//! resolves, and it receives typed accessors instead of raw modules:
//!
//! ```rust,ignore
//! use br_behavior::{absent, declare, present};
//! use br_memory::catalog::{ATTACK_TARGET, NEAREST_HOSTILE};
//!
//! let start_attacking = declare(
//!     "start_attacking",
//!     (present(NEAREST_HOSTILE), absent(ATTACK_TARGET)),
//!     |ctx, (hostile, target)| {
//!         target.set(ctx, *hostile.get());
//!         true
//!     },
//! );
//! ```
//!
//! Accessors hold a copy of the value read at resolve time, so the callback
//! is free to mutate the context.

use br_memory::{MemoryModule, MemoryStatus, MemoryStore, ModuleKey};

use crate::{BrainContext, EntryCondition, Trigger};

// ── Query ─────────────────────────────────────────────────────────────────────

/// One or more memory requirements that resolve to accessors.
pub trait Query: Send {
    type Output;

    fn register(&self, entry: &mut EntryCondition);

    /// `Some` iff every requirement holds.
    fn resolve(&self, store: &MemoryStore) -> Option<Self::Output>;
}

// ── Accessors ─────────────────────────────────────────────────────────────────

/// A module that held a value when the trigger fired.
pub struct Present<T> {
    module: MemoryModule<T>,
    value:  T,
}

impl<T: Send + Sync + 'static> Present<T> {
    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn set(&self, ctx: &mut BrainContext<'_>, value: T) {
        ctx.memory_mut().set(self.module, value);
    }

    pub fn set_with_expiry(&self, ctx: &mut BrainContext<'_>, value: T, ticks: u64) {
        ctx.memory_mut().set_with_expiry(self.module, value, ticks);
    }

    pub fn erase(&self, ctx: &mut BrainContext<'_>) {
        ctx.memory_mut().erase(self.module);
    }
}

/// A module that was empty when the trigger fired.
pub struct Absent<T> {
    module: MemoryModule<T>,
}

impl<T: Send + Sync + 'static> Absent<T> {
    pub fn set(&self, ctx: &mut BrainContext<'_>, value: T) {
        ctx.memory_mut().set(self.module, value);
    }

    pub fn set_with_expiry(&self, ctx: &mut BrainContext<'_>, value: T, ticks: u64) {
        ctx.memory_mut().set_with_expiry(self.module, value, ticks);
    }
}

/// A declared module, with whatever value it held.
pub struct Registered<T> {
    module: MemoryModule<T>,
    value:  Option<T>,
}

impl<T: Send + Sync + 'static> Registered<T> {
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn set(&self, ctx: &mut BrainContext<'_>, value: T) {
        ctx.memory_mut().set(self.module, value);
    }

    pub fn set_optional(&self, ctx: &mut BrainContext<'_>, value: Option<T>) {
        ctx.memory_mut().set_optional(self.module, value);
    }

    pub fn erase(&self, ctx: &mut BrainContext<'_>) {
        ctx.memory_mut().erase(self.module);
    }
}

// ── Single-module queries ─────────────────────────────────────────────────────

pub struct PresentQuery<T>(MemoryModule<T>);
pub struct AbsentQuery<T>(MemoryModule<T>);
pub struct RegisteredQuery<T>(MemoryModule<T>);

/// Require `module` to hold a value.
pub fn present<T>(module: MemoryModule<T>) -> PresentQuery<T> {
    PresentQuery(module)
}

/// Require `module` to be empty.
pub fn absent<T>(module: MemoryModule<T>) -> AbsentQuery<T> {
    AbsentQuery(module)
}

/// Require `module` to be declared.
pub fn registered<T>(module: MemoryModule<T>) -> RegisteredQuery<T> {
    RegisteredQuery(module)
}

impl<T: Clone + Send + Sync + 'static> Query for PresentQuery<T> {
    type Output = Present<T>;

    fn register(&self, entry: &mut EntryCondition) {
        entry.push(self.0.key(), MemoryStatus::Present);
    }

    fn resolve(&self, store: &MemoryStore) -> Option<Present<T>> {
        if !store.has(self.0.id(), MemoryStatus::Present) {
            return None;
        }
        store.get(self.0).cloned().map(|value| Present { module: self.0, value })
    }
}

impl<T: Send + Sync + 'static> Query for AbsentQuery<T> {
    type Output = Absent<T>;

    fn register(&self, entry: &mut EntryCondition) {
        entry.push(self.0.key(), MemoryStatus::Absent);
    }

    fn resolve(&self, store: &MemoryStore) -> Option<Absent<T>> {
        store
            .has(self.0.id(), MemoryStatus::Absent)
            .then_some(Absent { module: self.0 })
    }
}

impl<T: Clone + Send + Sync + 'static> Query for RegisteredQuery<T> {
    type Output = Registered<T>;

    fn register(&self, entry: &mut EntryCondition) {
        entry.push(self.0.key(), MemoryStatus::Registered);
    }

    fn resolve(&self, store: &MemoryStore) -> Option<Registered<T>> {
        if !store.is_registered(self.0.id()) {
            return None;
        }
        Some(Registered { module: self.0, value: store.get(self.0).cloned() })
    }
}

// ── Tuples ────────────────────────────────────────────────────────────────────

macro_rules! tuple_query {
    ($($q:ident),+) => {
        impl<$($q: Query),+> Query for ($($q,)+) {
            type Output = ($($q::Output,)+);

            #[allow(non_snake_case)]
            fn register(&self, entry: &mut EntryCondition) {
                let ($($q,)+) = self;
                $($q.register(entry);)+
            }

            #[allow(non_snake_case)]
            fn resolve(&self, store: &MemoryStore) -> Option<Self::Output> {
                let ($($q,)+) = self;
                Some(($($q.resolve(store)?,)+))
            }
        }
    };
}

tuple_query!(A);
tuple_query!(A, B);
tuple_query!(A, B, C);
tuple_query!(A, B, C, D);

// ── Declared triggers ─────────────────────────────────────────────────────────

pub struct Declared<Q, F> {
    name:     &'static str,
    entry:    EntryCondition,
    query:    Q,
    callback: F,
}

impl<Q: Query, F> Declared<Q, F> {
    pub fn entry_condition(&self) -> &EntryCondition {
        &self.entry
    }

    pub fn keys(&self) -> Vec<ModuleKey> {
        self.entry.keys().collect()
    }
}

impl<Q, F> Trigger for Declared<Q, F>
where
    Q: Query,
    F: FnMut(&mut BrainContext<'_>, Q::Output) -> bool + Send,
{
    fn name(&self) -> &str {
        self.name
    }

    fn trigger(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        if !self.entry.is_satisfied(ctx.memory()) {
            return false;
        }
        match self.query.resolve(ctx.memory()) {
            Some(accessors) => (self.callback)(ctx, accessors),
            None => false,
        }
    }
}

/// Declare a trigger gated on `query`.
pub fn declare<Q, F>(name: &'static str, query: Q, callback: F) -> Declared<Q, F>
where
    Q: Query,
    F: FnMut(&mut BrainContext<'_>, Q::Output) -> bool + Send,
{
    let mut entry = EntryCondition::new();
    query.register(&mut entry);
    Declared { name, entry, query, callback }
}

// ── Composition ───────────────────────────────────────────────────────────────

pub struct Sequence<A, B> {
    name:   &'static str,
    first:  A,
    second: B,
}

impl<A: Trigger, B: Trigger> Trigger for Sequence<A, B> {
    fn name(&self) -> &str {
        self.name
    }

    fn trigger(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        self.first.trigger(ctx) && self.second.trigger(ctx)
    }
}

/// Fire `second` only if `first` fired.
pub fn sequence<A: Trigger, B: Trigger>(name: &'static str, first: A, second: B) -> Sequence<A, B> {
    Sequence { name, first, second }
}

pub struct Conditional<P, T> {
    name:      &'static str,
    predicate: P,
    inner:     T,
}

impl<P, T> Trigger for Conditional<P, T>
where
    P: FnMut(&BrainContext<'_>) -> bool + Send,
    T: Trigger,
{
    fn name(&self) -> &str {
        self.name
    }

    fn trigger(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        (self.predicate)(ctx) && self.inner.trigger(ctx)
    }
}

/// Fire `inner` only while `predicate` holds.
pub fn trigger_if<P, T>(name: &'static str, predicate: P, inner: T) -> Conditional<P, T>
where
    P: FnMut(&BrainContext<'_>) -> bool + Send,
    T: Trigger,
{
    Conditional { name, predicate, inner }
}
