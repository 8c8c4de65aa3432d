//! Typed memory-module keys.
//!
//! A `MemoryModule<T>` is a `const`-constructible token pairing a numeric
//! [`MemoryId`] with the static value type `T`.  The store keys its slots by
//! the id alone; the type parameter travels with the token so every read is a
//! checked downcast to the declared type.

use std::fmt;
use std::marker::PhantomData;

use br_core::MemoryId;

// ── ModuleKey ─────────────────────────────────────────────────────────────────

/// Type-erased identity of a module: its id plus a name for diagnostics.
///
/// Used wherever modules of different value types sit in one collection
/// (entry conditions, layouts, cleanup sets).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ModuleKey {
    pub id:   MemoryId,
    pub name: &'static str,
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ── MemoryModule ──────────────────────────────────────────────────────────────

/// A typed blackboard slot identifier.
///
/// ```rust
/// use br_memory::MemoryModule;
///
/// const HUNGER: MemoryModule<u32> = MemoryModule::new(900, "hunger");
/// assert_eq!(HUNGER.name(), "hunger");
/// ```
pub struct MemoryModule<T> {
    key:    ModuleKey,
    _value: PhantomData<fn() -> T>,
}

impl<T> MemoryModule<T> {
    pub const fn new(id: u16, name: &'static str) -> Self {
        Self {
            key:    ModuleKey { id: MemoryId(id), name },
            _value: PhantomData,
        }
    }

    #[inline]
    pub const fn key(&self) -> ModuleKey {
        self.key
    }

    #[inline]
    pub const fn id(&self) -> MemoryId {
        self.key.id
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.key.name
    }
}

// Manual impls: deriving would put a spurious `T: Clone` bound on the token.
impl<T> Clone for MemoryModule<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MemoryModule<T> {}

impl<T> PartialEq for MemoryModule<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key.id == other.key.id
    }
}

impl<T> Eq for MemoryModule<T> {}

impl<T> fmt::Debug for MemoryModule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemoryModule({}#{})", self.key.name, self.key.id.0)
    }
}

impl<T> From<MemoryModule<T>> for ModuleKey {
    fn from(module: MemoryModule<T>) -> Self {
        module.key
    }
}

// ── MemoryStatus ──────────────────────────────────────────────────────────────

/// Required state of a module in an entry condition.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MemoryStatus {
    /// The slot holds an unexpired value.
    Present,
    /// The slot is declared and empty (or expired).
    Absent,
    /// The slot is declared; its content does not matter.
    Registered,
}
