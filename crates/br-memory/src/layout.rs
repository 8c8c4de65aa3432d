//! `MemoryLayout`: the set of modules an archetype declares.
//!
//! The layout is built once per archetype (villager, goat, …) and stamped
//! out into a fresh [`MemoryStore`] for every agent of that kind:
//!
//! ```rust
//! use br_memory::{catalog, MemoryLayout};
//!
//! let layout = MemoryLayout::new()
//!     .with(catalog::WALK_TARGET)
//!     .with(catalog::HOME);
//! let store = layout.instantiate();
//! assert!(store.is_registered(catalog::HOME.id()));
//! ```

use crate::{MemoryModule, MemoryStore, ModuleKey};

#[derive(Clone, Debug, Default)]
pub struct MemoryLayout {
    keys: Vec<ModuleKey>,
}

impl MemoryLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: declare `module`.
    pub fn with<T>(mut self, module: MemoryModule<T>) -> Self {
        self.add(module.key());
        self
    }

    /// Builder-style: declare a type-erased key.
    pub fn with_key(mut self, key: ModuleKey) -> Self {
        self.add(key);
        self
    }

    /// Declare a key in place.  Duplicates are ignored.
    pub fn add(&mut self, key: ModuleKey) {
        if !self.contains(key) {
            self.keys.push(key);
        }
    }

    /// Declare every key yielded by `keys`.
    pub fn extend<I: IntoIterator<Item = ModuleKey>>(&mut self, keys: I) {
        for key in keys {
            self.add(key);
        }
    }

    pub fn contains(&self, key: ModuleKey) -> bool {
        self.keys.iter().any(|k| k.id == key.id)
    }

    pub fn keys(&self) -> &[ModuleKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// A fresh store with every declared module absent.
    pub fn instantiate(&self) -> MemoryStore {
        let mut store = MemoryStore::empty();
        for &key in &self.keys {
            store.register(key);
        }
        store
    }
}
