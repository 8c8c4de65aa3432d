//! `MemoryBank`: every agent's store, indexed by `AgentId`.
//!
//! Stores live in one `Vec` so a behavior running on agent A can write a
//! reciprocal reference into partner B's store (breeding, trading) through a
//! plain `&mut MemoryBank`.  Agents without a brain keep an empty store.

use br_core::{AgentId, Tick};

use crate::MemoryStore;

pub struct MemoryBank {
    stores: Vec<MemoryStore>,
}

impl MemoryBank {
    /// `count` empty stores, one per entity slot.
    pub fn new(count: usize) -> Self {
        Self {
            stores: (0..count).map(|_| MemoryStore::empty()).collect(),
        }
    }

    /// Replace `agent`'s store.  Grows the bank if `agent` is past the end.
    pub fn install(&mut self, agent: AgentId, store: MemoryStore) {
        let idx = agent.index();
        if idx >= self.stores.len() {
            self.stores.resize_with(idx + 1, MemoryStore::empty);
        }
        self.stores[idx] = store;
    }

    #[inline]
    pub fn get(&self, agent: AgentId) -> Option<&MemoryStore> {
        self.stores.get(agent.index())
    }

    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut MemoryStore> {
        self.stores.get_mut(agent.index())
    }

    /// `agent`'s store.
    ///
    /// # Panics
    /// Panics if `agent` is outside the bank.
    #[inline]
    pub fn store(&self, agent: AgentId) -> &MemoryStore {
        match self.stores.get(agent.index()) {
            Some(s) => s,
            None => panic!("{agent} has no memory store"),
        }
    }

    /// Mutable `agent` store.
    ///
    /// # Panics
    /// Panics if `agent` is outside the bank.
    #[inline]
    pub fn store_mut(&mut self, agent: AgentId) -> &mut MemoryStore {
        match self.stores.get_mut(agent.index()) {
            Some(s) => s,
            None => panic!("{agent} has no memory store"),
        }
    }

    /// Sweep expired values from every store.  Returns the total evicted.
    pub fn advance_all(&mut self, now: Tick) -> usize {
        self.stores.iter_mut().map(|s| s.advance(now)).sum()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// `(AgentId, &MemoryStore)` in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &MemoryStore)> + '_ {
        self.stores
            .iter()
            .enumerate()
            .map(|(i, s)| (AgentId(i as u32), s))
    }
}
