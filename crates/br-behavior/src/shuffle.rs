//! `ShufflingList`: weighted, re-shufflable ordering.
//!
//! # Weighting
//!
//! Each `shuffle` draws `u` uniform in `[0, 1)` per entry and scores it
//! `-(u^(1/weight))`, then stable-sorts ascending.  Higher weights push `u`'s
//! root toward 1, so their scores sort earlier more often.  Weights are
//! never changed and entries are never added or removed by a shuffle.

use br_core::AgentRng;

struct WeightedEntry<T> {
    item:   T,
    weight: u32,
    score:  f64,
}

pub struct ShufflingList<T> {
    entries: Vec<WeightedEntry<T>>,
}

impl<T> Default for ShufflingList<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> ShufflingList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` with `weight`.
    ///
    /// # Panics
    /// Panics if `weight` is zero.
    pub fn add(&mut self, item: T, weight: u32) -> &mut Self {
        assert!(weight >= 1, "shuffling list weight must be at least 1");
        self.entries.push(WeightedEntry { item, weight, score: 0.0 });
        self
    }

    /// Re-order entries by weighted random score.
    pub fn shuffle(&mut self, rng: &mut AgentRng) {
        for e in &mut self.entries {
            let u: f64 = rng.random();
            e.score = -u.powf(1.0 / e.weight as f64);
        }
        self.entries.sort_by(|a, b| a.score.total_cmp(&b.score));
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.entries.iter_mut().map(|e| &mut e.item)
    }

    /// `(item, weight)` pairs in current order.
    pub fn weighted(&self) -> impl Iterator<Item = (&T, u32)> + '_ {
        self.entries.iter().map(|e| (&e.item, e.weight))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> FromIterator<(T, u32)> for ShufflingList<T> {
    fn from_iter<I: IntoIterator<Item = (T, u32)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (item, weight) in iter {
            list.add(item, weight);
        }
        list
    }
}
