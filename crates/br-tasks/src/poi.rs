//! Point-of-interest acquisition and validation.
//!
//! # Retry backoff
//!
//! `AcquirePoi` scans for unclaimed POIs and claims the first one it can
//! path to.  Candidates that fail are parked behind a jittered linear
//! backoff:
//!
//! ```text
//! first failure:  delay = 40 + rand[0, 40)
//! each retry:     delay = min(delay + 40 + rand[0, 40), 400)
//! ```
//!
//! Entries whose last attempt is older than 400 ticks are forgotten, and the
//! whole table is cleared on a successful claim.

use std::collections::BTreeMap;

use tracing::debug;

use br_behavior::{BrainContext, Trigger};
use br_core::{AgentRng, BlockPos, Tick};
use br_memory::{MemoryModule, MemoryStatus};
use br_world::{PoiKind, WorldCommand};

/// Fixed part of each backoff increment.
pub const MIN_INTERVAL_INCREASE: u64 = 40;
/// Exclusive bound of the random part of each increment.
pub const RANDOM_INTERVAL_INCREASE: u64 = 40;
/// Cap on the retry delay; also the age at which a retry entry is dropped.
pub const MAX_RETRY_DELAY: u64 = 400;
/// Radius of the POI scan in blocks.
pub const SCAN_RANGE: u32 = 48;
/// Candidates path-checked per scan.
pub const BATCH_SIZE: usize = 5;

// ── Backoff ───────────────────────────────────────────────────────────────────

/// Jittered linear retry timer for one candidate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Backoff {
    previous_attempt: Tick,
    next_attempt:     Tick,
    delay:            u64,
}

impl Backoff {
    fn increment(rng: &mut AgentRng) -> u64 {
        MIN_INTERVAL_INCREASE + rng.gen_range(0..RANDOM_INTERVAL_INCREASE)
    }

    /// Timer after a first failed attempt at `now`.
    pub fn new(now: Tick, rng: &mut AgentRng) -> Self {
        let delay = Self::increment(rng);
        Self { previous_attempt: now, next_attempt: now + delay, delay }
    }

    /// Record another failed attempt at `now`.
    pub fn mark_attempt(&mut self, now: Tick, rng: &mut AgentRng) {
        self.delay = (self.delay + Self::increment(rng)).min(MAX_RETRY_DELAY);
        self.previous_attempt = now;
        self.next_attempt = now + self.delay;
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    pub fn next_attempt(&self) -> Tick {
        self.next_attempt
    }

    pub fn should_retry(&self, now: Tick) -> bool {
        now >= self.next_attempt
    }

    pub fn is_still_valid(&self, now: Tick) -> bool {
        now.since(self.previous_attempt) < MAX_RETRY_DELAY
    }
}

// ── AcquirePoi ────────────────────────────────────────────────────────────────

/// Claim the nearest reachable unclaimed POI of one kind and store it in a
/// memory module.
pub struct AcquirePoi {
    kind:        PoiKind,
    memory:      MemoryModule<BlockPos>,
    only_adults: bool,
    next_scan:   Tick,
    retries:     BTreeMap<BlockPos, Backoff>,
}

impl AcquirePoi {
    pub fn new(kind: PoiKind, memory: MemoryModule<BlockPos>, only_adults: bool) -> Self {
        Self { kind, memory, only_adults, next_scan: Tick::ZERO, retries: BTreeMap::new() }
    }

    /// Pending retry timers, by candidate.
    pub fn retries(&self) -> &BTreeMap<BlockPos, Backoff> {
        &self.retries
    }
}

impl Trigger for AcquirePoi {
    fn name(&self) -> &str {
        "acquire_poi"
    }

    fn trigger(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        if !ctx.memory().has(self.memory.id(), MemoryStatus::Absent) {
            return false;
        }
        let Some(me) = ctx.info().filter(|e| e.alive) else {
            return false;
        };
        if self.only_adults && me.is_baby() {
            return false;
        }
        let now = ctx.tick;
        if now < self.next_scan {
            return false;
        }
        self.next_scan = now + 20 + ctx.rng.gen_range(0..20);

        self.retries.retain(|_, b| b.is_still_valid(now));
        let candidates: Vec<BlockPos> = ctx
            .world
            .find_pois(self.kind, me.position.block_pos(), SCAN_RANGE)
            .into_iter()
            .filter(|p| self.retries.get(p).is_none_or(|b| b.should_retry(now)))
            .take(BATCH_SIZE)
            .collect();
        if candidates.is_empty() {
            return false;
        }

        for &pos in &candidates {
            let reachable = ctx.world.path_to(ctx.agent, pos, 1).is_some_and(|p| p.can_reach());
            if reachable {
                let agent = ctx.agent;
                ctx.issue(WorldCommand::TakePoi { agent, pos });
                ctx.memory_mut().set(self.memory, pos);
                self.retries.clear();
                debug!(%agent, %pos, kind = ?self.kind, "poi acquired");
                return true;
            }
        }

        for pos in candidates {
            match self.retries.get_mut(&pos) {
                Some(b) => b.mark_attempt(now, ctx.rng),
                None => {
                    self.retries.insert(pos, Backoff::new(now, ctx.rng));
                }
            }
        }
        false
    }
}

// ── ValidateNearbyPoi ─────────────────────────────────────────────────────────

/// Distance within which a stored POI is checked against the world.
pub const VALIDATE_RANGE: f64 = 16.0;

/// Forget (and release) a stored POI whose block no longer provides it.
pub struct ValidateNearbyPoi {
    kind:   PoiKind,
    memory: MemoryModule<BlockPos>,
}

impl ValidateNearbyPoi {
    pub fn new(kind: PoiKind, memory: MemoryModule<BlockPos>) -> Self {
        Self { kind, memory }
    }
}

impl Trigger for ValidateNearbyPoi {
    fn name(&self) -> &str {
        "validate_nearby_poi"
    }

    fn trigger(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        let Some(&pos) = ctx.memory().get(self.memory) else {
            return false;
        };
        let Some(me) = ctx.position() else { return false };
        if !pos.closer_to_center_than(me, VALIDATE_RANGE) {
            return false;
        }
        if ctx.world.block_at(pos).poi_kind() == Some(self.kind) {
            return false;
        }
        ctx.memory_mut().erase(self.memory);
        ctx.issue(WorldCommand::ReleasePoi { pos });
        debug!(agent = %ctx.agent, %pos, "poi invalidated");
        true
    }
}
