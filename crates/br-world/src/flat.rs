//! `FlatWorld`: an in-memory, single-layer reference world.
//!
//! # Model
//!
//! - Entities live in a `Vec` indexed by `AgentId` and are never removed;
//!   dying only clears `alive`.
//! - Interesting blocks (beds, workstations, bells, farmland, crops) sit in a
//!   sparse map; every other cell is air.  Obstacles are a separate set of
//!   impassable cells.
//! - Neighbour queries go through an R-tree (via `rstar`) of living entity
//!   positions, rebuilt whenever positions change.
//! - Paths come from [`plan_straight`]; followers advance
//!   `BASE_SPEED * speed` blocks per `step`.

use std::collections::VecDeque;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use br_core::{AgentId, BlockPos, ItemId, SimRng, Tick, Vec3};

use crate::path::plan_straight;
use crate::{BlockKind, EntityInfo, EntityKind, Path, PoiKind, World, WorldCommand, WorldError, WorldResult};

/// Blocks per tick at speed modifier 1.0.
pub const BASE_SPEED: f64 = 0.25;

/// Age given to freshly spawned babies; counts up to 0 (adult).
pub const BABY_AGE: i32 = -24_000;

/// Default cap on planned path length, in blocks.
pub const DEFAULT_MAX_PATH_LEN: u32 = 48;

const PROJECTILE_HIT_CHANCE: f64 = 0.8;
const PROJECTILE_DAMAGE: f32 = 4.0;

/// Per-tick chance that an immature crop grows one stage.
const CROP_GROWTH_CHANCE: f64 = 0.05;

fn max_health(kind: EntityKind) -> f32 {
    match kind {
        EntityKind::Villager | EntityKind::Player => 20.0,
        EntityKind::Pillager => 24.0,
        EntityKind::Goat | EntityKind::Cat | EntityKind::Cow => 10.0,
    }
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct EntityEntry {
    point: [f64; 3],
    id:    AgentId,
}

impl RTreeObject for EntityEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for EntityEntry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── Entity state ──────────────────────────────────────────────────────────────

struct EntityState {
    kind:          EntityKind,
    position:      Vec3,
    alive:         bool,
    age:           i32,
    health:        f32,
    sleeping:      Option<BlockPos>,
    route:         VecDeque<BlockPos>,
    speed:         f32,
    look_at:       Option<Vec3>,
    charging:      bool,
    last_attacker: Option<AgentId>,
    inventory:     Vec<ItemId>,
    jumps:         u32,
}

impl EntityState {
    fn new(kind: EntityKind, position: Vec3, age: i32) -> Self {
        Self {
            kind,
            position,
            alive: true,
            age,
            health: max_health(kind),
            sleeping: None,
            route: VecDeque::new(),
            speed: 0.0,
            look_at: None,
            charging: false,
            last_attacker: None,
            inventory: Vec::new(),
            jumps: 0,
        }
    }

    fn info(&self) -> EntityInfo {
        EntityInfo {
            kind:     self.kind,
            position: self.position,
            alive:    self.alive,
            age:      self.age,
            health:   self.health,
            sleeping: self.sleeping,
            moving:   !self.route.is_empty(),
        }
    }
}

// ── FlatWorld ─────────────────────────────────────────────────────────────────

pub struct FlatWorld {
    entities:     Vec<EntityState>,
    blocks:       FxHashMap<BlockPos, BlockKind>,
    obstacles:    FxHashSet<BlockPos>,
    tickets:      FxHashMap<BlockPos, AgentId>,
    index:        RTree<EntityEntry>,
    rng:          SimRng,
    max_path_len: u32,
    sounds:       Vec<&'static str>,
}

impl FlatWorld {
    pub fn new(seed: u64) -> Self {
        Self {
            entities:     Vec::new(),
            blocks:       FxHashMap::default(),
            obstacles:    FxHashSet::default(),
            tickets:      FxHashMap::default(),
            index:        RTree::new(),
            rng:          SimRng::new(seed),
            max_path_len: DEFAULT_MAX_PATH_LEN,
            sounds:       Vec::new(),
        }
    }

    /// Builder-style: cap planned path length.
    pub fn with_max_path_len(mut self, blocks: u32) -> Self {
        self.max_path_len = blocks;
        self
    }

    // ── Setup ─────────────────────────────────────────────────────────────

    /// Spawn an adult and return its id.  Ids are dense and never reused.
    pub fn spawn(&mut self, kind: EntityKind, at: Vec3) -> AgentId {
        self.spawn_aged(kind, at, 0)
    }

    pub fn spawn_baby(&mut self, kind: EntityKind, at: Vec3) -> AgentId {
        self.spawn_aged(kind, at, BABY_AGE)
    }

    fn spawn_aged(&mut self, kind: EntityKind, at: Vec3, age: i32) -> AgentId {
        let id = AgentId(self.entities.len() as u32);
        self.entities.push(EntityState::new(kind, at, age));
        self.reindex();
        debug!(%id, %kind, position = %at, "entity spawned");
        id
    }

    pub fn set_block(&mut self, pos: BlockPos, block: BlockKind) {
        if block == BlockKind::Air {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
        if block.poi_kind().is_none() {
            self.tickets.remove(&pos);
        }
    }

    /// Mark a cell impassable for path planning.
    pub fn add_obstacle(&mut self, pos: BlockPos) {
        self.obstacles.insert(pos);
    }

    pub fn kill(&mut self, id: AgentId) -> WorldResult<()> {
        self.state(id)?;
        self.die(id);
        Ok(())
    }

    /// Deal `damage` to `victim` on behalf of `attacker`.
    pub fn hurt(&mut self, victim: AgentId, attacker: AgentId, damage: f32) -> WorldResult<()> {
        if !self.state(victim)?.alive {
            return Err(WorldError::EntityDead(victim));
        }
        self.deal_damage(victim, attacker, damage);
        Ok(())
    }

    pub fn teleport(&mut self, id: AgentId, to: Vec3) -> WorldResult<()> {
        let e = self.state_mut(id)?;
        e.position = to;
        e.route.clear();
        self.reindex();
        Ok(())
    }

    /// Claim a POI outside of any brain (pre-assigned homes).
    pub fn assign_poi(&mut self, pos: BlockPos, owner: AgentId) -> WorldResult<()> {
        if self.block_at(pos).poi_kind().is_none() {
            return Err(WorldError::NotAPoi(pos));
        }
        self.state(owner)?;
        self.tickets.insert(pos, owner);
        Ok(())
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn poi_owner(&self, pos: BlockPos) -> Option<AgentId> {
        self.tickets.get(&pos).copied()
    }

    pub fn inventory(&self, id: AgentId) -> &[ItemId] {
        self.entities
            .get(id.index())
            .map(|e| e.inventory.as_slice())
            .unwrap_or(&[])
    }

    pub fn look_target(&self, id: AgentId) -> Option<Vec3> {
        self.entities.get(id.index()).and_then(|e| e.look_at)
    }

    pub fn is_charging(&self, id: AgentId) -> bool {
        self.entities.get(id.index()).is_some_and(|e| e.charging)
    }

    pub fn jumps(&self, id: AgentId) -> u32 {
        self.entities.get(id.index()).map_or(0, |e| e.jumps)
    }

    /// Every sound played so far, in order.
    pub fn sounds(&self) -> &[&'static str] {
        &self.sounds
    }

    pub fn living_count(&self) -> usize {
        self.entities.iter().filter(|e| e.alive).count()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn state(&self, id: AgentId) -> WorldResult<&EntityState> {
        self.entities.get(id.index()).ok_or(WorldError::EntityNotFound(id))
    }

    fn state_mut(&mut self, id: AgentId) -> WorldResult<&mut EntityState> {
        self.entities.get_mut(id.index()).ok_or(WorldError::EntityNotFound(id))
    }

    /// Mutable state of a living entity; `None` for missing or dead ids.
    fn living_mut(&mut self, id: AgentId) -> Option<&mut EntityState> {
        self.entities.get_mut(id.index()).filter(|e| e.alive)
    }

    fn reindex(&mut self) {
        let entries = self
            .entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.alive)
            .map(|(i, e)| EntityEntry {
                point: [e.position.x, e.position.y, e.position.z],
                id:    AgentId(i as u32),
            })
            .collect();
        self.index = RTree::bulk_load(entries);
    }

    fn deal_damage(&mut self, victim: AgentId, attacker: AgentId, damage: f32) {
        let Some(e) = self.living_mut(victim) else { return };
        e.health -= damage;
        e.last_attacker = Some(attacker);
        if e.health <= 0.0 {
            self.die(victim);
        }
    }

    fn die(&mut self, id: AgentId) {
        let Some(e) = self.entities.get_mut(id.index()) else { return };
        if !e.alive {
            return;
        }
        e.alive = false;
        e.route.clear();
        let bed = e.sleeping.take();
        if let Some(bed) = bed {
            self.blocks.insert(bed, BlockKind::Bed { occupied: false });
        }
        self.tickets.retain(|_, owner| *owner != id);
        self.reindex();
        debug!(%id, "entity died");
    }

    fn advance_entity(e: &mut EntityState) {
        match e.age.cmp(&0) {
            std::cmp::Ordering::Less => e.age += 1,
            std::cmp::Ordering::Greater => e.age -= 1,
            std::cmp::Ordering::Equal => {}
        }
        if e.sleeping.is_some() {
            return;
        }
        let Some(&next) = e.route.front() else { return };
        let goal = next.bottom_center();
        let step = BASE_SPEED * e.speed as f64;
        let delta = Vec3::new(goal.x - e.position.x, 0.0, goal.z - e.position.z);
        if delta.length() <= step {
            e.position = Vec3::new(goal.x, goal.y, goal.z);
            e.route.pop_front();
        } else {
            e.position = e.position.add(delta.normalize().scale(step));
        }
    }

    fn grow_crops(&mut self) {
        let mut crops: Vec<BlockPos> = self
            .blocks
            .iter()
            .filter(|(_, b)| matches!(b, BlockKind::Crop { .. }) && !b.is_mature_crop())
            .map(|(&p, _)| p)
            .collect();
        crops.sort_unstable();
        for pos in crops {
            if self.rng.gen_bool(CROP_GROWTH_CHANCE) {
                if let Some(BlockKind::Crop { age }) = self.blocks.get_mut(&pos) {
                    *age += 1;
                }
            }
        }
    }
}

impl World for FlatWorld {
    fn entity(&self, id: AgentId) -> Option<EntityInfo> {
        self.entities.get(id.index()).map(EntityState::info)
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn path_to(&self, agent: AgentId, target: BlockPos, tolerance: u32) -> Option<Path> {
        let e = self.entities.get(agent.index()).filter(|e| e.alive)?;
        plan_straight(e.position.block_pos(), target, tolerance, self.max_path_len, |p| {
            self.obstacles.contains(&p)
        })
    }

    fn entities_near(&self, center: Vec3, radius: f64) -> Vec<AgentId> {
        let point = [center.x, center.y, center.z];
        let mut found: Vec<(f64, AgentId)> = self
            .index
            .locate_within_distance(point, radius * radius)
            .map(|e| (e.distance_2(&point), e.id))
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.into_iter().map(|(_, id)| id).collect()
    }

    fn block_at(&self, pos: BlockPos) -> BlockKind {
        self.blocks.get(&pos).copied().unwrap_or_default()
    }

    fn find_pois(&self, kind: PoiKind, center: BlockPos, radius: u32) -> Vec<BlockPos> {
        let r2 = (radius as i64) * (radius as i64);
        let mut found: Vec<BlockPos> = self
            .blocks
            .iter()
            .filter(|(p, b)| {
                b.poi_kind() == Some(kind) && !self.tickets.contains_key(*p) && p.dist_sqr(center) <= r2
            })
            .map(|(&p, _)| p)
            .collect();
        found.sort_unstable_by_key(|p| (p.dist_sqr(center), *p));
        found
    }

    fn last_attacker(&self, agent: AgentId) -> Option<AgentId> {
        self.entities.get(agent.index()).and_then(|e| e.last_attacker)
    }

    fn apply(&mut self, command: WorldCommand) {
        trace!(command = command.label(), "applying world command");
        match command {
            WorldCommand::MoveTo { agent, path, speed } => {
                if let Some(e) = self.living_mut(agent) {
                    e.route = path.nodes.into();
                    e.speed = speed;
                }
            }
            WorldCommand::StopMoving { agent } => {
                if let Some(e) = self.living_mut(agent) {
                    e.route.clear();
                }
            }
            WorldCommand::LookAt { agent, target } => {
                if let Some(e) = self.living_mut(agent) {
                    e.look_at = Some(target);
                }
            }
            WorldCommand::SetBlock { pos, block } => self.set_block(pos, block),
            WorldCommand::SpawnEntity { kind, at, baby } => {
                self.spawn_aged(kind, at, if baby { BABY_AGE } else { 0 });
            }
            WorldCommand::PlaySound { at, sound } => {
                trace!(sound, position = %at, "sound");
                self.sounds.push(sound);
            }
            WorldCommand::TakePoi { agent, pos } => {
                if self.block_at(pos).poi_kind().is_some() && !self.tickets.contains_key(&pos) {
                    self.tickets.insert(pos, agent);
                    debug!(%agent, %pos, "poi claimed");
                } else {
                    trace!(%agent, %pos, "poi claim ignored");
                }
            }
            WorldCommand::ReleasePoi { pos } => {
                self.tickets.remove(&pos);
            }
            WorldCommand::StartSleeping { agent, bed } => {
                if self.block_at(bed) != (BlockKind::Bed { occupied: false }) {
                    return;
                }
                if let Some(e) = self.living_mut(agent) {
                    e.sleeping = Some(bed);
                    e.position = bed.bottom_center();
                    e.route.clear();
                    self.blocks.insert(bed, BlockKind::Bed { occupied: true });
                    self.reindex();
                }
            }
            WorldCommand::StopSleeping { agent } => {
                let bed = self.living_mut(agent).and_then(|e| e.sleeping.take());
                if let Some(bed) = bed {
                    if self.block_at(bed).is_bed() {
                        self.blocks.insert(bed, BlockKind::Bed { occupied: false });
                    }
                }
            }
            WorldCommand::Attack { attacker, target, damage } => {
                self.deal_damage(target, attacker, damage);
            }
            WorldCommand::StartCharging { agent } => {
                if let Some(e) = self.living_mut(agent) {
                    e.charging = true;
                }
            }
            WorldCommand::ShootProjectile { shooter, target } => {
                if let Some(e) = self.living_mut(shooter) {
                    e.charging = false;
                }
                if self.rng.gen_bool(PROJECTILE_HIT_CHANCE) {
                    self.deal_damage(target, shooter, PROJECTILE_DAMAGE);
                }
            }
            WorldCommand::Knockback { target, direction, strength } => {
                let push = Vec3::new(direction.x, 0.0, direction.z).normalize().scale(strength);
                if let Some(e) = self.living_mut(target) {
                    e.position = e.position.add(push);
                    e.route.clear();
                    self.reindex();
                }
            }
            WorldCommand::SetAge { agent, age } => {
                if let Some(e) = self.living_mut(agent) {
                    e.age = age;
                }
            }
            WorldCommand::Jump { agent } => {
                if let Some(e) = self.living_mut(agent) {
                    e.jumps += 1;
                }
            }
            WorldCommand::ThrowItem { from, to, item } => {
                if !self.is_alive(from) {
                    return;
                }
                if let Some(e) = self.living_mut(to) {
                    e.inventory.push(item);
                }
            }
        }
    }

    fn step(&mut self, _tick: Tick) {
        for e in self.entities.iter_mut().filter(|e| e.alive) {
            Self::advance_entity(e);
        }
        self.grow_crops();
        self.reindex();
    }
}
