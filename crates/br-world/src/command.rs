//! Fire-and-forget commands a brain issues to the world.
//!
//! Commands are buffered during an agent's brain tick and applied in issue
//! order right after it, so the next agent already sees their effects.

use br_core::{AgentId, BlockPos, ItemId, Vec3};

use crate::{BlockKind, EntityKind, Path};

#[derive(Clone, PartialEq, Debug)]
pub enum WorldCommand {
    /// Follow `path` at `speed` (fraction of the kind's base speed).
    MoveTo { agent: AgentId, path: Path, speed: f32 },
    StopMoving { agent: AgentId },
    LookAt { agent: AgentId, target: Vec3 },
    SetBlock { pos: BlockPos, block: BlockKind },
    /// Spawn a new entity.  Babies start with a negative age.
    SpawnEntity { kind: EntityKind, at: Vec3, baby: bool },
    PlaySound { at: Vec3, sound: &'static str },
    /// Claim a point of interest for `agent`.  Ignored if already claimed.
    TakePoi { agent: AgentId, pos: BlockPos },
    ReleasePoi { pos: BlockPos },
    StartSleeping { agent: AgentId, bed: BlockPos },
    StopSleeping { agent: AgentId },
    Attack { attacker: AgentId, target: AgentId, damage: f32 },
    StartCharging { agent: AgentId },
    ShootProjectile { shooter: AgentId, target: AgentId },
    Knockback { target: AgentId, direction: Vec3, strength: f64 },
    SetAge { agent: AgentId, age: i32 },
    Jump { agent: AgentId },
    ThrowItem { from: AgentId, to: AgentId, item: ItemId },
}

impl WorldCommand {
    /// Short lower-case label for traces.
    pub fn label(&self) -> &'static str {
        match self {
            WorldCommand::MoveTo { .. } => "move_to",
            WorldCommand::StopMoving { .. } => "stop_moving",
            WorldCommand::LookAt { .. } => "look_at",
            WorldCommand::SetBlock { .. } => "set_block",
            WorldCommand::SpawnEntity { .. } => "spawn_entity",
            WorldCommand::PlaySound { .. } => "play_sound",
            WorldCommand::TakePoi { .. } => "take_poi",
            WorldCommand::ReleasePoi { .. } => "release_poi",
            WorldCommand::StartSleeping { .. } => "start_sleeping",
            WorldCommand::StopSleeping { .. } => "stop_sleeping",
            WorldCommand::Attack { .. } => "attack",
            WorldCommand::StartCharging { .. } => "start_charging",
            WorldCommand::ShootProjectile { .. } => "shoot_projectile",
            WorldCommand::Knockback { .. } => "knockback",
            WorldCommand::SetAge { .. } => "set_age",
            WorldCommand::Jump { .. } => "jump",
            WorldCommand::ThrowItem { .. } => "throw_item",
        }
    }
}
