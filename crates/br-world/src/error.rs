//! World error type.

use thiserror::Error;

use br_core::{AgentId, BlockPos};

/// Errors produced by `br-world` setup helpers.  Commands never fail; a
/// command naming a missing entity is dropped with a trace log.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("entity {0} not found")]
    EntityNotFound(AgentId),

    #[error("entity {0} is dead")]
    EntityDead(AgentId),

    #[error("block {0} is not a point of interest")]
    NotAPoi(BlockPos),
}

pub type WorldResult<T> = Result<T, WorldError>;
