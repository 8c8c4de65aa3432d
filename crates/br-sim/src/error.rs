use thiserror::Error;

use br_core::{AgentId, CoreError};

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("brain for {agent} but the world only has {count} entities")]
    AgentOutOfRange {
        agent: AgentId,
        count: usize,
    },

    #[error("{0} was given more than one brain")]
    DuplicateBrain(AgentId),
}

pub type SimResult<T> = Result<T, SimError>;
