use thiserror::Error;

use br_schedule::Activity;

/// Brain configuration errors, reported by [`BrainBuilder::build`][crate::BrainBuilder::build].
#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("brain has no default activity")]
    NoDefaultActivity,

    #[error("core activity {0} cannot be the default activity")]
    CoreDefault(Activity),

    #[error("activity {0} is referenced but has no behaviors")]
    UnknownActivity(Activity),

    #[error("behavior configuration error: {0}")]
    Config(String),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
