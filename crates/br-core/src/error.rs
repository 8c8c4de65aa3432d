//! Framework error type.
//!
//! Sub-crates define their own error enums; `CoreError` covers the shared
//! failure modes (bad configuration, unparsable input, I/O).

use thiserror::Error;

use crate::AgentId;

/// The base error type for `br-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `br-core`.
pub type CoreResult<T> = Result<T, CoreError>;
