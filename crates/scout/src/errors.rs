use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("No final answer after {0} model calls")]
    IterationLimit(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Errors caused by the model asking for something we cannot do. These are
    /// reported back to the model instead of failing the turn.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AgentError::ToolNotFound(_) | AgentError::InvalidParameters(_)
        )
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
