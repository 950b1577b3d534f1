use crate::mcp::types::McpError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AbilityError {
    #[error("Ability not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Timeout")]
    Timeout,

    #[error("Remote error: {0}")]
    Remote(#[from] McpError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AbilityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AbilityError::ExecutionFailed(format!("not found: {}", msg)),
            StoreError::Conflict(msg) => AbilityError::ExecutionFailed(format!("conflict: {}", msg)),
            StoreError::Unavailable(msg) => AbilityError::Internal(msg),
        }
    }
}

pub type AbilityResult<T> = Result<T, AbilityError>;
