use containers::{ConsistencyError, SchemaError};
use thiserror::Error;
use transition::ToolError;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("cannot rewind to block {requested}: chain has {len} blocks")]
    Range { requested: usize, len: usize },

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error("transition tool failed: {0}")]
    ToolInvocation(#[source] ToolError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<ToolError> for ChainError {
    fn from(error: ToolError) -> Self {
        match error {
            ToolError::Schema(error) => ChainError::Schema(error),
            other => ChainError::ToolInvocation(other),
        }
    }
}
