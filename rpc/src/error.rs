use containers::SchemaError;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("rpc transport: {0}")]
    Transport(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("reply id is different: expected {expected}, got {found}")]
    IdMismatch { expected: u64, found: Value },

    #[error("reply version is different: expected 2.0, got {found}")]
    VersionMismatch { found: Value },

    #[error("{method}: reply result is different: expected {expected}, got {found}")]
    UnexpectedResult {
        method: String,
        expected: Value,
        found: Value,
    },
}
