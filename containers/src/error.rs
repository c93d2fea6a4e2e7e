use alloy_primitives::{B256, U256};
use thiserror::Error;

/// A document does not have the shape a structure requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{context}: missing required field `{field}`")]
    MissingField { context: String, field: String },

    #[error("{context}: field `{field}` is {found}, expected {expected}")]
    WrongType {
        context: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("{context}: unexpected field `{field}`")]
    UnknownField { context: String, field: String },

    #[error("{context}: expected an object, found {found}")]
    NotAnObject { context: String, found: String },

    #[error("field `{field}`: invalid hex `{value}` ({reason})")]
    InvalidHex {
        field: String,
        value: String,
        reason: String,
    },

    #[error("field `{field}`: expected {expected} bytes, found {found}")]
    WrongLength {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("malformed {format} document: {reason}")]
    Malformed { format: &'static str, reason: String },
}

/// A declared header hash disagrees with the hash computed from its content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("block {number}: declared hash {declared} != computed hash {computed}")]
pub struct ConsistencyError {
    pub number: U256,
    pub declared: B256,
    pub computed: B256,
}
