use crate::document::Document;
use crate::types::Hash32;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// A transaction as the transition tool consumes it.
///
/// The harness never looks inside: signing and encoding belong to the tool
/// and the fixtures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction(pub Document);

impl Transaction {
    pub fn document(&self) -> &Document {
        &self.0
    }
}

/// Receipt of a transaction the tool included in the block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: Hash32,
    pub gas_used: U256,
    #[serde(default)]
    pub status: Option<U256>,
    #[serde(default)]
    pub transaction_index: Option<U256>,
}

/// A transaction the tool refused to apply, by position in the submitted list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedTransaction {
    pub index: usize,
    pub error: String,
}
