use crate::error::ToolError;
use alloy_primitives::U256;
use containers::document::{check_declared_fields, optional_str, required_str};
use containers::types::{parse_fixed, parse_value};
use containers::{
    BlockHeader, Bloom, DataType, Document, FieldSpec, Hash32, RejectedTransaction, SchemaError,
    Transaction, TransactionReceipt, WorldState,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

const CONTEXT: &str = "ToolResponse";

const STRING: &[DataType] = &[DataType::String];
const STRING_OR_NULL: &[DataType] = &[DataType::String, DataType::Null];
const ARRAY_OR_NULL: &[DataType] = &[DataType::Array, DataType::Null];

const RESULT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("stateRoot", STRING),
    FieldSpec::required("txRoot", STRING),
    FieldSpec::required("receiptsRoot", STRING),
    FieldSpec::required("logsBloom", STRING),
    FieldSpec::required("gasUsed", STRING),
    FieldSpec::optional("currentDifficulty", STRING_OR_NULL),
    FieldSpec::optional("hash", STRING),
    FieldSpec::optional("receipts", ARRAY_OR_NULL),
    FieldSpec::optional("rejected", ARRAY_OR_NULL),
];

/// The tool's answer for one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolResponse {
    pub state_root: Hash32,
    pub transactions_root: Hash32,
    pub receipts_root: Hash32,
    pub logs_bloom: Bloom,
    pub gas_used: U256,
    /// Difficulty the tool calculated, when the intent left it to the tool.
    pub difficulty: Option<U256>,
    /// Block hash as the tool computed it, if it reports one.
    pub declared_hash: Option<Hash32>,
    pub receipts: Vec<TransactionReceipt>,
    pub rejected: Vec<RejectedTransaction>,
    pub post_state: WorldState,
    /// Whatever the tool printed, kept for failure reports.
    pub debug: String,
}

impl ToolResponse {
    /// Build a response from the tool's result document and post-state dump.
    pub fn from_documents(
        result: &Document,
        post_alloc: Document,
        debug: String,
    ) -> Result<Self, SchemaError> {
        check_declared_fields(result, CONTEXT, RESULT_FIELDS)?;

        let state_root = hash(result, "stateRoot")?;
        // `null` is how tools spell "not calculated"
        let difficulty = match result.get("currentDifficulty") {
            Some(Value::String(raw)) => Some(parse_value("currentDifficulty", raw)?),
            _ => None,
        };

        Ok(Self {
            state_root,
            transactions_root: hash(result, "txRoot")?,
            receipts_root: hash(result, "receiptsRoot")?,
            logs_bloom: Bloom::from(parse_fixed::<256>(
                "logsBloom",
                required_str(result, CONTEXT, "logsBloom")?,
            )?),
            gas_used: parse_value("gasUsed", required_str(result, CONTEXT, "gasUsed")?)?,
            difficulty,
            declared_hash: optional_str(result, CONTEXT, "hash")?
                .map(|raw| parse_fixed::<32>("hash", raw))
                .transpose()?,
            receipts: list(result, "receipts")?,
            rejected: list(result, "rejected")?,
            post_state: WorldState::new(state_root, post_alloc),
            debug,
        })
    }

    /// The mined header: the caller's intent with every execution-derived
    /// field replaced by the tool's values.
    ///
    /// The hash is the tool's declared hash when it reported one and the
    /// locally computed one otherwise, so [`BlockHeader::verify_hash`] on the
    /// result checks the two against each other.
    pub fn confirmed_header(&self, intent: &BlockHeader) -> BlockHeader {
        let mut header = BlockHeader {
            difficulty: self.difficulty.unwrap_or(intent.difficulty),
            gas_used: self.gas_used,
            logs_bloom: self.logs_bloom,
            receipts_root: self.receipts_root,
            state_root: self.state_root,
            transactions_root: self.transactions_root,
            ..intent.clone()
        };
        match self.declared_hash {
            Some(declared) => header.hash = declared,
            None => header.recompute_hash(),
        }
        header
    }

    /// Submitted transactions minus the rejected ones, in submission order.
    pub fn accepted_transactions(
        &self,
        submitted: &[Transaction],
    ) -> Result<Vec<Transaction>, ToolError> {
        if let Some(bad) = self.rejected.iter().find(|r| r.index >= submitted.len()) {
            return Err(ToolError::MalformedOutput(format!(
                "rejected transaction index {} out of {} submitted",
                bad.index,
                submitted.len()
            )));
        }
        Ok(submitted
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.rejected.iter().any(|r| r.index == *index))
            .map(|(_, tx)| tx.clone())
            .collect())
    }
}

fn hash(result: &Document, key: &'static str) -> Result<Hash32, SchemaError> {
    parse_fixed::<32>(key, required_str(result, CONTEXT, key)?)
}

fn list<T: DeserializeOwned>(result: &Document, key: &str) -> Result<Vec<T>, SchemaError> {
    match result.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(items) => serde_json::from_value(items.clone()).map_err(|e| SchemaError::Malformed {
            format: "ToolResponse",
            reason: format!("`{key}`: {e}"),
        }),
    }
}
