#![allow(dead_code)]

use alloy_primitives::{keccak256, U256};
use containers::{
    Block, BlockHeader, Bloom, Fork, Hash32, RejectedTransaction, SchemaError, SealEngine,
    WorldState, EMPTY_TRIE_ROOT, EMPTY_UNCLES_HASH,
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use transition::{ToolError, ToolResponse, TransitionRequest, TransitionTool};

pub const ETHER: u128 = 1_000_000_000_000_000_000;

/// What the fake tool does on its next call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behaviour {
    Succeed,
    Fail,
    MissingField,
    DeclareCorrectHash,
    DeclareWrongHash,
    RejectFirst,
}

/// What the fake tool was asked to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub number: U256,
    pub parent: Hash32,
    pub seal_engine: SealEngine,
    pub reward: Option<U256>,
    pub transactions: usize,
    pub history: usize,
}

/// Deterministic in-process transition tool.
///
/// The post-state root is the hash of the block number, so the same
/// pending block always mines to the same header.
#[derive(Debug, Default)]
pub struct FakeTool {
    script: Mutex<VecDeque<Behaviour>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTool {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn then(&self, behaviour: Behaviour) -> &Self {
        self.script.lock().unwrap().push_back(behaviour);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn state_root_for(number: U256) -> Hash32 {
    keccak256(number.to_be_bytes::<32>())
}

impl TransitionTool for FakeTool {
    fn apply(&self, request: &TransitionRequest<'_>) -> Result<ToolResponse, ToolError> {
        let pending = request.pending;
        self.calls.lock().unwrap().push(Call {
            number: pending.header.number,
            parent: request.parent.hash(),
            seal_engine: request.seal_engine,
            reward: request.reward(),
            transactions: pending.transactions.len(),
            history: request.history.len(),
        });

        let behaviour = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Behaviour::Succeed);

        match behaviour {
            Behaviour::Fail => {
                return Err(ToolError::Exit {
                    status: "exit status: 1".to_string(),
                    stderr: "boom".to_string(),
                })
            }
            Behaviour::MissingField => {
                return Err(ToolError::Schema(SchemaError::MissingField {
                    context: "ToolResponse".to_string(),
                    field: "stateRoot".to_string(),
                }))
            }
            _ => {}
        }

        let state_root = state_root_for(pending.header.number);
        let mut response = ToolResponse {
            state_root,
            transactions_root: EMPTY_TRIE_ROOT,
            receipts_root: EMPTY_TRIE_ROOT,
            logs_bloom: Bloom::ZERO,
            gas_used: U256::ZERO,
            difficulty: None,
            declared_hash: None,
            receipts: Vec::new(),
            rejected: Vec::new(),
            post_state: WorldState::new(
                state_root,
                json!({ "number": pending.header.number.to_string() }),
            ),
            debug: String::new(),
        };

        match behaviour {
            Behaviour::DeclareCorrectHash => {
                response.declared_hash = Some(response.confirmed_header(&pending.header).hash);
            }
            Behaviour::DeclareWrongHash => {
                response.declared_hash = Some(Hash32::repeat_byte(0xab));
            }
            Behaviour::RejectFirst => {
                response.rejected.push(RejectedTransaction {
                    index: 0,
                    error: "nonce too low".to_string(),
                });
            }
            _ => {}
        }
        Ok(response)
    }
}

pub fn genesis_header() -> BlockHeader {
    BlockHeader {
        difficulty: U256::from(0x020000),
        gas_limit: U256::from(0x2fefd8),
        sha3_uncles: EMPTY_UNCLES_HASH,
        receipts_root: EMPTY_TRIE_ROOT,
        transactions_root: EMPTY_TRIE_ROOT,
        state_root: state_root_for(U256::ZERO),
        timestamp: U256::from(1000),
        ..Default::default()
    }
    .with_recomputed_hash()
}

pub fn genesis() -> Block {
    Block::genesis(genesis_header(), json!({}))
}

pub fn istanbul() -> Fork {
    Fork::new("Istanbul", U256::from(2 * ETHER))
}
