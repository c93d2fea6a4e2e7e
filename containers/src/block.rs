use crate::document::Document;
use crate::header::BlockHeader;
use crate::transaction::Transaction;
use crate::types::Hash32;
use alloy_primitives::U256;
use serde::Serialize;

/// World state after a block, as produced by the transition tool.
///
/// `alloc` is the tool's account dump and is handed back to it verbatim as
/// the pre-state of the next block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorldState {
    pub root: Hash32,
    pub alloc: Document,
}

impl WorldState {
    pub fn new(root: Hash32, alloc: Document) -> Self {
        Self { root, alloc }
    }
}

/// A materialized block: its header, the transactions it carries and the
/// state they produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub state: WorldState,
}

impl Block {
    /// Genesis block: a header and its allocation, no transactions.
    pub fn genesis(header: BlockHeader, alloc: Document) -> Self {
        let state = WorldState::new(header.state_root, alloc);
        Self {
            header,
            transactions: Vec::new(),
            state,
        }
    }

    pub fn hash(&self) -> Hash32 {
        self.header.hash
    }

    pub fn number(&self) -> U256 {
        self.header.number
    }
}

/// A block proposed for mining.
///
/// The header carries the caller's intent (coinbase, difficulty, gas limit,
/// timestamp, extra data, seal fields). Fields computed by execution are
/// overwritten by the transition tool's answer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingBlock {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl PendingBlock {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// Start a child of `parent`: same coinbase and gas limit, next number,
    /// parent hash linked, timestamp bumped by one.
    pub fn on_top_of(parent: &Block) -> Self {
        let parent = &parent.header;
        let header = BlockHeader {
            author: parent.author,
            difficulty: parent.difficulty,
            gas_limit: parent.gas_limit,
            number: parent.number + U256::from(1),
            parent_hash: parent.hash,
            sha3_uncles: parent.sha3_uncles,
            timestamp: parent.timestamp + U256::from(1),
            ..Default::default()
        };
        Self::new(header, Vec::new())
    }

    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_extra_data(mut self, extra_data: impl Into<alloy_primitives::Bytes>) -> Self {
        self.header.extra_data = extra_data.into();
        self
    }
}
