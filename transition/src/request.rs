use alloy_primitives::U256;
use containers::types::{bytes_to_hex, value_to_hex};
use containers::{Block, Document, Fork, PendingBlock, SealEngine};
use serde_json::{Map, Value};

/// Everything the tool needs to apply one pending block.
///
/// `history` is the chain so far in order; its last element is the parent
/// whose state the block is applied to.
#[derive(Clone, Copy, Debug)]
pub struct TransitionRequest<'a> {
    pub parent: &'a Block,
    pub history: &'a [Block],
    pub pending: &'a PendingBlock,
    pub fork: &'a Fork,
    pub seal_engine: SealEngine,
}

impl<'a> TransitionRequest<'a> {
    pub fn new(
        history: &'a [Block],
        parent: &'a Block,
        pending: &'a PendingBlock,
        fork: &'a Fork,
        seal_engine: SealEngine,
    ) -> Self {
        Self {
            parent,
            history,
            pending,
            fork,
            seal_engine,
        }
    }

    /// Pre-state accounts.
    pub fn alloc(&self) -> &Document {
        &self.parent.state.alloc
    }

    /// Block environment: the pending header intent plus what the tool needs
    /// to know about the parent.
    pub fn env(&self) -> Document {
        let header = &self.pending.header;
        let parent = &self.parent.header;

        let mut env = Map::new();
        env.insert("currentCoinbase".into(), hex_bytes(header.author.as_slice()));
        env.insert("currentDifficulty".into(), hex_value(&header.difficulty));
        env.insert("currentGasLimit".into(), hex_value(&header.gas_limit));
        env.insert("currentNumber".into(), hex_value(&header.number));
        env.insert("currentTimestamp".into(), hex_value(&header.timestamp));
        env.insert("previousHash".into(), hex_bytes(header.parent_hash.as_slice()));
        env.insert("parentDifficulty".into(), hex_value(&parent.difficulty));
        env.insert("parentTimestamp".into(), hex_value(&parent.timestamp));
        env.insert("parentUncleHash".into(), hex_bytes(parent.sha3_uncles.as_slice()));
        env.insert("blockHashes".into(), self.block_hashes());
        Value::Object(env)
    }

    /// Hashes of the known ancestors keyed by decimal block number, for BLOCKHASH.
    pub fn block_hashes(&self) -> Document {
        let hashes = self
            .history
            .iter()
            .map(|block| {
                (
                    block.number().to_string(),
                    hex_bytes(block.hash().as_slice()),
                )
            })
            .collect::<Map<_, _>>();
        Value::Object(hashes)
    }

    pub fn transactions(&self) -> Document {
        Value::Array(
            self.pending
                .transactions
                .iter()
                .map(|tx| tx.document().clone())
                .collect(),
        )
    }

    /// Reward settled on the coinbase, `None` for [`SealEngine::NoReward`].
    pub fn reward(&self) -> Option<U256> {
        self.fork.reward_for(self.seal_engine)
    }
}

fn hex_value(value: &U256) -> Value {
    Value::String(value_to_hex(value))
}

fn hex_bytes(bytes: &[u8]) -> Value {
    Value::String(bytes_to_hex(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use containers::{BlockHeader, Transaction, EMPTY_UNCLES_HASH};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn genesis() -> Block {
        let header = BlockHeader {
            difficulty: U256::from(0x020000),
            gas_limit: U256::from(0x2fefd8),
            sha3_uncles: EMPTY_UNCLES_HASH,
            timestamp: U256::from(1000),
            ..Default::default()
        }
        .with_recomputed_hash();
        Block::genesis(header, json!({ "0x1000000000000000000000000000000000000000": { "balance": "0x01" } }))
    }

    #[test]
    fn env_carries_intent_and_parent_fields() {
        let genesis = genesis();
        let history = vec![genesis.clone()];
        let pending = PendingBlock::on_top_of(&genesis)
            .with_transactions(vec![Transaction(json!({ "nonce": "0x00" }))]);
        let fork = Fork::new("Istanbul", U256::from(2_000_000_000_000_000_000u128));

        let request =
            TransitionRequest::new(&history, &genesis, &pending, &fork, SealEngine::NoReward);
        let env = request.env();

        assert_eq!(env["currentNumber"], json!("0x01"));
        assert_eq!(env["currentTimestamp"], json!("0x03e9"));
        assert_eq!(env["currentGasLimit"], json!("0x2fefd8"));
        assert_eq!(env["parentDifficulty"], json!("0x020000"));
        assert_eq!(env["parentTimestamp"], json!("0x03e8"));
        assert_eq!(env["previousHash"], json!(bytes_to_hex(genesis.hash().as_slice())));
        assert_eq!(
            env["blockHashes"],
            json!({ "0": bytes_to_hex(genesis.hash().as_slice()) })
        );
        assert_eq!(request.transactions(), json!([{ "nonce": "0x00" }]));
        assert_eq!(request.alloc(), &genesis.state.alloc);
        assert_eq!(request.reward(), None);
    }
}
