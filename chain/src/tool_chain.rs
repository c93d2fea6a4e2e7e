use crate::error::ChainError;
use alloy_primitives::U256;
use containers::{Block, Fork, Hash32, PendingBlock, SealEngine};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use transition::{TransitionRequest, TransitionTool};

/// A chain of blocks whose execution is delegated to a transition tool.
///
/// The chain is never empty: it starts at its genesis block and a rewind
/// can go back to it but not past it. Mining and rewinding either succeed
/// completely or leave the chain as it was.
pub struct ToolChain {
    blocks: Vec<Block>,
    fork: Fork,
    seal_engine: SealEngine,
    tool: Box<dyn TransitionTool>,
}

impl ToolChain {
    pub fn new(
        genesis: Block,
        fork: Fork,
        seal_engine: SealEngine,
        tool: impl TransitionTool + 'static,
    ) -> Self {
        info!(
            genesis = %genesis.hash(),
            fork = %fork,
            seal_engine = %seal_engine,
            "Chain created"
        );
        Self {
            blocks: vec![genesis],
            fork,
            seal_engine,
            tool: Box::new(tool),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn genesis(&self) -> &Block {
        assert!(!self.blocks.is_empty(), "chain lost its genesis block");
        &self.blocks[0]
    }

    pub fn last_block(&self) -> &Block {
        assert!(!self.blocks.is_empty(), "chain lost its genesis block");
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn fork(&self) -> &Fork {
        &self.fork
    }

    pub fn seal_engine(&self) -> SealEngine {
        self.seal_engine
    }

    pub fn block_hashes(&self) -> BTreeMap<U256, Hash32> {
        self.blocks
            .iter()
            .map(|block| (block.number(), block.hash()))
            .collect()
    }

    /// Mine `pending` on top of the last block with the chain's seal engine.
    pub fn mine_block(&mut self, pending: &PendingBlock) -> Result<&Block, ChainError> {
        self.mine_block_with(pending, self.seal_engine)
    }

    /// Mine `pending` with a seal engine other than the chain's default.
    ///
    /// The tool is authoritative for every execution-derived header field.
    /// When it also reports a block hash, that hash must match the one
    /// computed from the confirmed header.
    pub fn mine_block_with(
        &mut self,
        pending: &PendingBlock,
        seal_engine: SealEngine,
    ) -> Result<&Block, ChainError> {
        let parent = self.last_block();
        let request =
            TransitionRequest::new(&self.blocks, parent, pending, &self.fork, seal_engine);

        let response = self.tool.apply(&request).map_err(|error| {
            warn!(
                parent = %parent.hash(),
                number = %pending.header.number,
                error = %error,
                "Transition tool failed"
            );
            ChainError::from(error)
        })?;

        let header = response.confirmed_header(&pending.header);
        if let Err(error) = header.verify_hash() {
            debug!(output = %response.debug, "Transition tool output");
            return Err(error.into());
        }
        let transactions = response.accepted_transactions(&pending.transactions)?;

        for rejected in &response.rejected {
            info!(index = rejected.index, error = %rejected.error, "Transaction rejected");
        }

        let block = Block {
            header,
            transactions,
            state: response.post_state,
        };
        info!(
            number = %block.number(),
            hash = %block.hash(),
            state_root = %block.state.root,
            transactions = block.transactions.len(),
            "Block mined"
        );
        self.blocks.push(block);
        Ok(self.last_block())
    }

    /// Drop every block after `number`, making it the last block.
    pub fn rewind_to_block(&mut self, number: usize) -> Result<(), ChainError> {
        if number >= self.blocks.len() {
            return Err(ChainError::Range {
                requested: number,
                len: self.blocks.len(),
            });
        }
        let dropped = self.blocks.len() - number - 1;
        self.blocks.truncate(number + 1);
        info!(number, dropped, head = %self.last_block().hash(), "Chain rewound");
        Ok(())
    }
}
