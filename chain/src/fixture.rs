//! Runner for a single blockchain-test fixture.
//!
//! The fixture's genesis and pre-state seed a [`ToolChain`]; every block
//! header in the fixture is used as mining intent, and the mined header
//! must equal the expected one key for key.

use crate::error::ChainError;
use crate::tool_chain::ToolChain;
use anyhow::{bail, Context, Result};
use containers::{
    Block, BlockHeader, Document, FieldMismatch, Hash32, HeaderCodec, PendingBlock, SealEngine,
    Transaction,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use transition::TransitionTool;

/// A fixture file: test name to test body.
#[derive(Debug, Deserialize)]
pub struct FixtureFile {
    #[serde(flatten)]
    pub tests: BTreeMap<String, BlockchainFixture>,
}

impl FixtureFile {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read fixture {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("cannot parse fixture {}", path.display()))
    }

    /// The only test in the file.
    pub fn single(self) -> Result<(String, BlockchainFixture)> {
        let mut tests = self.tests.into_iter();
        let Some(test) = tests.next() else {
            bail!("fixture file holds no test");
        };
        if tests.next().is_some() {
            bail!("fixture file holds more than one test");
        }
        Ok(test)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainFixture {
    pub genesis_block_header: Document,
    pub pre: Document,
    #[serde(default)]
    pub blocks: Vec<FixtureBlock>,
    pub network: String,
    #[serde(default)]
    pub seal_engine: Option<SealEngine>,
    #[serde(rename = "lastblockhash", default)]
    pub last_block_hash: Option<Hash32>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureBlock {
    /// Absent for blocks that are meant to be rejected.
    #[serde(default)]
    pub block_header: Option<Document>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// A mined header that differs from the fixture's.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockMismatch {
    /// Position of the block in the fixture's block list.
    pub index: usize,
    pub mismatches: Vec<FieldMismatch>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixtureReport {
    pub name: String,
    pub blocks_mined: usize,
    pub blocks_skipped: usize,
    pub mismatches: Vec<BlockMismatch>,
    /// Expected and actual head hash, when they differ.
    pub last_block_hash: Option<(Hash32, Hash32)>,
}

impl FixtureReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty() && self.last_block_hash.is_none()
    }
}

impl BlockchainFixture {
    pub fn genesis(&self, codec: &HeaderCodec) -> Result<Block, ChainError> {
        let header = codec.parse(&self.genesis_block_header)?;
        Ok(Block::genesis(header, self.pre.clone()))
    }

    /// Seal engine from the fixture, `default` when it names none.
    pub fn seal_engine_or(&self, default: SealEngine) -> SealEngine {
        self.seal_engine.unwrap_or(default)
    }

    /// Mine every block of the fixture on `chain` and compare the results.
    ///
    /// Tool failures and inconsistent tool answers abort the run; header
    /// mismatches are collected in the report.
    pub fn run(
        &self,
        name: &str,
        codec: &HeaderCodec,
        chain: &mut ToolChain,
    ) -> Result<FixtureReport, ChainError> {
        let mut report = FixtureReport {
            name: name.to_string(),
            ..Default::default()
        };

        for (index, block) in self.blocks.iter().enumerate() {
            let Some(document) = &block.block_header else {
                info!(test = name, index, "Skipping block without header");
                report.blocks_skipped += 1;
                continue;
            };
            let expected = codec.parse(document)?;
            let pending = PendingBlock::new(intent(&expected), block.transactions.clone());

            let mined = chain.mine_block(&pending)?;
            report.blocks_mined += 1;

            if mined.header != expected {
                let mismatches = expected.diff(&mined.header);
                for mismatch in &mismatches {
                    warn!(test = name, index, %mismatch, "Header mismatch");
                }
                report.mismatches.push(BlockMismatch { index, mismatches });
            }
        }

        if let Some(expected) = self.last_block_hash {
            let actual = chain.last_block().hash();
            if actual != expected {
                warn!(test = name, %expected, %actual, "Last block hash mismatch");
                report.last_block_hash = Some((expected, actual));
            }
        }

        info!(
            test = name,
            mined = report.blocks_mined,
            skipped = report.blocks_skipped,
            passed = report.passed(),
            "Fixture finished"
        );
        Ok(report)
    }
}

/// Build a chain for `fixture` and run it.
pub fn run_fixture(
    name: &str,
    fixture: &BlockchainFixture,
    fork: containers::Fork,
    default_seal_engine: SealEngine,
    tool: impl TransitionTool + 'static,
) -> Result<FixtureReport, ChainError> {
    let codec = HeaderCodec::new();
    let genesis = fixture.genesis(&codec)?;
    let seal_engine = fixture.seal_engine_or(default_seal_engine);
    let mut chain = ToolChain::new(genesis, fork, seal_engine, tool);
    fixture.run(name, &codec, &mut chain)
}

// The caller-controlled part of an expected header. Everything else is
// left for the tool to compute.
fn intent(expected: &BlockHeader) -> BlockHeader {
    BlockHeader {
        author: expected.author,
        difficulty: expected.difficulty,
        extra_data: expected.extra_data.clone(),
        gas_limit: expected.gas_limit,
        mix_hash: expected.mix_hash,
        nonce: expected.nonce,
        number: expected.number,
        parent_hash: expected.parent_hash,
        sha3_uncles: expected.sha3_uncles,
        timestamp: expected.timestamp,
        ..Default::default()
    }
}
