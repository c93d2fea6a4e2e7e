#![allow(dead_code)]

use alloy_primitives::U256;
use containers::{Block, BlockHeader, Document, Fork, EMPTY_TRIE_ROOT, EMPTY_UNCLES_HASH};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use transition::T8nTool;

pub const POST_STATE_ROOT: &str =
    "0x7d883d38bc7a640dd66e5cda78cd01b52a7dc40e61f7c2ddbab7cb3ae3b8b9f2";

// Collects the interesting t8n arguments into shell variables.
const ARGUMENT_PARSER: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --input.alloc) alloc="$2"; shift ;;
    --input.env) env="$2"; shift ;;
    --input.txs) txs="$2"; shift ;;
    --output.basedir) dir="$2"; shift ;;
    --state.fork) fork="$2"; shift ;;
    --state.reward) reward="$2"; shift ;;
  esac
  shift
done
"#;

/// A shell script standing in for `evm t8n`, run through `/bin/sh` so the
/// script file itself never has to be executable.
pub struct ScriptedTool {
    _dir: TempDir,
    pub script: PathBuf,
}

impl ScriptedTool {
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("t8n.sh");
        fs::write(&script, format!("{ARGUMENT_PARSER}\n{body}\n")).unwrap();
        Self { _dir: dir, script }
    }

    /// Writes `result` and copies the pre-state to the post-state.
    pub fn answering(result: &Value) -> Self {
        Self::answering_then(result, "")
    }

    /// Like [`ScriptedTool::answering`], running `epilogue` afterwards.
    pub fn answering_then(result: &Value, epilogue: &str) -> Self {
        Self::new(&format!(
            r#"echo "fork=$fork reward=$reward" >&2
cat "$env"
cat > "$dir/result.json" <<'RESULT'
{result}
RESULT
cp "$alloc" "$dir/post_alloc.json"
{epilogue}"#
        ))
    }

    pub fn tool(&self) -> T8nTool {
        T8nTool::new("/bin/sh").with_args([self.script.display().to_string()])
    }
}

pub fn result_document() -> Value {
    json!({
        "stateRoot": POST_STATE_ROOT,
        "txRoot": EMPTY_TRIE_ROOT.to_string(),
        "receiptsRoot": EMPTY_TRIE_ROOT.to_string(),
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "gasUsed": "0x0",
        "currentDifficulty": "0x020000",
        "receipts": [],
    })
}

pub fn alloc() -> Document {
    json!({
        "0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b": {
            "balance": "0x0de0b6b3a7640000",
            "code": "0x",
            "nonce": "0x00",
            "storage": {}
        }
    })
}

pub fn genesis() -> Block {
    let header = BlockHeader {
        difficulty: U256::from(0x020000),
        gas_limit: U256::from(0x2fefd8),
        sha3_uncles: EMPTY_UNCLES_HASH,
        transactions_root: EMPTY_TRIE_ROOT,
        receipts_root: EMPTY_TRIE_ROOT,
        timestamp: U256::from(1000),
        ..Default::default()
    }
    .with_recomputed_hash();
    Block::genesis(header, alloc())
}

pub fn istanbul() -> Fork {
    Fork::new("Istanbul", U256::from(2_000_000_000_000_000_000u128))
}
