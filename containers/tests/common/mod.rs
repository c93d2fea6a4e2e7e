//! Shared header fixtures for the codec tests

use serde_json::{json, Value};

pub const ZERO_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";
pub const EMPTY_TRIE: &str = "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421";
pub const EMPTY_UNCLES: &str = "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347";
pub const STATE_ROOT: &str = "0x7d883d38bc7a640dd66e5cda78cd01b52a7dc40e61f7c2ddbab7cb3ae3b8b9f2";
pub const COINBASE: &str = "0x8888f1f195afa192cfee860698584c030f4c9db1";

/// Hash of [`genesis_document`].
pub const GENESIS_HASH: &str = "0xbf9ef6a4a7e939610c59424103ac8f0b9721998245e3fe5f954d176e50f31d8e";
/// Hash of [`genesis_document`] with `mixHash` and `nonce` zeroed.
pub const GENESIS_ZERO_SEAL_HASH: &str =
    "0x1ba2d30dc78f4a6e17606a767d07d41e5ff0f68cc187b6dbf6016c526cc7df38";
/// Length of the canonical encoding of [`genesis_document`].
pub const GENESIS_RLP_LEN: usize = 504;

pub fn empty_bloom() -> String {
    format!("0x{}", "00".repeat(256))
}

/// Genesis header in canonical key spelling, without a declared hash.
pub fn genesis_document() -> Value {
    json!({
        "author": COINBASE,
        "difficulty": "0x020000",
        "extraData": "0x",
        "gasLimit": "0x2fefd8",
        "gasUsed": "0x00",
        "logsBloom": empty_bloom(),
        "mixHash": ZERO_HASH,
        "nonce": "0x0102030405060708",
        "number": "0x00",
        "parentHash": ZERO_HASH,
        "receiptsRoot": EMPTY_TRIE,
        "sha3Uncles": EMPTY_UNCLES,
        "stateRoot": STATE_ROOT,
        "timestamp": "0x03e8",
        "transactionsRoot": EMPTY_TRIE,
    })
}

/// The same header in legacy key spelling, as blockchain fixtures write it.
pub fn legacy_genesis_document() -> Value {
    json!({
        "coinbase": COINBASE,
        "difficulty": "0x020000",
        "extraData": "0x",
        "gasLimit": "0x2fefd8",
        "gasUsed": "0x00",
        "bloom": empty_bloom(),
        "hash": GENESIS_HASH,
        "mixHash": ZERO_HASH,
        "nonce": "0x0102030405060708",
        "number": "0x00",
        "parentHash": ZERO_HASH,
        "receiptTrie": EMPTY_TRIE,
        "uncleHash": EMPTY_UNCLES,
        "stateRoot": STATE_ROOT,
        "timestamp": "0x03e8",
        "transactionsTrie": EMPTY_TRIE,
    })
}

pub fn without(mut doc: Value, keys: &[&str]) -> Value {
    if let Some(object) = doc.as_object_mut() {
        for key in keys {
            object.remove(*key);
        }
    }
    doc
}

pub fn with(mut doc: Value, key: &str, value: Value) -> Value {
    if let Some(object) = doc.as_object_mut() {
        object.insert(key.to_string(), value);
    }
    doc
}
