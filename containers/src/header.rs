use crate::diagnostics::{RateLimitedWarning, DEFAULT_WARNING_LIMIT};
use crate::document::{
    aliased_str, optional_str, require_fields, required_str, DataType, Document, FieldSpec,
};
use crate::error::{ConsistencyError, SchemaError};
use crate::types::{
    bytes_to_hex, parse_bytes, parse_fixed, parse_value, value_to_hex, Address, Bloom, Bytes,
    Hash32, Nonce,
};
use alloy_primitives::{b256, keccak256, U256};
use alloy_rlp::{BufMut, Encodable, Header};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// keccak256(RLP([])), the uncle hash of a block without uncles.
pub const EMPTY_UNCLES_HASH: Hash32 =
    b256!("1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347");

/// Root of an empty Merkle-Patricia trie.
pub const EMPTY_TRIE_ROOT: Hash32 =
    b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");

const CONTEXT: &str = "BlockHeader";

const STRING: &[DataType] = &[DataType::String];
const ARRAY: &[DataType] = &[DataType::Array];

// Keys a header document may carry. The last four only appear in
// `eth_getBlockBy*` responses and are ignored.
const HEADER_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("bloom", STRING),
    FieldSpec::optional("logsBloom", STRING),
    FieldSpec::optional("coinbase", STRING),
    FieldSpec::optional("author", STRING),
    FieldSpec::optional("miner", STRING),
    FieldSpec::required("difficulty", STRING),
    FieldSpec::required("extraData", STRING),
    FieldSpec::required("gasLimit", STRING),
    FieldSpec::required("gasUsed", STRING),
    FieldSpec::optional("hash", STRING),
    FieldSpec::optional("mixHash", STRING),
    FieldSpec::optional("nonce", STRING),
    FieldSpec::required("number", STRING),
    FieldSpec::required("parentHash", STRING),
    FieldSpec::optional("receiptTrie", STRING),
    FieldSpec::optional("receiptsRoot", STRING),
    FieldSpec::required("stateRoot", STRING),
    FieldSpec::required("timestamp", STRING),
    FieldSpec::optional("transactionsTrie", STRING),
    FieldSpec::optional("transactionsRoot", STRING),
    FieldSpec::optional("sha3Uncles", STRING),
    FieldSpec::optional("uncleHash", STRING),
    FieldSpec::optional("size", STRING),
    FieldSpec::optional("totalDifficulty", STRING),
    FieldSpec::optional("transactions", ARRAY),
    FieldSpec::optional("uncles", ARRAY),
];

/// A pre-merge block header.
///
/// `hash` is the declared hash. It is only brought in line with the content
/// by [`BlockHeader::recompute_hash`]; setting a field never touches it.
#[derive(Clone, Debug, Default)]
pub struct BlockHeader {
    pub author: Address,
    pub difficulty: U256,
    pub extra_data: Bytes,
    pub gas_limit: U256,
    pub gas_used: U256,
    pub hash: Hash32,
    pub logs_bloom: Bloom,
    pub mix_hash: Hash32,
    pub nonce: Nonce,
    pub number: U256,
    pub parent_hash: Hash32,
    pub receipts_root: Hash32,
    pub sha3_uncles: Hash32,
    pub state_root: Hash32,
    pub timestamp: U256,
    pub transactions_root: Hash32,
}

/// One exported key whose value differs between two headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

impl BlockHeader {
    /// Exported key/value pairs. Aliased fields use their legacy spelling.
    fn export_fields(&self) -> [(&'static str, String); 16] {
        [
            ("bloom", bytes_to_hex(self.logs_bloom.as_slice())),
            ("coinbase", bytes_to_hex(self.author.as_slice())),
            ("difficulty", value_to_hex(&self.difficulty)),
            ("extraData", bytes_to_hex(&self.extra_data)),
            ("gasLimit", value_to_hex(&self.gas_limit)),
            ("gasUsed", value_to_hex(&self.gas_used)),
            ("hash", bytes_to_hex(self.hash.as_slice())),
            ("mixHash", bytes_to_hex(self.mix_hash.as_slice())),
            ("nonce", bytes_to_hex(self.nonce.as_slice())),
            ("number", value_to_hex(&self.number)),
            ("parentHash", bytes_to_hex(self.parent_hash.as_slice())),
            ("receiptTrie", bytes_to_hex(self.receipts_root.as_slice())),
            ("stateRoot", bytes_to_hex(self.state_root.as_slice())),
            ("timestamp", value_to_hex(&self.timestamp)),
            ("transactionsTrie", bytes_to_hex(self.transactions_root.as_slice())),
            ("uncleHash", bytes_to_hex(self.sha3_uncles.as_slice())),
        ]
    }

    pub fn to_document(&self) -> Document {
        let fields = self
            .export_fields()
            .into_iter()
            .map(|(key, value)| (key.to_string(), Value::String(value)))
            .collect::<Map<_, _>>();
        Value::Object(fields)
    }

    /// RLP encoding of the 15 content fields, the input of the block hash.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        self.encode(&mut out);
        out
    }

    pub fn compute_hash(&self) -> Hash32 {
        keccak256(self.canonical_bytes())
    }

    pub fn recompute_hash(&mut self) {
        self.hash = self.compute_hash();
    }

    pub fn with_recomputed_hash(mut self) -> Self {
        self.recompute_hash();
        self
    }

    /// Check the declared hash against the content.
    pub fn verify_hash(&self) -> Result<(), ConsistencyError> {
        let computed = self.compute_hash();
        if computed != self.hash {
            return Err(ConsistencyError {
                number: self.number,
                declared: self.hash,
                computed,
            });
        }
        Ok(())
    }

    /// Exported keys whose values differ, `self` being the expectation.
    pub fn diff(&self, actual: &BlockHeader) -> Vec<FieldMismatch> {
        self.export_fields()
            .into_iter()
            .zip(actual.export_fields())
            .filter(|((_, expected), (_, got))| expected != got)
            .map(|((field, expected), (_, got))| FieldMismatch {
                field,
                expected,
                actual: got,
            })
            .collect()
    }

    fn rlp_payload_length(&self) -> usize {
        self.parent_hash.length()
            + self.sha3_uncles.length()
            + self.author.length()
            + self.state_root.length()
            + self.transactions_root.length()
            + self.receipts_root.length()
            + self.logs_bloom.length()
            + self.difficulty.length()
            + self.number.length()
            + self.gas_limit.length()
            + self.gas_used.length()
            + self.timestamp.length()
            + self.extra_data.length()
            + self.mix_hash.length()
            + self.nonce.length()
    }
}

// Field order and widths are the wire format shared with every other
// client; the declared hash is not part of it.
impl Encodable for BlockHeader {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.rlp_payload_length(),
        }
        .encode(out);
        self.parent_hash.encode(out);
        self.sha3_uncles.encode(out);
        self.author.encode(out);
        self.state_root.encode(out);
        self.transactions_root.encode(out);
        self.receipts_root.encode(out);
        self.logs_bloom.encode(out);
        self.difficulty.encode(out);
        self.number.encode(out);
        self.gas_limit.encode(out);
        self.gas_used.encode(out);
        self.timestamp.encode(out);
        self.extra_data.encode(out);
        self.mix_hash.encode(out);
        self.nonce.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.rlp_payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

/// Headers are equal when their exported documents are, declared hash included.
impl PartialEq for BlockHeader {
    fn eq(&self, other: &Self) -> bool {
        self.export_fields() == other.export_fields()
    }
}

impl Eq for BlockHeader {}

impl Serialize for BlockHeader {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// Reads block headers out of documents.
///
/// Owns the throttle for the legacy `mixHash` warning, so one codec per
/// harness (or per chain) bounds how often it is logged.
#[derive(Debug)]
pub struct HeaderCodec {
    missing_mix_hash: RateLimitedWarning,
}

impl Default for HeaderCodec {
    fn default() -> Self {
        Self::with_warning_limit(DEFAULT_WARNING_LIMIT)
    }
}

impl HeaderCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_warning_limit(limit: usize) -> Self {
        Self {
            missing_mix_hash: RateLimitedWarning::new(
                "BlockHeader `mixHash` is not defined. Using default `0x00..00` value!",
                limit,
            ),
        }
    }

    /// Number of parsed headers that lacked `mixHash`.
    pub fn missing_mix_hash_count(&self) -> usize {
        self.missing_mix_hash.occurrences()
    }

    /// Parse a header document.
    ///
    /// Canonical key spellings win over legacy ones. Without `hash` the
    /// header is hashed from its content; without `mixHash` both `mixHash`
    /// and `nonce` are zero.
    pub fn parse(&self, doc: &Document) -> Result<BlockHeader, SchemaError> {
        require_fields(doc, CONTEXT, HEADER_FIELDS)?;

        let (author_key, author) = aliased_str(doc, CONTEXT, &["author", "coinbase", "miner"])?;
        let (bloom_key, bloom) = aliased_str(doc, CONTEXT, &["logsBloom", "bloom"])?;

        let (mix_hash, nonce) = match optional_str(doc, CONTEXT, "mixHash")? {
            Some(mix_hash) => (
                parse_fixed::<32>("mixHash", mix_hash)?,
                parse_fixed::<8>("nonce", required_str(doc, CONTEXT, "nonce")?)?,
            ),
            None => {
                self.missing_mix_hash.emit(CONTEXT);
                (Hash32::ZERO, Nonce::ZERO)
            }
        };

        let declared = optional_str(doc, CONTEXT, "hash")?
            .map(|raw| parse_fixed::<32>("hash", raw))
            .transpose()?;

        let mut header = BlockHeader {
            author: Address::from(parse_fixed::<20>(author_key, author)?),
            difficulty: value_field(doc, "difficulty")?,
            extra_data: parse_bytes("extraData", required_str(doc, CONTEXT, "extraData")?)?,
            gas_limit: value_field(doc, "gasLimit")?,
            gas_used: value_field(doc, "gasUsed")?,
            hash: declared.unwrap_or_default(),
            logs_bloom: Bloom::from(parse_fixed::<256>(bloom_key, bloom)?),
            mix_hash,
            nonce,
            number: value_field(doc, "number")?,
            parent_hash: hash_field(doc, &["parentHash"])?,
            receipts_root: hash_field(doc, &["receiptsRoot", "receiptTrie"])?,
            sha3_uncles: hash_field(doc, &["sha3Uncles", "uncleHash"])?,
            state_root: hash_field(doc, &["stateRoot"])?,
            timestamp: value_field(doc, "timestamp")?,
            transactions_root: hash_field(doc, &["transactionsRoot", "transactionsTrie"])?,
        };

        if declared.is_none() {
            header.recompute_hash();
        }
        Ok(header)
    }
}

fn value_field(doc: &Document, key: &'static str) -> Result<U256, SchemaError> {
    parse_value(key, required_str(doc, CONTEXT, key)?)
}

fn hash_field(doc: &Document, keys: &[&'static str]) -> Result<Hash32, SchemaError> {
    let (key, raw) = aliased_str(doc, CONTEXT, keys)?;
    parse_fixed::<32>(key, raw)
}
