pub mod block;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod header;
pub mod transaction;
pub mod types;

pub use block::{Block, PendingBlock, WorldState};
pub use config::{Fork, SealEngine};
pub use diagnostics::RateLimitedWarning;
pub use document::{DataType, Document, FieldSpec};
pub use error::{ConsistencyError, SchemaError};
pub use header::{BlockHeader, FieldMismatch, HeaderCodec, EMPTY_TRIE_ROOT, EMPTY_UNCLES_HASH};
pub use transaction::{RejectedTransaction, Transaction, TransactionReceipt};
pub use types::{Address, Bloom, Bytes, Hash32, Nonce, B256};
pub use alloy_primitives::U256;
