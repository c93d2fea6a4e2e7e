//! JSON-RPC envelope and the standard protocol checks.

pub mod checks;
pub mod error;
pub mod request;

pub use checks::{check_id_and_version, require_result_type, run_checks};
pub use error::RpcError;
pub use request::{RpcRequest, RpcSession};

pub const VERSION: &str = "2.0";
