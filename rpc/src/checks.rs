//! Protocol checks every JSON-RPC client is expected to answer.

use crate::error::RpcError;
use crate::request::{RpcRequest, RpcSession};
use crate::VERSION;
use alloy_primitives::keccak256;
use containers::document::require_fields;
use containers::types::bytes_to_hex;
use containers::{DataType, Document, FieldSpec};
use serde_json::Value;
use tracing::{info, warn};

const HELLO_WORLD: &[u8] = b"hello world";

/// Check that a reply echoes the request id and the protocol version.
pub fn check_id_and_version(reply: &Document, id: u64) -> Result<(), RpcError> {
    let found_id = reply.get("id").cloned().unwrap_or(Value::Null);
    if found_id.as_u64() != Some(id) {
        return Err(RpcError::IdMismatch {
            expected: id,
            found: found_id,
        });
    }
    let version = reply.get("jsonrpc").cloned().unwrap_or(Value::Null);
    if version.as_str() != Some(VERSION) {
        return Err(RpcError::VersionMismatch { found: version });
    }
    Ok(())
}

/// Check that a reply holds exactly `id`, `jsonrpc` and a `result` of type
/// `result`.
pub fn require_result_type(
    reply: &Document,
    method: &str,
    result: DataType,
) -> Result<(), RpcError> {
    let fields = [
        FieldSpec::required("id", &[DataType::Integer]),
        FieldSpec::required("jsonrpc", &[DataType::String]),
        FieldSpec::required("result", single(result)),
    ];
    require_fields(reply, method, &fields)?;
    Ok(())
}

fn single(data_type: DataType) -> &'static [DataType] {
    match data_type {
        DataType::Null => &[DataType::Null],
        DataType::Bool => &[DataType::Bool],
        DataType::Integer => &[DataType::Integer],
        DataType::String => &[DataType::String],
        DataType::Array => &[DataType::Array],
        DataType::Object => &[DataType::Object],
    }
}

fn call(
    session: &dyn RpcSession,
    request: &RpcRequest,
    result: DataType,
) -> Result<Value, RpcError> {
    let reply = request.send(session)?;
    require_result_type(&reply, &request.method, result)?;
    check_id_and_version(&reply, request.id)?;
    Ok(reply["result"].clone())
}

fn expect(method: &str, expected: Value, found: Value) -> Result<(), RpcError> {
    if expected != found {
        return Err(RpcError::UnexpectedResult {
            method: method.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

/// `web3_clientVersion`: any string. Returns it.
pub fn web3_client_version(session: &dyn RpcSession) -> Result<String, RpcError> {
    let request = RpcRequest::new("web3_clientVersion", 67);
    let result = call(session, &request, DataType::String)?;
    Ok(result.as_str().unwrap_or_default().to_string())
}

/// `web3_sha3` of "hello world" must match the local keccak.
pub fn web3_sha3(session: &dyn RpcSession) -> Result<(), RpcError> {
    let request = RpcRequest::new("web3_sha3", 64).with_param(bytes_to_hex(HELLO_WORLD));
    let result = call(session, &request, DataType::String)?;
    let expected = bytes_to_hex(keccak256(HELLO_WORLD).as_slice());
    expect(&request.method, Value::String(expected), result)
}

/// `net_version` must be mainnet, `"1"`.
pub fn net_version(session: &dyn RpcSession) -> Result<(), RpcError> {
    let request = RpcRequest::new("net_version", 67);
    let result = call(session, &request, DataType::String)?;
    expect(&request.method, Value::from("1"), result)
}

/// `net_listening` must be `false`: a client under test has no peers.
pub fn net_listening(session: &dyn RpcSession) -> Result<(), RpcError> {
    let request = RpcRequest::new("net_listening", 67);
    let result = call(session, &request, DataType::Bool)?;
    expect(&request.method, Value::Bool(false), result)
}

/// Run every check, returning each one's outcome by method name.
pub fn run_checks(session: &dyn RpcSession) -> Vec<(&'static str, Result<(), RpcError>)> {
    let outcomes = vec![
        ("web3_clientVersion", web3_client_version(session).map(|version| {
            info!(%version, "Client version");
        })),
        ("web3_sha3", web3_sha3(session)),
        ("net_version", net_version(session)),
        ("net_listening", net_listening(session)),
    ];
    for (method, outcome) in &outcomes {
        if let Err(error) = outcome {
            warn!(method = *method, %error, "RPC check failed");
        }
    }
    outcomes
}
