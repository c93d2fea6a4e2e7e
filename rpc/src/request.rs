use crate::error::RpcError;
use crate::VERSION;
use containers::document::from_json_str;
use containers::Document;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Something that can carry a raw JSON-RPC request to a client and bring
/// the raw reply back. Sockets and process management live behind it.
pub trait RpcSession {
    fn send_raw_request(&self, request: &str) -> Result<String, RpcError>;
}

/// `{"jsonrpc":"2.0","method":..,"params":[..],"id":..}`
#[derive(Clone, Debug, PartialEq)]
pub struct RpcRequest {
    jsonrpc: &'static str,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, id: u64) -> Self {
        Self {
            jsonrpc: VERSION,
            method: method.into(),
            params: Vec::new(),
            id,
        }
    }

    pub fn with_param(mut self, param: impl Into<Value>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn to_document(&self) -> Document {
        serde_json::json!({
            "jsonrpc": self.jsonrpc,
            "method": self.method,
            "params": self.params,
            "id": self.id,
        })
    }

    /// Send the request and parse the reply into a document.
    pub fn send(&self, session: &dyn RpcSession) -> Result<Document, RpcError> {
        let raw = self.to_string();
        debug!(method = %self.method, id = self.id, "Sending rpc request");
        let reply = session.send_raw_request(&raw)?;
        debug!(method = %self.method, reply = %reply, "Received rpc reply");
        Ok(from_json_str(&reply)?)
    }
}

impl fmt::Display for RpcRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_document())
    }
}
