//! JSON-RPC 2.0 framing for the MCP stdio server.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ForgeError;

/// Incoming JSON-RPC request or notification.
#[derive(Debug, Deserialize)]
pub struct Request {
    #[allow(dead_code)]
    #[serde(default)]
    pub jsonrpc: String,
    /// Absent for notifications. An explicit `null` id is still a request.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn present_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Request {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message,
                data: None,
            }),
        }
    }

    pub fn from_error(id: Value, err: ForgeError) -> Self {
        let (code, message) = err.into_rpc();
        Self::error(id, code, message)
    }
}

/// MCP tool result carrying one text block.
pub fn tool_text(text: impl Into<String>, is_error: bool) -> Value {
    let mut result = serde_json::json!({
        "content": [{ "type": "text", "text": text.into() }]
    });
    if is_error {
        result["isError"] = Value::Bool(true);
    }
    result
}
