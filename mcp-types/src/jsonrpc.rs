//! The JSON-RPC 2.0 envelope shared by every MCP message.
//!
//! `JSONRPCMessage` is the outermost sum type. Its `Deserialize` impl
//! performs the two-pass classification described for the codec: first the
//! envelope fields are inspected to pick a variant, then the variant's own
//! `Deserialize` takes over for the rest.

use serde::Deserialize;
use serde::Serialize;
use serde::de::Error as DeError;
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC request id. Outbound ids generated by this crate are always
/// [`RequestId::Integer`]; [`RequestId::String`] exists so inbound messages
/// from spec-compliant peers that use string ids still deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Integer(i64),
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Integer(i) => write!(f, "{i}"),
            RequestId::String(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCErrorError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCError {
    pub jsonrpc: String,
    pub id: RequestId,
    pub error: JSONRPCErrorError,
}

/// The four-variant sum described by the message model: every line on the
/// wire decodes to exactly one of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JSONRPCMessage {
    Request(JSONRPCRequest),
    Notification(JSONRPCNotification),
    Response(JSONRPCResponse),
    Error(JSONRPCError),
}

/// Raw envelope used only to classify a message before picking a variant.
/// `result`/`error` are kept as `Value` here; the typed decode happens once
/// the variant is known (see `mcp-protocol`'s codec-driven request path, or
/// the field-probing fallback in [`crate::result_probe`]).
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Option<RequestId>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JSONRPCErrorError>,
}

impl<'de> Deserialize<'de> for JSONRPCMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let envelope = Envelope::deserialize(deserializer)?;
        match (envelope.method, envelope.id, envelope.error, envelope.result) {
            (Some(method), Some(id), _, _) => Ok(JSONRPCMessage::Request(JSONRPCRequest {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id,
                method,
                params: envelope.params,
            })),
            (Some(method), None, _, _) => Ok(JSONRPCMessage::Notification(JSONRPCNotification {
                jsonrpc: JSONRPC_VERSION.to_string(),
                method,
                params: envelope.params,
            })),
            (None, Some(id), Some(error), _) => Ok(JSONRPCMessage::Error(JSONRPCError {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id,
                error,
            })),
            (None, Some(id), None, Some(result)) => Ok(JSONRPCMessage::Response(JSONRPCResponse {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id,
                result,
            })),
            _ => Err(DeError::custom(
                "message is neither a request, notification, response, nor error",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_request() {
        let raw = json!({"jsonrpc":"2.0","id":1,"method":"ping"}).to_string();
        let msg: JSONRPCMessage = serde_json::from_str(&raw).unwrap();
        assert!(matches!(msg, JSONRPCMessage::Request(_)));
    }

    #[test]
    fn classifies_notification() {
        let raw = json!({"jsonrpc":"2.0","method":"notifications/initialized"}).to_string();
        let msg: JSONRPCMessage = serde_json::from_str(&raw).unwrap();
        assert!(matches!(msg, JSONRPCMessage::Notification(_)));
    }

    #[test]
    fn classifies_error() {
        let raw = json!({"jsonrpc":"2.0","id":9,"error":{"code":-32601,"message":"method not found"}})
            .to_string();
        let msg: JSONRPCMessage = serde_json::from_str(&raw).unwrap();
        assert!(matches!(msg, JSONRPCMessage::Error(_)));
    }

    #[test]
    fn classifies_response() {
        let raw = json!({"jsonrpc":"2.0","id":1,"result":{}}).to_string();
        let msg: JSONRPCMessage = serde_json::from_str(&raw).unwrap();
        assert!(matches!(msg, JSONRPCMessage::Response(_)));
    }
}
