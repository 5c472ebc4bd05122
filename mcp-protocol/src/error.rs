use serde_json::Value;

/// Standard JSON-RPC error codes, plus the two MCP extensions.
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const CONNECTION_CLOSED: i64 = -32000;
pub const REQUEST_TIMEOUT: i64 = -32001;

/// The protocol-level error taxonomy. Every variant carries the JSON-RPC
/// code it maps to so a caught `McpError` can be re-serialized into an
/// error response without a second translation step.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("parse error: {message}")]
    ParseError { message: String, data: Option<Value> },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String, data: Option<Value> },

    #[error("method not found: {method}")]
    MethodNotFound { method: String },

    #[error("invalid params: {message}")]
    InvalidParams { message: String, data: Option<Value> },

    #[error("internal error: {message}")]
    InternalError { message: String, data: Option<Value> },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("request timed out")]
    RequestTimeout,

    #[error("peer is not connected to a transport")]
    NotConnected,

    #[error("decoded result did not match the expected type for this request")]
    ResultTypeMismatch,

    #[error("{0}")]
    CapabilityMissing(String),

    #[error("a handler is already registered for method {method}")]
    HandlerAlreadyRegistered { method: String },

    #[error("transport error: {0}")]
    Transport(#[from] mcp_transport::TransportError),

    #[error("received a response for an id with no matching in-flight request: {id}")]
    UnsolicitedResponse { id: i64 },
}

impl McpError {
    pub fn code(&self) -> i64 {
        match self {
            McpError::ParseError { .. } => PARSE_ERROR,
            McpError::InvalidRequest { .. } => INVALID_REQUEST,
            McpError::MethodNotFound { .. } => METHOD_NOT_FOUND,
            McpError::InvalidParams { .. } => INVALID_PARAMS,
            McpError::InternalError { .. } => INTERNAL_ERROR,
            McpError::ConnectionClosed => CONNECTION_CLOSED,
            McpError::RequestTimeout => REQUEST_TIMEOUT,
            McpError::CapabilityMissing(_) => INVALID_REQUEST,
            McpError::HandlerAlreadyRegistered { .. } => INVALID_REQUEST,
            McpError::NotConnected
            | McpError::ResultTypeMismatch
            | McpError::Transport(_)
            | McpError::UnsolicitedResponse { .. } => INTERNAL_ERROR,
        }
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        McpError::MethodNotFound { method: method.into() }
    }

    pub fn data(&self) -> Option<Value> {
        match self {
            McpError::ParseError { data, .. }
            | McpError::InvalidRequest { data, .. }
            | McpError::InvalidParams { data, .. }
            | McpError::InternalError { data, .. } => data.clone(),
            _ => None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        McpError::InternalError {
            message: message.into(),
            data: None,
        }
    }

    /// Builds the error out of a raw JSON-RPC error object received from the
    /// remote (used when delivering an `ErrorResponse` to a waiting caller).
    ///
    /// `message` is human-readable prose (spec §8 S2: literally `"method not
    /// found"`), not a method name, so a `-32601` never binds it straight to
    /// `MethodNotFound.method`. The method instead travels in `data.method`
    /// (how this crate's own peers emit it, see `Peer::dispatch_request`);
    /// a peer that omits `data` but still suffixes the method onto `message`
    /// the conventional way is tolerated by stripping that prefix.
    pub fn from_wire(code: i64, message: String, data: Option<Value>) -> Self {
        match code {
            PARSE_ERROR => McpError::ParseError { message, data },
            INVALID_REQUEST => McpError::InvalidRequest { message, data },
            METHOD_NOT_FOUND => {
                let method = data
                    .as_ref()
                    .and_then(|d| d.get("method"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        message
                            .strip_prefix("method not found: ")
                            .map(str::to_string)
                            .unwrap_or(message)
                    });
                McpError::MethodNotFound { method }
            }
            INVALID_PARAMS => McpError::InvalidParams { message, data },
            CONNECTION_CLOSED => McpError::ConnectionClosed,
            REQUEST_TIMEOUT => McpError::RequestTimeout,
            _ => McpError::InternalError { message, data },
        }
    }
}
