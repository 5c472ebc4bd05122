use std::io;

/// Errors surfaced by a [`crate::Transport`] implementation.
///
/// This is a framing-layer error type, distinct from `mcp-protocol`'s
/// `McpError` taxonomy. The protocol engine wraps these into MCP error codes
/// at the peer boundary (decode failures become ParseError, send failures
/// are returned to the caller that issued them).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport already started")]
    AlreadyStarted,

    #[error("transport not started")]
    NotStarted,

    #[error("failed to spawn subprocess: {0}")]
    Spawn(#[source] io::Error),

    #[error("subprocess did not expose {0}")]
    MissingStdio(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to decode line as a JSON-RPC message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("transport is closed")]
    Closed,
}
