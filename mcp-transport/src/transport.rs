use async_trait::async_trait;
use mcp_types::JSONRPCMessage;
use tokio::sync::mpsc;

use crate::error::TransportError;

/// One event surfaced from the transport's background reader.
///
/// The source SDK exposes these as three independent callback setters
/// (`onReceiveMessage`/`onClose`/`onError`). A channel of events is the
/// idiomatic async-Rust shape for the same contract: the peer owns the
/// receiving end and a single task drains it in order, so message delivery,
/// decode errors, and closure are all serialized relative to one another.
#[derive(Debug)]
pub enum TransportEvent {
    Message(JSONRPCMessage),
    /// A line failed to decode. Per the framing contract this does not tear
    /// down the transport; the reader keeps going.
    DecodeError(TransportError),
    Closed,
}

/// A duplex, newline-delimited JSON-RPC byte stream.
///
/// Implementations own their transport handle exclusively; callers never
/// hold a reference to the peer, avoiding the cyclic ownership the source
/// is prone to (transport -> peer -> transport).
#[async_trait]
pub trait Transport: Send {
    /// Begins reading in the background and returns the channel on which
    /// [`TransportEvent`]s will arrive. Must not be called twice.
    ///
    /// Implementations must not return until the reader loop is actually
    /// live, so that a handshake initiated immediately after `start()`
    /// returns cannot race the first inbound line.
    async fn start(&mut self) -> Result<mpsc::Receiver<TransportEvent>, TransportError>;

    /// Encodes `message`, appends a single `\n`, and writes it atomically.
    async fn send_message(&mut self, message: &JSONRPCMessage) -> Result<(), TransportError>;

    /// Idempotent. Terminates the subprocess or closes the streams, flushes
    /// and clears the read buffer.
    async fn close(&mut self) -> Result<(), TransportError>;
}
