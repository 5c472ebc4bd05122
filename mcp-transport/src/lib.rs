//! Framed, newline-delimited JSON-RPC transports.
//!
//! This crate is deliberately ignorant of request/response correlation and
//! capability negotiation: it only knows how to turn a duplex byte stream
//! into a channel of [`TransportEvent`]s and back. That correlation lives
//! one layer up, in `mcp-protocol`'s `Protocol` engine, which owns a
//! `Box<dyn Transport>` and drives it.

mod duplex;
mod error;
mod framing;
mod read_buffer;
mod stdio_client;
mod stdio_server;
mod transport;

pub use duplex::DuplexTransport;
pub use error::TransportError;
pub use read_buffer::ReadBuffer;
pub use stdio_client::DEFAULT_INHERITED_ENV_VARS;
pub use stdio_client::Stderr;
pub use stdio_client::StdioClientTransport;
pub use stdio_client::StdioServerParameters;
pub use stdio_client::default_inherited_env;
pub use stdio_server::StdioServerTransport;
pub use transport::Transport;
pub use transport::TransportEvent;
