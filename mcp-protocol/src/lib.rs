//! The peer engine shared by both sides of an MCP connection.
//!
//! `mcp-types` owns the wire shapes and `mcp-transport` owns framing; this
//! crate is where they meet a correlation table, a handler table, and
//! capability enforcement to become a usable request/response/notification
//! API. [`Peer`] is generic over [`RoleValidators`] so the engine itself is
//! written once; `mcp-client` and `mcp-server` each supply a thin driver
//! that picks a role and exposes the methods that make sense for it.

mod error;
mod handler;
mod inflight;
mod lifecycle;
mod peer;
mod role;
mod sync;

pub use error::CONNECTION_CLOSED;
pub use error::INTERNAL_ERROR;
pub use error::INVALID_PARAMS;
pub use error::INVALID_REQUEST;
pub use error::METHOD_NOT_FOUND;
pub use error::McpError;
pub use error::PARSE_ERROR;
pub use error::REQUEST_TIMEOUT;
pub use handler::HandlerTable;
pub use handler::RawNotificationHandler;
pub use handler::RawRequestHandler;
pub use handler::TypedNotificationHandler;
pub use handler::TypedRequestHandler;
pub use inflight::Delivery;
pub use inflight::InFlightTable;
pub use lifecycle::LifecycleSignal;
pub use peer::Peer;
pub use peer::PeerOptions;
pub use peer::PeerState;
pub use role::ClientRole;
pub use role::RoleValidators;
pub use role::ServerRole;
pub use sync::LockExt;
pub use sync::RwLockExt;
