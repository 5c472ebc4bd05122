//! Typed message model for the Model Context Protocol (MCP).
//!
//! This crate owns the wire-format types (§3/§4.2 of the protocol design):
//! the JSON-RPC envelope ([`JSONRPCMessage`] and friends), the per-method
//! typed `Params`/`Result` payloads, and the `TryFrom` conversions that
//! classify an already-decoded [`JSONRPCRequest`]/[`JSONRPCNotification`]
//! into the [`ClientRequest`]/[`ServerRequest`]/[`ClientNotification`]/
//! [`ServerNotification`] sums a role actually receives.
//!
//! It does not know about transports, handler tables, or correlation — see
//! `mcp-transport` and `mcp-protocol` for those.

mod capabilities;
mod completion;
mod content;
mod implementation;
mod jsonrpc;
mod logging;
pub mod method;
mod notifications;
mod progress;
mod prompt;
mod requests;
mod resource;
pub mod result_probe;
mod results;
mod root;
mod sampling;
mod tool;

pub use capabilities::ClientCapabilities;
pub use capabilities::ClientCapabilitiesRoots;
pub use capabilities::ServerCapabilities;
pub use capabilities::ServerCapabilitiesPrompts;
pub use capabilities::ServerCapabilitiesResources;
pub use capabilities::ServerCapabilitiesTools;
pub use capabilities::merge_client_capabilities;
pub use capabilities::merge_server_capabilities;
pub use completion::CompleteRequestArgument;
pub use completion::Completion;
pub use completion::Reference;
pub use content::AudioContent;
pub use content::BlobResourceContents;
pub use content::ContentBlock;
pub use content::EmbeddedResource;
pub use content::ImageContent;
pub use content::ResourceContents;
pub use content::TextContent;
pub use content::TextResourceContents;
pub use implementation::Implementation;
pub use jsonrpc::JSONRPC_VERSION;
pub use jsonrpc::JSONRPCError;
pub use jsonrpc::JSONRPCErrorError;
pub use jsonrpc::JSONRPCMessage;
pub use jsonrpc::JSONRPCNotification;
pub use jsonrpc::JSONRPCRequest;
pub use jsonrpc::JSONRPCResponse;
pub use jsonrpc::RequestId;
pub use logging::LoggingLevel;
pub use notifications::CancelledNotification;
pub use notifications::CancelledNotificationParams;
pub use notifications::ClientNotification;
pub use notifications::InitializedNotification;
pub use notifications::LoggingMessageNotification;
pub use notifications::LoggingMessageNotificationParams;
pub use notifications::ModelContextProtocolNotification;
pub use notifications::ProgressNotification;
pub use notifications::ProgressNotificationParams;
pub use notifications::PromptListChangedNotification;
pub use notifications::ResourceListChangedNotification;
pub use notifications::ResourceUpdatedNotification;
pub use notifications::ResourceUpdatedNotificationParams;
pub use notifications::RootsListChangedNotification;
pub use notifications::ServerNotification;
pub use notifications::ToolListChangedNotification;
pub use progress::ProgressToken;
pub use prompt::Prompt;
pub use prompt::PromptArgument;
pub use prompt::PromptMessage;
pub use prompt::Role;
pub use requests::CallToolRequest;
pub use requests::CallToolRequestParams;
pub use requests::ClientRequest;
pub use requests::CompleteRequest;
pub use requests::CompleteRequestParams;
pub use requests::CreateMessageRequest;
pub use requests::CreateMessageRequestParams;
pub use requests::GetPromptRequest;
pub use requests::GetPromptRequestParams;
pub use requests::InitializeRequest;
pub use requests::InitializeRequestParams;
pub use requests::ListPromptsRequest;
pub use requests::ListPromptsRequestParams;
pub use requests::ListResourceTemplatesRequest;
pub use requests::ListResourceTemplatesRequestParams;
pub use requests::ListResourcesRequest;
pub use requests::ListResourcesRequestParams;
pub use requests::ListRootsRequest;
pub use requests::ListToolsRequest;
pub use requests::ListToolsRequestParams;
pub use requests::ModelContextProtocolRequest;
pub use requests::PingRequest;
pub use requests::ReadResourceRequest;
pub use requests::ReadResourceRequestParams;
pub use requests::ServerRequest;
pub use requests::SetLevelRequest;
pub use requests::SetLevelRequestParams;
pub use requests::SubscribeRequest;
pub use requests::SubscribeRequestParams;
pub use requests::UnknownMethodError;
pub use requests::UnsubscribeRequest;
pub use requests::UnsubscribeRequestParams;
pub use resource::Resource;
pub use resource::ResourceTemplate;
pub use results::CallToolResult;
pub use results::CompleteResult;
pub use results::CreateMessageResult;
pub use results::EmptyResult;
pub use results::GetPromptResult;
pub use results::InitializeResult;
pub use results::ListPromptsResult;
pub use results::ListResourceTemplatesResult;
pub use results::ListResourcesResult;
pub use results::ListRootsResult;
pub use results::ListToolsResult;
pub use results::ReadResourceResult;
pub use root::Root;
pub use sampling::ModelHint;
pub use sampling::ModelPreferences;
pub use sampling::SamplingContent;
pub use sampling::SamplingMessage;
pub use tool::Tool;
pub use tool::ToolAnnotations;

/// The protocol revision this SDK speaks by default.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// Protocol revisions this SDK can interoperate with. A client's
/// `initialize` handshake fails unless the server's echoed
/// `protocolVersion` appears here.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] =
    &["2025-06-18", "2025-03-26", "2024-11-05"];
