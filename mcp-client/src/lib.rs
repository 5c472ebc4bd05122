//! The client role driver (§4.5): a thin layer over
//! `mcp_protocol::Peer<ClientRole>` that performs the client-side
//! initialize handshake and exposes typed convenience methods for every
//! client-initiated request and notification in §6.
//!
//! Registering handlers for the two server-initiated requests
//! (`sampling/createMessage`, `roots/list`) is left to the embedder via
//! [`Client::set_create_message_handler`] / [`Client::set_list_roots_handler`]
//! — this crate does not itself decide how a host answers a sampling
//! request or enumerates roots.

use std::future::Future;
use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;

use mcp_protocol::ClientRole;
use mcp_protocol::McpError;
use mcp_protocol::Peer;
use mcp_protocol::PeerOptions;
use mcp_protocol::RwLockExt;
use mcp_transport::Transport;
use mcp_types::CallToolRequest;
use mcp_types::CallToolRequestParams;
use mcp_types::CallToolResult;
use mcp_types::ClientCapabilities;
use mcp_types::CompleteRequest;
use mcp_types::CompleteRequestParams;
use mcp_types::CompleteResult;
use mcp_types::CreateMessageRequest;
use mcp_types::CreateMessageRequestParams;
use mcp_types::CreateMessageResult;
use mcp_types::EmptyResult;
use mcp_types::GetPromptRequest;
use mcp_types::GetPromptRequestParams;
use mcp_types::GetPromptResult;
use mcp_types::Implementation;
use mcp_types::InitializeRequest;
use mcp_types::InitializeRequestParams;
use mcp_types::InitializeResult;
use mcp_types::InitializedNotification;
use mcp_types::ListPromptsRequest;
use mcp_types::ListPromptsRequestParams;
use mcp_types::ListPromptsResult;
use mcp_types::ListResourceTemplatesRequest;
use mcp_types::ListResourceTemplatesRequestParams;
use mcp_types::ListResourceTemplatesResult;
use mcp_types::ListResourcesRequest;
use mcp_types::ListResourcesRequestParams;
use mcp_types::ListResourcesResult;
use mcp_types::ListRootsRequest;
use mcp_types::ListRootsResult;
use mcp_types::ListToolsRequest;
use mcp_types::ListToolsRequestParams;
use mcp_types::ListToolsResult;
use mcp_types::LoggingLevel;
use mcp_types::PingRequest;
use mcp_types::ReadResourceRequest;
use mcp_types::ReadResourceRequestParams;
use mcp_types::ReadResourceResult;
use mcp_types::RootsListChangedNotification;
use mcp_types::ServerCapabilities;
use mcp_types::SetLevelRequest;
use mcp_types::SetLevelRequestParams;
use mcp_types::SubscribeRequest;
use mcp_types::SubscribeRequestParams;
use mcp_types::SUPPORTED_PROTOCOL_VERSIONS;
use mcp_types::UnsubscribeRequest;
use mcp_types::UnsubscribeRequestParams;
use mcp_types::LATEST_PROTOCOL_VERSION;

/// One side of an MCP connection, playing the client role.
///
/// Construct once, `connect` a transport, then issue any of the
/// client-initiated requests. Everything below `connect` is a thin shell
/// around [`Peer::request`]/[`Peer::notify`] — the correlation, capability
/// gating, and dispatch all live in `mcp-protocol`.
pub struct Client {
    peer: Arc<Peer<ClientRole>>,
    client_info: Implementation,
    server_info: RwLock<Option<Implementation>>,
    instructions: RwLock<Option<String>>,
}

impl Client {
    pub fn new(client_info: Implementation, capabilities: ClientCapabilities) -> Self {
        Self::with_options(client_info, capabilities, PeerOptions::default())
    }

    pub fn with_options(
        client_info: Implementation,
        capabilities: ClientCapabilities,
        options: PeerOptions,
    ) -> Self {
        Self {
            peer: Peer::with_options(capabilities, options),
            client_info,
            server_info: RwLock::new(None),
            instructions: RwLock::new(None),
        }
    }

    /// Direct access to the underlying engine, for callers that need
    /// lower-level control (custom timeouts, `on_error`/`on_close` hooks,
    /// or registering a fallback handler).
    pub fn peer(&self) -> &Arc<Peer<ClientRole>> {
        &self.peer
    }

    /// Hands `transport` to the peer and performs the `initialize` handshake
    /// (§4.4, scenario S1). On a protocol-version mismatch the transport is
    /// closed and an error is returned *without* sending
    /// `notifications/initialized` (S3).
    pub async fn connect(
        &self,
        transport: Box<dyn Transport>,
        timeout: Option<Duration>,
    ) -> Result<InitializeResult, McpError> {
        self.peer.connect(transport).await?;
        self.peer.transport_started().wait().await;

        let params = InitializeRequestParams {
            protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
            capabilities: self.peer.self_capabilities(),
            client_info: self.client_info.clone(),
        };
        let result = self
            .peer
            .request_with_timeout::<InitializeRequest>(params, timeout)
            .await?;

        if !SUPPORTED_PROTOCOL_VERSIONS.contains(&result.protocol_version.as_str()) {
            self.peer.close().await?;
            return Err(McpError::InvalidRequest {
                message: format!(
                    "server negotiated unsupported protocol version {}",
                    result.protocol_version
                ),
                data: None,
            });
        }

        self.peer.set_remote_capabilities(result.capabilities.clone());
        *self.server_info.write_ignore_poison() = Some(result.server_info.clone());
        *self.instructions.write_ignore_poison() = result.instructions.clone();

        self.peer.notify::<InitializedNotification>(None).await?;
        self.peer.mark_operation_phase_started();

        Ok(result)
    }

    pub fn server_capabilities(&self) -> Option<ServerCapabilities> {
        self.peer.remote_capabilities()
    }

    pub fn server_info(&self) -> Option<Implementation> {
        self.server_info.read_ignore_poison().clone()
    }

    pub fn instructions(&self) -> Option<String> {
        self.instructions.read_ignore_poison().clone()
    }

    pub async fn close(&self) -> Result<(), McpError> {
        self.peer.close().await
    }

    pub async fn ping(&self) -> Result<EmptyResult, McpError> {
        self.peer.request::<PingRequest>(None).await
    }

    pub async fn complete(
        &self,
        params: CompleteRequestParams,
    ) -> Result<CompleteResult, McpError> {
        self.peer.request::<CompleteRequest>(params).await
    }

    pub async fn set_logging_level(&self, level: LoggingLevel) -> Result<EmptyResult, McpError> {
        self.peer
            .request::<SetLevelRequest>(SetLevelRequestParams { level })
            .await
    }

    pub async fn get_prompt(
        &self,
        params: GetPromptRequestParams,
    ) -> Result<GetPromptResult, McpError> {
        self.peer.request::<GetPromptRequest>(params).await
    }

    pub async fn list_prompts(
        &self,
        cursor: Option<String>,
    ) -> Result<ListPromptsResult, McpError> {
        self.peer
            .request::<ListPromptsRequest>(Some(ListPromptsRequestParams { cursor }))
            .await
    }

    pub async fn list_resources(
        &self,
        cursor: Option<String>,
    ) -> Result<ListResourcesResult, McpError> {
        self.peer
            .request::<ListResourcesRequest>(Some(ListResourcesRequestParams { cursor }))
            .await
    }

    pub async fn list_resource_templates(
        &self,
        cursor: Option<String>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        self.peer
            .request::<ListResourceTemplatesRequest>(Some(ListResourceTemplatesRequestParams {
                cursor,
            }))
            .await
    }

    pub async fn read_resource(&self, uri: String) -> Result<ReadResourceResult, McpError> {
        self.peer
            .request::<ReadResourceRequest>(ReadResourceRequestParams { uri })
            .await
    }

    pub async fn subscribe_resource(&self, uri: String) -> Result<EmptyResult, McpError> {
        self.peer
            .request::<SubscribeRequest>(SubscribeRequestParams { uri })
            .await
    }

    pub async fn unsubscribe_resource(&self, uri: String) -> Result<EmptyResult, McpError> {
        self.peer
            .request::<UnsubscribeRequest>(UnsubscribeRequestParams { uri })
            .await
    }

    pub async fn call_tool(
        &self,
        name: String,
        arguments: Option<serde_json::Value>,
    ) -> Result<CallToolResult, McpError> {
        self.peer
            .request::<CallToolRequest>(CallToolRequestParams { name, arguments })
            .await
    }

    pub async fn list_tools(&self, cursor: Option<String>) -> Result<ListToolsResult, McpError> {
        self.peer
            .request::<ListToolsRequest>(Some(ListToolsRequestParams { cursor }))
            .await
    }

    pub async fn send_roots_list_changed(&self) -> Result<(), McpError> {
        self.peer.notify::<RootsListChangedNotification>(None).await
    }

    /// Registers the handler that answers a server-initiated
    /// `sampling/createMessage` request. Requires `self`'s capabilities to
    /// advertise `sampling` (enforced by [`Peer::set_request_handler`]).
    pub fn set_create_message_handler<F, Fut>(&self, handler: F) -> Result<(), McpError>
    where
        F: Fn(CreateMessageRequestParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CreateMessageResult, McpError>> + Send + 'static,
    {
        self.peer.set_request_handler::<CreateMessageRequest, _, _>(handler)
    }

    /// Registers the handler that answers a server-initiated `roots/list`
    /// request. Requires `self`'s capabilities to advertise `roots`.
    pub fn set_list_roots_handler<F, Fut>(&self, handler: F) -> Result<(), McpError>
    where
        F: Fn(Option<serde_json::Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ListRootsResult, McpError>> + Send + 'static,
    {
        self.peer.set_request_handler::<ListRootsRequest, _, _>(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> Client {
        Client::new(
            Implementation {
                name: "test-client".to_string(),
                version: "0.0.0".to_string(),
                title: None,
                user_agent: None,
            },
            ClientCapabilities::default(),
        )
    }

    #[tokio::test]
    async fn ping_before_connect_is_not_connected() {
        let client = test_client();
        let err = client.ping().await.unwrap_err();
        assert!(matches!(err, McpError::NotConnected));
    }

    #[tokio::test]
    async fn server_capabilities_are_absent_before_handshake() {
        let client = test_client();
        assert!(client.server_capabilities().is_none());
        assert!(client.server_info().is_none());
    }
}
