//! The server role driver (§4.5): a thin layer over
//! `mcp_protocol::Peer<ServerRole>` that pre-installs the server-side
//! initialize handshake handlers and exposes typed convenience methods for
//! every server-initiated request and notification in §6.
//!
//! Registering handlers for client-initiated requests (`tools/list`,
//! `resources/read`, ...) is left to the embedder via [`Server::peer`] —
//! the high-level façade that converts named resource/tool/prompt
//! registrations into handlers is explicitly out of scope (spec §1).

use std::future::Future;
use std::sync::Arc;
use std::sync::RwLock;

use mcp_protocol::LockExt;
use mcp_protocol::McpError;
use mcp_protocol::Peer;
use mcp_protocol::PeerOptions;
use mcp_protocol::RwLockExt;
use mcp_protocol::ServerRole;
use mcp_transport::StdioServerTransport;
use mcp_transport::Transport;
use mcp_types::CreateMessageRequest;
use mcp_types::CreateMessageRequestParams;
use mcp_types::CreateMessageResult;
use mcp_types::EmptyResult;
use mcp_types::Implementation;
use mcp_types::InitializeRequest;
use mcp_types::InitializeRequestParams;
use mcp_types::InitializeResult;
use mcp_types::InitializedNotification;
use mcp_types::ListRootsRequest;
use mcp_types::ListRootsResult;
use mcp_types::LoggingLevel;
use mcp_types::LoggingMessageNotification;
use mcp_types::LoggingMessageNotificationParams;
use mcp_types::PingRequest;
use mcp_types::PromptListChangedNotification;
use mcp_types::ResourceListChangedNotification;
use mcp_types::ResourceUpdatedNotification;
use mcp_types::ResourceUpdatedNotificationParams;
use mcp_types::ServerCapabilities;
use mcp_types::ToolListChangedNotification;

/// One side of an MCP connection, playing the server role.
///
/// The `initialize`/`notifications/initialized` handshake handlers are
/// installed at construction time (§4.4); an embedder only needs to
/// `connect` a transport, register handlers for the methods it serves, and
/// await [`Peer::operation_phase_started`] before issuing server-initiated
/// calls.
pub struct Server {
    peer: Arc<Peer<ServerRole>>,
    client_info: Arc<RwLock<Option<Implementation>>>,
}

impl Server {
    pub fn new(
        server_info: Implementation,
        capabilities: ServerCapabilities,
        instructions: Option<String>,
    ) -> Self {
        Self::with_options(server_info, capabilities, instructions, PeerOptions::default())
    }

    pub fn with_options(
        server_info: Implementation,
        capabilities: ServerCapabilities,
        instructions: Option<String>,
        options: PeerOptions,
    ) -> Self {
        let peer = Peer::with_options(capabilities, options);
        let client_info = Arc::new(RwLock::new(None));

        let initialize_peer = peer.clone();
        let initialize_client_info = client_info.clone();
        // Pre-installed at construction, same as `Peer::new`'s `ping`
        // handler, so `replace_*` (infallible) is used rather than
        // `set_*` (which rejects a method that's already registered).
        let _ = peer.replace_request_handler::<InitializeRequest, _, _>(
            move |params: InitializeRequestParams| {
                let peer = initialize_peer.clone();
                let client_info = initialize_client_info.clone();
                let server_info = server_info.clone();
                let instructions = instructions.clone();
                async move {
                    peer.set_remote_capabilities(params.capabilities);
                    *client_info.write_ignore_poison() = Some(params.client_info);
                    Ok(InitializeResult {
                        // Echoes back the client-proposed version per §4.4
                        // ("server role ... echoes back the client-proposed
                        // protocol version"), not the SDK's own latest.
                        protocol_version: params.protocol_version,
                        capabilities: peer.self_capabilities(),
                        server_info,
                        instructions,
                    })
                }
            },
        );

        let initialized_peer = peer.clone();
        peer.replace_notification_handler::<InitializedNotification, _, _>(
            move |_: Option<serde_json::Value>| {
                let peer = initialized_peer.clone();
                async move {
                    peer.mark_operation_phase_started();
                    Ok(())
                }
            },
        );

        Self { peer, client_info }
    }

    /// Direct access to the underlying engine, for registering handlers for
    /// client-initiated requests/notifications this server serves, or for
    /// lower-level control (`on_error`/`on_close`, a fallback handler).
    pub fn peer(&self) -> &Arc<Peer<ServerRole>> {
        &self.peer
    }

    /// Hands `transport` to the peer. Unlike the client side there is no
    /// handshake to drive here — the pre-installed `initialize` handler
    /// answers when the client sends it; await
    /// `peer().operation_phase_started().wait()` to know when
    /// `notifications/initialized` has arrived.
    pub async fn connect(&self, transport: Box<dyn Transport>) -> Result<(), McpError> {
        self.peer.connect(transport).await
    }

    /// Convenience wrapper for the common case: connect over the current
    /// process's stdin/stdout and block until the transport closes.
    pub async fn serve_stdio(&self) -> Result<(), McpError> {
        self.connect(Box::new(StdioServerTransport::new())).await?;
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = std::sync::Mutex::new(Some(tx));
        self.peer.set_on_close(move || {
            if let Some(tx) = tx.lock_ignore_poison().take() {
                let _ = tx.send(());
            }
        });
        let _ = rx.await;
        Ok(())
    }

    pub fn client_info(&self) -> Option<Implementation> {
        self.client_info.read_ignore_poison().clone()
    }

    pub async fn close(&self) -> Result<(), McpError> {
        self.peer.close().await
    }

    pub async fn ping(&self) -> Result<EmptyResult, McpError> {
        self.peer.request::<PingRequest>(None).await
    }

    /// Sends `sampling/createMessage`. The result's `content` is already a
    /// closed, tagged `Text | Image | Audio` sum (`SamplingContent`) rather
    /// than a generic content type, per the design note in §9 — the
    /// "dispatch on content type" called for here is the caller matching on
    /// that enum.
    pub async fn create_message(
        &self,
        params: CreateMessageRequestParams,
    ) -> Result<CreateMessageResult, McpError> {
        self.peer.request::<CreateMessageRequest>(params).await
    }

    pub async fn list_roots(&self) -> Result<ListRootsResult, McpError> {
        self.peer.request::<ListRootsRequest>(None).await
    }

    pub async fn send_logging_message(
        &self,
        level: LoggingLevel,
        logger: Option<String>,
        data: serde_json::Value,
    ) -> Result<(), McpError> {
        self.peer
            .notify::<LoggingMessageNotification>(LoggingMessageNotificationParams {
                level,
                logger,
                data,
            })
            .await
    }

    pub async fn send_resource_updated(&self, uri: String) -> Result<(), McpError> {
        self.peer
            .notify::<ResourceUpdatedNotification>(ResourceUpdatedNotificationParams { uri })
            .await
    }

    pub async fn send_resource_list_changed(&self) -> Result<(), McpError> {
        self.peer.notify::<ResourceListChangedNotification>(None).await
    }

    pub async fn send_tool_list_changed(&self) -> Result<(), McpError> {
        self.peer.notify::<ToolListChangedNotification>(None).await
    }

    pub async fn send_prompt_list_changed(&self) -> Result<(), McpError> {
        self.peer.notify::<PromptListChangedNotification>(None).await
    }

    /// Registers a handler serving a client-initiated request. `Server`
    /// never allows registering a `sampling/createMessage` *handler*
    /// (enforced by [`mcp_protocol::ServerRole`]'s capability validator,
    /// grounded on `server/capability_validators.go`'s hard failure for
    /// that method) — only a client can satisfy a sampling request.
    pub fn set_request_handler<R, F, Fut>(&self, handler: F) -> Result<(), McpError>
    where
        R: mcp_types::ModelContextProtocolRequest,
        F: Fn(R::Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R::Result, McpError>> + Send + 'static,
    {
        self.peer.set_request_handler::<R, F, Fut>(handler)
    }

    pub fn set_notification_handler<N, F, Fut>(&self, handler: F) -> Result<(), McpError>
    where
        N: mcp_types::ModelContextProtocolNotification,
        F: Fn(N::Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), McpError>> + Send + 'static,
    {
        self.peer.set_notification_handler::<N, F, Fut>(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_server() -> Server {
        Server::new(
            Implementation {
                name: "test-server".to_string(),
                version: "0.0.0".to_string(),
                title: None,
                user_agent: None,
            },
            ServerCapabilities::default(),
            None,
        )
    }

    #[tokio::test]
    async fn registering_a_sampling_handler_is_rejected() {
        let server = test_server();
        let err = server
            .set_request_handler::<CreateMessageRequest, _, _>(|_params| async {
                Ok(CreateMessageResult {
                    model: "test".to_string(),
                    stop_reason: None,
                    role: mcp_types::Role::Assistant,
                    content: mcp_types::SamplingContent::Text {
                        text: "hi".to_string(),
                    },
                })
            })
            .unwrap_err();
        assert!(matches!(err, McpError::CapabilityMissing(_)));
    }

    #[tokio::test]
    async fn ping_before_connect_is_not_connected() {
        let server = test_server();
        let err = server.ping().await.unwrap_err();
        assert!(matches!(err, McpError::NotConnected));
    }

    #[tokio::test]
    async fn client_info_is_absent_before_handshake() {
        let server = test_server();
        assert!(server.client_info().is_none());
    }
}
