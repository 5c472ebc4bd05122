//! End-to-end scenarios driving a real [`Client`] against either a real
//! [`mcp_server::Server`] or a hand-driven raw transport standing in for a
//! misbehaving peer, connected over an in-memory [`DuplexTransport`] pair
//! so no subprocess is involved.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use mcp_client::Client;
use mcp_protocol::LockExt;
use mcp_protocol::McpError;
use mcp_protocol::PeerOptions;
use mcp_server::Server;
use mcp_transport::DuplexTransport;
use mcp_transport::Transport;
use mcp_transport::TransportEvent;
use mcp_types::ClientCapabilities;
use mcp_types::Implementation;
use mcp_types::InitializeResult;
use mcp_types::JSONRPCMessage;
use mcp_types::JSONRPCResponse;
use mcp_types::RequestId;
use mcp_types::ServerCapabilities;
use mcp_types::ServerCapabilitiesTools;

fn test_client() -> Client {
    Client::new(
        Implementation {
            name: "handshake-test-client".to_string(),
            version: "0.0.0".to_string(),
            title: None,
            user_agent: None,
        },
        ClientCapabilities::default(),
    )
}

fn test_server(capabilities: ServerCapabilities) -> Server {
    Server::new(
        Implementation {
            name: "handshake-test-server".to_string(),
            version: "0.0.0".to_string(),
            title: None,
            user_agent: None,
        },
        capabilities,
        None,
    )
}

/// S1: a client and a server complete the `initialize` /
/// `notifications/initialized` handshake and can each see what the other
/// advertised.
#[tokio::test]
async fn handshake_exchanges_capabilities_and_info() {
    let client = test_client();
    let server = test_server(ServerCapabilities {
        tools: Some(ServerCapabilitiesTools { list_changed: Some(false) }),
        ..Default::default()
    });
    let (client_transport, server_transport) = DuplexTransport::pair();

    server.connect(Box::new(server_transport)).await.unwrap();
    let init = client
        .connect(Box::new(client_transport), Some(Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(init.server_info.name, "handshake-test-server");
    assert!(client.server_capabilities().unwrap().tools.is_some());

    // The server's `initialize` handler stores the client's info before
    // answering, so by the time `connect` resolves it's already visible.
    assert_eq!(server.client_info().unwrap().name, "handshake-test-client");
}

/// S2: a request for a method the peer has no handler for comes back as
/// `MethodNotFound` rather than hanging or panicking.
#[tokio::test]
async fn unhandled_method_comes_back_as_method_not_found() {
    let client = test_client();
    let server = test_server(ServerCapabilities::default());
    let (client_transport, server_transport) = DuplexTransport::pair();

    server.connect(Box::new(server_transport)).await.unwrap();
    client.connect(Box::new(client_transport), Some(Duration::from_secs(5))).await.unwrap();

    let err = client.list_tools(None).await.unwrap_err();
    match err {
        McpError::MethodNotFound { method } => assert_eq!(method, "tools/list"),
        other => panic!("expected MethodNotFound, got {other:?}"),
    }
}

/// S3: a server that negotiates a protocol version the client doesn't
/// support is rejected, the transport is closed, and
/// `notifications/initialized` is never sent.
#[tokio::test]
async fn unsupported_protocol_version_aborts_before_initialized_is_sent() {
    let client = test_client();
    let (client_transport, mut fake_server_transport) = DuplexTransport::pair();

    let mut fake_server_events = fake_server_transport.start().await.unwrap();
    let fake_server = tokio::spawn(async move {
        let Some(TransportEvent::Message(JSONRPCMessage::Request(request))) =
            fake_server_events.recv().await
        else {
            panic!("expected an initialize request");
        };
        assert_eq!(request.method, "initialize");

        let result = InitializeResult {
            protocol_version: "1999-01-01".to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: Implementation {
                name: "ancient-server".to_string(),
                version: "0.0.0".to_string(),
                title: None,
                user_agent: None,
            },
            instructions: None,
        };
        let response = JSONRPCMessage::Response(JSONRPCResponse {
            jsonrpc: mcp_types::JSONRPC_VERSION.to_string(),
            id: request.id,
            result: serde_json::to_value(result).unwrap(),
        });
        fake_server_transport.send_message(&response).await.unwrap();

        // The client must close without ever sending `notifications/initialized`.
        matches!(fake_server_events.recv().await, Some(TransportEvent::Closed) | None)
    });

    let err = client
        .connect(Box::new(client_transport), Some(Duration::from_secs(5)))
        .await
        .unwrap_err();
    assert!(matches!(err, McpError::InvalidRequest { .. }));

    assert!(fake_server.await.unwrap());
}

/// S4: with strict capability enforcement on, sending a request the remote
/// hasn't advertised support for fails locally without writing anything.
#[tokio::test]
async fn strict_mode_rejects_sends_the_remote_does_not_support() {
    let client = Client::with_options(
        Implementation {
            name: "strict-client".to_string(),
            version: "0.0.0".to_string(),
            title: None,
            user_agent: None,
        },
        ClientCapabilities::default(),
        PeerOptions { enforce_strict_capabilities: true, ..PeerOptions::default() },
    );
    // No tools capability advertised by the server.
    let server = test_server(ServerCapabilities::default());
    let (client_transport, server_transport) = DuplexTransport::pair();

    server.connect(Box::new(server_transport)).await.unwrap();
    client.connect(Box::new(client_transport), Some(Duration::from_secs(5))).await.unwrap();

    let err = client.call_tool("whatever".to_string(), None).await.unwrap_err();
    assert!(matches!(err, McpError::CapabilityMissing(_)));
}

/// S5: a response for an id with no matching in-flight request is reported
/// through `on_error` as `UnsolicitedResponse` rather than silently dropped.
#[tokio::test]
async fn unsolicited_response_is_reported_as_an_error() {
    let client = test_client();
    let (client_transport, mut fake_server_transport) = DuplexTransport::pair();

    let mut fake_server_events = fake_server_transport.start().await.unwrap();
    let fake_server = tokio::spawn(async move {
        let Some(TransportEvent::Message(JSONRPCMessage::Request(request))) =
            fake_server_events.recv().await
        else {
            panic!("expected an initialize request");
        };

        let result = InitializeResult {
            protocol_version: mcp_types::LATEST_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: Implementation {
                name: "well-behaved-server".to_string(),
                version: "0.0.0".to_string(),
                title: None,
                user_agent: None,
            },
            instructions: None,
        };
        let response = JSONRPCMessage::Response(JSONRPCResponse {
            jsonrpc: mcp_types::JSONRPC_VERSION.to_string(),
            id: request.id,
            result: serde_json::to_value(result).unwrap(),
        });
        fake_server_transport.send_message(&response).await.unwrap();

        // Drain the `notifications/initialized` that follows, then send a
        // response for an id nobody is waiting on.
        let _ = fake_server_events.recv().await;
        let bogus = JSONRPCMessage::Response(JSONRPCResponse {
            jsonrpc: mcp_types::JSONRPC_VERSION.to_string(),
            id: RequestId::Integer(999),
            result: serde_json::json!({}),
        });
        fake_server_transport.send_message(&bogus).await.unwrap();
    });

    let (tx, rx) = tokio::sync::oneshot::channel();
    let tx = std::sync::Mutex::new(Some(tx));
    client.peer().set_on_error(move |err| {
        if matches!(err, McpError::UnsolicitedResponse { id: 999 }) {
            if let Some(tx) = tx.lock_ignore_poison().take() {
                let _ = tx.send(());
            }
        }
    });

    client.connect(Box::new(client_transport), Some(Duration::from_secs(5))).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), rx).await.unwrap().unwrap();

    fake_server.await.unwrap();
}
