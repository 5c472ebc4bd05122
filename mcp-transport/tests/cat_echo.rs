#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::ffi::OsString;

use mcp_types::JSONRPCMessage;
use mcp_types::JSONRPCRequest;
use mcp_types::JSONRPC_VERSION;
use mcp_types::RequestId;
use mcp_transport::StdioClientTransport;
use mcp_transport::StdioServerParameters;
use mcp_transport::Transport;
use mcp_transport::TransportEvent;

/// Validates the framing layer independently of the protocol engine: `cat`
/// echoes whatever it receives on stdin back out on stdout unchanged, so a
/// framed `ping` request sent in must come back out still shaped like a
/// request (not a response — `cat` has no idea this is JSON-RPC).
#[tokio::test]
async fn ping_request_round_trips_through_cat() {
    let mut transport = StdioClientTransport::new(StdioServerParameters {
        command: OsString::from("cat"),
        ..Default::default()
    });

    let mut events = transport.start().await.expect("start transport");

    let request = JSONRPCMessage::Request(JSONRPCRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        id: RequestId::Integer(1),
        method: "ping".to_string(),
        params: None,
    });

    transport
        .send_message(&request)
        .await
        .expect("send ping through cat");

    let event = tokio::time::timeout(std::time::Duration::from_secs(5), events.recv())
        .await
        .expect("cat echoed something back before the timeout")
        .expect("event channel stayed open");

    match event {
        TransportEvent::Message(echoed) => assert_eq!(echoed, request),
        other => panic!("expected an echoed request, got {other:?}"),
    }

    transport.close().await.expect("close transport");
}
