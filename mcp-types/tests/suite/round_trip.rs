use mcp_types::CallToolRequestParams;
use mcp_types::CallToolResult;
use mcp_types::ContentBlock;
use mcp_types::JSONRPC_VERSION;
use mcp_types::JSONRPCMessage;
use mcp_types::JSONRPCNotification;
use mcp_types::JSONRPCRequest;
use mcp_types::JSONRPCResponse;
use mcp_types::RequestId;
use mcp_types::TextContent;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn request_round_trips_through_json() {
    let params = CallToolRequestParams {
        name: "echo".to_string(),
        arguments: Some(json!({"text": "hi"})),
    };
    let req = JSONRPCMessage::Request(JSONRPCRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        id: RequestId::Integer(7),
        method: "tools/call".to_string(),
        params: Some(serde_json::to_value(&params).expect("serialize params")),
    });
    let encoded = serde_json::to_string(&req).expect("encode request");
    let decoded: JSONRPCMessage = serde_json::from_str(&encoded).expect("decode request");
    assert_eq!(req, decoded);
}

#[test]
fn notification_with_no_params_omits_the_field() {
    let notification = JSONRPCMessage::Notification(JSONRPCNotification {
        jsonrpc: JSONRPC_VERSION.to_string(),
        method: "notifications/initialized".to_string(),
        params: None,
    });
    let encoded = serde_json::to_value(&notification).expect("encode notification");
    assert!(encoded.get("params").is_none());

    let decoded: JSONRPCMessage =
        serde_json::from_value(encoded).expect("decode notification");
    assert_eq!(notification, decoded);
}

#[test]
fn response_with_call_tool_result_round_trips() {
    let result = CallToolResult {
        content: vec![ContentBlock::TextContent(TextContent {
            text: "done".to_string(),
            annotations: None,
        })],
        is_error: Some(false),
        structured_content: None,
    };
    let response = JSONRPCMessage::Response(JSONRPCResponse {
        jsonrpc: JSONRPC_VERSION.to_string(),
        id: RequestId::Integer(1),
        result: serde_json::to_value(&result).expect("serialize result"),
    });
    let encoded = serde_json::to_string(&response).expect("encode response");
    let decoded: JSONRPCMessage = serde_json::from_str(&encoded).expect("decode response");
    let JSONRPCMessage::Response(JSONRPCResponse { result: decoded_result, .. }) = decoded else {
        panic!("expected Response");
    };
    let round_tripped: CallToolResult =
        serde_json::from_value(decoded_result).expect("decode CallToolResult");
    assert_eq!(round_tripped, result);
}

#[test]
fn unrecognized_method_still_round_trips_as_an_opaque_request() {
    let raw = r#"{"jsonrpc":"2.0","id":42,"method":"experimental/futureMethod","params":{"foo":1}}"#;
    let decoded: JSONRPCMessage = serde_json::from_str(raw).expect("decode request");
    let JSONRPCMessage::Request(req) = &decoded else {
        panic!("expected Request");
    };
    assert_eq!(req.method, "experimental/futureMethod");
    assert_eq!(req.params, Some(json!({"foo": 1})));

    let encoded = serde_json::to_string(&decoded).expect("encode request");
    let re_decoded: JSONRPCMessage = serde_json::from_str(&encoded).expect("decode request");
    assert_eq!(decoded, re_decoded);
}
