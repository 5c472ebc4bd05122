use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::capabilities::ClientCapabilities;
use crate::completion::CompleteRequestArgument;
use crate::completion::Reference;
use crate::implementation::Implementation;
use crate::jsonrpc::JSONRPCRequest;
use crate::logging::LoggingLevel;
use crate::method;
use crate::results::CallToolResult;
use crate::results::CompleteResult;
use crate::results::EmptyResult;
use crate::results::GetPromptResult;
use crate::results::InitializeResult;
use crate::results::ListPromptsResult;
use crate::results::ListResourceTemplatesResult;
use crate::results::ListResourcesResult;
use crate::results::ListRootsResult;
use crate::results::ListToolsResult;
use crate::results::ReadResourceResult;
use crate::sampling::ModelPreferences;
use crate::sampling::SamplingMessage;

/// Associates a zero-sized marker type with its method name and the
/// `Params`/`Result` payload types the codec must use to decode/encode it.
/// The in-flight table keys a pending request by the marker type so the
/// response can be decoded with the caller's expected shape rather than by
/// probing `result`'s fields (see the design note on untagged result
/// polymorphism).
pub trait ModelContextProtocolRequest {
    const METHOD: &'static str;
    type Params: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Result: Serialize + DeserializeOwned + Send + Sync + 'static;
}

macro_rules! request_marker {
    ($name:ident, $method:expr, $params:ty, $result:ty) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl ModelContextProtocolRequest for $name {
            const METHOD: &'static str = $method;
            type Params = $params;
            type Result = $result;
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequestParams {
    pub protocol_version: String,
    pub capabilities: ClientCapabilities,
    pub client_info: Implementation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesRequestParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourceTemplatesRequestParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResourceRequestParams {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeRequestParams {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsubscribeRequestParams {
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPromptsRequestParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPromptRequestParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsRequestParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolRequestParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLevelRequestParams {
    pub level: LoggingLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteRequestParams {
    #[serde(rename = "ref")]
    pub reference: Reference,
    pub argument: CompleteRequestArgument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequestParams {
    pub messages: Vec<SamplingMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    pub max_tokens: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_preferences: Option<ModelPreferences>,
}

request_marker!(
    InitializeRequest,
    method::INITIALIZE,
    InitializeRequestParams,
    InitializeResult
);
request_marker!(PingRequest, method::PING, Option<Value>, EmptyResult);
request_marker!(
    CompleteRequest,
    method::COMPLETION_COMPLETE,
    CompleteRequestParams,
    CompleteResult
);
request_marker!(
    SetLevelRequest,
    method::LOGGING_SET_LEVEL,
    SetLevelRequestParams,
    EmptyResult
);
request_marker!(
    GetPromptRequest,
    method::PROMPTS_GET,
    GetPromptRequestParams,
    GetPromptResult
);
request_marker!(
    ListPromptsRequest,
    method::PROMPTS_LIST,
    Option<ListPromptsRequestParams>,
    ListPromptsResult
);
request_marker!(
    ListResourcesRequest,
    method::RESOURCES_LIST,
    Option<ListResourcesRequestParams>,
    ListResourcesResult
);
request_marker!(
    ListResourceTemplatesRequest,
    method::RESOURCES_TEMPLATES_LIST,
    Option<ListResourceTemplatesRequestParams>,
    ListResourceTemplatesResult
);
request_marker!(
    ReadResourceRequest,
    method::RESOURCES_READ,
    ReadResourceRequestParams,
    ReadResourceResult
);
request_marker!(
    SubscribeRequest,
    method::RESOURCES_SUBSCRIBE,
    SubscribeRequestParams,
    EmptyResult
);
request_marker!(
    UnsubscribeRequest,
    method::RESOURCES_UNSUBSCRIBE,
    UnsubscribeRequestParams,
    EmptyResult
);
request_marker!(
    CallToolRequest,
    method::TOOLS_CALL,
    CallToolRequestParams,
    CallToolResult
);
request_marker!(
    ListToolsRequest,
    method::TOOLS_LIST,
    Option<ListToolsRequestParams>,
    ListToolsResult
);
request_marker!(
    CreateMessageRequest,
    method::SAMPLING_CREATE_MESSAGE,
    CreateMessageRequestParams,
    crate::results::CreateMessageResult
);
request_marker!(
    ListRootsRequest,
    method::ROOTS_LIST,
    Option<Value>,
    ListRootsResult
);

/// Error produced when an inbound request's method does not match any
/// variant a role can receive, or its params fail to decode.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unrecognized or malformed request method `{method}`: {reason}")]
pub struct UnknownMethodError {
    pub method: String,
    pub reason: String,
}

/// Requests a server role can receive from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    InitializeRequest(InitializeRequestParams),
    PingRequest(Option<Value>),
    CompleteRequest(CompleteRequestParams),
    SetLevelRequest(SetLevelRequestParams),
    GetPromptRequest(GetPromptRequestParams),
    ListPromptsRequest(Option<ListPromptsRequestParams>),
    ListResourcesRequest(Option<ListResourcesRequestParams>),
    ListResourceTemplatesRequest(Option<ListResourceTemplatesRequestParams>),
    ReadResourceRequest(ReadResourceRequestParams),
    SubscribeRequest(SubscribeRequestParams),
    UnsubscribeRequest(UnsubscribeRequestParams),
    ListToolsRequest(Option<ListToolsRequestParams>),
    CallToolRequest(CallToolRequestParams),
}

impl TryFrom<JSONRPCRequest> for ClientRequest {
    type Error = UnknownMethodError;

    fn try_from(request: JSONRPCRequest) -> Result<Self, Self::Error> {
        let JSONRPCRequest { method, params, .. } = request;
        let fail = |e: String| UnknownMethodError {
            method: method.clone(),
            reason: e,
        };
        Ok(match method.as_str() {
            method::INITIALIZE => ClientRequest::InitializeRequest(
                decode_required(params).map_err(fail)?,
            ),
            method::PING => ClientRequest::PingRequest(params),
            method::COMPLETION_COMPLETE => {
                ClientRequest::CompleteRequest(decode_required(params).map_err(fail)?)
            }
            method::LOGGING_SET_LEVEL => {
                ClientRequest::SetLevelRequest(decode_required(params).map_err(fail)?)
            }
            method::PROMPTS_GET => {
                ClientRequest::GetPromptRequest(decode_required(params).map_err(fail)?)
            }
            method::PROMPTS_LIST => {
                ClientRequest::ListPromptsRequest(decode_optional(params).map_err(fail)?)
            }
            method::RESOURCES_LIST => {
                ClientRequest::ListResourcesRequest(decode_optional(params).map_err(fail)?)
            }
            method::RESOURCES_TEMPLATES_LIST => ClientRequest::ListResourceTemplatesRequest(
                decode_optional(params).map_err(fail)?,
            ),
            method::RESOURCES_READ => {
                ClientRequest::ReadResourceRequest(decode_required(params).map_err(fail)?)
            }
            method::RESOURCES_SUBSCRIBE => {
                ClientRequest::SubscribeRequest(decode_required(params).map_err(fail)?)
            }
            method::RESOURCES_UNSUBSCRIBE => {
                ClientRequest::UnsubscribeRequest(decode_required(params).map_err(fail)?)
            }
            method::TOOLS_LIST => {
                ClientRequest::ListToolsRequest(decode_optional(params).map_err(fail)?)
            }
            method::TOOLS_CALL => {
                ClientRequest::CallToolRequest(decode_required(params).map_err(fail)?)
            }
            other => {
                return Err(UnknownMethodError {
                    method: other.to_string(),
                    reason: "no client-request variant for this method".to_string(),
                });
            }
        })
    }
}

/// Requests a client role can receive from a server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerRequest {
    PingRequest(Option<Value>),
    CreateMessageRequest(CreateMessageRequestParams),
    ListRootsRequest(Option<Value>),
}

impl TryFrom<JSONRPCRequest> for ServerRequest {
    type Error = UnknownMethodError;

    fn try_from(request: JSONRPCRequest) -> Result<Self, Self::Error> {
        let JSONRPCRequest { method, params, .. } = request;
        let fail = |e: String| UnknownMethodError {
            method: method.clone(),
            reason: e,
        };
        Ok(match method.as_str() {
            method::PING => ServerRequest::PingRequest(params),
            method::SAMPLING_CREATE_MESSAGE => {
                ServerRequest::CreateMessageRequest(decode_required(params).map_err(fail)?)
            }
            method::ROOTS_LIST => ServerRequest::ListRootsRequest(params),
            other => {
                return Err(UnknownMethodError {
                    method: other.to_string(),
                    reason: "no server-request variant for this method".to_string(),
                });
            }
        })
    }
}

fn decode_required<T: DeserializeOwned>(params: Option<Value>) -> Result<T, String> {
    match params {
        Some(value) => serde_json::from_value(value).map_err(|e| e.to_string()),
        None => Err("missing required params".to_string()),
    }
}

fn decode_optional<T: DeserializeOwned>(params: Option<Value>) -> Result<Option<T>, String> {
    match params {
        Some(value) => serde_json::from_value(value).map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonrpc::RequestId;
    use serde_json::json;

    #[test]
    fn client_request_dispatches_by_method() {
        let req = JSONRPCRequest {
            jsonrpc: "2.0".into(),
            id: RequestId::Integer(1),
            method: method::TOOLS_CALL.to_string(),
            params: Some(json!({"name": "echo", "arguments": {"text": "hi"}})),
        };
        let client_req = ClientRequest::try_from(req).unwrap();
        assert!(matches!(client_req, ClientRequest::CallToolRequest(_)));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let req = JSONRPCRequest {
            jsonrpc: "2.0".into(),
            id: RequestId::Integer(1),
            method: "does/not/exist".to_string(),
            params: None,
        };
        assert!(ClientRequest::try_from(req).is_err());
    }

    #[test]
    fn list_tools_with_absent_params_decodes_to_none() {
        let req = JSONRPCRequest {
            jsonrpc: "2.0".into(),
            id: RequestId::Integer(2),
            method: method::TOOLS_LIST.to_string(),
            params: None,
        };
        let client_req = ClientRequest::try_from(req).unwrap();
        assert_eq!(client_req, ClientRequest::ListToolsRequest(None));
    }
}
