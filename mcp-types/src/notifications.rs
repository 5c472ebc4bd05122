use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::jsonrpc::JSONRPCNotification;
use crate::jsonrpc::RequestId;
use crate::logging::LoggingLevel;
use crate::method;
use crate::progress::ProgressToken;
use crate::requests::UnknownMethodError;

pub trait ModelContextProtocolNotification {
    const METHOD: &'static str;
    type Params: Serialize + DeserializeOwned + Send + Sync + 'static;
}

macro_rules! notification_marker {
    ($name:ident, $method:expr, $params:ty) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl ModelContextProtocolNotification for $name {
            const METHOD: &'static str = $method;
            type Params = $params;
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledNotificationParams {
    pub request_id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNotificationParams {
    pub progress_token: ProgressToken,
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingMessageNotificationParams {
    pub level: LoggingLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUpdatedNotificationParams {
    pub uri: String,
}

notification_marker!(
    InitializedNotification,
    method::NOTIFICATIONS_INITIALIZED,
    Option<Value>
);
notification_marker!(
    CancelledNotification,
    method::NOTIFICATIONS_CANCELLED,
    CancelledNotificationParams
);
notification_marker!(
    ProgressNotification,
    method::NOTIFICATIONS_PROGRESS,
    ProgressNotificationParams
);
notification_marker!(
    RootsListChangedNotification,
    method::NOTIFICATIONS_ROOTS_LIST_CHANGED,
    Option<Value>
);
notification_marker!(
    LoggingMessageNotification,
    method::NOTIFICATIONS_MESSAGE,
    LoggingMessageNotificationParams
);
notification_marker!(
    ResourceUpdatedNotification,
    method::NOTIFICATIONS_RESOURCES_UPDATED,
    ResourceUpdatedNotificationParams
);
notification_marker!(
    ResourceListChangedNotification,
    method::NOTIFICATIONS_RESOURCES_LIST_CHANGED,
    Option<Value>
);
notification_marker!(
    ToolListChangedNotification,
    method::NOTIFICATIONS_TOOLS_LIST_CHANGED,
    Option<Value>
);
notification_marker!(
    PromptListChangedNotification,
    method::NOTIFICATIONS_PROMPTS_LIST_CHANGED,
    Option<Value>
);

/// Notifications a server role can receive from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientNotification {
    InitializedNotification(Option<Value>),
    CancelledNotification(CancelledNotificationParams),
    ProgressNotification(ProgressNotificationParams),
    RootsListChangedNotification(Option<Value>),
}

impl TryFrom<JSONRPCNotification> for ClientNotification {
    type Error = UnknownMethodError;

    fn try_from(notification: JSONRPCNotification) -> Result<Self, Self::Error> {
        let JSONRPCNotification { method, params, .. } = notification;
        let fail = |e: String| UnknownMethodError {
            method: method.clone(),
            reason: e,
        };
        Ok(match method.as_str() {
            method::NOTIFICATIONS_INITIALIZED => {
                ClientNotification::InitializedNotification(params)
            }
            method::NOTIFICATIONS_CANCELLED => ClientNotification::CancelledNotification(
                decode_required(params).map_err(fail)?,
            ),
            method::NOTIFICATIONS_PROGRESS => ClientNotification::ProgressNotification(
                decode_required(params).map_err(fail)?,
            ),
            method::NOTIFICATIONS_ROOTS_LIST_CHANGED => {
                ClientNotification::RootsListChangedNotification(params)
            }
            other => {
                return Err(UnknownMethodError {
                    method: other.to_string(),
                    reason: "no client-notification variant for this method".to_string(),
                });
            }
        })
    }
}

/// Notifications a client role can receive from a server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerNotification {
    CancelledNotification(CancelledNotificationParams),
    ProgressNotification(ProgressNotificationParams),
    LoggingMessageNotification(LoggingMessageNotificationParams),
    ResourceUpdatedNotification(ResourceUpdatedNotificationParams),
    ResourceListChangedNotification(Option<Value>),
    ToolListChangedNotification(Option<Value>),
    PromptListChangedNotification(Option<Value>),
}

impl TryFrom<JSONRPCNotification> for ServerNotification {
    type Error = UnknownMethodError;

    fn try_from(notification: JSONRPCNotification) -> Result<Self, Self::Error> {
        let JSONRPCNotification { method, params, .. } = notification;
        let fail = |e: String| UnknownMethodError {
            method: method.clone(),
            reason: e,
        };
        Ok(match method.as_str() {
            method::NOTIFICATIONS_CANCELLED => ServerNotification::CancelledNotification(
                decode_required(params).map_err(fail)?,
            ),
            method::NOTIFICATIONS_PROGRESS => ServerNotification::ProgressNotification(
                decode_required(params).map_err(fail)?,
            ),
            method::NOTIFICATIONS_MESSAGE => ServerNotification::LoggingMessageNotification(
                decode_required(params).map_err(fail)?,
            ),
            method::NOTIFICATIONS_RESOURCES_UPDATED => {
                ServerNotification::ResourceUpdatedNotification(
                    decode_required(params).map_err(fail)?,
                )
            }
            method::NOTIFICATIONS_RESOURCES_LIST_CHANGED => {
                ServerNotification::ResourceListChangedNotification(params)
            }
            method::NOTIFICATIONS_TOOLS_LIST_CHANGED => {
                ServerNotification::ToolListChangedNotification(params)
            }
            method::NOTIFICATIONS_PROMPTS_LIST_CHANGED => {
                ServerNotification::PromptListChangedNotification(params)
            }
            other => {
                return Err(UnknownMethodError {
                    method: other.to_string(),
                    reason: "no server-notification variant for this method".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn progress_notification_round_trips() {
        let notification = JSONRPCNotification {
            jsonrpc: "2.0".into(),
            method: method::NOTIFICATIONS_PROGRESS.to_string(),
            params: Some(json!({
                "progressToken": 99,
                "progress": 0.5,
                "total": 1.0,
                "message": "Half way there"
            })),
        };
        let server_notif = ServerNotification::try_from(notification).unwrap();
        let ServerNotification::ProgressNotification(params) = server_notif else {
            panic!("expected ProgressNotification");
        };
        assert_eq!(params.progress, 0.5);
        assert_eq!(params.progress_token, ProgressToken::Integer(99));
    }
}
