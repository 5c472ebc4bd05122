use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use mcp_types::ModelContextProtocolNotification;
use mcp_types::ModelContextProtocolRequest;
use serde_json::Value;

use crate::error::McpError;
use crate::sync::RwLockExt;

/// Type-erased request handler stored in the [`HandlerTable`]. Registration
/// is generic over a marker type from `mcp-types`; dispatch operates on raw
/// JSON because the method string, not the type system, is what the wire
/// gives us to key on.
#[async_trait]
pub trait RawRequestHandler: Send + Sync {
    async fn handle(&self, params: Option<Value>) -> Result<Value, McpError>;
}

#[async_trait]
pub trait RawNotificationHandler: Send + Sync {
    async fn handle(&self, params: Option<Value>) -> Result<(), McpError>;
}

/// Adapts a typed async closure `R::Params -> Result<R::Result, McpError>`
/// into a [`RawRequestHandler`], decoding/encoding at the boundary.
pub struct TypedRequestHandler<R, F> {
    handler: F,
    _marker: PhantomData<fn() -> R>,
}

impl<R, F, Fut> TypedRequestHandler<R, F>
where
    R: ModelContextProtocolRequest,
    F: Fn(R::Params) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R::Result, McpError>> + Send,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<R, F, Fut> RawRequestHandler for TypedRequestHandler<R, F>
where
    R: ModelContextProtocolRequest,
    F: Fn(R::Params) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R::Result, McpError>> + Send,
{
    async fn handle(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params_value = params.unwrap_or(Value::Null);
        let typed: R::Params =
            serde_json::from_value(params_value).map_err(|e| McpError::InvalidParams {
                message: e.to_string(),
                data: None,
            })?;
        let result = (self.handler)(typed).await?;
        serde_json::to_value(result).map_err(|e| McpError::internal(e.to_string()))
    }
}

pub struct TypedNotificationHandler<N, F> {
    handler: F,
    _marker: PhantomData<fn() -> N>,
}

impl<N, F, Fut> TypedNotificationHandler<N, F>
where
    N: ModelContextProtocolNotification,
    F: Fn(N::Params) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), McpError>> + Send,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<N, F, Fut> RawNotificationHandler for TypedNotificationHandler<N, F>
where
    N: ModelContextProtocolNotification,
    F: Fn(N::Params) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), McpError>> + Send,
{
    async fn handle(&self, params: Option<Value>) -> Result<(), McpError> {
        let params_value = params.unwrap_or(Value::Null);
        let typed: N::Params =
            serde_json::from_value(params_value).map_err(|e| McpError::InvalidParams {
                message: e.to_string(),
                data: None,
            })?;
        (self.handler)(typed).await
    }
}

/// Method-keyed handler tables. Reads happen from the reader task; writes
/// happen only from the registration API, so a plain `RwLock` (no async
/// hand-off needed) is enough per the concurrency model in §5.
#[derive(Default)]
pub struct HandlerTable {
    requests: RwLock<HashMap<String, Arc<dyn RawRequestHandler>>>,
    notifications: RwLock<HashMap<String, Arc<dyn RawNotificationHandler>>>,
    fallback_request: RwLock<Option<Arc<dyn RawRequestHandler>>>,
    fallback_notification: RwLock<Option<Arc<dyn RawNotificationHandler>>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails if a handler is already registered for `method` (see the
    /// design note on re-registration: this rewrite treats it as an error
    /// rather than a silent override).
    pub fn set_request_handler(
        &self,
        method: &str,
        handler: Arc<dyn RawRequestHandler>,
    ) -> Result<(), McpError> {
        let mut table = self.requests.write_ignore_poison();
        if table.contains_key(method) {
            return Err(McpError::HandlerAlreadyRegistered {
                method: method.to_string(),
            });
        }
        table.insert(method.to_string(), handler);
        Ok(())
    }

    /// Unconditionally installs `handler`, overriding any prior registration.
    pub fn replace_request_handler(&self, method: &str, handler: Arc<dyn RawRequestHandler>) {
        self.requests
            .write_ignore_poison()
            .insert(method.to_string(), handler);
    }

    pub fn set_notification_handler(
        &self,
        method: &str,
        handler: Arc<dyn RawNotificationHandler>,
    ) -> Result<(), McpError> {
        let mut table = self.notifications.write_ignore_poison();
        if table.contains_key(method) {
            return Err(McpError::HandlerAlreadyRegistered {
                method: method.to_string(),
            });
        }
        table.insert(method.to_string(), handler);
        Ok(())
    }

    pub fn replace_notification_handler(
        &self,
        method: &str,
        handler: Arc<dyn RawNotificationHandler>,
    ) {
        self.notifications
            .write_ignore_poison()
            .insert(method.to_string(), handler);
    }

    pub fn set_fallback_request_handler(&self, handler: Arc<dyn RawRequestHandler>) {
        *self.fallback_request.write_ignore_poison() = Some(handler);
    }

    pub fn set_fallback_notification_handler(&self, handler: Arc<dyn RawNotificationHandler>) {
        *self.fallback_notification.write_ignore_poison() = Some(handler);
    }

    pub fn request_handler(&self, method: &str) -> Option<Arc<dyn RawRequestHandler>> {
        self.requests.read_ignore_poison().get(method).cloned()
    }

    pub fn notification_handler(&self, method: &str) -> Option<Arc<dyn RawNotificationHandler>> {
        self.notifications.read_ignore_poison().get(method).cloned()
    }

    pub fn fallback_request_handler(&self) -> Option<Arc<dyn RawRequestHandler>> {
        self.fallback_request.read_ignore_poison().clone()
    }

    pub fn fallback_notification_handler(&self) -> Option<Arc<dyn RawNotificationHandler>> {
        self.fallback_notification.read_ignore_poison().clone()
    }
}
