use mcp_types::ClientCapabilities;
use mcp_types::ServerCapabilities;

use crate::error::McpError;

/// Methods exempt from every capability check (§4.4).
fn bypasses_capability_checks(method: &str) -> bool {
    matches!(
        method,
        "ping"
            | "initialize"
            | "notifications/initialized"
            | "notifications/cancelled"
            | "notifications/progress"
    )
}

/// Parameterizes [`crate::Peer`] with the capability-validator triple for one
/// side of the connection. A client and a server share the same `Peer`
/// engine; only this trait differs between them, so the engine itself is
/// never duplicated per role.
pub trait RoleValidators: Send + Sync + 'static {
    /// Capabilities this side of the connection advertises about itself.
    type SelfCapabilities: Clone + Default + Send + Sync + 'static;
    /// Capabilities learned from the remote side during the handshake.
    type RemoteCapabilities: Clone + Default + Send + Sync + 'static;

    /// Before *sending* a request: does the remote support this method?
    fn validate_capability_for_method(
        remote: &Self::RemoteCapabilities,
        method: &str,
    ) -> Result<(), McpError>;

    /// Before *sending* a notification: does self support this method?
    fn validate_notification_capability(
        self_caps: &Self::SelfCapabilities,
        method: &str,
    ) -> Result<(), McpError>;

    /// Before *registering* a handler: does self support this method?
    fn validate_request_handler_capability(
        self_caps: &Self::SelfCapabilities,
        method: &str,
    ) -> Result<(), McpError>;

    /// Deep, override-semantics merge used by `registerCapabilities`.
    fn merge_self_capabilities(base: &mut Self::SelfCapabilities, extra: Self::SelfCapabilities);
}

/// The client side: self = [`ClientCapabilities`], remote = [`ServerCapabilities`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientRole;

impl RoleValidators for ClientRole {
    type SelfCapabilities = ClientCapabilities;
    type RemoteCapabilities = ServerCapabilities;

    fn validate_capability_for_method(
        remote: &ServerCapabilities,
        method: &str,
    ) -> Result<(), McpError> {
        if bypasses_capability_checks(method) {
            return Ok(());
        }
        match method {
            "logging/setLevel" => require(remote.logging.is_some(), "logging", method),
            "prompts/get" | "prompts/list" => require(remote.prompts.is_some(), "prompts", method),
            "resources/list" | "resources/templates/list" | "resources/read" => {
                require(remote.resources.is_some(), "resources", method)
            }
            "resources/subscribe" => {
                require(remote.supports_resource_subscribe(), "resources.subscribe", method)
            }
            "resources/unsubscribe" => require(remote.resources.is_some(), "resources", method),
            "tools/call" | "tools/list" => require(remote.tools.is_some(), "tools", method),
            "completion/complete" => require(remote.completions.is_some(), "completion", method),
            _ => Ok(()),
        }
    }

    fn validate_notification_capability(
        self_caps: &ClientCapabilities,
        method: &str,
    ) -> Result<(), McpError> {
        if bypasses_capability_checks(method) {
            return Ok(());
        }
        match method {
            "notifications/roots/list_changed" => {
                let supports = self_caps
                    .roots
                    .as_ref()
                    .is_some_and(|r| r.list_changed == Some(true));
                require(supports, "roots.listChanged", method)
            }
            _ => Ok(()),
        }
    }

    fn validate_request_handler_capability(
        self_caps: &ClientCapabilities,
        method: &str,
    ) -> Result<(), McpError> {
        if bypasses_capability_checks(method) {
            return Ok(());
        }
        match method {
            "sampling/createMessage" => require(self_caps.sampling.is_some(), "sampling", method),
            "roots/list" => require(self_caps.roots.is_some(), "roots", method),
            _ => Ok(()),
        }
    }

    fn merge_self_capabilities(base: &mut ClientCapabilities, extra: ClientCapabilities) {
        mcp_types::merge_client_capabilities(base, extra);
    }
}

/// The server side: self = [`ServerCapabilities`], remote = [`ClientCapabilities`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerRole;

impl RoleValidators for ServerRole {
    type SelfCapabilities = ServerCapabilities;
    type RemoteCapabilities = ClientCapabilities;

    fn validate_capability_for_method(
        remote: &ClientCapabilities,
        method: &str,
    ) -> Result<(), McpError> {
        if bypasses_capability_checks(method) {
            return Ok(());
        }
        match method {
            "sampling/createMessage" => require(remote.sampling.is_some(), "sampling", method),
            "roots/list" => require(remote.roots.is_some(), "roots", method),
            _ => Ok(()),
        }
    }

    fn validate_notification_capability(
        self_caps: &ServerCapabilities,
        method: &str,
    ) -> Result<(), McpError> {
        if bypasses_capability_checks(method) {
            return Ok(());
        }
        match method {
            "notifications/message" => require(self_caps.logging.is_some(), "logging", method),
            "notifications/resources/updated" | "notifications/resources/list_changed" => {
                require(self_caps.resources.is_some(), "resources", method)
            }
            "notifications/tools/list_changed" => {
                require(self_caps.tools.is_some(), "tools", method)
            }
            "notifications/prompts/list_changed" => {
                require(self_caps.prompts.is_some(), "prompts", method)
            }
            _ => Ok(()),
        }
    }

    fn validate_request_handler_capability(
        self_caps: &ServerCapabilities,
        method: &str,
    ) -> Result<(), McpError> {
        if method == "sampling/createMessage" {
            // The server role never serves sampling/createMessage: only a
            // client can satisfy a sampling request.
            return Err(McpError::CapabilityMissing(format!(
                "server does not support sampling (required for {method})"
            )));
        }
        if bypasses_capability_checks(method) {
            return Ok(());
        }
        match method {
            "logging/setLevel" => require(self_caps.logging.is_some(), "logging", method),
            "prompts/get" | "prompts/list" => require(self_caps.prompts.is_some(), "prompts", method),
            "resources/list" | "resources/templates/list" | "resources/read" => {
                require(self_caps.resources.is_some(), "resources", method)
            }
            "tools/call" | "tools/list" => require(self_caps.tools.is_some(), "tools", method),
            _ => Ok(()),
        }
    }

    fn merge_self_capabilities(base: &mut ServerCapabilities, extra: ServerCapabilities) {
        mcp_types::merge_server_capabilities(base, extra);
    }
}

fn require(supported: bool, capability: &str, method: &str) -> Result<(), McpError> {
    if supported {
        Ok(())
    } else {
        Err(McpError::CapabilityMissing(format!(
            "peer does not support {capability} (required for {method})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_types::ServerCapabilitiesResources;

    #[test]
    fn client_role_rejects_prompts_list_when_server_omits_prompts() {
        let remote = ServerCapabilities::default();
        let err = ClientRole::validate_capability_for_method(&remote, "prompts/list").unwrap_err();
        assert!(matches!(err, McpError::CapabilityMissing(msg) if msg.contains("prompts")));
    }

    #[test]
    fn client_role_rejects_subscribe_without_the_subscribe_flag() {
        let remote = ServerCapabilities {
            resources: Some(ServerCapabilitiesResources {
                subscribe: Some(false),
                list_changed: Some(false),
            }),
            ..Default::default()
        };
        let err =
            ClientRole::validate_capability_for_method(&remote, "resources/subscribe").unwrap_err();
        assert!(matches!(err, McpError::CapabilityMissing(msg) if msg.contains("subscribe")));
    }

    #[test]
    fn ping_and_initialize_bypass_every_validator() {
        let remote = ServerCapabilities::default();
        assert!(ClientRole::validate_capability_for_method(&remote, "ping").is_ok());
        assert!(ClientRole::validate_capability_for_method(&remote, "initialize").is_ok());
    }

    #[test]
    fn server_role_never_allows_registering_a_sampling_handler() {
        let self_caps = ServerCapabilities::default();
        let err = ServerRole::validate_request_handler_capability(
            &self_caps,
            "sampling/createMessage",
        )
        .unwrap_err();
        assert!(matches!(err, McpError::CapabilityMissing(_)));
    }
}
