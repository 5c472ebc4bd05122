use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Capabilities a client may advertise during `initialize`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roots: Option<ClientCapabilitiesRoots>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elicitation: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilitiesRoots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Capabilities a server may advertise during `initialize`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<ServerCapabilitiesPrompts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ServerCapabilitiesResources>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ServerCapabilitiesTools>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilitiesPrompts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilitiesResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilitiesTools {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

impl ServerCapabilities {
    /// True when `resources/subscribe` may be sent to this peer.
    pub fn supports_resource_subscribe(&self) -> bool {
        matches!(
            self.resources,
            Some(ServerCapabilitiesResources {
                subscribe: Some(true),
                ..
            })
        )
    }
}

/// Deep, override-semantics merge used by `registerCapabilities`: scalar and
/// `Option` fields present in `extra` replace the receiver's; absent fields
/// are left untouched.
pub fn merge_server_capabilities(
    base: &mut ServerCapabilities,
    extra: ServerCapabilities,
) {
    if extra.experimental.is_some() {
        base.experimental = extra.experimental;
    }
    if extra.logging.is_some() {
        base.logging = extra.logging;
    }
    if extra.completions.is_some() {
        base.completions = extra.completions;
    }
    if extra.prompts.is_some() {
        base.prompts = extra.prompts;
    }
    if extra.resources.is_some() {
        base.resources = extra.resources;
    }
    if extra.tools.is_some() {
        base.tools = extra.tools;
    }
}

pub fn merge_client_capabilities(base: &mut ClientCapabilities, extra: ClientCapabilities) {
    if extra.experimental.is_some() {
        base.experimental = extra.experimental;
    }
    if extra.roots.is_some() {
        base.roots = extra.roots;
    }
    if extra.sampling.is_some() {
        base.sampling = extra.sampling;
    }
    if extra.elicitation.is_some() {
        base.elicitation = extra.elicitation;
    }
}
