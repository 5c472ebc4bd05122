use serde::Deserialize;
use serde::Serialize;

/// A filesystem (or other URI-addressable) root the client exposes to the
/// server, always `file://`-prefixed in practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
