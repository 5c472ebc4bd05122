use serde::Deserialize;
use serde::Serialize;

/// Identifies the application implementing either side of the connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Implementation {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Extra suffix appended to the HTTP user agent when this peer acts as
    /// an MCP server reached over a network transport. Unused by the stdio
    /// transport but carried through so embedders can populate it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}
