use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Polymorphic content carried by tool results and prompt messages. The
/// `type` field is the discriminator; the codec dispatches on it elementwise
/// as required for `CallToolResult.content` and `GetPromptResult.messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    TextContent(TextContent),
    #[serde(rename = "image")]
    ImageContent(ImageContent),
    #[serde(rename = "audio")]
    AudioContent(AudioContent),
    #[serde(rename = "resource")]
    EmbeddedResource(EmbeddedResource),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub data: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioContent {
    pub data: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedResource {
    pub resource: ResourceContents,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
}

/// The contents of a resource, embedded into a prompt or tool call result,
/// or returned directly from `resources/read`. Discriminated on the
/// presence of `text` vs `blob` rather than an explicit `type` tag, per the
/// upstream schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceContents {
    Text(TextResourceContents),
    Blob(BlobResourceContents),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResourceContents {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobResourceContents {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub blob: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dispatches_content_block_by_type() {
        let raw = json!({"type": "text", "text": "hi"});
        let block: ContentBlock = serde_json::from_value(raw).unwrap();
        assert!(matches!(block, ContentBlock::TextContent(TextContent { text, .. }) if text == "hi"));
    }

    #[test]
    fn resource_contents_dispatch_on_text_vs_blob() {
        let text = json!({"uri": "file:///a", "text": "hello"});
        let contents: ResourceContents = serde_json::from_value(text).unwrap();
        assert!(matches!(contents, ResourceContents::Text(_)));

        let blob = json!({"uri": "file:///b", "blob": "ZGF0YQ=="});
        let contents: ResourceContents = serde_json::from_value(blob).unwrap();
        assert!(matches!(contents, ResourceContents::Blob(_)));
    }
}
