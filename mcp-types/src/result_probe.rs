//! Field-probing classification of an untyped JSON-RPC `result` object.
//!
//! The engine in `mcp-protocol` decodes responses using the *expected*
//! result type recorded when the request was sent (the recommended
//! refinement from the design notes), so this probing table is not on the
//! hot path. It exists for callers that only have a bare `result: Value`
//! with no in-flight context to consult — e.g. a codec unit test, or a
//! generic message inspector — and documents the discriminating field sets
//! from the wire format.

use serde_json::Value;

/// Which typed result shape a raw `result` object's field set matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Initialize,
    ReadResource,
    Complete,
    Empty,
    CallTool,
    ListResources,
    ListTools,
    ListPrompts,
    CreateMessage,
    ListRoots,
    ListResourceTemplates,
    GetPrompt,
    Unknown,
}

/// Classify `result` by the discriminating field-set table from the codec
/// design: the first matching row wins, checked in an order that resolves
/// the only two rows with overlapping prefixes (`ListResources` vs
/// `ListResourceTemplates`).
pub fn classify(result: &Value) -> ResultShape {
    let Value::Object(map) = result else {
        return ResultShape::Unknown;
    };
    if map.contains_key("protocolVersion") && map.contains_key("serverInfo") {
        ResultShape::Initialize
    } else if map.contains_key("contents") {
        ResultShape::ReadResource
    } else if map.contains_key("completion") {
        ResultShape::Complete
    } else if map.contains_key("content") {
        ResultShape::CallTool
    } else if map.contains_key("resourceTemplates") {
        ResultShape::ListResourceTemplates
    } else if map.contains_key("resources") {
        ResultShape::ListResources
    } else if map.contains_key("tools") {
        ResultShape::ListTools
    } else if map.contains_key("prompts") {
        ResultShape::ListPrompts
    } else if map.contains_key("description") && map.contains_key("messages") {
        ResultShape::GetPrompt
    } else if map.contains_key("model") && map.contains_key("role") && map.contains_key("content")
    {
        ResultShape::CreateMessage
    } else if map.contains_key("roots") {
        ResultShape::ListRoots
    } else if map.is_empty() {
        ResultShape::Empty
    } else {
        ResultShape::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_known_shapes() {
        assert_eq!(
            classify(&json!({"protocolVersion": "x", "capabilities": {}, "serverInfo": {}})),
            ResultShape::Initialize
        );
        assert_eq!(classify(&json!({"contents": []})), ResultShape::ReadResource);
        assert_eq!(classify(&json!({})), ResultShape::Empty);
        assert_eq!(classify(&json!({"tools": []})), ResultShape::ListTools);
        assert_eq!(
            classify(&json!({"resourceTemplates": []})),
            ResultShape::ListResourceTemplates
        );
        assert_eq!(classify(&json!({"resources": []})), ResultShape::ListResources);
    }

    #[test]
    fn unmatched_object_is_unknown() {
        assert_eq!(classify(&json!({"foo": 1})), ResultShape::Unknown);
    }
}
