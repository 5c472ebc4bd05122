use mcp_types::result_probe::ResultShape;
use mcp_types::result_probe::classify;
use serde_json::json;

#[test]
fn call_tool_result_is_classified_by_content_field() {
    let result = json!({
        "content": [{"type": "text", "text": "ok"}],
        "isError": false
    });
    assert_eq!(classify(&result), ResultShape::CallTool);
}

#[test]
fn create_message_result_is_classified_by_model_role_content() {
    let result = json!({
        "model": "claude",
        "role": "assistant",
        "content": {"type": "text", "text": "hi"}
    });
    assert_eq!(classify(&result), ResultShape::CreateMessage);
}

#[test]
fn list_resource_templates_wins_over_list_resources() {
    let result = json!({"resourceTemplates": []});
    assert_eq!(classify(&result), ResultShape::ListResourceTemplates);
}
