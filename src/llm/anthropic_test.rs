use super::*;
use crate::llm::config::ProviderEndpoint;

fn make_response(content: serde_json::Value) -> String {
    serde_json::json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "content": content,
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 100, "output_tokens": 50 }
    })
    .to_string()
}

#[test]
fn request_uses_custom_header_and_separate_system() {
    let endpoint = ProviderEndpoint { base_url: "https://api.anthropic.com/v1".into(), model: "claude".into() };
    let req = AnthropicAdapter.build_request(RequestParts {
        endpoint: &endpoint,
        system: "SYS",
        prompt: "draw a state machine",
        credential: "sk-ant",
        max_tokens: 2048,
    });

    assert_eq!(req.url, "https://api.anthropic.com/v1/messages");
    assert!(req.headers.contains(&("x-api-key", "sk-ant".to_string())));
    assert!(req.headers.contains(&("anthropic-version", API_VERSION.to_string())));
    assert!(!req.headers.iter().any(|(name, _)| *name == "authorization"));
    assert_eq!(req.body["system"], "SYS");
    assert_eq!(req.body["max_tokens"], 2048);
    assert_eq!(req.body["messages"].as_array().map(Vec::len), Some(1));
    assert_eq!(req.body["messages"][0]["role"], "user");
    assert_eq!(req.body["messages"][0]["content"], "draw a state machine");
    assert!(!AnthropicAdapter.supports_streaming());
}

#[test]
fn parse_text_response() {
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "sequenceDiagram\nA->>B: hi" }
    ]));
    assert_eq!(AnthropicAdapter.parse_response(&json).as_deref(), Some("sequenceDiagram\nA->>B: hi"));
}

#[test]
fn parse_skips_thinking_blocks() {
    let json = make_response(serde_json::json!([
        { "type": "thinking", "thinking": "Let me think..." },
        { "type": "text", "text": "graph LR\nX-->Y" }
    ]));
    assert_eq!(AnthropicAdapter.parse_response(&json).as_deref(), Some("graph LR\nX-->Y"));
}

#[test]
fn parse_thinking_only_is_none() {
    let json = make_response(serde_json::json!([
        { "type": "thinking", "thinking": "Let me think..." }
    ]));
    assert!(AnthropicAdapter.parse_response(&json).is_none());
}

#[test]
fn parse_invalid_json_is_none() {
    assert!(AnthropicAdapter.parse_response("not json").is_none());
}
