use super::*;
use crate::llm::config::ProviderEndpoint;

#[test]
fn request_puts_key_in_query_and_has_no_roles() {
    let endpoint = ProviderEndpoint {
        base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
        model: "gemini-2.0-flash".into(),
    };
    let req = GeminiAdapter.build_request(RequestParts {
        endpoint: &endpoint,
        system: "SYS",
        prompt: "class diagram for a zoo",
        credential: "g-key",
        max_tokens: 100,
    });

    assert_eq!(
        req.url,
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
    );
    assert!(req.headers.is_empty());
    assert_eq!(req.query, vec![("key", "g-key".to_string())]);

    let parts = req.body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["text"], "SYS");
    assert_eq!(parts[1]["text"], "class diagram for a zoo");
    assert!(req.body["contents"][0].get("role").is_none());
}

#[test]
fn parse_first_candidate_text() {
    let body = serde_json::json!({
        "candidates": [
            { "content": { "parts": [{ "text": "graph TD\n" }, { "text": "A-->B" }], "role": "model" } },
            { "content": { "parts": [{ "text": "ignored" }] } }
        ]
    })
    .to_string();
    assert_eq!(GeminiAdapter.parse_response(&body).as_deref(), Some("graph TD\nA-->B"));
}

#[test]
fn parse_blocked_candidate_is_none() {
    let body = serde_json::json!({ "candidates": [{ "finishReason": "SAFETY" }] }).to_string();
    assert!(GeminiAdapter.parse_response(&body).is_none());
    assert!(GeminiAdapter.parse_response(r#"{"promptFeedback":{}}"#).is_none());
}
