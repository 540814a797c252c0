//! Anthropic Messages API adapter.
//!
//! The system instruction travels in its own `system` field rather than as a
//! message. Authentication is a custom `x-api-key` header plus a pinned API
//! version.

use serde::{Deserialize, Serialize};

use super::provider::{ProviderAdapter, RequestParts};
use super::types::ProviderRequest;

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter;

impl ProviderAdapter for AnthropicAdapter {
    fn build_request(&self, parts: RequestParts<'_>) -> ProviderRequest {
        let body = ApiRequest {
            model: &parts.endpoint.model,
            max_tokens: parts.max_tokens,
            system: parts.system,
            messages: [ApiMessage { role: "user", content: parts.prompt }],
        };
        ProviderRequest {
            url: format!("{}/messages", parts.endpoint.base_url),
            headers: vec![("x-api-key", parts.credential.to_string()), ("anthropic-version", API_VERSION.to_string())],
            query: Vec::new(),
            body: serde_json::to_value(body).unwrap_or_default(),
        }
    }

    fn parse_response(&self, body: &str) -> Option<String> {
        let api: ApiResponse = serde_json::from_str(body).ok()?;
        api.content.into_iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Unknown => None,
        })
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [ApiMessage<'a>; 1],
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    /// Thinking blocks and anything newer are skipped.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
