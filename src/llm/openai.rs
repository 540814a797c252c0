//! `OpenAI` chat completions adapter (streaming).
//!
//! `DeepSeek` speaks the same wire format, so the body builder and parsers
//! here are shared with [`super::deepseek`].

use serde::{Deserialize, Serialize};

use super::provider::{ProviderAdapter, RequestParts};
use super::types::ProviderRequest;

pub struct OpenAiAdapter;

impl ProviderAdapter for OpenAiAdapter {
    fn supports_streaming(&self) -> bool {
        true
    }

    fn build_request(&self, parts: RequestParts<'_>) -> ProviderRequest {
        ProviderRequest {
            url: format!("{}/chat/completions", parts.endpoint.base_url),
            headers: vec![("authorization", format!("Bearer {}", parts.credential))],
            query: Vec::new(),
            body: chat_completions_body(parts, true),
        }
    }

    fn parse_response(&self, body: &str) -> Option<String> {
        parse_chat_completion(body)
    }

    fn parse_stream_record(&self, record: &str) -> Option<String> {
        parse_chat_completion_delta(record)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    messages: [CcMessage<'a>; 2],
    stream: bool,
}

#[derive(Serialize)]
struct CcMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CcResponse {
    #[serde(default)]
    choices: Vec<CcChoice>,
}

#[derive(Deserialize)]
struct CcChoice {
    message: Option<CcContent>,
    delta: Option<CcContent>,
}

#[derive(Deserialize)]
struct CcContent {
    content: Option<String>,
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

pub(crate) fn chat_completions_body(parts: RequestParts<'_>, stream: bool) -> serde_json::Value {
    let body = CcRequest {
        model: &parts.endpoint.model,
        messages: [
            CcMessage { role: "system", content: parts.system },
            CcMessage { role: "user", content: parts.prompt },
        ],
        stream,
    };
    serde_json::to_value(body).unwrap_or_default()
}

/// `choices[0].message.content` of a buffered response.
pub(crate) fn parse_chat_completion(body: &str) -> Option<String> {
    let response: CcResponse = serde_json::from_str(body).ok()?;
    response
        .choices
        .into_iter()
        .next()?
        .message?
        .content
}

/// `choices[0].delta.content` of one streamed record.
pub(crate) fn parse_chat_completion_delta(record: &str) -> Option<String> {
    let response: CcResponse = serde_json::from_str(record).ok()?;
    response
        .choices
        .into_iter()
        .next()?
        .delta?
        .content
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
