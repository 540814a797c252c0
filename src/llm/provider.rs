//! Provider capability: one adapter per AI service.
//!
//! DESIGN
//! ======
//! Each service differs in endpoint path, authentication, request body, and
//! response shape. An adapter captures exactly those differences; the
//! completion client owns transport, status handling, streaming, and cleanup,
//! and never branches on provider identity.

use super::anthropic::AnthropicAdapter;
use super::config::ProviderEndpoint;
use super::deepseek::DeepSeekAdapter;
use super::gemini::GeminiAdapter;
use super::openai::OpenAiAdapter;
use super::types::{ProviderId, ProviderRequest};

/// Inputs every adapter needs to build a call.
#[derive(Debug, Clone, Copy)]
pub struct RequestParts<'a> {
    pub endpoint: &'a ProviderEndpoint,
    pub system: &'a str,
    pub prompt: &'a str,
    pub credential: &'a str,
    pub max_tokens: u32,
}

pub trait ProviderAdapter: Send + Sync {
    /// `true` when responses arrive as `data:` records instead of one JSON body.
    fn supports_streaming(&self) -> bool {
        false
    }

    fn build_request(&self, parts: RequestParts<'_>) -> ProviderRequest;

    /// Extract the first candidate's text from a buffered response body.
    fn parse_response(&self, body: &str) -> Option<String>;

    /// Extract the text delta from one streamed record.
    fn parse_stream_record(&self, _record: &str) -> Option<String> {
        None
    }
}

static OPENAI: OpenAiAdapter = OpenAiAdapter;
static ANTHROPIC: AnthropicAdapter = AnthropicAdapter;
static GEMINI: GeminiAdapter = GeminiAdapter;
static DEEPSEEK: DeepSeekAdapter = DeepSeekAdapter;

impl ProviderId {
    /// The adapter implementing this provider's protocol.
    #[must_use]
    pub fn adapter(self) -> &'static dyn ProviderAdapter {
        match self {
            Self::OpenAi => &OPENAI,
            Self::Anthropic => &ANTHROPIC,
            Self::Gemini => &GEMINI,
            Self::DeepSeek => &DEEPSEEK,
        }
    }
}

/// Pull a human-readable message out of a provider error body.
///
/// All four services wrap errors as `{"error": {"message": ...}}`; Gemini
/// sometimes returns a top-level array of those. Falls back to the raw body,
/// truncated.
#[must_use]
pub fn extract_provider_message(body: &str) -> String {
    const MAX_RAW_LEN: usize = 300;

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let error = value
            .get("error")
            .or_else(|| value.get(0).and_then(|first| first.get("error")));
        if let Some(message) = error.and_then(|e| e.get("message")).and_then(serde_json::Value::as_str) {
            return message.to_string();
        }
        if let Some(message) = error.and_then(serde_json::Value::as_str) {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.len() <= MAX_RAW_LEN {
        return trimmed.to_string();
    }
    let mut end = MAX_RAW_LEN;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &trimmed[..end])
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
