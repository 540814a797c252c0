//! `DeepSeek` chat completions adapter (buffered).

use super::openai::{chat_completions_body, parse_chat_completion};
use super::provider::{ProviderAdapter, RequestParts};
use super::types::ProviderRequest;

pub struct DeepSeekAdapter;

impl ProviderAdapter for DeepSeekAdapter {
    fn build_request(&self, parts: RequestParts<'_>) -> ProviderRequest {
        ProviderRequest {
            url: format!("{}/chat/completions", parts.endpoint.base_url),
            headers: vec![("authorization", format!("Bearer {}", parts.credential))],
            query: Vec::new(),
            body: chat_completions_body(parts, false),
        }
    }

    fn parse_response(&self, body: &str) -> Option<String> {
        parse_chat_completion(body)
    }
}
