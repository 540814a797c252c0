//! Google Gemini `generateContent` adapter.
//!
//! Gemini takes a single content-parts array without roles; the system
//! instruction rides along as the first part. The API key goes in the URL
//! query string.

use serde::{Deserialize, Serialize};

use super::provider::{ProviderAdapter, RequestParts};
use super::types::ProviderRequest;

pub struct GeminiAdapter;

impl ProviderAdapter for GeminiAdapter {
    fn build_request(&self, parts: RequestParts<'_>) -> ProviderRequest {
        let body = ApiRequest { contents: [ApiContent { parts: [ApiPart { text: parts.system }, ApiPart { text: parts.prompt }] }] };
        ProviderRequest {
            url: format!("{}/models/{}:generateContent", parts.endpoint.base_url, parts.endpoint.model),
            headers: Vec::new(),
            query: vec![("key", parts.credential.to_string())],
            body: serde_json::to_value(body).unwrap_or_default(),
        }
    }

    fn parse_response(&self, body: &str) -> Option<String> {
        let api: ApiResponse = serde_json::from_str(body).ok()?;
        let candidate = api.candidates.into_iter().next()?;
        let text: String = candidate
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        Some(text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    contents: [ApiContent<'a>; 1],
}

#[derive(Serialize)]
struct ApiContent<'a> {
    parts: [ApiPart<'a>; 2],
}

#[derive(Serialize)]
struct ApiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
