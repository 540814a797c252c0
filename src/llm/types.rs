//! LLM types: provider identifiers, generation requests, and errors.
//!
//! Provider-neutral types shared by every adapter and by the orchestrator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

// =============================================================================
// PROVIDER ID
// =============================================================================

/// One of the fixed set of AI completion services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// `OpenAI` chat completions. Streams.
    #[default]
    OpenAi,
    /// Anthropic messages API.
    Anthropic,
    /// Google Gemini `generateContent`.
    Gemini,
    /// `DeepSeek` chat completions.
    DeepSeek,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [Self::OpenAi, Self::Anthropic, Self::Gemini, Self::DeepSeek];

    /// Stable identifier used in storage keys and on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::DeepSeek => "deepseek",
        }
    }

    /// Human-facing name for notifications.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Gemini",
            Self::DeepSeek => "DeepSeek",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| GenerationError::UnknownProvider(s.to_string()))
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// One AI call. Lives only for the duration of the call.
#[derive(Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub provider: ProviderId,
    pub credential: String,
}

impl fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("prompt", &self.prompt)
            .field("provider", &self.provider)
            .field("credential", &"<redacted>")
            .finish()
    }
}

impl GenerationRequest {
    /// Check preconditions that must hold before any network call.
    ///
    /// # Errors
    ///
    /// `MissingCredential` for a blank credential (checked first), then
    /// `EmptyPrompt` for a blank prompt.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.credential.trim().is_empty() {
            return Err(GenerationError::MissingCredential(self.provider));
        }
        if self.prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        Ok(())
    }
}

/// Receives every partial accumulation of a streamed completion.
pub type ProgressSender = mpsc::UnboundedSender<String>;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by AI generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No credential saved for the provider. Caller must prompt for one.
    #[error("no API key configured for {}", .0.label())]
    MissingCredential(ProviderId),

    /// Prompt was empty or whitespace-only.
    #[error("prompt is empty")]
    EmptyPrompt,

    /// The provider identifier is not one of the supported set.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// The endpoint answered with a non-success status.
    #[error("provider returned status {status}: {provider_message}")]
    Http { status: u16, provider_message: String },

    /// The call succeeded but no usable text came back.
    #[error("provider returned an empty completion")]
    EmptyCompletion,

    /// Network-level failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,
}

impl crate::frame::ErrorCode for GenerationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCredential(_) => "E_MISSING_CREDENTIAL",
            Self::EmptyPrompt => "E_EMPTY_PROMPT",
            Self::UnknownProvider(_) => "E_UNKNOWN_PROVIDER",
            Self::Http { .. } => "E_PROVIDER_HTTP",
            Self::EmptyCompletion => "E_EMPTY_COMPLETION",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Timeout => "E_TIMEOUT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout | Self::EmptyCompletion)
            || matches!(self, Self::Http { status: 429 | 500..=599, .. })
    }
}

impl From<reqwest::Error> for GenerationError {
    /// The URL is stripped: some providers carry the credential in the query.
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() { Self::Timeout } else { Self::Transport(e.without_url().to_string()) }
    }
}

// =============================================================================
// PROVIDER REQUEST
// =============================================================================

/// A fully built provider call: where to POST, how to authenticate, what to send.
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub query: Vec<(&'static str, String)>,
    pub body: serde_json::Value,
}

impl fmt::Debug for ProviderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| *name).collect();
        let query_names: Vec<&str> = self.query.iter().map(|(name, _)| *name).collect();
        f.debug_struct("ProviderRequest")
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("query", &query_names)
            .field("body", &self.body)
            .finish()
    }
}

// =============================================================================
// GENERATOR TRAIT
// =============================================================================

/// Provider-neutral async trait for diagram generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait DiagramGenerator: Send + Sync {
    /// Turn a natural-language prompt into diagram source.
    ///
    /// When `progress` is given and the provider streams, every partial
    /// accumulation is sent through it before the final value is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] for failed preconditions, transport or
    /// HTTP failures, and empty completions.
    async fn generate(
        &self,
        request: &GenerationRequest,
        progress: Option<&ProgressSender>,
    ) -> Result<String, GenerationError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
