//! LLM configuration parsed from environment variables.

use std::collections::HashMap;

use super::types::ProviderId;
use crate::config::env_parse;

pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for LlmTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    }
}

/// Where one provider lives and which model it is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub model: String,
}

impl ProviderEndpoint {
    #[must_use]
    pub fn default_for(provider: ProviderId) -> Self {
        Self { base_url: default_base_url(provider).to_string(), model: default_model(provider).to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub timeouts: LlmTimeouts,
    pub max_tokens: u32,
    endpoints: HashMap<ProviderId, ProviderEndpoint>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let endpoints = ProviderId::ALL
            .into_iter()
            .map(|p| (p, ProviderEndpoint::default_for(p)))
            .collect();
        Self { timeouts: LlmTimeouts::default(), max_tokens: DEFAULT_LLM_MAX_TOKENS, endpoints }
    }
}

impl GeneratorConfig {
    /// Build typed generator config from environment variables.
    ///
    /// Every setting is optional:
    /// - `LLM_<PROVIDER>_BASE_URL`: endpoint base (e.g. `LLM_OPENAI_BASE_URL`)
    /// - `LLM_<PROVIDER>_MODEL`: model name
    /// - `LLM_MAX_TOKENS`: default 4096
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// Credentials are not read here; they come from the preferences store.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        for provider in ProviderId::ALL {
            let prefix = format!("LLM_{}", provider.as_str().to_ascii_uppercase());
            let mut endpoint = ProviderEndpoint::default_for(provider);
            if let Ok(base_url) = std::env::var(format!("{prefix}_BASE_URL")) {
                endpoint.base_url = base_url;
            }
            if let Ok(model) = std::env::var(format!("{prefix}_MODEL")) {
                endpoint.model = model;
            }
            config.set_endpoint(provider, endpoint);
        }
        config.max_tokens = env_parse("LLM_MAX_TOKENS", DEFAULT_LLM_MAX_TOKENS);
        config.timeouts = LlmTimeouts {
            request_secs: env_parse("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };
        config
    }

    /// Replace one provider's endpoint. Trailing slashes are dropped.
    pub fn set_endpoint(&mut self, provider: ProviderId, mut endpoint: ProviderEndpoint) {
        endpoint.base_url = endpoint.base_url.trim_end_matches('/').to_string();
        self.endpoints.insert(provider, endpoint);
    }

    #[must_use]
    pub fn endpoint(&self, provider: ProviderId) -> ProviderEndpoint {
        self.endpoints
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| ProviderEndpoint::default_for(provider))
    }
}

fn default_base_url(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::OpenAi => "https://api.openai.com/v1",
        ProviderId::Anthropic => "https://api.anthropic.com/v1",
        ProviderId::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        ProviderId::DeepSeek => "https://api.deepseek.com",
    }
}

fn default_model(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::OpenAi => "gpt-4o",
        ProviderId::Anthropic => "claude-sonnet-4-5-20250929",
        ProviderId::Gemini => "gemini-2.0-flash",
        ProviderId::DeepSeek => "deepseek-chat",
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
