use super::*;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// # Safety
/// Callers must hold `ENV_LOCK` to avoid env races between tests.
unsafe fn clear_llm_env() {
    unsafe {
        for provider in ProviderId::ALL {
            let prefix = format!("LLM_{}", provider.as_str().to_ascii_uppercase());
            std::env::remove_var(format!("{prefix}_BASE_URL"));
            std::env::remove_var(format!("{prefix}_MODEL"));
        }
        std::env::remove_var("LLM_MAX_TOKENS");
        std::env::remove_var("LLM_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("LLM_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_llm_env() };

    let cfg = GeneratorConfig::from_env();
    assert_eq!(cfg, GeneratorConfig::default());
    assert_eq!(cfg.max_tokens, DEFAULT_LLM_MAX_TOKENS);
    assert_eq!(
        cfg.timeouts,
        LlmTimeouts { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.endpoint(ProviderId::OpenAi).base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.endpoint(ProviderId::Anthropic).model, "claude-sonnet-4-5-20250929");
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_OPENAI_BASE_URL", "https://example.test/v1/");
        std::env::set_var("LLM_GEMINI_MODEL", "gemini-exp");
        std::env::set_var("LLM_MAX_TOKENS", "512");
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("LLM_CONNECT_TIMEOUT_SECS", "7");
    }

    let cfg = GeneratorConfig::from_env();
    assert_eq!(cfg.endpoint(ProviderId::OpenAi).base_url, "https://example.test/v1");
    assert_eq!(cfg.endpoint(ProviderId::OpenAi).model, "gpt-4o");
    assert_eq!(cfg.endpoint(ProviderId::Gemini).model, "gemini-exp");
    assert_eq!(cfg.max_tokens, 512);
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });

    unsafe { clear_llm_env() };
}

#[test]
fn set_endpoint_trims_trailing_slash() {
    let mut cfg = GeneratorConfig::default();
    cfg.set_endpoint(
        ProviderId::DeepSeek,
        ProviderEndpoint { base_url: "http://127.0.0.1:9000//".into(), model: "m".into() },
    );
    assert_eq!(cfg.endpoint(ProviderId::DeepSeek).base_url, "http://127.0.0.1:9000");
}
