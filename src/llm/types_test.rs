use super::*;
use crate::frame::ErrorCode;

fn request(prompt: &str, credential: &str) -> GenerationRequest {
    GenerationRequest { prompt: prompt.into(), provider: ProviderId::OpenAi, credential: credential.into() }
}

#[test]
fn provider_ids_round_trip_through_str() {
    for provider in ProviderId::ALL {
        assert_eq!(provider.as_str().parse::<ProviderId>().unwrap(), provider);
    }
}

#[test]
fn unknown_provider_is_rejected() {
    let err = "mistral".parse::<ProviderId>().unwrap_err();
    assert!(matches!(err, GenerationError::UnknownProvider(ref s) if s == "mistral"));
}

#[test]
fn provider_serde_matches_storage_ids() {
    assert_eq!(serde_json::to_string(&ProviderId::OpenAi).unwrap(), "\"openai\"");
    assert_eq!(serde_json::to_string(&ProviderId::DeepSeek).unwrap(), "\"deepseek\"");
    let parsed: ProviderId = serde_json::from_str("\"gemini\"").unwrap();
    assert_eq!(parsed, ProviderId::Gemini);
}

#[test]
fn missing_credential_checked_before_prompt() {
    let err = request("flowchart for login", "").validate().unwrap_err();
    assert!(matches!(err, GenerationError::MissingCredential(ProviderId::OpenAi)));

    let err = request("", "   ").validate().unwrap_err();
    assert!(matches!(err, GenerationError::MissingCredential(_)));
}

#[test]
fn blank_prompt_is_empty_prompt() {
    let err = request("", "sk-1").validate().unwrap_err();
    assert!(matches!(err, GenerationError::EmptyPrompt));

    let err = request(" \n\t", "sk-1").validate().unwrap_err();
    assert!(matches!(err, GenerationError::EmptyPrompt));
}

#[test]
fn valid_request_passes() {
    assert!(request("flowchart for login", "sk-1").validate().is_ok());
}

#[test]
fn debug_output_redacts_credential() {
    let dbg = format!("{:?}", request("p", "sk-secret"));
    assert!(!dbg.contains("sk-secret"));
    assert!(dbg.contains("<redacted>"));
}

#[test]
fn provider_request_debug_hides_header_values() {
    let req = ProviderRequest {
        url: "https://example.test/v1".into(),
        headers: vec![("authorization", "Bearer sk-secret".into())],
        query: vec![("key", "g-secret".into())],
        body: serde_json::json!({}),
    };
    let dbg = format!("{req:?}");
    assert!(dbg.contains("authorization"));
    assert!(!dbg.contains("sk-secret"));
    assert!(!dbg.contains("g-secret"));
}

#[test]
fn error_codes_and_retryability() {
    assert_eq!(GenerationError::EmptyPrompt.error_code(), "E_EMPTY_PROMPT");
    assert!(!GenerationError::MissingCredential(ProviderId::Gemini).retryable());
    assert!(GenerationError::Timeout.retryable());
    assert!(GenerationError::Http { status: 503, provider_message: String::new() }.retryable());
    assert!(!GenerationError::Http { status: 401, provider_message: String::new() }.retryable());
}

#[test]
fn missing_credential_message_names_provider() {
    let msg = GenerationError::MissingCredential(ProviderId::Anthropic).to_string();
    assert!(msg.contains("Anthropic"));
}
