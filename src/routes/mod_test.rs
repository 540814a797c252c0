use super::*;
use crate::llm::ProviderId;
use crate::state::test_helpers;

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn generation_status_maps_precondition_failures_to_bad_request() {
    assert_eq!(generation_status(&GenerationError::EmptyPrompt), StatusCode::BAD_REQUEST);
    assert_eq!(generation_status(&GenerationError::MissingCredential(ProviderId::Gemini)), StatusCode::BAD_REQUEST);
}

#[test]
fn generation_status_maps_provider_failures_to_gateway() {
    let http = GenerationError::Http { status: 500, provider_message: "boom".into() };
    assert_eq!(generation_status(&http), StatusCode::BAD_GATEWAY);
    assert_eq!(generation_status(&GenerationError::Timeout), StatusCode::GATEWAY_TIMEOUT);
}

#[test]
fn export_status_maps_no_artifact_to_conflict() {
    assert_eq!(export_status(&ExportError::NoArtifact), StatusCode::CONFLICT);
    assert_eq!(export_status(&ExportError::UnsupportedFormat("gif".into())), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn api_error_body_carries_code_and_retryable() {
    let err: ApiError = GenerationError::Timeout.into();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

    let body = body_json(response).await;
    assert_eq!(body["code"], "E_TIMEOUT");
    assert_eq!(body["retryable"], true);
    assert_eq!(body["message"], "request timed out");
}

#[tokio::test]
async fn healthz_answers_ok() {
    let (state, _, _) = test_helpers::test_app_state().await;
    let addr = test_helpers::serve_app(state).await;
    let response = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}
