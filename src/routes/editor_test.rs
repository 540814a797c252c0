use crate::state::test_helpers::{self, CANNED_DIAGRAM};
use serde_json::{Value, json};
use std::time::Duration;

async fn app() -> (String, crate::state::AppState) {
    let (state, _, _) = test_helpers::test_app_state().await;
    let addr = test_helpers::serve_app(state.clone()).await;
    (format!("http://{addr}"), state)
}

/// Poll `GET /api/artifact` until a render lands.
async fn wait_for_artifact(base: &str) -> reqwest::Response {
    let client = reqwest::Client::new();
    for _ in 0..100 {
        let response = client.get(format!("{base}/api/artifact")).send().await.unwrap();
        if response.status().is_success() {
            return response;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("render never committed");
}

#[tokio::test]
async fn source_put_renders_and_artifact_is_served() {
    let (base, state) = app().await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{base}/api/editor/source"))
        .json(&json!({ "source": "graph TD\nA-->B" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

    let artifact = wait_for_artifact(&base).await;
    assert_eq!(artifact.headers()["content-type"], "image/svg+xml");
    assert_eq!(artifact.text().await.unwrap(), state.editor.artifact().unwrap().svg);

    let snapshot: Value = client.get(format!("{base}/api/editor")).send().await.unwrap().json().await.unwrap();
    assert_eq!(snapshot["source"], "graph TD\nA-->B");
    assert_eq!(snapshot["error"]["active"], false);
    assert_eq!(snapshot["render"]["status"], "success");
}

#[tokio::test]
async fn artifact_before_render_is_conflict() {
    let (base, _) = app().await;
    let response = reqwest::get(format!("{base}/api/artifact")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "E_NO_ARTIFACT");
}

#[tokio::test]
async fn export_rejects_unknown_format() {
    let (base, _) = app().await;
    let response = reqwest::get(format!("{base}/api/export/gif")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "E_EXPORT_FORMAT");
}

#[tokio::test]
async fn export_svg_is_attachment_of_artifact() {
    let (base, state) = app().await;
    state.editor.edit("graph TD\nA-->B");
    wait_for_artifact(&base).await;

    let response = reqwest::get(format!("{base}/api/export/SVG")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()["content-disposition"], "attachment; filename=\"diagram.svg\"");
    let bytes = response.bytes().await.unwrap();
    assert_eq!(bytes.as_ref(), state.editor.artifact().unwrap().svg.as_bytes());
}

#[tokio::test]
async fn generate_without_credential_is_bad_request() {
    let (base, state) = app().await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/generate"))
        .json(&json!({ "prompt": "login flow" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "E_MISSING_CREDENTIAL");
    assert_eq!(body["retryable"], false);
    assert_eq!(state.editor.source(), "");
}

#[tokio::test]
async fn generate_with_credential_adopts_result() {
    let (base, state) = app().await;
    let client = reqwest::Client::new();
    client
        .put(format!("{base}/api/preferences/credentials/openai"))
        .json(&json!({ "credential": "sk-test" }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{base}/api/generate"))
        .json(&json!({ "prompt": "two steps" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["outcome"], "adopted");
    assert_eq!(body["source"], CANNED_DIAGRAM);
    assert_eq!(state.editor.source(), CANNED_DIAGRAM);
}

#[tokio::test]
async fn fix_without_failure_reports_nothing_to_fix() {
    let (base, _) = app().await;
    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/generate/fix"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["outcome"], "nothing_to_fix");
}

#[tokio::test]
async fn theme_and_grid_are_reflected_in_snapshot() {
    let (base, _) = app().await;
    let client = reqwest::Client::new();
    client.put(format!("{base}/api/editor/theme")).json(&json!({ "theme": "light" })).send().await.unwrap();
    client.put(format!("{base}/api/editor/grid")).json(&json!({ "style": "none" })).send().await.unwrap();

    let snapshot: Value = client.get(format!("{base}/api/editor")).send().await.unwrap().json().await.unwrap();
    assert_eq!(snapshot["theme"], "light");
    assert_eq!(snapshot["grid"], "none");
}

#[tokio::test]
async fn unknown_grid_style_is_rejected() {
    let (base, _) = app().await;
    let response = reqwest::Client::new()
        .put(format!("{base}/api/editor/grid"))
        .json(&json!({ "style": "hexagonal" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn viewport_zoom_is_clamped() {
    let (base, _) = app().await;
    let state: Value = reqwest::Client::new()
        .post(format!("{base}/api/viewport/zoom"))
        .json(&json!({ "delta": -10.0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["scale"], crate::viewport::MIN_SCALE);
}

#[tokio::test]
async fn preferences_never_return_credentials() {
    let (base, _) = app().await;
    let client = reqwest::Client::new();
    let response = client
        .put(format!("{base}/api/preferences/credentials/anthropic"))
        .json(&json!({ "credential": "sk-ant-secret" }))
        .send()
        .await
        .unwrap();
    let text = response.text().await.unwrap();
    assert!(!text.contains("sk-ant-secret"));

    let summary: Value = client.get(format!("{base}/api/preferences")).send().await.unwrap().json().await.unwrap();
    let anthropic = summary["providers"].as_array().unwrap().iter().find(|p| p["id"] == "anthropic").unwrap();
    assert_eq!(anthropic["has_credential"], true);
}

#[tokio::test]
async fn credential_for_unknown_provider_is_not_found() {
    let (base, _) = app().await;
    let response = reqwest::Client::new()
        .put(format!("{base}/api/preferences/credentials/bard"))
        .json(&json!({ "credential": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
