//! Preference routes. Credentials go in, never come out.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use super::ApiError;
use crate::llm::{GenerationError, ProviderId};
use crate::services::preferences::PreferencesSummary;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ProviderBody {
    pub provider: ProviderId,
}

#[derive(Deserialize)]
pub struct CredentialBody {
    pub credential: String,
}

/// `GET /api/preferences`
pub async fn summary(State(state): State<AppState>) -> Json<PreferencesSummary> {
    Json(state.editor.preferences().summary())
}

/// `PUT /api/preferences/provider`
pub async fn set_provider(
    State(state): State<AppState>,
    Json(body): Json<ProviderBody>,
) -> Result<Json<PreferencesSummary>, ApiError> {
    state.editor.set_active_provider(body.provider).await?;
    Ok(Json(state.editor.preferences().summary()))
}

/// `PUT /api/preferences/credentials/{provider}`: a blank credential clears it.
pub async fn save_credential(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(body): Json<CredentialBody>,
) -> Result<Json<PreferencesSummary>, ApiError> {
    let provider: ProviderId = provider
        .parse()
        .map_err(|e: GenerationError| ApiError::new(StatusCode::NOT_FOUND, &e))?;
    state.editor.save_credential(provider, &body.credential).await?;
    Ok(Json(state.editor.preferences().summary()))
}

/// `POST /api/preferences/tips-seen`
pub async fn tips_seen(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.editor.mark_tips_seen().await?;
    Ok(StatusCode::NO_CONTENT)
}
