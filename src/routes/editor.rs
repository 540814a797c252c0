//! Editor routes: source, theme, grid, generation, artifact, export.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use super::ApiError;
use crate::export::{ExportError, ExportFormat};
use crate::render::Theme;
use crate::services::editor::{EditorSnapshot, GenerationOutcome};
use crate::services::events::GridStyle;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SourceBody {
    pub source: String,
}

#[derive(Deserialize)]
pub struct ThemeBody {
    pub theme: Theme,
}

#[derive(Deserialize)]
pub struct GridBody {
    pub style: GridStyle,
}

#[derive(Deserialize)]
pub struct GenerateBody {
    pub prompt: String,
}

/// `GET /api/editor`: full editor snapshot.
pub async fn snapshot(State(state): State<AppState>) -> Json<EditorSnapshot> {
    Json(state.editor.snapshot())
}

/// `PUT /api/editor/source`: replace the source; the render follows on the event stream.
pub async fn set_source(State(state): State<AppState>, Json(body): Json<SourceBody>) -> StatusCode {
    state.editor.edit(body.source);
    StatusCode::ACCEPTED
}

/// `POST /api/editor/rerender`
pub async fn rerender(State(state): State<AppState>) -> StatusCode {
    state.editor.force_rerender();
    StatusCode::ACCEPTED
}

/// `PUT /api/editor/theme`
pub async fn set_theme(State(state): State<AppState>, Json(body): Json<ThemeBody>) -> Json<serde_json::Value> {
    state.editor.set_theme(body.theme);
    Json(serde_json::json!({ "theme": body.theme }))
}

/// `PUT /api/editor/grid`: `dotted`, `lined`, or `none`.
pub async fn set_grid(State(state): State<AppState>, Json(body): Json<GridBody>) -> Json<serde_json::Value> {
    state.editor.set_grid(body.style);
    Json(serde_json::json!({ "style": body.style }))
}

/// `POST /api/generate`: generate with the active provider and adopt the result.
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<GenerationOutcome>, ApiError> {
    Ok(Json(state.editor.generate(&body.prompt).await?))
}

/// `POST /api/generate/fix`: repair the current source using the last render error.
pub async fn fix(State(state): State<AppState>) -> Result<Json<GenerationOutcome>, ApiError> {
    Ok(Json(state.editor.fix_with_ai().await?))
}

/// `GET /api/artifact`: the current SVG markup.
pub async fn artifact(State(state): State<AppState>) -> Result<Response, ApiError> {
    let Some(artifact) = state.editor.artifact() else {
        return Err(ExportError::NoArtifact.into());
    };
    Ok(([(CONTENT_TYPE, ExportFormat::Svg.mime())], artifact.svg).into_response())
}

/// `GET /api/export/{format}`: download the artifact as svg, png, or pdf.
pub async fn export(State(state): State<AppState>, Path(format): Path<String>) -> Result<Response, ApiError> {
    let format: ExportFormat = format.parse()?;
    let output = state.editor.export(format).await?;
    let disposition = format!("attachment; filename=\"{}\"", output.file_name);

    Ok(([(CONTENT_TYPE, output.mime.to_string()), (CONTENT_DISPOSITION, disposition)], output.bytes).into_response())
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
