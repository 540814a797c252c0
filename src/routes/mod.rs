//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the HTTP and websocket endpoints of the editor under a
//! single Axum router. REST handlers cover one-shot operations; the socket
//! carries the editor event stream plus latency-sensitive inbound requests
//! (edits, viewport gestures).
//!
//! ERROR HANDLING
//! ==============
//! Every typed error leaves as [`ApiError`]: a status plus a JSON body of
//! `{ code, message, retryable }` built from the error's [`ErrorCode`].

pub mod editor;
pub mod preferences;
pub mod viewport;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::store::PrefsError;
use crate::export::ExportError;
use crate::frame::ErrorCode;
use crate::llm::GenerationError;
use crate::state::AppState;

// =============================================================================
// ROUTER
// =============================================================================

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/editor", get(editor::snapshot))
        .route("/api/editor/source", put(editor::set_source))
        .route("/api/editor/rerender", post(editor::rerender))
        .route("/api/editor/theme", put(editor::set_theme))
        .route("/api/editor/grid", put(editor::set_grid))
        .route("/api/generate", post(editor::generate))
        .route("/api/generate/fix", post(editor::fix))
        .route("/api/artifact", get(editor::artifact))
        .route("/api/export/{format}", get(editor::export))
        .route("/api/viewport", get(viewport::current))
        .route("/api/viewport/drag/begin", post(viewport::drag_begin))
        .route("/api/viewport/drag/move", post(viewport::drag_move))
        .route("/api/viewport/drag/end", post(viewport::drag_end))
        .route("/api/viewport/zoom", post(viewport::zoom))
        .route("/api/viewport/wheel", post(viewport::wheel))
        .route("/api/viewport/reset", post(viewport::reset))
        .route("/api/viewport/fit", post(viewport::fit))
        .route("/api/viewport/container", post(viewport::container))
        .route("/api/preferences", get(preferences::summary))
        .route("/api/preferences/provider", put(preferences::set_provider))
        .route("/api/preferences/credentials/{provider}", put(preferences::save_credential))
        .route("/api/preferences/tips-seen", post(preferences::tips_seen))
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// API ERROR
// =============================================================================

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { status, code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "code": self.code,
            "message": self.message,
            "retryable": self.retryable,
        });
        (self.status, Json(body)).into_response()
    }
}

pub(crate) fn generation_status(err: &GenerationError) -> StatusCode {
    match err {
        GenerationError::MissingCredential(_) | GenerationError::EmptyPrompt | GenerationError::UnknownProvider(_) => {
            StatusCode::BAD_REQUEST
        }
        GenerationError::Http { .. } | GenerationError::EmptyCompletion | GenerationError::Transport(_) => {
            StatusCode::BAD_GATEWAY
        }
        GenerationError::Timeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

pub(crate) fn export_status(err: &ExportError) -> StatusCode {
    match err {
        ExportError::NoArtifact => StatusCode::CONFLICT,
        ExportError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
        ExportError::SerializationFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        Self::new(generation_status(&err), &err)
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        Self::new(export_status(&err), &err)
    }
}

impl From<PrefsError> for ApiError {
    fn from(err: PrefsError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, &err)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
