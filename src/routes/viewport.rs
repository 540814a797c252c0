//! Viewport routes. Every operation answers with the resulting state.

use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use crate::render::Bounds;
use crate::state::AppState;
use crate::viewport::ViewportState;

#[derive(Deserialize)]
pub struct PointBody {
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize)]
pub struct ZoomBody {
    pub delta: f64,
}

#[derive(Deserialize)]
pub struct WheelBody {
    pub delta_y: f64,
}

#[derive(Deserialize)]
pub struct ContainerBody {
    pub width: f64,
    pub height: f64,
}

pub async fn current(State(state): State<AppState>) -> Json<ViewportState> {
    Json(state.editor.viewport())
}

pub async fn drag_begin(State(state): State<AppState>, Json(body): Json<PointBody>) -> Json<ViewportState> {
    Json(state.editor.begin_drag(body.x, body.y))
}

pub async fn drag_move(State(state): State<AppState>, Json(body): Json<PointBody>) -> Json<ViewportState> {
    Json(state.editor.continue_drag(body.x, body.y))
}

pub async fn drag_end(State(state): State<AppState>) -> Json<ViewportState> {
    Json(state.editor.end_drag())
}

/// `POST /api/viewport/zoom`: add `delta` to the scale, clamped.
pub async fn zoom(State(state): State<AppState>, Json(body): Json<ZoomBody>) -> Json<ViewportState> {
    Json(state.editor.zoom(body.delta))
}

/// `POST /api/viewport/wheel`: one wheel notch; negative `delta_y` zooms in.
pub async fn wheel(State(state): State<AppState>, Json(body): Json<WheelBody>) -> Json<ViewportState> {
    Json(state.editor.wheel(body.delta_y))
}

pub async fn reset(State(state): State<AppState>) -> Json<ViewportState> {
    Json(state.editor.reset_view())
}

pub async fn fit(State(state): State<AppState>) -> Json<ViewportState> {
    Json(state.editor.fit_to_view())
}

/// `POST /api/viewport/container`: report the display region size.
pub async fn container(State(state): State<AppState>, Json(body): Json<ContainerBody>) -> Json<ViewportState> {
    Json(state.editor.set_container(Bounds { width: body.width, height: body.height }))
}
