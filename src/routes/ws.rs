//! WebSocket handler: editor event stream plus inbound requests.
//!
//! DESIGN
//! ======
//! On upgrade, subscribes to the editor's event channel, generates a client
//! ID and enters a `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall prefix
//! - Editor events → wrap as request frames → forward to client
//! - Deferred replies (AI requests) → forward to client
//!
//! Handlers return an `Outcome` and never touch the socket. AI requests run
//! on their own task so streamed progress events keep flowing while the
//! provider call is outstanding; their reply comes back through the
//! per-connection channel.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id` and a snapshot
//! 2. Client sends frames → dispatch → done/error reply to sender
//! 3. Editor events → every connected client
//! 4. Close → drop subscription

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::frame::{Data, Frame, Status};
use crate::render::{Bounds, Theme};
use crate::services::events::GridStyle;
use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

enum Outcome {
    /// Send done+data to sender.
    Reply(Data),
    /// Send empty done to sender.
    Done,
    /// Reply arrives later through the client channel.
    Deferred,
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    let mut events = state.editor.subscribe();
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(64);

    let welcome = Frame::request("session:connected", Data::new())
        .with_data("client_id", client_id.to_string())
        .with_data("snapshot", serde_json::to_value(state.editor.snapshot()).unwrap_or_default());
    if send_frame(&mut socket, &welcome).await.is_err() {
        return;
    }

    info!(%client_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        for frame in process_inbound_text(&state, client_id, &client_tx, &text).await {
                            let _ = send_frame(&mut socket, &frame).await;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if send_frame(&mut socket, &event.to_frame()).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(%client_id, skipped, "ws: client lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return frames for the sender.
async fn process_inbound_text(
    state: &AppState,
    client_id: Uuid,
    client_tx: &mpsc::Sender<Frame>,
    text: &str,
) -> Vec<Frame> {
    let req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            let err = Frame::request("gateway:error", Data::new()).with_data("message", format!("invalid json: {e}"));
            return vec![err];
        }
    };

    let prefix = req.prefix();
    if prefix != "viewport" {
        info!(%client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");
    }

    let result = match prefix {
        "source" => handle_source(state, &req),
        "editor" => handle_editor(state, &req),
        "viewport" => handle_viewport(state, &req),
        "ai" => handle_ai(state, client_tx, &req),
        _ => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    match result {
        Ok(Outcome::Reply(data)) => vec![req.done(data)],
        Ok(Outcome::Done) => vec![req.done(Data::new())],
        Ok(Outcome::Deferred) => vec![],
        Err(err_frame) => vec![err_frame],
    }
}

fn op(req: &Frame) -> &str {
    req.syscall.split_once(':').map_or("", |(_, op)| op)
}

// =============================================================================
// SOURCE / EDITOR HANDLERS
// =============================================================================

fn handle_source(state: &AppState, req: &Frame) -> Result<Outcome, Frame> {
    match op(req) {
        "edit" => {
            let Some(source) = req.str_field("source") else {
                return Err(req.error("source required"));
            };
            state.editor.edit(source);
            Ok(Outcome::Done)
        }
        other => Err(req.error(format!("unknown source op: {other}"))),
    }
}

fn handle_editor(state: &AppState, req: &Frame) -> Result<Outcome, Frame> {
    match op(req) {
        "snapshot" => Ok(Outcome::Reply(to_data(&state.editor.snapshot()))),
        "rerender" => {
            state.editor.force_rerender();
            Ok(Outcome::Done)
        }
        "theme" => {
            let theme = match req.str_field("theme") {
                Some("dark") => Theme::Dark,
                Some("light") => Theme::Light,
                None => return Ok(Outcome::Reply(theme_data(state.editor.toggle_theme()))),
                Some(other) => return Err(req.error(format!("unknown theme: {other}"))),
            };
            state.editor.set_theme(theme);
            Ok(Outcome::Reply(theme_data(theme)))
        }
        "grid" => {
            let Some(style) = req.data.get("style") else {
                return Err(req.error("style required"));
            };
            let style: GridStyle = serde_json::from_value(style.clone())
                .map_err(|_| req.error(format!("unknown grid style: {style}")))?;
            state.editor.set_grid(style);
            Ok(Outcome::Done)
        }
        other => Err(req.error(format!("unknown editor op: {other}"))),
    }
}

// =============================================================================
// VIEWPORT HANDLER
// =============================================================================

fn handle_viewport(state: &AppState, req: &Frame) -> Result<Outcome, Frame> {
    let editor = &state.editor;
    let point = || (req.f64_field("x").unwrap_or(0.0), req.f64_field("y").unwrap_or(0.0));

    let viewport = match op(req) {
        "begin" => {
            let (x, y) = point();
            editor.begin_drag(x, y)
        }
        "move" => {
            let (x, y) = point();
            editor.continue_drag(x, y)
        }
        "end" => editor.end_drag(),
        "zoom" => {
            let Some(delta) = req.f64_field("delta") else {
                return Err(req.error("delta required"));
            };
            editor.zoom(delta)
        }
        "zoom_in" => editor.zoom_in(),
        "zoom_out" => editor.zoom_out(),
        "wheel" => editor.wheel(req.f64_field("delta_y").unwrap_or(0.0)),
        "reset" => editor.reset_view(),
        "fit" => editor.fit_to_view(),
        "container" => {
            let (Some(width), Some(height)) = (req.f64_field("width"), req.f64_field("height")) else {
                return Err(req.error("width and height required"));
            };
            editor.set_container(Bounds { width, height })
        }
        other => return Err(req.error(format!("unknown viewport op: {other}"))),
    };
    Ok(Outcome::Reply(to_data(&viewport)))
}

// =============================================================================
// AI HANDLER
// =============================================================================

fn handle_ai(state: &AppState, client_tx: &mpsc::Sender<Frame>, req: &Frame) -> Result<Outcome, Frame> {
    let prompt = match op(req) {
        "generate" => Some(req.str_field("prompt").unwrap_or_default().to_string()),
        "fix" => None,
        other => return Err(req.error(format!("unknown ai op: {other}"))),
    };

    let editor = state.editor.clone();
    let tx = client_tx.clone();
    let req = req.clone();
    tokio::spawn(async move {
        let result = match prompt {
            Some(prompt) => editor.generate(&prompt).await,
            None => editor.fix_with_ai().await,
        };
        let reply = match result {
            Ok(outcome) => req.done(to_data(&outcome)),
            Err(e) => req.error_from(&e),
        };
        // Client may have disconnected meanwhile.
        let _ = tx.send(reply).await;
    });
    Ok(Outcome::Deferred)
}

// =============================================================================
// HELPERS
// =============================================================================

fn theme_data(theme: Theme) -> Data {
    Data::from([("theme".to_string(), serde_json::json!(theme))])
}

fn to_data(value: &impl Serialize) -> Data {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
        _ => Data::new(),
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == Status::Error {
        let code = frame.str_field("code").unwrap_or("-");
        let message = frame.str_field("message").unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    }
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
