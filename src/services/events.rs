//! Editor events pushed to every subscriber of the editor's event stream.

use serde::{Deserialize, Serialize};

use crate::frame::{Data, Frame};
use crate::llm::ProviderId;
use crate::render::{Artifact, Theme};
use crate::viewport::ViewportState;

/// Where a new source value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceOrigin {
    User,
    /// A streamed partial or the final result of a generation.
    Generated,
    /// Put back after a generation failed part-way through streaming.
    Restored,
}

/// Background grid behind the preview. Display-only; never re-renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridStyle {
    #[default]
    Dotted,
    Lined,
    #[serde(rename = "none")]
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// The one current user-visible error banner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorState {
    pub active: bool,
    pub message: String,
}

impl ErrorState {
    #[must_use]
    pub fn raised(message: impl Into<String>) -> Self {
        Self { active: true, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    SourceChanged { source: String, origin: SourceOrigin },
    RenderSucceeded { artifact: Artifact },
    RenderFailed { message: String, placeholder: String },
    RenderCleared,
    ErrorChanged { error: ErrorState },
    GenerationStarted { seq: u64, provider: ProviderId },
    GenerationProgress { seq: u64, partial: String },
    Notification { level: NotificationLevel, message: String, code: Option<&'static str> },
    ViewportChanged { viewport: ViewportState },
    ThemeChanged { theme: Theme },
    GridChanged { style: GridStyle },
}

impl EditorEvent {
    /// Event-stream syscall name, `<area>:<what>`.
    #[must_use]
    pub fn syscall(&self) -> &'static str {
        match self {
            Self::SourceChanged { .. } => "source:changed",
            Self::RenderSucceeded { .. } => "render:success",
            Self::RenderFailed { .. } => "render:failure",
            Self::RenderCleared => "render:cleared",
            Self::ErrorChanged { .. } => "error:changed",
            Self::GenerationStarted { .. } => "ai:started",
            Self::GenerationProgress { .. } => "ai:progress",
            Self::Notification { .. } => "notify:show",
            Self::ViewportChanged { .. } => "viewport:changed",
            Self::ThemeChanged { .. } => "theme:changed",
            Self::GridChanged { .. } => "grid:changed",
        }
    }

    /// Wrap as a server-pushed request frame. Payload is the event's fields.
    #[must_use]
    pub fn to_frame(&self) -> Frame {
        let data = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().filter(|(k, _)| k != "event").collect(),
            _ => Data::new(),
        };
        Frame::request(self.syscall(), data)
    }
}
