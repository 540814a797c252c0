//! Render: the external renderer seam and the debounced render scheduler.
//!
//! DESIGN
//! ======
//! Parsing and layout are delegated to a Mermaid renderer behind the
//! [`DiagramRenderer`] trait. Two implementations exist: the in-process
//! `mermaid-rs-renderer` crate and the Mermaid CLI. The scheduler owns the
//! single current [`RenderResult`]; everything else reads it.
//!
//! ERROR HANDLING
//! ==============
//! A failed render never propagates. It becomes a `Failure` result carrying
//! the renderer's diagnostic and a placeholder SVG shown in place of the
//! diagram.

pub mod cli;
pub mod native;
pub mod scheduler;
pub mod theme;

#[cfg(test)]
pub(crate) mod test_helpers;

use serde::Serialize;

pub use scheduler::{RenderObserver, RenderScheduler};
pub use theme::{Theme, ThemeSettings};

/// Message shown when the renderer rejects source without saying why.
pub const FALLBACK_DIAGNOSTIC: &str = "Invalid syntax";

/// Mermaid's own default for the largest accepted source text.
pub const DEFAULT_MAX_TEXT_SIZE: usize = 50_000;

// =============================================================================
// ARTIFACT
// =============================================================================

/// Rendered size in SVG user units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// One successful render: the SVG markup, its render id, and its measured size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub id: String,
    pub svg: String,
    pub bounds: Bounds,
}

impl Artifact {
    /// Parse the markup and record its intrinsic size.
    ///
    /// # Errors
    ///
    /// Returns `Measure` when the markup is not a usable SVG document.
    pub fn measure(id: impl Into<String>, svg: String) -> Result<Self, RenderError> {
        let tree = resvg::usvg::Tree::from_str(&svg, &resvg::usvg::Options::default())
            .map_err(|e| RenderError::Measure(e.to_string()))?;
        let size = tree.size();
        Ok(Self {
            id: id.into(),
            svg,
            bounds: Bounds { width: f64::from(size.width()), height: f64::from(size.height()) },
        })
    }
}

/// The current outcome of the latest committed render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RenderResult {
    /// Source was empty; nothing to show and nothing wrong.
    Empty,
    Success { artifact: Artifact },
    Failure { message: String, placeholder: String },
}

impl RenderResult {
    #[must_use]
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Success { artifact } => Some(artifact),
            Self::Empty | Self::Failure { .. } => None,
        }
    }

    #[must_use]
    pub fn failure(error: &RenderError, theme: Theme) -> Self {
        let message = error.diagnostic();
        let placeholder = placeholder_svg(&message, theme);
        Self::Failure { message, placeholder }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    /// The renderer rejected the source. Build with [`RenderError::syntax`].
    #[error("{0}")]
    Syntax(String),

    #[error("diagram source exceeds {limit} characters")]
    TooLarge { limit: usize },

    #[error("render timed out after {0} seconds")]
    Timeout(u64),

    /// Renderer never finished initializing; every render fails with this.
    #[error("renderer unavailable: {0}")]
    Unavailable(String),

    #[error("renderer output could not be measured: {0}")]
    Measure(String),
}

impl RenderError {
    /// Syntax failure from a raw renderer diagnostic, which may be blank.
    #[must_use]
    pub fn syntax(diagnostic: &str) -> Self {
        let trimmed = diagnostic.trim();
        if trimmed.is_empty() {
            Self::Syntax(FALLBACK_DIAGNOSTIC.to_string())
        } else {
            Self::Syntax(trimmed.to_string())
        }
    }

    /// User-visible message, never empty.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        self.to_string()
    }
}

impl crate::frame::ErrorCode for RenderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Syntax(_) => "E_RENDER_SYNTAX",
            Self::TooLarge { .. } => "E_RENDER_TOO_LARGE",
            Self::Timeout(_) => "E_RENDER_TIMEOUT",
            Self::Unavailable(_) => "E_RENDER_UNAVAILABLE",
            Self::Measure(_) => "E_RENDER_MEASURE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum InitializationError {
    #[error("invalid renderer settings: {0}")]
    InvalidSettings(String),

    #[error("renderer probe failed: {0}")]
    ProbeFailed(String),
}

impl crate::frame::ErrorCode for InitializationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSettings(_) => "E_RENDERER_SETTINGS",
            Self::ProbeFailed(_) => "E_RENDERER_PROBE",
        }
    }
}

// =============================================================================
// RENDERER TRAIT
// =============================================================================

/// One-time renderer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    pub theme: ThemeSettings,
    pub max_text_size: usize,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self { theme: ThemeSettings::default(), max_text_size: DEFAULT_MAX_TEXT_SIZE }
    }
}

impl RendererSettings {
    /// Reject settings no renderer could honor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSettings` for non-positive spacing or a zero text limit.
    pub fn validate(&self) -> Result<(), InitializationError> {
        if self.max_text_size == 0 {
            return Err(InitializationError::InvalidSettings("max_text_size must be positive".into()));
        }
        if !(self.theme.node_spacing > 0.0 && self.theme.rank_spacing > 0.0) {
            return Err(InitializationError::InvalidSettings("spacing must be positive".into()));
        }
        Ok(())
    }
}

/// External diagram renderer. Enables mocking in tests.
#[async_trait::async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Configure the renderer once, before the first render.
    ///
    /// # Errors
    ///
    /// Returns an [`InitializationError`] if the renderer cannot be used.
    async fn initialize(&self, settings: &RendererSettings) -> Result<(), InitializationError>;

    /// Render `source` to SVG markup. `id` is unique per call.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the source is rejected.
    async fn render(&self, id: &str, source: &str, theme: &ThemeSettings) -> Result<String, RenderError>;
}

// =============================================================================
// PLACEHOLDER
// =============================================================================

/// Error artifact drawn in place of a diagram that failed to render.
#[must_use]
pub fn placeholder_svg(message: &str, theme: Theme) -> String {
    let [r, g, b] = theme.background_rgb();
    let text = match theme {
        Theme::Dark => "#fc8181",
        Theme::Light => "#c53030",
    };
    let first_line = message.lines().next().unwrap_or(FALLBACK_DIAGNOSTIC);
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="480" height="120" viewBox="0 0 480 120">"#,
            r##"<rect width="480" height="120" fill="#{r:02x}{g:02x}{b:02x}" stroke="{text}" stroke-dasharray="6 4"/>"##,
            r#"<text x="240" y="55" text-anchor="middle" font-family="sans-serif" font-size="16" fill="{text}">Syntax error</text>"#,
            r#"<text x="240" y="82" text-anchor="middle" font-family="sans-serif" font-size="12" fill="{text}">{message}</text>"#,
            "</svg>"
        ),
        r = r,
        g = g,
        b = b,
        text = text,
        message = escape_xml(first_line),
    )
}

pub(crate) fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
