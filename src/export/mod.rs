//! Export pipeline: the current artifact as SVG, PNG, or PDF bytes.
//!
//! DESIGN
//! ======
//! SVG is the artifact markup verbatim. PNG rasterizes at 4x supersampling
//! times the current viewport scale, capped, over the theme background. PDF
//! rasterizes the same way and tiles the result across A4 pages.
//!
//! The viewport pan offset is zeroed for the duration of an export and
//! restored on every exit path by [`PanReset`]. Scale is left alone. A pan
//! that lands while the export runs (a drag, a recenter after a render
//! commit) wins over the saved offset. Both writes are reported through the
//! caller's callback.
//!
//! ERROR HANDLING
//! ==============
//! No artifact is `NoArtifact`; anything that goes wrong while encoding is
//! `SerializationFailure`. Rasterization runs on the blocking pool.

pub mod pdf;
pub mod raster;

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::render::{Artifact, Theme};
use crate::viewport::{ViewportController, ViewportState};

/// Base supersampling factor for raster exports.
pub const SUPERSAMPLE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Bytes ready for download.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub format: ExportFormat,
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing has rendered successfully yet")]
    NoArtifact,

    #[error("export failed: {0}")]
    SerializationFailure(String),

    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
}

impl crate::frame::ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoArtifact => "E_NO_ARTIFACT",
            Self::SerializationFailure(_) => "E_EXPORT_FAILED",
            Self::UnsupportedFormat(_) => "E_EXPORT_FORMAT",
        }
    }
}

/// Called with the viewport state after each offset write by [`PanReset`].
pub type PanListener<'a> = &'a (dyn Fn(ViewportState) + Sync);

/// Zeroes the pan offset while alive; restores it on drop unless the offset
/// was moved in the meantime.
pub struct PanReset<'a> {
    viewport: &'a Mutex<ViewportController>,
    on_pan: PanListener<'a>,
    saved: (f64, f64),
    revision: u64,
}

impl<'a> PanReset<'a> {
    pub fn engage(viewport: &'a Mutex<ViewportController>, on_pan: PanListener<'a>) -> Self {
        let (saved, revision, zeroed) = {
            let mut vp = viewport.lock().unwrap_or_else(PoisonError::into_inner);
            let state = vp.state();
            vp.set_offset(0.0, 0.0);
            ((state.offset_x, state.offset_y), vp.pan_revision(), vp.state())
        };
        on_pan(zeroed);
        Self { viewport, on_pan, saved, revision }
    }
}

impl Drop for PanReset<'_> {
    fn drop(&mut self) {
        let restored = {
            let mut vp = self.viewport.lock().unwrap_or_else(PoisonError::into_inner);
            if vp.pan_revision() == self.revision {
                vp.set_offset(self.saved.0, self.saved.1);
                Some(vp.state())
            } else {
                None
            }
        };
        if let Some(state) = restored {
            (self.on_pan)(state);
        }
    }
}

/// Export `artifact` in `format`.
///
/// # Errors
///
/// `NoArtifact` when `artifact` is `None`; `SerializationFailure` when
/// rasterization or encoding fails.
pub async fn export(
    format: ExportFormat,
    artifact: Option<Artifact>,
    theme: Theme,
    viewport: &Mutex<ViewportController>,
    on_pan: PanListener<'_>,
) -> Result<ExportOutput, ExportError> {
    let artifact = artifact.ok_or(ExportError::NoArtifact)?;
    let _pan = PanReset::engage(viewport, on_pan);
    let scale = SUPERSAMPLE * viewport.lock().unwrap_or_else(PoisonError::into_inner).state().scale;

    let bytes = match format {
        ExportFormat::Svg => artifact.svg.into_bytes(),
        ExportFormat::Png | ExportFormat::Pdf => {
            let svg = artifact.svg;
            let background = theme.background_rgb();
            tokio::task::spawn_blocking(move || {
                let raster = raster::rasterize(&svg, scale, background)?;
                match format {
                    ExportFormat::Pdf => pdf::write_pdf(&raster),
                    _ => raster::encode_png(&raster),
                }
            })
            .await
            .map_err(|e| ExportError::SerializationFailure(format!("export task failed: {e}")))??
        }
    };

    info!(%format, id = %artifact.id, bytes = bytes.len(), "export: complete");
    Ok(ExportOutput {
        format,
        file_name: format!("diagram.{}", format.extension()),
        mime: format.mime(),
        bytes,
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
