//! Mermaid CLI (`mmdc`) renderer.
//!
//! DESIGN
//! ======
//! `mmdc` does not render from stdin to stdout reliably, so each render
//! writes the source and a generated JSON config to temp files named after
//! the render id, invokes the CLI with an output path, and reads the SVG
//! back. The child is killed if the render future is dropped (timeout or
//! superseded render).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};

use serde_json::json;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{DiagramRenderer, InitializationError, RenderError, RendererSettings, Theme, ThemeSettings};

pub struct CliRenderer {
    program: PathBuf,
    scratch_dir: PathBuf,
    max_text_size: Mutex<usize>,
}

impl CliRenderer {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_scratch_dir(program, std::env::temp_dir())
    }

    #[must_use]
    pub fn with_scratch_dir(program: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            scratch_dir: scratch_dir.into(),
            max_text_size: Mutex::new(super::DEFAULT_MAX_TEXT_SIZE),
        }
    }
}

/// The `--configFile` document for one render.
pub(crate) fn cli_config(theme: &ThemeSettings, max_text_size: usize) -> serde_json::Value {
    let base = match theme.theme {
        Theme::Dark => "dark",
        Theme::Light => "default",
    };
    json!({
        "theme": base,
        "maxTextSize": max_text_size,
        "themeVariables": {
            "primaryColor": theme.palette.primary,
            "primaryTextColor": theme.palette.text,
            "primaryBorderColor": theme.palette.border,
            "lineColor": theme.palette.line,
            "background": theme.palette.background,
        },
        "flowchart": {
            "curve": theme.curve.as_str(),
            "nodeSpacing": theme.node_spacing,
            "rankSpacing": theme.rank_spacing,
        },
    })
}

/// Temp files for one render, removed on drop.
struct Scratch {
    input: PathBuf,
    config: PathBuf,
    output: PathBuf,
}

impl Scratch {
    fn new(dir: &Path, id: &str) -> Self {
        Self {
            input: dir.join(format!("{id}.mmd")),
            config: dir.join(format!("{id}.config.json")),
            output: dir.join(format!("{id}.svg")),
        }
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        for path in [&self.input, &self.config, &self.output] {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[async_trait::async_trait]
impl DiagramRenderer for CliRenderer {
    async fn initialize(&self, settings: &RendererSettings) -> Result<(), InitializationError> {
        settings.validate()?;
        *self.max_text_size.lock().unwrap_or_else(PoisonError::into_inner) = settings.max_text_size;

        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| InitializationError::ProbeFailed(format!("{}: {e}", self.program.display())))?;
        if !output.status.success() {
            return Err(InitializationError::ProbeFailed(format!(
                "{} --version exited with {}",
                self.program.display(),
                output.status
            )));
        }
        let version = String::from_utf8_lossy(&output.stdout);
        info!(program = %self.program.display(), version = %version.trim(), "render: mermaid cli ready");
        Ok(())
    }

    async fn render(&self, id: &str, source: &str, theme: &ThemeSettings) -> Result<String, RenderError> {
        let limit = *self.max_text_size.lock().unwrap_or_else(PoisonError::into_inner);
        if source.chars().count() > limit {
            return Err(RenderError::TooLarge { limit });
        }

        let scratch = Scratch::new(&self.scratch_dir, id);
        let config = cli_config(theme, limit).to_string();
        tokio::fs::write(&scratch.input, source)
            .await
            .map_err(|e| RenderError::Unavailable(format!("scratch write failed: {e}")))?;
        tokio::fs::write(&scratch.config, config)
            .await
            .map_err(|e| RenderError::Unavailable(format!("scratch write failed: {e}")))?;

        let output = Command::new(&self.program)
            .arg("--input")
            .arg(&scratch.input)
            .arg("--output")
            .arg(&scratch.output)
            .arg("--configFile")
            .arg(&scratch.config)
            .arg("--backgroundColor")
            .arg("transparent")
            .arg("--quiet")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| RenderError::Unavailable(format!("{}: {e}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(%id, status = %output.status, "render: mermaid cli rejected source");
            return Err(RenderError::syntax(&stderr));
        }

        let svg = tokio::fs::read_to_string(&scratch.output)
            .await
            .map_err(|e| RenderError::Unavailable(format!("mermaid cli produced no output: {e}")))?;
        debug!(%id, bytes = svg.len(), "render: cli svg generated");
        Ok(svg)
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
