//! In-process renderer backed by `mermaid-rs-renderer`.
//!
//! Rendering is CPU-bound and synchronous, so every call runs on the
//! blocking pool.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use super::{DiagramRenderer, InitializationError, RenderError, RendererSettings, ThemeSettings};

const PROBE_SOURCE: &str = "graph TD\nA-->B";

/// Renders Mermaid source without leaving the process.
pub struct NativeRenderer {
    max_text_size: Mutex<usize>,
}

impl NativeRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self { max_text_size: Mutex::new(super::DEFAULT_MAX_TEXT_SIZE) }
    }
}

impl Default for NativeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Map editor theme settings onto the crate's theme and layout knobs.
fn render_options(settings: &ThemeSettings) -> mermaid_rs_renderer::RenderOptions {
    let mut theme = mermaid_rs_renderer::Theme::modern();
    theme.primary_color.clone_from(&settings.palette.primary);
    theme.primary_text_color.clone_from(&settings.palette.text);
    theme.primary_border_color.clone_from(&settings.palette.border);
    theme.line_color.clone_from(&settings.palette.line);
    theme.text_color.clone_from(&settings.palette.text);
    theme.background.clone_from(&settings.palette.background);
    theme.edge_label_background.clone_from(&settings.palette.background);
    theme.cluster_background.clone_from(&settings.palette.background);
    theme.cluster_border.clone_from(&settings.palette.border);

    let mut layout = mermaid_rs_renderer::LayoutConfig::default();
    layout.node_spacing = settings.node_spacing;
    layout.rank_spacing = settings.rank_spacing;

    mermaid_rs_renderer::RenderOptions { theme, layout }
}

/// Reject flowchart statements that end on a link operator (`A--`, `A-->`).
///
/// The layout engine drops a link with no target and draws the rest.
fn check_dangling_links(source: &str) -> Result<(), RenderError> {
    let mut lines = source.lines().enumerate().filter(|(_, line)| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with("%%")
    });
    let Some((_, header)) = lines.next() else {
        return Ok(());
    };
    let header = header.trim();
    if !header.starts_with("graph") && !header.starts_with("flowchart") {
        return Ok(());
    }

    for (n, line) in lines {
        for statement in line.split(';') {
            let statement = statement.trim();
            let head = statement.trim_end_matches(['-', '=', '.', '>', '<']);
            let tail = &statement[head.len()..];
            if !head.is_empty() && (tail.contains("--") || tail.contains("==") || tail.contains("-.")) {
                let caret = "-".repeat(statement.chars().count());
                return Err(RenderError::syntax(&format!(
                    "Parse error on line {}:\n{statement}\n{caret}^\nExpecting a node after '{tail}', got end of line",
                    n + 1,
                )));
            }
        }
    }
    Ok(())
}

fn render_blocking(source: String, settings: ThemeSettings) -> Result<String, RenderError> {
    check_dangling_links(&source)?;
    mermaid_rs_renderer::render_with_options(&source, render_options(&settings))
        .map(|svg| sanitize_font_family(&svg))
        .map_err(|e| RenderError::syntax(&e.to_string()))
}

/// Replace unescaped inner quotes in `font-family="..."` attribute values.
///
/// Font stacks like `Inter, "Segoe UI", sans-serif` are sometimes emitted
/// with raw double quotes, which no XML parser accepts.
fn sanitize_font_family(svg: &str) -> String {
    const ATTR: &str = "font-family=\"";

    let mut out = String::with_capacity(svg.len());
    let mut rest = svg;
    while let Some(start) = rest.find(ATTR) {
        let (head, tail) = rest.split_at(start + ATTR.len());
        out.push_str(head);

        let bytes = tail.as_bytes();
        let end = bytes
            .iter()
            .enumerate()
            .find(|&(i, &b)| {
                b == b'"' && matches!(bytes.get(i + 1), None | Some(b' ' | b'/' | b'>' | b'\n' | b'\t'))
            })
            .map_or(tail.len(), |(i, _)| i);
        out.push_str(&tail[..end].replace('"', "'"));
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

#[async_trait::async_trait]
impl DiagramRenderer for NativeRenderer {
    async fn initialize(&self, settings: &RendererSettings) -> Result<(), InitializationError> {
        settings.validate()?;
        *self.max_text_size.lock().unwrap_or_else(PoisonError::into_inner) = settings.max_text_size;

        let theme = settings.theme.clone();
        tokio::task::spawn_blocking(move || render_blocking(PROBE_SOURCE.to_string(), theme))
            .await
            .map_err(|e| InitializationError::ProbeFailed(e.to_string()))?
            .map_err(|e| InitializationError::ProbeFailed(e.to_string()))?;

        info!(theme = %settings.theme.theme, "render: native renderer ready");
        Ok(())
    }

    async fn render(&self, id: &str, source: &str, theme: &ThemeSettings) -> Result<String, RenderError> {
        let limit = *self.max_text_size.lock().unwrap_or_else(PoisonError::into_inner);
        if source.chars().count() > limit {
            return Err(RenderError::TooLarge { limit });
        }

        let source = source.to_string();
        let settings = theme.clone();
        let svg = tokio::task::spawn_blocking(move || render_blocking(source, settings))
            .await
            .map_err(|e| RenderError::Unavailable(format!("render task failed: {e}")))??;
        debug!(%id, bytes = svg.len(), "render: native svg generated");
        Ok(svg)
    }
}

#[cfg(test)]
#[path = "native_test.rs"]
mod tests;
