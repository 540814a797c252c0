//! Scripted renderer and recording observer shared by render and editor tests.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{DiagramRenderer, InitializationError, RenderError, RenderObserver, RenderResult, RendererSettings, ThemeSettings};

/// Understands just enough flowchart syntax to draw `A-->B` edges.
///
/// A line containing `--` without a complete `X-->Y` edge is a syntax error.
#[derive(Default)]
pub struct MockRenderer {
    pub calls: Mutex<Vec<(String, String)>>,
    pub delay: Option<Duration>,
    pub fail_init: bool,
    pub silent_errors: bool,
}

impl MockRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay: Some(delay), ..Self::default() })
    }

    pub fn sources(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }
}

fn draw(source: &str, theme: &ThemeSettings) -> Result<String, String> {
    let mut lines = source.lines();
    let header = lines.next().unwrap_or_default().trim();
    if !header.starts_with("graph") && !header.starts_with("flowchart") {
        return Err(format!("No diagram type detected for text: {header}"));
    }

    let mut nodes = BTreeSet::new();
    let mut edges = Vec::new();
    for (n, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once("-->") {
            Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
                nodes.insert(from.trim().to_string());
                nodes.insert(to.trim().to_string());
                edges.push((from.trim().to_string(), to.trim().to_string()));
            }
            _ if line.contains("--") => return Err(format!("Parse error on line {}", n + 2)),
            _ => {
                nodes.insert(line.to_string());
            }
        }
    }

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = 100 * nodes.len().max(1),
        h = 80 * nodes.len().max(1),
    );
    for (i, node) in nodes.iter().enumerate() {
        svg.push_str(&format!(
            r#"<g class="node" id="{node}"><rect x="{x}" y="{y}" width="60" height="30" fill="{fill}"/></g>"#,
            x = 20 + i * 100,
            y = 20 + i * 80,
            fill = theme.palette.primary,
        ));
    }
    for (from, to) in &edges {
        svg.push_str(&format!(r#"<path class="edge" data-from="{from}" data-to="{to}" d="M0 0 L10 10"/>"#));
    }
    svg.push_str("</svg>");
    Ok(svg)
}

#[async_trait::async_trait]
impl DiagramRenderer for MockRenderer {
    async fn initialize(&self, _settings: &RendererSettings) -> Result<(), InitializationError> {
        if self.fail_init {
            return Err(InitializationError::ProbeFailed("renderer library failed to load".into()));
        }
        Ok(())
    }

    async fn render(&self, id: &str, source: &str, theme: &ThemeSettings) -> Result<String, RenderError> {
        self.calls.lock().unwrap().push((id.to_string(), source.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        draw(source, theme).map_err(|message| {
            if self.silent_errors { RenderError::syntax("") } else { RenderError::syntax(&message) }
        })
    }
}

/// Records every committed result in order.
#[derive(Default)]
pub struct RecordingObserver {
    pub results: Mutex<Vec<RenderResult>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn results(&self) -> Vec<RenderResult> {
        self.results.lock().unwrap().clone()
    }
}

impl RenderObserver for RecordingObserver {
    fn render_committed(&self, result: &RenderResult) {
        self.results.lock().unwrap().push(result.clone());
    }
}

pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
