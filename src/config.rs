//! Service configuration parsed from environment variables.
//!
//! Provider-specific settings live in [`crate::llm::config`]; this module
//! covers the process itself: listen port, preferences database, and the
//! render pipeline.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://diagram-studio.db?mode=rwc";
pub const DEFAULT_RENDER_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MMDC_PATH: &str = "mmdc";

/// Errors produced while reading service configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

/// Which external renderer backs the render scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// In-process `mermaid-rs-renderer`.
    Native,
    /// Mermaid CLI subprocess.
    Cli,
}

/// Render pipeline tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub debounce: Duration,
    pub timeout: Duration,
    pub renderer: RendererKind,
    pub mmdc_path: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_RENDER_DEBOUNCE_MS),
            timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
            renderer: RendererKind::Native,
            mmdc_path: DEFAULT_MMDC_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    pub port: u16,
    pub database_url: String,
    pub render: RenderConfig,
}

impl StudioConfig {
    /// Build typed service config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DATABASE_URL`: `SQLite` URL for the preferences store
    /// - `RENDER_DEBOUNCE_MS`: default 300
    /// - `RENDER_TIMEOUT_SECS`: default 10
    /// - `RENDERER`: `native` (default) or `cli`
    /// - `MMDC_PATH`: Mermaid CLI binary, default `mmdc`
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` or `RENDERER` hold unrecognized values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Parse(format!("invalid PORT: {raw}")))?,
            Err(_) => DEFAULT_PORT,
        };
        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let render = RenderConfig {
            debounce: Duration::from_millis(env_parse("RENDER_DEBOUNCE_MS", DEFAULT_RENDER_DEBOUNCE_MS)),
            timeout: Duration::from_secs(env_parse("RENDER_TIMEOUT_SECS", DEFAULT_RENDER_TIMEOUT_SECS)),
            renderer: parse_renderer(std::env::var("RENDERER").ok().as_deref())?,
            mmdc_path: std::env::var("MMDC_PATH").unwrap_or_else(|_| DEFAULT_MMDC_PATH.to_string()),
        };
        Ok(Self { port, database_url, render })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_renderer(raw: Option<&str>) -> Result<RendererKind, ConfigError> {
    match raw.unwrap_or("native") {
        "native" => Ok(RendererKind::Native),
        "cli" => Ok(RendererKind::Cli),
        other => Err(ConfigError::Parse(format!("unknown RENDERER: {other} (expected 'native' or 'cli')"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
