//! Editor themes and the renderer settings derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Preview theme. Selects the renderer palette and the export background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Opaque background painted under rasterized exports.
    #[must_use]
    pub fn background_rgb(self) -> [u8; 3] {
        match self {
            Self::Dark => [0x1e, 0x1e, 0x1e],
            Self::Light => [0xff, 0xff, 0xff],
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge curve interpolation requested from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CurveStyle {
    Basis,
    Linear,
    Step,
}

impl CurveStyle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basis => "basis",
            Self::Linear => "linear",
            Self::Step => "step",
        }
    }
}

/// Hex colors handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub text: String,
    pub border: String,
    pub line: String,
    pub background: String,
}

/// Everything a renderer needs to style one diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeSettings {
    pub theme: Theme,
    pub curve: CurveStyle,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub palette: Palette,
}

impl ThemeSettings {
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        let palette = match theme {
            Theme::Dark => Palette {
                primary: "#2d3748".into(),
                text: "#e2e8f0".into(),
                border: "#63b3ed".into(),
                line: "#a0aec0".into(),
                background: "#1e1e1e".into(),
            },
            Theme::Light => Palette {
                primary: "#ebf8ff".into(),
                text: "#1a202c".into(),
                border: "#3182ce".into(),
                line: "#4a5568".into(),
                background: "#ffffff".into(),
            },
        };
        Self { theme, curve: CurveStyle::Basis, node_spacing: 50.0, rank_spacing: 50.0, palette }
    }
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self::for_theme(Theme::default())
    }
}

#[cfg(test)]
#[path = "theme_test.rs"]
mod tests;
