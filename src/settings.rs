//! Appearance Settings - JSON Key-Value Store
//!
//! Loaded once at startup and rewritten in full on every change. The
//! certificate pipeline never reads these; they only style the shell.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to write settings: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    System,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSizeChoice {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSizeChoice {
    /// Base UI font size in pixels.
    pub fn base_px(&self) -> u32 {
        match self {
            Self::Small => 14,
            Self::Medium => 18,
            Self::Large => 22,
        }
    }

    /// Multiplier applied to element-specific sizes.
    pub fn scale_factor(&self) -> f32 {
        match self {
            Self::Small => 0.9,
            Self::Medium => 1.0,
            Self::Large => 1.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub accent_color: String,
    pub font_size: FontSizeChoice,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            accent_color: "#667eea".to_string(),
            font_size: FontSizeChoice::Medium,
        }
    }
}

impl Settings {
    /// Read the store; a missing or corrupt file yields the defaults.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("settings store corrupt, using defaults: {e}");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Rewrite the store in full.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Darker companion shade used for the accent gradient.
    pub fn accent_secondary(&self) -> String {
        shade_color(&self.accent_color, -30).unwrap_or_else(|| self.accent_color.clone())
    }
}

/// Shade an `#rrggbb` color by a signed percentage, saturating per channel.
/// Returns `None` for anything that is not a six-digit hex triple.
pub fn shade_color(color: &str, percent: i32) -> Option<String> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| -> Option<u8> {
        let value = u8::from_str_radix(hex.get(range)?, 16).ok()?;
        let shaded = (value as i64 * (100 + percent as i64)) / 100;
        Some(shaded.clamp(0, 255) as u8)
    };

    let r = channel(0..2)?;
    let g = channel(2..4)?;
    let b = channel(4..6)?;
    Some(format!("#{:02x}{:02x}{:02x}", r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shell() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.accent_color, "#667eea");
        assert_eq!(settings.font_size, FontSizeChoice::Medium);
    }

    #[test]
    fn shade_darkens_each_channel() {
        assert_eq!(shade_color("#667eea", -30).unwrap(), "#4758a3");
    }

    #[test]
    fn shade_zero_is_identity() {
        assert_eq!(shade_color("#667eea", 0).unwrap(), "#667eea");
    }

    #[test]
    fn shade_saturates_at_white() {
        assert_eq!(shade_color("#ffffff", 50).unwrap(), "#ffffff");
    }

    #[test]
    fn shade_rejects_malformed_input() {
        assert!(shade_color("667eea", -30).is_none());
        assert!(shade_color("#fff", -30).is_none());
        assert!(shade_color("#zzzzzz", -30).is_none());
    }

    #[test]
    fn missing_store_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn corrupt_store_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings {
            theme: Theme::Light,
            accent_color: "#ff8800".to_string(),
            font_size: FontSizeChoice::Large,
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn font_size_scaling() {
        assert_eq!(FontSizeChoice::Small.base_px(), 14);
        assert_eq!(FontSizeChoice::Large.base_px(), 22);
        assert!(FontSizeChoice::Medium.scale_factor() == 1.0);
    }
}
