//! Template Definition - The Certificate Contract
//!
//! Exactly one template is active at a time. The definition names the
//! background asset and the ordered category list; the renderer owns the
//! text layout itself.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read template definition: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse template definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to decode template background: {0}")]
    Background(#[from] image::ImageError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub template_version: String,
    pub engine_min_version: String,
    /// Pixel dimensions the background is stretched to; must match the
    /// canvas the renderer lays text out against.
    pub canonical_size: [u32; 2],
    pub background: PathBuf,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

fn default_categories() -> Vec<String> {
    [
        "SURVEYOR",
        "TECHNOLOGIST",
        "TECHNICIAN",
        "GISP",
        "CARTOGRAPHER",
        "PHOTOGRAMMETRIST",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

impl Template {
    /// The built-in ZiG membership certificate definition.
    pub fn builtin() -> Self {
        Self {
            id: "zig-membership".to_string(),
            name: "ZiG Membership Certificate".to_string(),
            description: "Annual membership certificate of the Zimbabwe Institute of Geomatics"
                .to_string(),
            template_version: "1.0.0".to_string(),
            engine_min_version: "1.0.0".to_string(),
            canonical_size: [crate::render::CANVAS_WIDTH, crate::render::CANVAS_HEIGHT],
            background: PathBuf::from("ZiGCertTemplate.png"),
            categories: default_categories(),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, TemplateError> {
        let content = fs::read_to_string(path)?;
        let template = serde_json::from_str(&content)?;
        Ok(template)
    }

    pub fn category_set(&self) -> CategorySet {
        CategorySet::new(self.categories.clone())
    }
}

/// The ordered list of valid membership category codes, consumed as a
/// membership set. Order is preserved for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySet {
    codes: Vec<String>,
}

impl CategorySet {
    pub fn new(codes: Vec<String>) -> Self {
        Self { codes }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(|c| c.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Readiness flag for the background asset. The original load is deferred,
/// so the renderer checks this synchronously and no-ops until `Ready`.
#[derive(Debug, Clone, Default)]
pub enum TemplateAsset {
    #[default]
    Loading,
    Ready(RgbaImage),
}

impl TemplateAsset {
    /// Decode the background file and flip the flag to `Ready`.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let decoded = image::open(path)?;
        Ok(Self::Ready(decoded.to_rgba8()))
    }

    pub fn ready(image: RgbaImage) -> Self {
        Self::Ready(image)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        match self {
            Self::Loading => None,
            Self::Ready(image) => Some(image),
        }
    }
}
