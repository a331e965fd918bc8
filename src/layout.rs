//! Text Layout Engine - Measurement and Centering
//!
//! `DrawingSurface` is the capability both the layout engine and the
//! renderer draw through, so a headless backend can stand in for the real
//! glyph rasterizer under test.

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("Failed to read font file {file}: {source}")]
    Read {
        file: String,
        source: std::io::Error,
    },

    #[error("Font file {0} is not a usable TrueType face")]
    Parse(String),
}

/// The three faces the certificate uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// Script face for the member name.
    Script,
    /// Body face for the subtitle and category statement.
    Body,
    /// Monospace face for the membership number.
    Mono,
}

/// A font selection already resolved for measurement: face plus pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size: f32,
}

impl FontSpec {
    pub const fn new(family: FontFamily, size: f32) -> Self {
        Self { family, size }
    }
}

/// Horizontal placement of a text run against the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    pub x: f32,
    pub y: f32,
}

/// Measurement plus glyph drawing against an RGBA canvas.
pub trait DrawingSurface {
    /// Rendered pixel width of `text` under the given spec.
    fn text_width(&self, text: &str, spec: &FontSpec) -> f32;

    /// Paint `text` with its baseline at (`x`, `baseline_y`).
    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: f32,
        baseline_y: f32,
        spec: &FontSpec,
        color: Rgba<u8>,
    );
}

/// Center `text` horizontally within `canvas_width` at `baseline_y`.
///
/// The resulting `x` may be negative when the run is wider than the canvas;
/// that overflow is passed through untouched. `y` is the baseline unchanged.
pub fn center_text<S: DrawingSurface + ?Sized>(
    surface: &S,
    canvas_width: u32,
    text: &str,
    baseline_y: f32,
    spec: &FontSpec,
) -> TextPlacement {
    let measured = surface.text_width(text, spec);
    TextPlacement {
        x: canvas_width as f32 / 2.0 - measured / 2.0,
        y: baseline_y,
    }
}

const SCRIPT_FONT_FILE: &str = "Charm-Regular.ttf";
const BODY_FONT_FILE: &str = "CenturyGothic.ttf";
const MONO_FONT_FILE: &str = "LiberationMono-Regular.ttf";

/// Production glyph backend: the three TrueType faces loaded from a fonts
/// directory.
pub struct FontLibrary {
    script: Font<'static>,
    body: Font<'static>,
    mono: Font<'static>,
}

impl FontLibrary {
    pub fn load_from_dir(dir: &Path) -> Result<Self, FontError> {
        Ok(Self {
            script: load_font(dir, SCRIPT_FONT_FILE)?,
            body: load_font(dir, BODY_FONT_FILE)?,
            mono: load_font(dir, MONO_FONT_FILE)?,
        })
    }

    pub fn from_fonts(script: Font<'static>, body: Font<'static>, mono: Font<'static>) -> Self {
        Self { script, body, mono }
    }

    fn font(&self, family: FontFamily) -> &Font<'static> {
        match family {
            FontFamily::Script => &self.script,
            FontFamily::Body => &self.body,
            FontFamily::Mono => &self.mono,
        }
    }
}

fn load_font(dir: &Path, file: &str) -> Result<Font<'static>, FontError> {
    let path = dir.join(file);
    let data = fs::read(&path).map_err(|source| FontError::Read {
        file: path.display().to_string(),
        source,
    })?;
    Font::try_from_vec(data).ok_or_else(|| FontError::Parse(path.display().to_string()))
}

impl DrawingSurface for FontLibrary {
    fn text_width(&self, text: &str, spec: &FontSpec) -> f32 {
        let font = self.font(spec.family);
        let scale = Scale::uniform(spec.size);
        font.layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: f32,
        baseline_y: f32,
        spec: &FontSpec,
        color: Rgba<u8>,
    ) {
        let font = self.font(spec.family);
        let scale = Scale::uniform(spec.size);
        let (width, height) = canvas.dimensions();

        for glyph in font.layout(text, scale, point(x, baseline_y)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                    return;
                }
                let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                *pixel = blend(*pixel, color, coverage);
            });
        }
    }
}

fn blend(dst: Rgba<u8>, src: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let mix = |d: u8, s: u8| (s as f32 * coverage + d as f32 * (1.0 - coverage)) as u8;
    Rgba([
        mix(dst[0], src[0]),
        mix(dst[1], src[1]),
        mix(dst[2], src[2]),
        255,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Headless surface: every character advances a fixed number of pixels.
    struct FixedAdvance(f32);

    impl DrawingSurface for FixedAdvance {
        fn text_width(&self, text: &str, _spec: &FontSpec) -> f32 {
            text.chars().count() as f32 * self.0
        }

        fn draw_text(
            &self,
            _canvas: &mut RgbaImage,
            _text: &str,
            _x: f32,
            _baseline_y: f32,
            _spec: &FontSpec,
            _color: Rgba<u8>,
        ) {
        }
    }

    const SPEC: FontSpec = FontSpec::new(FontFamily::Body, 40.0);

    #[test]
    fn centers_within_canvas() {
        let surface = FixedAdvance(10.0);
        // "abcde" measures 50px on a 200px canvas: x = 100 - 25.
        let placement = center_text(&surface, 200, "abcde", 630.0, &SPEC);
        assert_eq!(placement.x, 75.0);
        assert_eq!(placement.y, 630.0);
    }

    #[test]
    fn overflow_goes_negative() {
        let surface = FixedAdvance(50.0);
        // 10 chars at 50px is wider than a 200px canvas; no clamping.
        let placement = center_text(&surface, 200, "0123456789", 100.0, &SPEC);
        assert!(placement.x < 0.0);
    }

    #[test]
    fn empty_text_centers_on_midline() {
        let surface = FixedAdvance(10.0);
        let placement = center_text(&surface, 200, "", 50.0, &SPEC);
        assert_eq!(placement.x, 100.0);
    }

    #[test]
    fn baseline_passes_through() {
        let surface = FixedAdvance(1.0);
        for y in [0.0, 545.0, 860.0] {
            assert_eq!(center_text(&surface, 1280, "x", y, &SPEC).y, y);
        }
    }

    #[test]
    fn blend_full_coverage_takes_source() {
        let out = blend(Rgba([0, 0, 0, 255]), Rgba([0x26, 0x22, 0x64, 255]), 1.0);
        assert_eq!(out, Rgba([0x26, 0x22, 0x64, 255]));
    }

    #[test]
    fn blend_zero_coverage_keeps_destination() {
        let dst = Rgba([10, 20, 30, 255]);
        let out = blend(dst, Rgba([255, 255, 255, 255]), 0.0);
        assert_eq!(out, dst);
    }
}
