//! Export Encoder - PNG Bytes and Single-Page PDF
//!
//! The PDF page is sized exactly to the raster (96 dpi pixel mapping),
//! landscape, with the raster embedded full-page at the origin.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::DynamicImage;
use printpdf::{ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::hashing::sha256_hex;
use crate::render::RenderedCertificate;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    #[error("Artifact payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// One encoded export, handed to the caller and not retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub id: String,
    pub filename: String,
    pub format: ExportFormat,
    pub size: [u32; 2],
    pub data_base64: String,
    pub hash: String,
}

impl ExportArtifact {
    pub fn new(filename: String, format: ExportFormat, size: [u32; 2], bytes: &[u8]) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            filename,
            format,
            size,
            data_base64: BASE64.encode(bytes),
            hash: sha256_hex(bytes),
        }
    }

    /// Decode the payload back to raw bytes.
    pub fn data(&self) -> Result<Vec<u8>, ExportError> {
        Ok(BASE64.decode(&self.data_base64)?)
    }
}

/// Encode the raster as PNG bytes.
pub fn to_png(raster: &RenderedCertificate) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    raster
        .image()
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)?;
    Ok(bytes)
}

/// CSS pixel mapping used for the PDF page size.
const EXPORT_DPI: f32 = 96.0;

fn px_to_mm(px: u32) -> f32 {
    px as f32 * 25.4 / EXPORT_DPI
}

/// Wrap the raster in a single landscape page sized exactly to
/// (`width`, `height`) pixels, embedded full-page at the origin.
pub fn to_pdf(raster: &RenderedCertificate, width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let (doc, page, layer) = PdfDocument::new(
        "Membership Certificate",
        Mm(px_to_mm(width)),
        Mm(px_to_mm(height)),
        "Certificate",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let rgb = DynamicImage::ImageRgba8(raster.image().clone()).to_rgb8();
    let image = Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: rgb.into_raw(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(0.0)),
            translate_y: Some(Mm(0.0)),
            dpi: Some(EXPORT_DPI),
            ..Default::default()
        },
    );

    doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}

/// Saved-file name derived from the normalized display name, spaces kept.
pub fn export_filename(display_name: &str, format: ExportFormat) -> String {
    format!("Certificate-{}.{}", display_name, format.extension())
}

/// The preview form handed to the UI collaborator.
pub fn png_data_url(png_bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(png_bytes))
}
