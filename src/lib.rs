//! ZiG Certificate Core - Membership Certificate Engine
//!
//! # The Pipeline (Fixed Order)
//! 1. Raw Input Is Ephemeral
//! 2. Normalization Is Fresh
//! 3. Validation Gates Rendering
//! 4. Rendering Repaints Fully
//! 5. Exports Carry Their Digest

pub mod template;
pub mod validation;
pub mod normalize;
pub mod layout;
pub mod render;
pub mod export;
pub mod hashing;
pub mod settings;
pub mod pipeline;

pub use template::{Template, TemplateAsset, TemplateError, CategorySet};
pub use validation::{RawInput, ValidationOutcome};
pub use normalize::CertificateFields;
pub use layout::{DrawingSurface, FontLibrary, FontSpec, FontFamily, TextPlacement};
pub use render::{CertificateRenderer, RenderedCertificate, CANVAS_WIDTH, CANVAS_HEIGHT};
pub use export::{ExportArtifact, ExportFormat, ExportError};
pub use hashing::sha256_hex;
pub use settings::{Settings, Theme, FontSizeChoice};
pub use pipeline::{CertificatePipeline, FormState, Stage, PipelineError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
