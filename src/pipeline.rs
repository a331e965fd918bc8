//! Certificate Pipeline - Single Entry Point
//!
//! CRITICAL: preview and export MUST validate internally. No bypass.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::export::{self, ExportArtifact, ExportError, ExportFormat};
use crate::layout::{DrawingSurface, FontError, FontLibrary};
use crate::normalize::CertificateFields;
use crate::render::{CertificateRenderer, RenderedCertificate};
use crate::template::{CategorySet, Template, TemplateAsset, TemplateError};
use crate::validation::{self, RawInput, ValidationOutcome};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation failed: {}", .0.message().unwrap_or("unknown"))]
    Validation(ValidationOutcome),

    #[error("Template background is still loading")]
    TemplateNotReady,

    #[error("Template version {0} requires engine >= {1}, current is {2}")]
    EngineVersionMismatch(String, String, String),

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Font(#[from] FontError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Application-level pipeline stage. `Editing` is both initial and
/// re-entrant: any raw-input edit drops back to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Editing,
    Validated,
    Rendered,
    Exported,
}

/// Explicit owner of the raw fields and the pipeline stage. The pipeline
/// itself holds no per-form state between calls.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    raw: RawInput,
    stage: Stage,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(raw: RawInput) -> Self {
        Self {
            raw,
            stage: Stage::Editing,
        }
    }

    pub fn raw(&self) -> &RawInput {
        &self.raw
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn set_name(&mut self, name: &str) {
        self.raw.name = name.to_string();
        self.stage = Stage::Editing;
    }

    pub fn set_category_code(&mut self, code: &str) {
        self.raw.category_code = code.to_string();
        self.stage = Stage::Editing;
    }

    pub fn set_membership_id(&mut self, id: &str) {
        self.raw.membership_id = id.to_string();
        self.stage = Stage::Editing;
    }

    /// The UI collaborator's reset after an `InvalidCategory` outcome; the
    /// validator itself never mutates the form.
    pub fn clear_category_code(&mut self) {
        self.set_category_code("");
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Normalized display values, derived fresh on every call so the
    /// cutoff year is never stale.
    pub fn fields(&self) -> CertificateFields {
        CertificateFields::derive(&self.raw)
    }

    fn mark_validated(&mut self) {
        self.stage = Stage::Validated;
    }

    fn mark_rendered(&mut self) {
        self.stage = Stage::Rendered;
    }

    fn mark_exported(&mut self) {
        self.stage = Stage::Exported;
    }
}

/// The certificate pipeline - single entry point for preview and export.
#[derive(Debug)]
pub struct CertificatePipeline<S> {
    template: Template,
    categories: CategorySet,
    surface: S,
    asset: TemplateAsset,
}

impl CertificatePipeline<FontLibrary> {
    /// Production construction: template definition plus the fonts directory.
    pub fn open(template: Template, fonts_dir: &Path) -> Result<Self, PipelineError> {
        let fonts = FontLibrary::load_from_dir(fonts_dir)?;
        Self::with_surface(template, fonts)
    }
}

impl<S: DrawingSurface> CertificatePipeline<S> {
    pub fn with_surface(template: Template, surface: S) -> Result<Self, PipelineError> {
        check_engine_version(&template)?;
        let categories = template.category_set();
        Ok(Self {
            template,
            categories,
            surface,
            asset: TemplateAsset::Loading,
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn is_template_ready(&self) -> bool {
        self.asset.is_ready()
    }

    /// Decode the background referenced by the template and flip the
    /// readiness flag.
    pub fn load_background(&mut self) -> Result<(), PipelineError> {
        self.asset = TemplateAsset::load(&self.template.background)?;
        log::info!("template background ready: {}", self.template.background.display());
        Ok(())
    }

    /// Supply an already-decoded background (headless callers).
    pub fn set_background(&mut self, image: RgbaImage) {
        self.asset = TemplateAsset::ready(image);
    }

    /// Classify the current form fields.
    ///
    /// This is the ONLY validation entry point.
    pub fn validate(&self, form: &mut FormState) -> ValidationOutcome {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let outcome = validation::validate(form.raw(), &self.categories);
        if outcome.is_valid() {
            form.mark_validated();
        }
        outcome
    }

    /// Validate, render, and hand back the PNG preview as a data URL.
    ///
    /// Returns `Ok(None)` while the template background is still loading;
    /// the render side is a no-op in that state.
    pub fn preview(&self, form: &mut FormState) -> Result<Option<String>, PipelineError> {
        let raster = match self.render(form)? {
            Some(raster) => raster,
            None => return Ok(None),
        };
        let png = export::to_png(&raster)?;
        form.mark_rendered();
        Ok(Some(export::png_data_url(&png)))
    }

    /// Encode the certificate in the requested format.
    ///
    /// CRITICAL: This ALWAYS validates internally. No bypass possible.
    pub fn export(
        &self,
        form: &mut FormState,
        format: ExportFormat,
    ) -> Result<ExportArtifact, PipelineError> {
        let raster = self.render(form)?.ok_or(PipelineError::TemplateNotReady)?;
        let (width, height) = (raster.width(), raster.height());

        let bytes = match format {
            ExportFormat::Png => export::to_png(&raster)?,
            ExportFormat::Pdf => export::to_pdf(&raster, width, height)?,
        };

        let fields = form.fields();
        let artifact = ExportArtifact::new(
            export::export_filename(&fields.display_name, format),
            format,
            [width, height],
            &bytes,
        );
        form.mark_exported();
        log::info!("exported {} ({} bytes)", artifact.filename, bytes.len());
        Ok(artifact)
    }

    fn render(&self, form: &mut FormState) -> Result<Option<RenderedCertificate>, PipelineError> {
        // MANDATORY: validation gates every render.
        let outcome = self.validate(form);
        if !outcome.is_valid() {
            return Err(PipelineError::Validation(outcome));
        }

        let fields = form.fields();
        let renderer = CertificateRenderer::new(&self.surface);
        Ok(renderer.render(&fields, &self.asset))
    }
}

fn check_engine_version(template: &Template) -> Result<(), PipelineError> {
    let engine = semver::Version::parse(ENGINE_VERSION)
        .map_err(|_| PipelineError::InvalidVersion(ENGINE_VERSION.to_string()))?;
    let min = semver::Version::parse(&template.engine_min_version)
        .map_err(|_| PipelineError::InvalidVersion(template.engine_min_version.clone()))?;

    if engine < min {
        return Err(PipelineError::EngineVersionMismatch(
            template.template_version.clone(),
            template.engine_min_version.clone(),
            ENGINE_VERSION.to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FontSpec;
    use image::Rgba;

    #[derive(Debug)]
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

    fn pipeline() -> CertificatePipeline<FixedAdvance> {
        CertificatePipeline::with_surface(Template::builtin(), FixedAdvance(10.0)).unwrap()
    }

    #[test]
    fn stage_starts_editing() {
        assert_eq!(FormState::new().stage(), Stage::Editing);
    }

    #[test]
    fn valid_form_advances_to_validated() {
        let pipeline = pipeline();
        let mut form = FormState::new();
        form.set_name("jane doe");
        form.set_category_code("GISP");
        form.set_membership_id("12345");

        assert!(pipeline.validate(&mut form).is_valid());
        assert_eq!(form.stage(), Stage::Validated);
    }

    #[test]
    fn edit_returns_to_editing() {
        let pipeline = pipeline();
        let mut form = FormState::new();
        form.set_name("jane doe");
        form.set_category_code("GISP");
        form.set_membership_id("12345");
        pipeline.validate(&mut form);
        assert_eq!(form.stage(), Stage::Validated);

        form.set_name("john doe");
        assert_eq!(form.stage(), Stage::Editing);
    }

    #[test]
    fn failed_validation_stays_editing() {
        let pipeline = pipeline();
        let mut form = FormState::new();
        form.set_name("jane doe");
        form.set_category_code("BOGUS");
        form.set_membership_id("12345");

        assert_eq!(
            pipeline.validate(&mut form),
            ValidationOutcome::InvalidCategory
        );
        assert_eq!(form.stage(), Stage::Editing);
    }

    #[test]
    fn preview_is_none_until_background_ready() {
        let pipeline = pipeline();
        let mut form = FormState::new();
        form.set_name("jane doe");
        form.set_category_code("GISP");
        form.set_membership_id("12345");

        assert!(pipeline.preview(&mut form).unwrap().is_none());
        // The no-op render never advances the stage past Validated.
        assert_eq!(form.stage(), Stage::Validated);
    }

    #[test]
    fn export_without_background_is_template_not_ready() {
        let pipeline = pipeline();
        let mut form = FormState::new();
        form.set_name("jane doe");
        form.set_category_code("GISP");
        form.set_membership_id("12345");

        let err = pipeline.export(&mut form, ExportFormat::Png).unwrap_err();
        assert!(matches!(err, PipelineError::TemplateNotReady));
    }

    #[test]
    fn engine_version_gate() {
        let mut template = Template::builtin();
        template.engine_min_version = "99.0.0".to_string();
        let err = CertificatePipeline::with_surface(template, FixedAdvance(1.0)).unwrap_err();
        assert!(matches!(err, PipelineError::EngineVersionMismatch(..)));
    }

    #[test]
    fn bad_version_string_rejected() {
        let mut template = Template::builtin();
        template.engine_min_version = "not-a-version".to_string();
        let err = CertificatePipeline::with_surface(template, FixedAdvance(1.0)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidVersion(_)));
    }
}
