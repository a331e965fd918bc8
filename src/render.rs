//! Certificate Renderer - Fixed-Layout Composition
//!
//! Every call repaints the whole canvas: template first, then the four text
//! layers. Layout is fixed; nothing here is configurable at runtime.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::layout::{center_text, DrawingSurface, FontFamily, FontSpec};
use crate::normalize::CertificateFields;
use crate::template::TemplateAsset;

pub const CANVAS_WIDTH: u32 = 1280;
pub const CANVAS_HEIGHT: u32 = 905;

/// Fill color shared by all four text elements.
pub const TEXT_COLOR: Rgba<u8> = Rgba([0x26, 0x22, 0x64, 0xff]);

pub const INSTITUTE_SUBTITLE: &str = "IS A MEMBER OF ZIMBABWE INSTITUTE OF GEOMATICS";

const NAME_BASELINE_Y: f32 = 545.0;
const SUBTITLE_BASELINE_Y: f32 = 630.0;
const CATEGORY_BASELINE_Y: f32 = 680.0;
// The membership number is deliberately left-aligned, unlike the other
// three elements.
const NUMBER_X: f32 = 240.0;
const NUMBER_BASELINE_Y: f32 = 860.0;

const NAME_FONT: FontSpec = FontSpec::new(FontFamily::Script, 90.0);
const BODY_FONT: FontSpec = FontSpec::new(FontFamily::Body, 40.0);
const NUMBER_FONT: FontSpec = FontSpec::new(FontFamily::Mono, 44.0);

/// The fully composited raster, regenerated on every render.
#[derive(Debug, Clone)]
pub struct RenderedCertificate {
    image: RgbaImage,
}

impl RenderedCertificate {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl From<RgbaImage> for RenderedCertificate {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}

pub struct CertificateRenderer<'a, S: DrawingSurface> {
    surface: &'a S,
}

impl<'a, S: DrawingSurface> CertificateRenderer<'a, S> {
    pub fn new(surface: &'a S) -> Self {
        Self { surface }
    }

    /// Composite the normalized fields onto the template.
    ///
    /// Returns `None` while the template asset is still `Loading`; callers
    /// gate on readiness rather than treating that as a failure.
    pub fn render(
        &self,
        fields: &CertificateFields,
        template: &TemplateAsset,
    ) -> Option<RenderedCertificate> {
        let background = template.image()?;

        // Stretch to exactly fill the canvas. The source is expected to
        // already match the canvas aspect ratio.
        let mut canvas = if background.dimensions() == (CANVAS_WIDTH, CANVAS_HEIGHT) {
            background.clone()
        } else {
            imageops::resize(background, CANVAS_WIDTH, CANVAS_HEIGHT, FilterType::Triangle)
        };

        self.draw_centered(&mut canvas, &fields.display_name, NAME_BASELINE_Y, &NAME_FONT);
        self.draw_centered(&mut canvas, INSTITUTE_SUBTITLE, SUBTITLE_BASELINE_Y, &BODY_FONT);
        self.draw_centered(
            &mut canvas,
            &fields.category_statement,
            CATEGORY_BASELINE_Y,
            &BODY_FONT,
        );
        self.surface.draw_text(
            &mut canvas,
            &fields.membership_number,
            NUMBER_X,
            NUMBER_BASELINE_Y,
            &NUMBER_FONT,
            TEXT_COLOR,
        );

        log::debug!("rendered certificate for {:?}", fields.display_name);
        Some(RenderedCertificate { image: canvas })
    }

    fn draw_centered(&self, canvas: &mut RgbaImage, text: &str, baseline_y: f32, spec: &FontSpec) {
        let placement = center_text(self.surface, CANVAS_WIDTH, text, baseline_y, spec);
        self.surface
            .draw_text(canvas, text, placement.x, placement.y, spec, TEXT_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::RawInput;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    /// Headless surface recording every draw call.
    struct Recorder {
        advance: f32,
        calls: RefCell<Vec<(String, f32, f32)>>,
    }

    impl Recorder {
        fn new(advance: f32) -> Self {
            Self {
                advance,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl DrawingSurface for Recorder {
        fn text_width(&self, text: &str, _spec: &FontSpec) -> f32 {
            text.chars().count() as f32 * self.advance
        }

        fn draw_text(
            &self,
            _canvas: &mut RgbaImage,
            text: &str,
            x: f32,
            baseline_y: f32,
            _spec: &FontSpec,
            _color: Rgba<u8>,
        ) {
            self.calls.borrow_mut().push((text.to_string(), x, baseline_y));
        }
    }

    fn fields() -> CertificateFields {
        CertificateFields::derive_at(
            &RawInput::new("jane doe", "GISP", "12345"),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        )
    }

    #[test]
    fn render_is_noop_while_loading() {
        let surface = Recorder::new(10.0);
        let renderer = CertificateRenderer::new(&surface);
        let result = renderer.render(&fields(), &TemplateAsset::Loading);
        assert!(result.is_none());
        assert!(surface.calls.borrow().is_empty());
    }

    #[test]
    fn render_draws_four_elements_in_order() {
        let surface = Recorder::new(10.0);
        let renderer = CertificateRenderer::new(&surface);
        let template = TemplateAsset::ready(RgbaImage::new(CANVAS_WIDTH, CANVAS_HEIGHT));

        renderer.render(&fields(), &template).unwrap();

        let calls = surface.calls.borrow();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].0, "Jane Doe");
        assert_eq!(calls[1].0, INSTITUTE_SUBTITLE);
        assert!(calls[2].0.starts_with("REGISTERED AS A GEOMATICS GISP"));
        assert_eq!(calls[3].0, "ZIG12345");
    }

    #[test]
    fn name_is_centered_and_number_left_aligned() {
        let surface = Recorder::new(10.0);
        let renderer = CertificateRenderer::new(&surface);
        let template = TemplateAsset::ready(RgbaImage::new(CANVAS_WIDTH, CANVAS_HEIGHT));

        renderer.render(&fields(), &template).unwrap();

        let calls = surface.calls.borrow();
        // "Jane Doe" is 8 chars at 10px: x = 640 - 40.
        assert_eq!(calls[0].1, 600.0);
        assert_eq!(calls[0].2, 545.0);
        // The membership number ignores centering entirely.
        assert_eq!(calls[3].1, NUMBER_X);
        assert_eq!(calls[3].2, NUMBER_BASELINE_Y);
    }

    #[test]
    fn template_is_stretched_to_canvas() {
        let surface = Recorder::new(10.0);
        let renderer = CertificateRenderer::new(&surface);
        // Half-size source gets stretched to the full canvas.
        let template = TemplateAsset::ready(RgbaImage::from_pixel(
            CANVAS_WIDTH / 2,
            CANVAS_HEIGHT / 2,
            Rgba([200, 10, 10, 255]),
        ));

        let rendered = renderer.render(&fields(), &template).unwrap();
        assert_eq!(rendered.width(), CANVAS_WIDTH);
        assert_eq!(rendered.height(), CANVAS_HEIGHT);
        assert_eq!(*rendered.image().get_pixel(0, 0), Rgba([200, 10, 10, 255]));
    }

    #[test]
    fn render_repaints_from_template_each_call() {
        let surface = Recorder::new(10.0);
        let renderer = CertificateRenderer::new(&surface);
        let template = TemplateAsset::ready(RgbaImage::from_pixel(
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            Rgba([1, 2, 3, 255]),
        ));

        let first = renderer.render(&fields(), &template).unwrap();
        let second = renderer.render(&fields(), &template).unwrap();
        assert_eq!(first.image().as_raw(), second.image().as_raw());
    }
}
