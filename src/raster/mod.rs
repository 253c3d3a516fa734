//! # Text Rasterization
//!
//! The layout planner and pipeline never draw glyphs themselves. They talk to
//! a [`TextRasterizer`], which measures and draws runs of text onto an RGBA
//! [`Surface`] (black ink on white, `y` is the top of the text box).
//!
//! ## Bundled Rasterizers
//!
//! | Type | Fonts | Notes |
//! |------|-------|-------|
//! | [`BitmapRasterizer`] | Spleen 6×12 / 8×16 / 12×24, scaled | No font files, byte-for-byte reproducible |
//! | [`TtfRasterizer`] | Any TTF/OTF loaded at runtime | Anti-aliased coverage |
//! | [`FontSet`] | TTF families, bitmap fallback | What the CLI uses |

pub mod bitmap;
pub mod ttf;

use image::{Rgba, RgbaImage};

use crate::error::SlipcastError;

pub use bitmap::BitmapRasterizer;
pub use ttf::{FaceStyle, TtfRasterizer};

/// Drawing surface: RGBA pixels, white background.
pub type Surface = RgbaImage;

/// Create a white surface.
pub fn blank_surface(width: u32, height: u32) -> Surface {
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
}

/// Font request for one run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    /// Pixel height
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }
}

/// Text measuring and drawing capability.
pub trait TextRasterizer {
    /// Advance width of `text` in pixels.
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f32, SlipcastError>;

    /// Draw `text` with its top-left corner at (`x`, `y`).
    fn draw(
        &self,
        text: &str,
        x: f32,
        y: f32,
        font: &FontSpec,
        target: &mut Surface,
    ) -> Result<(), SlipcastError>;

    /// Whether `family` resolves to a real face rather than a fallback.
    fn has_family(&self, _family: &str) -> bool {
        true
    }
}

impl<T: TextRasterizer + ?Sized> TextRasterizer for &T {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f32, SlipcastError> {
        (**self).measure(text, font)
    }

    fn draw(
        &self,
        text: &str,
        x: f32,
        y: f32,
        font: &FontSpec,
        target: &mut Surface,
    ) -> Result<(), SlipcastError> {
        (**self).draw(text, x, y, font, target)
    }

    fn has_family(&self, family: &str) -> bool {
        (**self).has_family(family)
    }
}

/// Darken one pixel by `coverage` (0.0 = untouched, 1.0 = black).
///
/// Coordinates outside the surface are clipped.
pub(crate) fn ink(target: &mut Surface, x: i64, y: i64, coverage: f32) {
    if x < 0 || y < 0 || x >= target.width() as i64 || y >= target.height() as i64 {
        return;
    }
    let level = (255.0 * (1.0 - coverage.clamp(0.0, 1.0))).round() as u8;
    let pixel = target.get_pixel_mut(x as u32, y as u32);
    for channel in pixel.0.iter_mut().take(3) {
        *channel = (*channel).min(level);
    }
}

/// TTF families with the bitmap face as fallback for everything else.
#[derive(Default)]
pub struct FontSet {
    pub ttf: TtfRasterizer,
    pub bitmap: BitmapRasterizer,
}

impl FontSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn pick(&self, family: &str) -> &dyn TextRasterizer {
        if self.ttf.has_family(family) {
            &self.ttf
        } else {
            &self.bitmap
        }
    }
}

impl TextRasterizer for FontSet {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f32, SlipcastError> {
        self.pick(&font.family).measure(text, font)
    }

    fn draw(
        &self,
        text: &str,
        x: f32,
        y: f32,
        font: &FontSpec,
        target: &mut Surface,
    ) -> Result<(), SlipcastError> {
        self.pick(&font.family).draw(text, x, y, font, target)
    }

    fn has_family(&self, family: &str) -> bool {
        self.ttf.has_family(family) || self.bitmap.has_family(family)
    }
}
