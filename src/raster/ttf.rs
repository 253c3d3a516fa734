//! TrueType/OpenType rasterizer using ab_glyph.
//!
//! Families are registered at runtime from font bytes or files. A family
//! needs at least one face; missing bold or italic faces are synthesized
//! (double strike and shear) from the closest face that exists.

use ab_glyph::{Font, FontArc, ScaleFont, point};
use std::collections::HashMap;
use std::path::Path;

use super::{FontSpec, Surface, TextRasterizer, ink};
use crate::error::SlipcastError;

/// Horizontal shift per pixel above the baseline for synthetic italics
const ITALIC_SLANT: f32 = 0.2;

/// Style slot of a face within a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FaceStyle {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Regular,
            (true, false) => Self::Bold,
            (false, true) => Self::Italic,
            (true, true) => Self::BoldItalic,
        }
    }

    /// Faces to try, best first, when this style is requested.
    fn fallbacks(self) -> [FaceStyle; 4] {
        use FaceStyle::*;
        match self {
            Regular => [Regular, Bold, Italic, BoldItalic],
            Bold => [Bold, Regular, BoldItalic, Italic],
            Italic => [Italic, Regular, BoldItalic, Bold],
            BoldItalic => [BoldItalic, Bold, Italic, Regular],
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }

    fn is_italic(self) -> bool {
        matches!(self, Self::Italic | Self::BoldItalic)
    }
}

/// A resolved face plus what must be synthesized on top of it.
struct ResolvedFace<'a> {
    font: &'a FontArc,
    fake_bold: bool,
    fake_italic: bool,
}

/// Rasterizer for fonts loaded at runtime.
#[derive(Default)]
pub struct TtfRasterizer {
    families: HashMap<String, HashMap<FaceStyle, FontArc>>,
}

impl TtfRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a face from raw font bytes.
    pub fn add_face(
        &mut self,
        family: &str,
        style: FaceStyle,
        bytes: Vec<u8>,
    ) -> Result<(), SlipcastError> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| {
            SlipcastError::Font(format!("Invalid font for '{}' ({:?}): {}", family, style, e))
        })?;
        self.families
            .entry(family.to_lowercase())
            .or_default()
            .insert(style, font);
        Ok(())
    }

    /// Register a face from a font file.
    pub fn load_face(
        &mut self,
        family: &str,
        style: FaceStyle,
        path: impl AsRef<Path>,
    ) -> Result<(), SlipcastError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            SlipcastError::Font(format!("Failed to read {}: {}", path.display(), e))
        })?;
        log::debug!("loaded {:?} face for '{}' from {}", style, family, path.display());
        self.add_face(family, style, bytes)
    }

    fn resolve(&self, font: &FontSpec) -> Result<ResolvedFace<'_>, SlipcastError> {
        let faces = self
            .families
            .get(&font.family.to_lowercase())
            .ok_or_else(|| SlipcastError::Font(format!("Unknown font family '{}'", font.family)))?;

        let wanted = FaceStyle::from_flags(font.bold, font.italic);
        wanted
            .fallbacks()
            .into_iter()
            .find_map(|style| {
                faces.get(&style).map(|f| ResolvedFace {
                    font: f,
                    fake_bold: wanted.is_bold() && !style.is_bold(),
                    fake_italic: wanted.is_italic() && !style.is_italic(),
                })
            })
            .ok_or_else(|| SlipcastError::Font(format!("Font family '{}' has no faces", font.family)))
    }
}

impl TextRasterizer for TtfRasterizer {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f32, SlipcastError> {
        let face = self.resolve(font)?;
        let scaled = face.font.as_scaled(font.size);

        let mut width = 0.0f32;
        let mut previous = None;
        for ch in text.chars().filter(|c| !c.is_control()) {
            let glyph_id = face.font.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, glyph_id);
            }
            width += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }
        Ok(width)
    }

    fn draw(
        &self,
        text: &str,
        x: f32,
        y: f32,
        font: &FontSpec,
        target: &mut Surface,
    ) -> Result<(), SlipcastError> {
        let face = self.resolve(font)?;
        let scaled = face.font.as_scaled(font.size);
        let baseline_y = y + scaled.ascent();

        let mut caret_x = x;
        let mut previous = None;
        for ch in text.chars().filter(|c| !c.is_control()) {
            let glyph_id = face.font.glyph_id(ch);
            if let Some(prev) = previous {
                caret_x += scaled.kern(prev, glyph_id);
            }

            let glyph = glyph_id.with_scale_and_position(font.size, point(caret_x, baseline_y));
            if let Some(outlined) = face.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    let gx = px as i64 + bounds.min.x as i64;
                    let gy = py as i64 + bounds.min.y as i64;
                    let shear = if face.fake_italic {
                        ((baseline_y - gy as f32) * ITALIC_SLANT).round() as i64
                    } else {
                        0
                    };
                    ink(target, gx + shear, gy, coverage);
                    if face.fake_bold {
                        ink(target, gx + shear + 1, gy, coverage);
                    }
                });
            }

            caret_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }

        Ok(())
    }

    fn has_family(&self, family: &str) -> bool {
        self.families.contains_key(&family.to_lowercase())
    }
}
