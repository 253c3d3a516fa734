//! Bitmap-font rasterizer built on the Spleen PSF2 faces.
//!
//! The face is picked by requested pixel height and scaled with nearest
//! neighbour, so output depends on nothing but the text and size:
//!
//! | Requested size | Face |
//! |----------------|------|
//! | ≤ 12px | Spleen 6×12 |
//! | 13–16px | Spleen 8×16 |
//! | > 16px | Spleen 12×24 |
//!
//! All Spleen faces are 1:2, so a glyph advances `round(size / 2)` pixels.
//! Bold is a 1px double strike, italic a row shear. Characters missing from
//! the face are drawn as an outlined box.

use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

use super::{FontSpec, Surface, TextRasterizer, ink};
use crate::error::SlipcastError;

/// Horizontal shift per row for synthetic italics
const ITALIC_SLANT: f32 = 0.2;

/// Family names served natively by this rasterizer
const FAMILIES: [&str; 3] = ["spleen", "monospace", "bitmap"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    S6x12,
    S8x16,
    S12x24,
}

impl Face {
    const ALL: [Face; 3] = [Face::S6x12, Face::S8x16, Face::S12x24];

    /// Cell width and height
    fn cell(self) -> (usize, usize) {
        match self {
            Face::S6x12 => (6, 12),
            Face::S8x16 => (8, 16),
            Face::S12x24 => (12, 24),
        }
    }

    fn data(self) -> &'static [u8] {
        match self {
            Face::S6x12 => FONT_6X12,
            Face::S8x16 => FONT_8X16,
            Face::S12x24 => FONT_12X24,
        }
    }

    /// Smallest face at least `pixel_height` tall, else the largest.
    fn for_height(pixel_height: usize) -> Face {
        Self::ALL
            .into_iter()
            .find(|face| face.cell().1 >= pixel_height)
            .unwrap_or(Face::S12x24)
    }

    /// Parse the face. Done once per drawn run, not per character.
    fn load(self) -> Result<PSF2Font<'static>, SlipcastError> {
        let (cell_w, cell_h) = self.cell();
        PSF2Font::new(self.data()).map_err(|e| {
            SlipcastError::Font(format!("Failed to load Spleen {}x{}: {}", cell_w, cell_h, e))
        })
    }

    /// Decode a glyph into a row-major cell bitmap. `None` if the face lacks it.
    fn glyph(self, font: &mut PSF2Font<'_>, ch: char) -> Option<Vec<bool>> {
        let (cell_w, cell_h) = self.cell();
        let mut utf8 = [0u8; 4];
        let bytes = ch.encode_utf8(&mut utf8).as_bytes();

        font.glyph_for_utf8(bytes).map(|glyph| {
            let mut cells = vec![false; cell_w * cell_h];
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if row_y < cell_h && col_x < cell_w {
                        cells[row_y * cell_w + col_x] = on;
                    }
                }
            }
            cells
        })
    }
}

/// Scaled glyph dimensions for a font size: (pixel height, advance).
fn scaled_metrics(size: f32) -> (usize, usize) {
    let pixel_height = size.round().max(1.0) as usize;
    let face = Face::for_height(pixel_height);
    let (cell_w, cell_h) = face.cell();
    let advance = (size * cell_w as f32 / cell_h as f32).round().max(1.0) as usize;
    (pixel_height, advance)
}

fn drawable(ch: &char) -> bool {
    !ch.is_control()
}

/// Deterministic rasterizer using bundled Spleen bitmap faces.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapRasterizer;

impl BitmapRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl TextRasterizer for BitmapRasterizer {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f32, SlipcastError> {
        let (_, advance) = scaled_metrics(font.size);
        Ok((text.chars().filter(drawable).count() * advance) as f32)
    }

    fn draw(
        &self,
        text: &str,
        x: f32,
        y: f32,
        font: &FontSpec,
        target: &mut Surface,
    ) -> Result<(), SlipcastError> {
        let (pixel_height, advance) = scaled_metrics(font.size);
        let face = Face::for_height(pixel_height);
        let (cell_w, cell_h) = face.cell();
        let mut psf = face.load()?;

        let origin_y = y.round() as i64;
        let mut pen_x = x.round() as i64;

        for ch in text.chars().filter(drawable) {
            let cells = face.glyph(&mut psf, ch);

            for dy in 0..pixel_height {
                let sy = dy * cell_h / pixel_height;
                let shear = if font.italic {
                    ((pixel_height - 1 - dy) as f32 * ITALIC_SLANT).round() as i64
                } else {
                    0
                };

                for dx in 0..advance {
                    let sx = dx * cell_w / advance;
                    let on = match &cells {
                        Some(cells) => cells[sy * cell_w + sx],
                        // Outlined box for missing glyphs
                        None => sx == 0 || sx == cell_w - 1 || sy == 0 || sy == cell_h - 1,
                    };
                    if !on {
                        continue;
                    }

                    let px = pen_x + dx as i64 + shear;
                    let py = origin_y + dy as i64;
                    ink(target, px, py, 1.0);
                    if font.bold {
                        ink(target, px + 1, py, 1.0);
                    }
                }
            }

            pen_x += advance as i64;
        }

        Ok(())
    }

    fn has_family(&self, family: &str) -> bool {
        FAMILIES.iter().any(|f| f.eq_ignore_ascii_case(family))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::blank_surface;

    fn ink_count(surface: &Surface) -> usize {
        surface.pixels().filter(|p| p.0[0] == 0).count()
    }

    #[test]
    fn test_face_selection() {
        assert_eq!(Face::for_height(8), Face::S6x12);
        assert_eq!(Face::for_height(12), Face::S6x12);
        assert_eq!(Face::for_height(16), Face::S8x16);
        assert_eq!(Face::for_height(20), Face::S12x24);
        assert_eq!(Face::for_height(72), Face::S12x24);
    }

    #[test]
    fn test_every_face_loads_and_has_ascii() {
        for face in Face::ALL {
            let mut psf = face.load().unwrap();
            let (cell_w, cell_h) = face.cell();
            let cells = face.glyph(&mut psf, 'A').unwrap();
            assert_eq!(cells.len(), cell_w * cell_h);
            assert!(cells.iter().any(|&on| on));
            // Reusing the parsed face gives the same glyph
            assert_eq!(face.glyph(&mut psf, 'A').unwrap(), cells);
        }
    }

    #[test]
    fn test_measure_is_half_size_per_char() {
        let raster = BitmapRasterizer;
        assert_eq!(raster.measure("abc", &FontSpec::new("spleen", 24.0)).unwrap(), 36.0);
        assert_eq!(raster.measure("abcd", &FontSpec::new("spleen", 20.0)).unwrap(), 40.0);
        assert_eq!(raster.measure("", &FontSpec::new("spleen", 20.0)).unwrap(), 0.0);
    }

    #[test]
    fn test_measure_ignores_control_chars() {
        let raster = BitmapRasterizer;
        let font = FontSpec::new("spleen", 24.0);
        assert_eq!(
            raster.measure("a\tb\n", &font).unwrap(),
            raster.measure("ab", &font).unwrap()
        );
    }

    #[test]
    fn test_draw_puts_ink_inside_advance() {
        let raster = BitmapRasterizer;
        let font = FontSpec::new("spleen", 24.0);
        let mut surface = blank_surface(64, 32);
        raster.draw("A", 10.0, 4.0, &font, &mut surface).unwrap();

        assert!(ink_count(&surface) > 0);
        for (x, y, p) in surface.enumerate_pixels() {
            if p.0[0] == 0 {
                assert!((10..22).contains(&x), "ink at x={}", x);
                assert!((4..28).contains(&y), "ink at y={}", y);
            }
        }
    }

    #[test]
    fn test_bold_adds_ink() {
        let raster = BitmapRasterizer;
        let regular = FontSpec::new("spleen", 24.0);
        let bold = FontSpec {
            bold: true,
            ..regular.clone()
        };

        let mut a = blank_surface(64, 32);
        let mut b = blank_surface(64, 32);
        raster.draw("H", 0.0, 0.0, &regular, &mut a).unwrap();
        raster.draw("H", 0.0, 0.0, &bold, &mut b).unwrap();
        assert!(ink_count(&b) > ink_count(&a));
    }

    #[test]
    fn test_space_draws_nothing() {
        let raster = BitmapRasterizer;
        let mut surface = blank_surface(64, 32);
        raster
            .draw("   ", 0.0, 0.0, &FontSpec::new("spleen", 16.0), &mut surface)
            .unwrap();
        assert_eq!(ink_count(&surface), 0);
    }

    #[test]
    fn test_draw_is_deterministic() {
        let raster = BitmapRasterizer;
        let font = FontSpec {
            italic: true,
            ..FontSpec::new("spleen", 30.0)
        };
        let mut a = blank_surface(200, 40);
        let mut b = blank_surface(200, 40);
        raster.draw("Order #42", 3.0, 2.0, &font, &mut a).unwrap();
        raster.draw("Order #42", 3.0, 2.0, &font, &mut b).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_known_families() {
        let raster = BitmapRasterizer;
        assert!(raster.has_family("Spleen"));
        assert!(raster.has_family("monospace"));
        assert!(!raster.has_family("Arial"));
    }
}
