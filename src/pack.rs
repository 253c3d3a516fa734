//! # Monochrome Packing
//!
//! Thresholds an RGBA pixel buffer down to the 1-bit-per-dot layout that
//! raster printer commands expect.
//!
//! ## Threshold
//!
//! Intensity is the plain mean of red, green and blue (alpha is ignored). A
//! pixel is ink when its intensity is strictly below the threshold:
//!
//! ```text
//! mean(r, g, b) < 128  →  1 (black dot)
//! mean(r, g, b) ≥ 128  →  0 (no dot)
//! ```
//!
//! The comparison is done as `r + g + b < 3 × threshold` so no rounding is
//! involved. There is no dithering.
//!
//! ## Bit Packing
//!
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - Each row starts on a fresh byte; unused low bits of the last byte are 0
//!
//! ```text
//! width = 12  →  bytes_per_row = 2
//!
//! row 0: ████████ ████░░░░    0xFF 0xF0
//! row 1: ░░░░░░░░ ░░░░░░░░    0x00 0x00
//!                     ^^^^ padding, never ink
//! ```

use image::{GrayImage, ImageEncoder, Luma};

use crate::error::SlipcastError;
use crate::raster::Surface;

/// Mid-grey threshold on a 0–255 scale
pub const DEFAULT_THRESHOLD: u8 = 128;

/// A 1-bit-per-pixel image with byte-aligned rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBitmap {
    pub width: u32,
    pub height: u32,
    /// `ceil(width / 8)`
    pub bytes_per_row: usize,
    /// `bytes_per_row * height` bytes, row-major
    pub data: Vec<u8>,
}

impl PackedBitmap {
    /// All-background bitmap.
    pub fn blank(width: u32, height: u32) -> Self {
        let bytes_per_row = (width as usize).div_ceil(8);
        Self {
            width,
            height,
            bytes_per_row,
            data: vec![0; bytes_per_row * height as usize],
        }
    }

    /// Packed bytes of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.bytes_per_row;
        &self.data[start..start + self.bytes_per_row]
    }

    /// Whether the dot at (`x`, `y`) is ink.
    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y as usize * self.bytes_per_row + x as usize / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Number of ink dots.
    pub fn ink_count(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Render to a black-on-white PNG, exactly as the printer will print it.
    pub fn to_png(&self) -> Result<Vec<u8>, SlipcastError> {
        let mut img = GrayImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let color = if self.is_ink(x, y) { 0u8 } else { 255u8 };
                img.put_pixel(x, y, Luma([color]));
            }
        }

        let mut png_bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                img.as_raw(),
                self.width,
                self.height,
                image::ExtendedColorType::L8,
            )
            .map_err(|e: image::ImageError| SlipcastError::Image(e.to_string()))?;

        Ok(png_bytes)
    }
}

/// Pack one row of ink flags MSB-first.
///
/// ```
/// use slipcast::pack::pack_row;
///
/// assert_eq!(pack_row(&[true, true, false, false, true, false, true, false]), vec![0xCA]);
/// assert_eq!(pack_row(&[true; 12]), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len().div_ceil(8)];
    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }
    bytes
}

/// Pack a tightly packed RGBA buffer (`4 * width * height` bytes).
///
/// Pixels missing from a short buffer count as background.
pub fn pack(pixels: &[u8], width: u32, height: u32, threshold: u8) -> PackedBitmap {
    let mut bitmap = PackedBitmap::blank(width, height);
    let limit = 3 * threshold as u32;
    let width = width as usize;
    let mut row = vec![false; width];

    for y in 0..height as usize {
        for (x, ink) in row.iter_mut().enumerate() {
            let offset = (y * width + x) * 4;
            *ink = match pixels.get(offset..offset + 3) {
                Some(rgb) => rgb.iter().map(|&c| c as u32).sum::<u32>() < limit,
                None => false,
            };
        }
        let start = y * bitmap.bytes_per_row;
        bitmap.data[start..start + bitmap.bytes_per_row].copy_from_slice(&pack_row(&row));
    }

    log::debug!(
        "packed {}x{} -> {} bytes ({} per row)",
        width,
        height,
        bitmap.data.len(),
        bitmap.bytes_per_row
    );

    bitmap
}

/// Pack a rendered surface.
pub fn pack_surface(surface: &Surface, threshold: u8) -> PackedBitmap {
    pack(surface.as_raw(), surface.width(), surface.height(), threshold)
}

// ============================================================================
// TESTS
// ============================================================================
