//! # ESC/POS Raster Graphics
//!
//! Wraps a [`PackedBitmap`] in the "print raster bit image" command and
//! appends the job trailer.
//!
//! ## Frame Layout
//!
//! ```text
//! ┌────┬────┬────┬───┬────┬────┬────┬────┬──────────────────────┬─────────┐
//! │ 1D │ 76 │ 30 │ m │ xL │ xH │ yL │ yH │ bytes_per_row × rows │ trailer │
//! └────┴────┴────┴───┴────┴────┴────┴────┴──────────────────────┴─────────┘
//!   GS    v    0   mode  width in     height in     packed rows,
//!                  = 0   bytes (LE)   dots (LE)     no separators
//! ```
//!
//! ## Trailers
//!
//! | Job | Trailer | Bytes |
//! |-----|---------|-------|
//! | Template slip | feed | `1B 64 n` |
//! | Plain text | feed, then feed and full cut | `1B 64 n 1D 56 41 00` |
//!
//! ## No Validation
//!
//! The header is taken from `bytes_per_row` and `height` as they are and the
//! payload is copied verbatim. A bitmap whose data length disagrees with its
//! dimensions is still encoded; the damage shows up on paper.

use super::commands::{GS, cut_full_feed, feed_lines, u16_le};
use crate::pack::PackedBitmap;

/// GS v 0 - print raster bit image
pub const RASTER_COMMAND: [u8; 3] = [GS, b'v', b'0'];

/// Normal density, no scaling
pub const MODE_NORMAL: u8 = 0;

/// Header length: command, mode, xL xH, yL yH
pub const HEADER_LEN: usize = 8;

/// What follows the image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trailer {
    /// Feed only (template slips)
    Feed,
    /// Feed, then feed to the cutter and cut (plain text)
    FeedAndCut,
}

/// # Raster Header (GS v 0 m xL xH yL yH)
///
/// ```
/// use slipcast::protocol::graphics::raster_header;
///
/// // 576 dots wide (72 bytes), 500 rows
/// assert_eq!(
///     raster_header(72, 500),
///     [0x1D, 0x76, 0x30, 0x00, 72, 0, 0xF4, 0x01]
/// );
/// ```
pub fn raster_header(bytes_per_row: u16, height: u16) -> [u8; HEADER_LEN] {
    let [xl, xh] = u16_le(bytes_per_row);
    let [yl, yh] = u16_le(height);
    [
        RASTER_COMMAND[0],
        RASTER_COMMAND[1],
        RASTER_COMMAND[2],
        MODE_NORMAL,
        xl,
        xh,
        yl,
        yh,
    ]
}

/// Raster command for a bitmap: header followed by its packed rows.
pub fn raster(bitmap: &PackedBitmap) -> Vec<u8> {
    let header = raster_header(bitmap.bytes_per_row as u16, bitmap.height as u16);
    let mut cmd = Vec::with_capacity(HEADER_LEN + bitmap.data.len());
    cmd.extend_from_slice(&header);
    cmd.extend_from_slice(&bitmap.data);
    cmd
}

/// Encode a complete job: raster command plus trailer.
pub fn encode(bitmap: &PackedBitmap, trailer: Trailer, feed: u8) -> Vec<u8> {
    let mut cmd = raster(bitmap);
    cmd.extend(feed_lines(feed));
    if trailer == Trailer::FeedAndCut {
        cmd.extend(cut_full_feed(0));
    }

    log::debug!(
        "encoded {}x{} bitmap into {} bytes ({:?})",
        bitmap.width,
        bitmap.height,
        cmd.len(),
        trailer
    );

    cmd
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_raster_header_fields() {
        let bitmap = PackedBitmap::blank(576, 100);
        let cmd = raster(&bitmap);

        assert_eq!(cmd[0], 0x1D); // GS
        assert_eq!(cmd[1], 0x76); // 'v'
        assert_eq!(cmd[2], 0x30); // '0'
        assert_eq!(cmd[3], 0); // m = normal
        assert_eq!(cmd[4], 72); // xL (576/8 = 72)
        assert_eq!(cmd[5], 0); // xH
        assert_eq!(cmd[6], 100); // yL
        assert_eq!(cmd[7], 0); // yH
        assert_eq!(cmd.len(), HEADER_LEN + 72 * 100);
    }

    #[test]
    fn test_raster_large_height() {
        let bitmap = PackedBitmap::blank(384, 500);
        let cmd = raster(&bitmap);
        // 500 = 0x01F4 -> [0xF4, 0x01] in little-endian
        assert_eq!(cmd[6], 0xF4);
        assert_eq!(cmd[7], 0x01);
    }

    #[test]
    fn test_raster_width_rounding() {
        // 385 dots round up to 49 bytes
        let bitmap = PackedBitmap::blank(385, 2);
        let cmd = raster(&bitmap);
        assert_eq!(cmd[4], 49);
        assert_eq!(cmd.len(), HEADER_LEN + 49 * 2);
    }

    #[test]
    fn test_raster_preserves_data() {
        let mut bitmap = PackedBitmap::blank(576, 50);
        bitmap.data = (0..72 * 50).map(|i| (i % 256) as u8).collect();
        let cmd = raster(&bitmap);
        assert_eq!(&cmd[HEADER_LEN..], &bitmap.data[..]);
    }

    #[test]
    fn test_feed_trailer() {
        let bitmap = PackedBitmap::blank(8, 1);
        let cmd = encode(&bitmap, Trailer::Feed, 3);
        assert_eq!(
            cmd,
            vec![0x1D, 0x76, 0x30, 0x00, 1, 0, 1, 0, 0x00, 0x1B, 0x64, 3]
        );
    }

    #[test]
    fn test_feed_and_cut_trailer() {
        let bitmap = PackedBitmap::blank(8, 1);
        let cmd = encode(&bitmap, Trailer::FeedAndCut, 3);
        assert_eq!(
            &cmd[HEADER_LEN + 1..],
            &[0x1B, 0x64, 3, 0x1D, 0x56, 0x41, 0x00]
        );
    }

    #[test]
    fn test_inconsistent_bitmap_still_encoded() {
        let bitmap = PackedBitmap {
            width: 16,
            height: 4,
            bytes_per_row: 2,
            data: vec![0xFF; 3],
        };
        let cmd = encode(&bitmap, Trailer::Feed, 1);
        assert_eq!(&cmd[4..8], &[2, 0, 4, 0]);
        assert_eq!(cmd.len(), HEADER_LEN + 3 + 3);
    }
}
