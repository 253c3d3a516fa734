//! # ESC/POS Protocol
//!
//! Byte-level command builders for ESC/POS thermal receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Paper feed and cutter commands
//! - [`graphics`]: Raster bit image framing and job trailers
//!
//! ## Usage Example
//!
//! ```
//! use slipcast::pack::PackedBitmap;
//! use slipcast::protocol::graphics::{self, Trailer};
//!
//! // A 384-dot (58mm) wide, 24-row blank strip
//! let bitmap = PackedBitmap::blank(384, 24);
//! let data = graphics::encode(&bitmap, Trailer::Feed, 3);
//!
//! assert_eq!(&data[..4], &[0x1D, 0x76, 0x30, 0x00]);
//! assert_eq!(data.len(), 8 + 48 * 24 + 3);
//! ```

pub mod commands;
pub mod graphics;
