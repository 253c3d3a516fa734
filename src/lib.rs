//! # Slipcast - Template Slips for Thermal Receipt Printers
//!
//! Slipcast turns a text template and a record of values into a printable
//! ESC/POS raster job. Text is rendered on the host, so any font and any
//! script the rasterizer can draw comes out on paper exactly as previewed.
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌────────┐   ┌────────┐   ┌──────┐   ┌────────┐
//! │ Template │──▶│ substitute │──▶│ layout │──▶│ raster │──▶│ pack │──▶│ encode │──▶ bytes
//! └──────────┘   └────────────┘   └────────┘   └────────┘   └──────┘   └────────┘
//!      ▲
//!   Record
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use slipcast::{RenderConfig, Template, render_template};
//! use slipcast::raster::BitmapRasterizer;
//! use slipcast::substitute::Record;
//!
//! let template = Template::new("order", "#{{sessionIndex}} - {{phone}}\nTotal: {{total}}")
//!     .with_placeholder_size("total", 30.0);
//!
//! let record: Record = [
//!     ("sessionIndex", "123"),
//!     ("phone", "0901234567"),
//!     ("total", "250000"),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v.to_string()))
//! .collect();
//!
//! let job = render_template(&template, &record, &BitmapRasterizer, &RenderConfig::default())?;
//! assert_eq!(job.bitmap.width, 576);
//!
//! // Hand the bytes to a printer:
//! // slipcast::transport::write_device("/dev/usb/lp0", &job.commands)?;
//! # Ok::<(), slipcast::SlipcastError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Template model, validation and the template store |
//! | [`substitute`] | `{{key}}` tokenizing and record substitution |
//! | [`layout`] | Line boxes and draw positions |
//! | [`raster`] | Text rasterizers (Spleen bitmap faces, TrueType) |
//! | [`pack`] | 1-bit row packing and PNG previews |
//! | [`protocol`] | ESC/POS raster framing, feed and cut |
//! | [`pipeline`] | End-to-end render of a template or plain text |
//! | [`transport`] | Device file and raw TCP delivery |
//! | [`config`] | Render configuration and font files |
//! | [`error`] | Error types |
//!
//! ## Paper Widths
//!
//! | Paper | Dots |
//! |-------|------|
//! | 58mm | 384 |
//! | 80mm | 576 |
//! | 104mm | 832 |

pub mod config;
pub mod error;
pub mod layout;
pub mod pack;
pub mod pipeline;
pub mod protocol;
pub mod raster;
pub mod substitute;
pub mod template;
pub mod transport;

// Re-exports for convenience
pub use config::RenderConfig;
pub use error::{SlipcastError, ValidationError};
pub use pack::PackedBitmap;
pub use pipeline::{PrintJob, render_plain_text, render_template};
pub use template::{Settings, Template, TemplateStore};
