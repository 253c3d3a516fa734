//! # Error Types
//!
//! This module defines error types used throughout the slipcast library.
//!
//! Configuration problems are reported as [`ValidationError`] and are meant to
//! be shown to whoever is editing the template. Everything that can go wrong
//! while rendering or delivering a job is a [`SlipcastError`].

use thiserror::Error;

/// A template setting that fails validation.
///
/// These are raised when a template is saved or handed to the pipeline.
/// The `Display` text is the user-facing message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Template name is empty or whitespace
    #[error("Template name cannot be empty")]
    EmptyName,

    /// Template content is empty or whitespace
    #[error("Template content cannot be empty")]
    EmptyContent,

    /// Raster width is not one of the paper presets
    #[error("Unsupported paper width {0} dots (expected 384, 576 or 832)")]
    UnsupportedWidth(u32),

    /// Global font size outside the allowed range
    #[error("Font size {0} is out of range (8-72)")]
    FontSizeOutOfRange(f32),

    /// Line height multiplier outside the allowed range
    #[error("Line height {0} is out of range (1.0-3.0)")]
    LineHeightOutOfRange(f32),

    /// Padding would leave no printable area
    #[error("Padding {padding} is too large for a {width} dot wide slip")]
    PaddingTooLarge { padding: u32, width: u32 },

    /// A line style override carries an invalid font size
    #[error("Line {line}: font size {size} is out of range (8-72)")]
    LineFontSizeOutOfRange { line: usize, size: f32 },

    /// A placeholder size override carries an invalid font size
    #[error("Placeholder '{key}': font size {size} is out of range (8-72)")]
    PlaceholderFontSizeOutOfRange { key: String, size: f32 },
}

impl ValidationError {
    /// Whether this is an out-of-range override size. These block saving a
    /// template but are clamped when an already stored template is rendered.
    pub fn is_override_size(&self) -> bool {
        matches!(
            self,
            Self::LineFontSizeOutOfRange { .. } | Self::PlaceholderFontSizeOutOfRange { .. }
        )
    }
}

/// Main error type for slipcast operations
#[derive(Debug, Error)]
pub enum SlipcastError {
    /// Template failed validation
    #[error("Invalid template: {0}")]
    Template(#[from] ValidationError),

    /// The text rasterizer could not measure or draw a run of text
    #[error("Render error: {0}")]
    Render(String),

    /// A font could not be loaded or resolved
    #[error("Font error: {0}")]
    Font(String),

    /// Image encoding/decoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Template store error
    #[error("Template store error: {0}")]
    Store(String),

    /// Run configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Transport-level errors (connection, I/O)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
