//! # Render Configuration
//!
//! Host-side settings that are not part of a template: spacing between lines,
//! the packing threshold, how far to feed after a job, and which font files
//! back which family names.
//!
//! ```json
//! {
//!   "lineSpacing": 4,
//!   "threshold": 128,
//!   "feedLines": 3,
//!   "fonts": {
//!     "Roboto": {
//!       "regular": "/usr/share/fonts/Roboto-Regular.ttf",
//!       "bold": "/usr/share/fonts/Roboto-Bold.ttf"
//!     }
//!   }
//! }
//! ```
//!
//! Every field is optional.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::SlipcastError;
use crate::pack::DEFAULT_THRESHOLD;
use crate::protocol::commands::DEFAULT_FEED_LINES;
use crate::raster::{FaceStyle, FontSet};

/// Font files for one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFiles {
    pub regular: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold_italic: Option<PathBuf>,
}

impl FontFiles {
    fn faces(&self) -> impl Iterator<Item = (FaceStyle, &Path)> {
        [
            Some((FaceStyle::Regular, self.regular.as_path())),
            self.bold.as_deref().map(|p| (FaceStyle::Bold, p)),
            self.italic.as_deref().map(|p| (FaceStyle::Italic, p)),
            self.bold_italic.as_deref().map(|p| (FaceStyle::BoldItalic, p)),
        ]
        .into_iter()
        .flatten()
    }
}

/// Settings for a render run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Extra pixels between adjacent lines
    pub line_spacing: f32,
    /// Ink threshold on the RGB mean (0-255)
    pub threshold: u8,
    /// Lines fed after the image
    pub feed_lines: u8,
    /// Font family name to font files
    pub fonts: BTreeMap<String, FontFiles>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            line_spacing: 0.0,
            threshold: DEFAULT_THRESHOLD,
            feed_lines: DEFAULT_FEED_LINES,
            fonts: BTreeMap::new(),
        }
    }
}

impl RenderConfig {
    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SlipcastError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SlipcastError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            SlipcastError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), SlipcastError> {
        if !self.line_spacing.is_finite() || self.line_spacing < 0.0 {
            return Err(SlipcastError::Config(format!(
                "lineSpacing must be a non-negative number, got {}",
                self.line_spacing
            )));
        }
        Ok(())
    }

    /// Register a family from the command line (`FAMILY=PATH`) as its regular face.
    pub fn add_font_arg(&mut self, arg: &str) -> Result<(), SlipcastError> {
        let (family, path) = arg.split_once('=').ok_or_else(|| {
            SlipcastError::Config(format!("Expected FAMILY=PATH, got '{}'", arg))
        })?;
        self.fonts.insert(
            family.trim().to_string(),
            FontFiles {
                regular: PathBuf::from(path.trim()),
                bold: None,
                italic: None,
                bold_italic: None,
            },
        );
        Ok(())
    }

    /// Load every configured font into a [`FontSet`].
    pub fn font_set(&self) -> Result<FontSet, SlipcastError> {
        let mut fonts = FontSet::new();
        for (family, files) in &self.fonts {
            for (style, path) in files.faces() {
                fonts.ttf.load_face(family, style, path)?;
            }
        }
        Ok(fonts)
    }
}
