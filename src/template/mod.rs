//! # Print Templates
//!
//! A template is free text with `{{placeholder}}` tokens plus the layout
//! settings used to turn it into a raster slip.
//!
//! ## JSON Form
//!
//! Templates are stored and exchanged as JSON with camelCase keys:
//!
//! ```json
//! {
//!   "name": "order-slip",
//!   "content": "#{{sessionIndex}} - {{phone}}\n{{name}}\nPrice: {{price}}",
//!   "settings": {
//!     "width": 576,
//!     "fontSize": 24,
//!     "lineHeight": 1.2,
//!     "padding": 8,
//!     "align": "center",
//!     "fontFamily": "spleen",
//!     "orientation": "portrait"
//!   },
//!   "lineStyles": { "line1": { "fontSize": 40, "bold": true } },
//!   "placeholderSizes": { "price": 30 }
//! }
//! ```
//!
//! Missing `settings` fields fall back to [`Settings::default`].
//!
//! ## Paper Widths
//!
//! | Preset | Paper | Width (dots @ 203 DPI) |
//! |--------|-------|------------------------|
//! | [`PaperWidth::Mm58`] | 58mm | 384 |
//! | [`PaperWidth::Mm80`] | 80mm | 576 |
//! | [`PaperWidth::Mm104`] | 104mm | 832 |

pub mod store;
mod validate;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use store::TemplateStore;

/// Smallest accepted font size in pixels
pub const MIN_FONT_SIZE: f32 = 8.0;

/// Largest accepted font size in pixels
pub const MAX_FONT_SIZE: f32 = 72.0;

/// Smallest accepted line height multiplier
pub const MIN_LINE_HEIGHT: f32 = 1.0;

/// Largest accepted line height multiplier
pub const MAX_LINE_HEIGHT: f32 = 3.0;

/// Clamp a font size into the accepted range.
///
/// NaN maps to the lower bound.
pub fn clamp_font_size(size: f32) -> f32 {
    if size.is_nan() {
        MIN_FONT_SIZE
    } else {
        size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    }
}

// ============================================================================
// PAPER WIDTH PRESETS
// ============================================================================

/// Supported thermal paper widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperWidth {
    /// 58mm paper, 48mm printable
    Mm58,
    /// 80mm paper, 72mm printable
    Mm80,
    /// 104mm (4 inch) paper
    Mm104,
}

impl PaperWidth {
    pub const ALL: [PaperWidth; 3] = [Self::Mm58, Self::Mm80, Self::Mm104];

    /// Raster width in dots
    #[inline]
    pub const fn dots(self) -> u32 {
        match self {
            Self::Mm58 => 384,
            Self::Mm80 => 576,
            Self::Mm104 => 832,
        }
    }

    /// Look up the preset for a raster width
    pub fn from_dots(dots: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.dots() == dots)
    }

    /// Parse `"58mm"`, `"80mm"`, `"104mm"` or a dot width such as `"576"`.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "58mm" | "58" => Ok(Self::Mm58),
            "80mm" | "80" => Ok(Self::Mm80),
            "104mm" | "104" => Ok(Self::Mm104),
            other => other
                .parse::<u32>()
                .ok()
                .and_then(Self::from_dots)
                .ok_or_else(|| {
                    format!(
                        "Unknown paper width '{}'. Use 58mm, 80mm, 104mm, 384, 576 or 832",
                        s
                    )
                }),
        }
    }
}

// ============================================================================
// SETTINGS
// ============================================================================

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl std::str::FromStr for Align {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(format!("Unknown alignment '{}'", s)),
        }
    }
}

/// Slip orientation relative to the paper feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Lines run across the paper
    #[default]
    Portrait,
    /// Lines run along the paper feed (surface rotated 90° clockwise)
    Landscape,
}

/// Global layout settings of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Raster width in dots; must be a [`PaperWidth`] preset
    pub width: u32,
    /// Default font size in pixels
    pub font_size: f32,
    /// Line box height as a multiple of the line's font size
    pub line_height: f32,
    /// Uniform margin in pixels
    pub padding: u32,
    pub align: Align,
    /// Family name resolved by the rasterizer
    pub font_family: String,
    pub orientation: Orientation,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: PaperWidth::Mm80.dots(),
            font_size: 24.0,
            line_height: 1.2,
            padding: 8,
            align: Align::Left,
            font_family: "spleen".to_string(),
            orientation: Orientation::Portrait,
        }
    }
}

// ============================================================================
// LINE STYLES
// ============================================================================

/// Per-line style override. Unset fields inherit from [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
}

/// Line style overrides keyed by 1-based line number.
///
/// Serialized as a map with `line1`, `line2`, … keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineStyles(BTreeMap<usize, LineStyle>);

impl LineStyles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the override for a 1-based line number.
    pub fn set(&mut self, line: usize, style: LineStyle) {
        self.0.insert(line, style);
    }

    /// Override for a 1-based line number.
    pub fn get(&self, line: usize) -> Option<&LineStyle> {
        self.0.get(&line)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &LineStyle)> {
        self.0.iter().map(|(line, style)| (*line, style))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(usize, LineStyle)> for LineStyles {
    fn from_iter<I: IntoIterator<Item = (usize, LineStyle)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse a `lineN` key into its 1-based line number.
fn parse_line_key(key: &str) -> Option<usize> {
    key.strip_prefix("line")
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|&n| n >= 1)
}

impl Serialize for LineStyles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (line, style) in &self.0 {
            map.serialize_entry(&format!("line{}", line), style)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LineStyles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, LineStyle>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, style)| {
                parse_line_key(&key)
                    .map(|line| (line, style))
                    .ok_or_else(|| {
                        de::Error::custom(format!(
                            "invalid line style key '{}', expected line1, line2, ...",
                            key
                        ))
                    })
            })
            .collect()
    }
}

// ============================================================================
// TEMPLATE
// ============================================================================

/// A named print template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    /// Newline-delimited text with `{{key}}` placeholders
    pub content: String,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "LineStyles::is_empty")]
    pub line_styles: LineStyles,
    /// Font size applied only to the substituted value of a placeholder
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub placeholder_sizes: BTreeMap<String, f32>,
}

impl Template {
    /// Create a template with default settings.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            settings: Settings::default(),
            line_styles: LineStyles::default(),
            placeholder_sizes: BTreeMap::new(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_line_style(mut self, line: usize, style: LineStyle) -> Self {
        self.line_styles.set(line, style);
        self
    }

    pub fn with_placeholder_size(mut self, key: impl Into<String>, size: f32) -> Self {
        self.placeholder_sizes.insert(key.into(), size);
        self
    }

    /// Lines of the content, split on `\n`.
    pub fn lines(&self) -> std::str::Split<'_, char> {
        self.content.split('\n')
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// Distinct placeholder keys in order of first use.
    pub fn placeholders(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for key in crate::substitute::placeholder_keys(&self.content) {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
        keys
    }

    /// Parse a template from JSON.
    pub fn from_json(json: &str) -> Result<Self, crate::SlipcastError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, crate::SlipcastError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// TESTS
// ============================================================================
