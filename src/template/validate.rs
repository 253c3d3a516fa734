//! Save-time template validation.

use super::{
    MAX_FONT_SIZE, MAX_LINE_HEIGHT, MIN_FONT_SIZE, MIN_LINE_HEIGHT, PaperWidth, Template,
};
use crate::error::ValidationError;

fn font_size_ok(size: f32) -> bool {
    (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size)
}

impl Template {
    /// Check the template, returning the first problem found.
    ///
    /// Line styles for lines that do not exist and placeholder sizes for keys
    /// that never appear in the content are never checked, since rendering
    /// never reads them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.problems().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Check only what rendering cannot recover from.
    ///
    /// Out-of-range line and placeholder sizes pass here; the layout planner
    /// clamps them.
    pub fn check_renderable(&self) -> Result<(), ValidationError> {
        match self.problems().into_iter().find(|p| !p.is_override_size()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Every validation problem, in a stable order.
    pub fn problems(&self) -> Vec<ValidationError> {
        let mut problems = Vec::new();
        let settings = &self.settings;

        if self.name.trim().is_empty() {
            problems.push(ValidationError::EmptyName);
        }
        if self.content.trim().is_empty() {
            problems.push(ValidationError::EmptyContent);
        }
        if PaperWidth::from_dots(settings.width).is_none() {
            problems.push(ValidationError::UnsupportedWidth(settings.width));
        }
        if !font_size_ok(settings.font_size) {
            problems.push(ValidationError::FontSizeOutOfRange(settings.font_size));
        }
        if !(MIN_LINE_HEIGHT..=MAX_LINE_HEIGHT).contains(&settings.line_height) {
            problems.push(ValidationError::LineHeightOutOfRange(settings.line_height));
        }
        if settings.padding.saturating_mul(2) >= settings.width {
            problems.push(ValidationError::PaddingTooLarge {
                padding: settings.padding,
                width: settings.width,
            });
        }

        let line_count = self.line_count();
        for (line, style) in self.line_styles.iter().filter(|(line, _)| *line <= line_count) {
            if let Some(size) = style.font_size
                && !font_size_ok(size)
            {
                problems.push(ValidationError::LineFontSizeOutOfRange { line, size });
            }
        }

        let used = self.placeholders();
        for (key, &size) in &self.placeholder_sizes {
            if !font_size_ok(size) && used.contains(key) {
                problems.push(ValidationError::PlaceholderFontSizeOutOfRange {
                    key: key.clone(),
                    size,
                });
            }
        }

        problems
    }
}
