//! # Layout Planner
//!
//! Turns styled lines into positioned draw instructions and a surface size.
//!
//! ## Vertical Layout
//!
//! ```text
//! y = 0          ┌──────────────────────────────┐
//!                │ padding                      │
//! y = padding    │ line 1   size₁ × lineHeight  │
//!                │ lineSpacing                  │
//!                │ line 2   size₂ × lineHeight  │
//!                │ ...                          │
//!                │ padding                      │
//! y = height     └──────────────────────────────┘
//! ```
//!
//! A line's size is its `lineN` font size override, else the template font
//! size. Placeholder-sized segments do not change the line box. Text is drawn
//! from the top of its line box. `lineSpacing` only appears between lines.
//!
//! Distances are summed at 1/1000 px precision and the total is rounded up to
//! whole rows.
//!
//! ## Horizontal Layout
//!
//! Each segment is measured at its own size and the widths are summed:
//!
//! | Align | Line start x |
//! |-------|--------------|
//! | left | `padding` |
//! | center | `(width - lineWidth) / 2` |
//! | right | `width - padding - lineWidth` |
//!
//! Segments follow each other left to right from the line start. Lines wider
//! than the surface are not wrapped; the surface clips them.

use crate::error::SlipcastError;
use crate::raster::{FontSpec, TextRasterizer};
use crate::substitute::StyledLine;
use crate::template::{Align, LineStyles, Settings, clamp_font_size};

/// One run of text to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawInstruction {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font: FontSpec,
}

/// Placement of one line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    /// 0-based line index
    pub index: usize,
    /// Top of the line box
    pub y: f32,
    pub height: f32,
    /// Effective (clamped) line font size
    pub font_size: f32,
    /// Start x of the first segment
    pub x: f32,
    /// Sum of the measured segment widths
    pub width: f32,
}

/// Complete layout of a slip.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub width: u32,
    pub height: u32,
    pub lines: Vec<LineBox>,
    pub instructions: Vec<DrawInstruction>,
}

/// Clamp a render-time font size, logging when the value had to change.
fn effective_size(size: f32, what: &str) -> f32 {
    let clamped = clamp_font_size(size);
    if clamped != size {
        log::warn!("{} font size {} out of range, clamped to {}", what, size, clamped);
    }
    clamped
}

/// Round a pixel distance to 1/1000 px so f32 noise such as
/// `24.0 * 1.2 == 28.800001` does not pile up over many lines.
fn snap(distance: f32) -> f64 {
    (distance as f64 * 1000.0).round() / 1000.0
}

/// Surface height for a total extent: exact totals are kept, fractions round up.
fn surface_height(total: f64) -> u32 {
    ((total * 1000.0).round() / 1000.0).ceil().max(0.0) as u32
}

/// Plan the layout of `lines`.
///
/// `line_spacing` is extra space in pixels between adjacent lines.
pub fn plan<R: TextRasterizer + ?Sized>(
    lines: &[StyledLine],
    settings: &Settings,
    line_styles: &LineStyles,
    line_spacing: f32,
    rasterizer: &R,
) -> Result<LayoutPlan, SlipcastError> {
    let width = settings.width as f32;
    let padding = settings.padding as f32;
    let default_size = effective_size(settings.font_size, "Template");

    let mut boxes = Vec::with_capacity(lines.len());
    let mut instructions = Vec::new();
    let mut cursor = padding as f64;

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            cursor += snap(line_spacing);
        }

        let y = cursor as f32;
        let style = line_styles.get(line.number()).copied().unwrap_or_default();
        let line_size = match style.font_size {
            Some(size) => effective_size(size, &format!("Line {}", line.number())),
            None => default_size,
        };
        let line_font = FontSpec {
            family: settings.font_family.clone(),
            size: line_size,
            bold: style.bold.unwrap_or(false),
            italic: style.italic.unwrap_or(false),
        };

        // Segments are measured at their own size, never as one line.
        let mut measured = Vec::with_capacity(line.segments.len());
        for segment in &line.segments {
            let font = match segment.font_size {
                Some(size) => FontSpec {
                    size: effective_size(size, "Placeholder"),
                    ..line_font.clone()
                },
                None => line_font.clone(),
            };
            let advance = rasterizer.measure(&segment.text, &font)?;
            measured.push((segment, font, advance));
        }
        let line_width: f32 = measured.iter().map(|(_, _, w)| w).sum();

        let start_x = match settings.align {
            Align::Left => padding,
            Align::Center => (width - line_width) / 2.0,
            Align::Right => width - padding - line_width,
        };

        let mut x = start_x;
        for (segment, font, advance) in measured {
            if !segment.text.is_empty() {
                instructions.push(DrawInstruction {
                    text: segment.text.clone(),
                    x,
                    y,
                    font,
                });
            }
            x += advance;
        }

        let height = line_size * settings.line_height;
        boxes.push(LineBox {
            index: line.index,
            y,
            height,
            font_size: line_size,
            x: start_x,
            width: line_width,
        });
        cursor += snap(height);
    }

    let total_height = cursor + padding as f64;
    let plan = LayoutPlan {
        width: settings.width,
        height: surface_height(total_height),
        lines: boxes,
        instructions,
    };

    log::debug!(
        "planned {} lines, {} draw instructions, surface {}x{}",
        plan.lines.len(),
        plan.instructions.len(),
        plan.width,
        plan.height
    );

    Ok(plan)
}

// ============================================================================
// TESTS
// ============================================================================
