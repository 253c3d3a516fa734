//! # Print Pipeline
//!
//! Runs a template and a data record through every stage and returns the
//! intermediate artifacts along with the final printer bytes.
//!
//! ```text
//! Template + Record
//!     │ substitute
//!     ▼
//! StyledLine[] ──plan──▶ LayoutPlan ──draw──▶ Surface (RGBA)
//!                                                │ rotate (landscape only)
//!                                                │ pack
//!                                                ▼
//!                                          PackedBitmap ──encode──▶ bytes
//! ```
//!
//! Each call is independent: nothing is cached between jobs, and the same
//! inputs with the same rasterizer always produce the same bytes. Any stage
//! failing aborts the job; no partial buffer is returned.
//!
//! ## Example
//!
//! ```
//! use slipcast::config::RenderConfig;
//! use slipcast::pipeline::render_template;
//! use slipcast::raster::BitmapRasterizer;
//! use slipcast::substitute::Record;
//! use slipcast::template::Template;
//!
//! let template = Template::new("slip", "#{{sessionIndex}} - {{phone}}");
//! let mut record = Record::new();
//! record.insert("sessionIndex".into(), "123".into());
//! record.insert("phone".into(), "0901234567".into());
//!
//! let job = render_template(&template, &record, &BitmapRasterizer, &RenderConfig::default())?;
//! assert_eq!(&job.commands[..3], &[0x1D, 0x76, 0x30]);
//! # Ok::<(), slipcast::SlipcastError>(())
//! ```

use image::imageops;

use crate::config::RenderConfig;
use crate::error::SlipcastError;
use crate::layout::{self, LayoutPlan};
use crate::pack::{self, PackedBitmap};
use crate::protocol::graphics::{self, Trailer};
use crate::raster::{Surface, TextRasterizer, blank_surface};
use crate::substitute::{self, Record, Segment, StyledLine};
use crate::template::{Orientation, Settings, Template};

/// Everything produced by one render.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub lines: Vec<StyledLine>,
    pub plan: LayoutPlan,
    /// Rendered pixels, after rotation for landscape slips
    pub surface: Surface,
    pub bitmap: PackedBitmap,
    /// Final printer command buffer
    pub commands: Vec<u8>,
}

/// Render a template slip. The trailer feeds but does not cut.
pub fn render_template<R: TextRasterizer + ?Sized>(
    template: &Template,
    record: &Record,
    rasterizer: &R,
    config: &RenderConfig,
) -> Result<PrintJob, SlipcastError> {
    template.check_renderable()?;

    let missing: Vec<String> = template
        .placeholders()
        .into_iter()
        .filter(|key| !record.contains_key(key))
        .collect();
    if !missing.is_empty() {
        log::debug!("record has no value for: {}", missing.join(", "));
    }

    let lines = substitute::substitute(template, record);
    run(lines, template, rasterizer, config, Trailer::Feed)
}

/// Render plain text with the given settings. Braces are printed literally and
/// the trailer cuts the paper.
pub fn render_plain_text<R: TextRasterizer + ?Sized>(
    text: &str,
    settings: &Settings,
    rasterizer: &R,
    config: &RenderConfig,
) -> Result<PrintJob, SlipcastError> {
    let template = Template::new("plain-text", text).with_settings(settings.clone());
    template.check_renderable()?;

    let lines = template
        .lines()
        .enumerate()
        .map(|(index, line)| StyledLine {
            index,
            segments: if line.is_empty() {
                Vec::new()
            } else {
                vec![Segment::plain(line)]
            },
        })
        .collect();
    run(lines, &template, rasterizer, config, Trailer::FeedAndCut)
}

fn run<R: TextRasterizer + ?Sized>(
    lines: Vec<StyledLine>,
    template: &Template,
    rasterizer: &R,
    config: &RenderConfig,
    trailer: Trailer,
) -> Result<PrintJob, SlipcastError> {
    let settings = &template.settings;
    if !rasterizer.has_family(&settings.font_family) {
        log::warn!(
            "font family '{}' not available, using fallback face",
            settings.font_family
        );
    }

    let plan = layout::plan(
        &lines,
        settings,
        &template.line_styles,
        config.line_spacing,
        rasterizer,
    )?;

    check_frame(&plan, settings.orientation)?;

    let mut surface = rasterize(&plan, rasterizer)?;
    if settings.orientation == Orientation::Landscape {
        surface = imageops::rotate90(&surface);
        if surface.width() > settings.width {
            log::warn!(
                "landscape slip is {} dots across, wider than the {} dot paper",
                surface.width(),
                settings.width
            );
        }
    }

    let bitmap = pack::pack_surface(&surface, config.threshold);
    let commands = graphics::encode(&bitmap, trailer, config.feed_lines);

    Ok(PrintJob {
        lines,
        plan,
        surface,
        bitmap,
        commands,
    })
}

/// Reject slips whose raster header fields would not fit in 16 bits.
fn check_frame(plan: &LayoutPlan, orientation: Orientation) -> Result<(), SlipcastError> {
    let (dots, rows) = match orientation {
        Orientation::Portrait => (plan.width, plan.height),
        Orientation::Landscape => (plan.height, plan.width),
    };
    let bytes_per_row = dots.div_ceil(8);
    if rows > u16::MAX as u32 || bytes_per_row > u16::MAX as u32 {
        return Err(SlipcastError::Render(format!(
            "slip of {} rows at {} bytes per row exceeds the raster limit of {} each",
            rows,
            bytes_per_row,
            u16::MAX
        )));
    }
    Ok(())
}

/// Draw every instruction of a plan onto a fresh white surface.
pub fn rasterize<R: TextRasterizer + ?Sized>(
    plan: &LayoutPlan,
    rasterizer: &R,
) -> Result<Surface, SlipcastError> {
    let mut surface = blank_surface(plan.width, plan.height);
    for instruction in &plan.instructions {
        rasterizer.draw(
            &instruction.text,
            instruction.x,
            instruction.y,
            &instruction.font,
            &mut surface,
        )?;
    }
    Ok(surface)
}
