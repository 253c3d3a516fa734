//! # Pipeline Tests
//!
//! End-to-end properties of the render pipeline: substitution, layout,
//! packing and the final ESC/POS buffer.
//!
//! Layout assertions use a fixed-advance rasterizer so positions are exact.
//! Byte-level assertions use the bundled Spleen bitmap faces, which render
//! identically on every platform.

use pretty_assertions::assert_eq;

use slipcast::layout::LayoutPlan;
use slipcast::pack::{self, PackedBitmap};
use slipcast::protocol::graphics::HEADER_LEN;
use slipcast::raster::{BitmapRasterizer, FontSpec, Surface, TextRasterizer};
use slipcast::substitute::{self, Record, Segment};
use slipcast::template::{Align, LineStyle, Settings, Template};
use slipcast::{RenderConfig, SlipcastError, render_plain_text, render_template};

// ============================================================================
// HELPERS
// ============================================================================

/// Every character advances half the font size; draws nothing.
struct HalfEm;

impl TextRasterizer for HalfEm {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f32, SlipcastError> {
        Ok(text.chars().count() as f32 * font.size / 2.0)
    }

    fn draw(
        &self,
        _text: &str,
        _x: f32,
        _y: f32,
        _font: &FontSpec,
        _target: &mut Surface,
    ) -> Result<(), SlipcastError> {
        Ok(())
    }
}

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn order_slip() -> Template {
    Template::new(
        "order-slip",
        "#{{sessionIndex}} - {{phone}}\n{{customer}}\n\nTotal: {{total}}",
    )
    .with_line_style(
        1,
        LineStyle {
            font_size: Some(32.0),
            bold: Some(true),
            italic: None,
        },
    )
    .with_placeholder_size("total", 30.0)
}

fn order_record() -> Record {
    record(&[
        ("sessionIndex", "123"),
        ("phone", "0901234567"),
        ("customer", "Nguyen Van A"),
        ("total", "250000"),
    ])
}

fn line_end(plan: &LayoutPlan, index: usize) -> f32 {
    let line = &plan.lines[index];
    line.x + line.width
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_session_phone_scenario() {
    let template = Template::new("t", "#{{sessionIndex}} - {{phone}}");
    let lines = substitute::substitute(
        &template,
        &record(&[("sessionIndex", "123"), ("phone", "0901234567")]),
    );

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].segments, vec![Segment::plain("#123 - 0901234567")]);
}

#[test]
fn test_two_line_surface_height() {
    let template = Template::new("t", "{{a}}\n{{b}}").with_settings(Settings {
        width: 384,
        font_size: 20.0,
        line_height: 1.5,
        padding: 2,
        ..Default::default()
    });

    let job = render_template(&template, &Record::new(), &HalfEm, &RenderConfig::default())
        .unwrap();

    assert_eq!(job.plan.height, 64);
    assert_eq!(job.bitmap.height, 64);
    assert_eq!(job.bitmap.bytes_per_row, 48);
}

#[test]
fn test_default_settings_height_is_exact() {
    // 8 + 5 * (24 * 1.2) + 8 = 160
    let template = Template::new("t", vec!["x"; 5].join("\n"));
    let job = render_template(&template, &Record::new(), &BitmapRasterizer, &RenderConfig::default())
        .unwrap();

    assert_eq!(job.plan.height, 160);
    assert_eq!(&job.commands[6..8], &[160, 0]);
}

#[test]
fn test_price_placeholder_size_scenario() {
    let template = Template::new("t", "Price: {{price}}").with_placeholder_size("price", 30.0);
    let lines = substitute::substitute(&template, &record(&[("price", "250000")]));

    assert_eq!(
        lines[0].segments,
        vec![Segment::plain("Price: "), Segment::sized("250000", 30.0)]
    );

    let job = render_template(
        &template,
        &record(&[("price", "250000")]),
        &HalfEm,
        &RenderConfig::default(),
    )
    .unwrap();
    let sizes: Vec<f32> = job
        .plan
        .instructions
        .iter()
        .map(|instruction| instruction.font.size)
        .collect();
    assert_eq!(sizes, vec![24.0, 30.0]);
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn test_renders_are_deterministic() {
    let template = order_slip();
    let config = RenderConfig::default();

    let first = render_template(&template, &order_record(), &BitmapRasterizer, &config).unwrap();
    let second = render_template(&template, &order_record(), &BitmapRasterizer, &config).unwrap();

    assert_eq!(first.commands, second.commands);
    assert!(first.bitmap.ink_count() > 0);
}

#[test]
fn test_line_count_preserved_for_any_record() {
    let contents = [
        "single",
        "a\nb\nc",
        "\n\n",
        "{{x}}\n\n{{y}} and {{z}}\n",
        "{{unclosed\n}}{{",
    ];
    let records = [Record::new(), order_record(), record(&[("x", "1\n2")])];

    for content in contents {
        let template = Template::new("t", content);
        for data in &records {
            assert_eq!(
                substitute::substitute(&template, data).len(),
                content.split('\n').count(),
                "content {:?}",
                content
            );
        }
    }
}

#[test]
fn test_packing_size_invariant() {
    for width in [1u32, 7, 8, 9, 383, 384, 385, 576, 832] {
        for height in [0u32, 1, 3, 17] {
            let pixels = vec![0u8; (width * height * 4) as usize];
            let bitmap = pack::pack(&pixels, width, height, pack::DEFAULT_THRESHOLD);
            assert_eq!(
                bitmap.data.len(),
                width.div_ceil(8) as usize * height as usize,
                "{}x{}",
                width,
                height
            );
        }
    }
}

#[test]
fn test_threshold_boundary() {
    let pixels = [128, 128, 128, 255, 127, 127, 127, 255];
    let bitmap = pack::pack(&pixels, 2, 1, 128);

    assert!(!bitmap.is_ink(0, 0));
    assert!(bitmap.is_ink(1, 0));
    assert_eq!(bitmap.data, vec![0b0100_0000]);
}

#[test]
fn test_rows_stay_byte_aligned() {
    // All black: every in-range bit set, padding bits clear.
    let pixels = vec![0u8; 385 * 3 * 4];
    let bitmap = pack::pack(&pixels, 385, 3, 128);

    assert_eq!(bitmap.bytes_per_row, 49);
    for y in 0..3 {
        let row = bitmap.row(y);
        assert!(row[..48].iter().all(|&b| b == 0xFF));
        assert_eq!(row[48], 0x80);
    }
}

#[test]
fn test_right_alignment_ends_at_padding() {
    let template = Template::new("t", "Total\nPrice: {{price}} VND\n")
        .with_settings(Settings {
            align: Align::Right,
            padding: 10,
            ..Default::default()
        })
        .with_placeholder_size("price", 40.0);

    let job = render_template(
        &template,
        &record(&[("price", "250000")]),
        &HalfEm,
        &RenderConfig::default(),
    )
    .unwrap();

    let bound = (576 - 10) as f32;
    assert_eq!(line_end(&job.plan, 0), bound);
    assert_eq!(line_end(&job.plan, 1), bound);

    // Last segment of the multi-segment line ends at the bound too.
    let last = job
        .plan
        .instructions
        .iter()
        .rfind(|instruction| instruction.text == " VND")
        .unwrap();
    let advance = HalfEm.measure(&last.text, &last.font).unwrap();
    assert_eq!(last.x + advance, bound);
}

// ============================================================================
// BYTE LAYOUT
// ============================================================================

#[test]
fn test_template_buffer_layout() {
    let job = render_template(
        &order_slip(),
        &order_record(),
        &BitmapRasterizer,
        &RenderConfig::default(),
    )
    .unwrap();
    let bitmap: &PackedBitmap = &job.bitmap;
    let height = bitmap.height as u16;

    assert_eq!(
        &job.commands[..HEADER_LEN],
        &[
            0x1D,
            0x76,
            0x30,
            0x00,
            72,
            0,
            height as u8,
            (height >> 8) as u8
        ]
    );
    assert_eq!(
        &job.commands[HEADER_LEN..HEADER_LEN + bitmap.data.len()],
        &bitmap.data[..]
    );
    assert_eq!(
        &job.commands[HEADER_LEN + bitmap.data.len()..],
        &[0x1B, 0x64, 3]
    );
}

#[test]
fn test_plain_text_buffer_layout() {
    let settings = Settings {
        width: 384,
        ..Default::default()
    };
    let job = render_plain_text(
        "Thank you!\n{{literally}}",
        &settings,
        &BitmapRasterizer,
        &RenderConfig::default(),
    )
    .unwrap();

    assert_eq!(job.commands[4], 48);
    assert_eq!(job.lines[1].text(), "{{literally}}");
    assert!(
        job.commands
            .ends_with(&[0x1B, 0x64, 3, 0x1D, 0x56, 0x41, 0x00])
    );
}

#[test]
fn test_missing_keys_render_empty() {
    let template = Template::new("t", "Name: {{name}}");
    let job = render_template(&template, &Record::new(), &HalfEm, &RenderConfig::default())
        .unwrap();

    assert_eq!(job.lines[0].text(), "Name: ");
}

#[test]
fn test_template_json_renders() {
    let json = r#"{
        "name": "kitchen",
        "content": "Table {{table}}\n{{items}}",
        "settings": { "width": 384, "fontSize": 20, "align": "center" },
        "lineStyles": { "line1": { "fontSize": 36, "bold": true } },
        "placeholderSizes": {}
    }"#;
    let template = Template::from_json(json).unwrap();
    let job = render_template(
        &template,
        &record(&[("table", "7"), ("items", "2x Pho")]),
        &BitmapRasterizer,
        &RenderConfig::default(),
    )
    .unwrap();

    assert_eq!(job.plan.lines[0].font_size, 36.0);
    assert_eq!(job.plan.lines[1].font_size, 20.0);
    assert_eq!(job.bitmap.width, 384);
}
