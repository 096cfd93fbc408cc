// File: crates/chart-render-skia/src/text.rs
// Summary: Paragraph-based text shaper: measurement and baseline-anchored, rotated drawing.

use skia_safe as skia;
use skia::textlayout::{FontCollection, Paragraph, ParagraphBuilder, ParagraphStyle, TextAlign, TextStyle};

use chart_core::TextExtent;

/// Share of the font size between a paragraph's top and its baseline.
const ASCENT_RATIO: f32 = 0.8;

pub struct TextShaper {
    fonts: FontCollection,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    pub fn new() -> Self {
        let mut fc = FontCollection::new();
        // system manager fallback
        fc.set_default_font_manager(skia::FontMgr::default(), None);
        Self { fonts: fc }
    }

    fn make_style(size: f32, color: skia::Color) -> TextStyle {
        let mut ts = TextStyle::new();
        ts.set_font_size(size.max(1.0));
        ts.set_color(color);
        ts.set_font_families(&["DejaVu Sans", "Arial", "Helvetica", "Segoe UI", "Roboto", "sans-serif"]);
        ts
    }

    pub fn layout(&self, text: &str, size: f32, color: skia::Color) -> Paragraph {
        let mut pstyle = ParagraphStyle::new();
        pstyle.set_text_align(TextAlign::Left);
        let mut builder = ParagraphBuilder::new(&pstyle, &self.fonts);
        builder.push_style(&Self::make_style(size, color));
        builder.add_text(text);
        let mut paragraph = builder.build();
        paragraph.layout(10_000.0);
        paragraph
    }

    /// Box of the text rotated counter-clockwise by `angle` degrees.
    pub fn measure(&self, text: &str, size: f32, angle: f32) -> TextExtent {
        if text.is_empty() {
            return TextExtent::default();
        }
        let p = self.layout(text, size, skia::Color::TRANSPARENT);
        let (w, h) = (p.longest_line(), p.height());
        let rad = angle.to_radians();
        let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
        TextExtent { width: (w * cos + h * sin).round(), height: (w * sin + h * cos).round() }
    }

    /// Draw `text` with its baseline-left corner at `(x, y)`, rotated
    /// counter-clockwise around that point.
    pub fn draw(&self, canvas: &skia::Canvas, text: &str, (x, y): (f32, f32), size: f32, angle: f32, color: skia::Color) {
        let p = self.layout(text, size, color);
        canvas.save();
        canvas.translate((x, y));
        if angle != 0.0 {
            canvas.rotate(-angle, None);
        }
        // paragraphs paint from their top-left corner
        p.paint(canvas, (0.0, -size * ASCENT_RATIO));
        canvas.restore();
    }
}
