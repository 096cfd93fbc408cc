// File: crates/chart-render-skia/src/canvas.rs
// Summary: `chart_core::Canvas` over a Skia CPU raster surface.
// Notes:
// - Non anti-aliased strokes are shifted by half a pixel so 1px lines land
//   on whole pixel rows and columns.

use anyhow::Result;
use skia_safe as skia;

use chart_core::geometry::Point;
use chart_core::{Canvas, Color, Stroke, TextExtent, TextStyle};

use crate::text::TextShaper;

fn sk_color(c: Color) -> skia::Color {
    skia::Color::from_argb(c.a, c.r, c.g, c.b)
}

fn fill_paint(color: Color) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_color(sk_color(color));
    paint.set_style(skia::paint::Style::Fill);
    paint
}

fn stroke_paint(color: Color, width: f32, anti_alias: bool) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_color(sk_color(color));
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(width);
    paint.set_anti_alias(anti_alias);
    paint
}

fn closed_path(points: &[Point]) -> Option<skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut path = skia::Path::new();
    path.move_to(*first);
    for &p in rest {
        path.line_to(p);
    }
    path.close();
    Some(path)
}

fn oval(center: Point, (w, h): (f32, f32)) -> skia::Rect {
    skia::Rect::from_xywh(center.0 - w / 2.0, center.1 - h / 2.0, w, h)
}

/// Raster surface plus the text shaper used for labels.
pub struct SkiaCanvas {
    surface: skia::Surface,
    text: TextShaper,
    width: u32,
    height: u32,
}

impl SkiaCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let surface = skia::surfaces::raster_n32_premul((width as i32, height as i32))
            .ok_or_else(|| anyhow::anyhow!("failed to create {width}x{height} raster surface"))?;
        Ok(Self { surface, text: TextShaper::new(), width, height })
    }

    /// Unpremultiplied RGBA pixels, row-major, `width * 4` bytes per row.
    pub fn to_rgba8(&mut self) -> Result<Vec<u8>> {
        let info = skia::ImageInfo::new(
            (self.width as i32, self.height as i32),
            skia::ColorType::RGBA8888,
            skia::AlphaType::Unpremul,
            None,
        );
        let stride = self.width as usize * 4;
        let mut pixels = vec![0u8; stride * self.height as usize];
        if !self.surface.read_pixels(&info, &mut pixels, stride, (0, 0)) {
            anyhow::bail!("reading back surface pixels failed");
        }
        Ok(pixels)
    }

    /// PNG-encoded snapshot of the surface.
    pub fn to_png(&mut self) -> Result<Vec<u8>> {
        let image = self.surface.image_snapshot();
        #[allow(deprecated)]
        let data = image
            .encode_to_data(skia::EncodedImageFormat::PNG)
            .ok_or_else(|| anyhow::anyhow!("encode PNG failed"))?;
        Ok(data.as_bytes().to_vec())
    }

    fn pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let rect = skia::Rect::from_xywh(x as f32, y as f32, 1.0, 1.0);
        self.surface.canvas().draw_rect(rect, &fill_paint(color));
    }
}

impl Canvas for SkiaCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.surface.canvas().clear(sk_color(color));
    }

    fn line(&mut self, from: Point, to: Point, color: Color, stroke: Stroke, anti_alias: bool) {
        let paint = stroke_paint(color, stroke.width(), anti_alias);
        let (from, to) = if anti_alias {
            (from, to)
        } else {
            ((from.0 + 0.5, from.1 + 0.5), (to.0 + 0.5, to.1 + 0.5))
        };
        self.surface.canvas().draw_line(from, to, &paint);
    }

    fn styled_line(&mut self, from: Point, to: Point, pattern: &[Option<Color>]) {
        if pattern.is_empty() {
            return;
        }
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).round() as usize;
        for k in 0..=steps {
            let t = if steps == 0 { 0.0 } else { k as f32 / steps as f32 };
            if let Some(color) = pattern[k % pattern.len()] {
                let (x, y) = (from.0 + dx * t, from.1 + dy * t);
                self.pixel(x.round() as i32, y.round() as i32, color);
            }
        }
    }

    fn polygon(&mut self, points: &[Point], color: Color) {
        let Some(path) = closed_path(points) else { return };
        let shifted = path.with_offset((0.5, 0.5));
        self.surface.canvas().draw_path(&shifted, &stroke_paint(color, 1.0, false));
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        let Some(path) = closed_path(points) else { return };
        self.surface.canvas().draw_path(&path, &fill_paint(color));
    }

    fn arc(&mut self, center: Point, size: (f32, f32), start_deg: f32, end_deg: f32, color: Color, filled: bool) {
        let rect = oval(center, size);
        let sweep = end_deg - start_deg;
        let canvas = self.surface.canvas();
        if filled {
            let mut paint = fill_paint(color);
            paint.set_anti_alias(true);
            if sweep >= 360.0 {
                canvas.draw_oval(rect, &paint);
            } else {
                canvas.draw_arc(rect, start_deg, sweep, true, &paint);
            }
        } else {
            let paint = stroke_paint(color, 1.0, true);
            if sweep >= 360.0 {
                canvas.draw_oval(rect, &paint);
            } else {
                canvas.draw_arc(rect, start_deg, sweep, true, &paint);
            }
        }
    }

    fn text(&mut self, text: &str, at: Point, style: TextStyle) {
        if text.is_empty() {
            return;
        }
        let canvas = self.surface.canvas();
        self.text.draw(canvas, text, at, style.size, style.angle, sk_color(style.color));
    }

    fn measure_text(&self, text: &str, size: f32, angle: f32) -> TextExtent {
        self.text.measure(text, size, angle)
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.pixel(x, y, color);
    }
}
