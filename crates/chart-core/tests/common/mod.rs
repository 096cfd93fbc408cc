// File: crates/chart-core/tests/common/mod.rs
// Purpose: Shared helpers: a Canvas that records primitives, and request builders.
#![allow(dead_code)]

use chart_core::geometry::Point;
use chart_core::{BucketRow, Canvas, Color, Stroke, TextExtent, TextStyle};

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Clear(Color),
    Line { from: Point, to: Point, color: Color, stroke: Stroke, anti_alias: bool },
    Styled { from: Point, to: Point, pattern: Vec<Option<Color>> },
    Polygon { points: Vec<Point>, color: Color },
    FillPolygon { points: Vec<Point>, color: Color },
    Arc { center: Point, size: (f32, f32), start: f32, end: f32, color: Color, filled: bool },
    Text { text: String, at: Point, style: TextStyle },
    Pixel { x: i32, y: i32, color: Color },
}

/// Records every primitive; text is measured as 0.6em per char, 1em high.
pub struct RecordingCanvas {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<Op>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, ops: Vec::new() }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn filled_arcs(&self) -> Vec<(f32, f32, Color)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Arc { start, end, color, filled: true, .. } => Some((*start, *end, *color)),
                _ => None,
            })
            .collect()
    }

    pub fn lines_with(&self, color: Color) -> usize {
        self.ops.iter().filter(|op| matches!(op, Op::Line { color: c, .. } if *c == color)).count()
    }

    pub fn styled_lines(&self) -> Vec<(Point, Point, Vec<Option<Color>>)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Styled { from, to, pattern } => Some((*from, *to, pattern.clone())),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.ops.push(Op::Clear(color));
    }

    fn line(&mut self, from: Point, to: Point, color: Color, stroke: Stroke, anti_alias: bool) {
        self.ops.push(Op::Line { from, to, color, stroke, anti_alias });
    }

    fn styled_line(&mut self, from: Point, to: Point, pattern: &[Option<Color>]) {
        self.ops.push(Op::Styled { from, to, pattern: pattern.to_vec() });
    }

    fn polygon(&mut self, points: &[Point], color: Color) {
        self.ops.push(Op::Polygon { points: points.to_vec(), color });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.ops.push(Op::FillPolygon { points: points.to_vec(), color });
    }

    fn arc(&mut self, center: Point, size: (f32, f32), start: f32, end: f32, color: Color, filled: bool) {
        self.ops.push(Op::Arc { center, size, start, end, color, filled });
    }

    fn text(&mut self, text: &str, at: Point, style: TextStyle) {
        self.ops.push(Op::Text { text: text.to_string(), at, style });
    }

    fn measure_text(&self, text: &str, size: f32, angle: f32) -> TextExtent {
        let (w, h) = (0.6 * size * text.chars().count() as f32, size);
        if angle.rem_euclid(180.0) == 90.0 {
            TextExtent { width: h, height: w }
        } else {
            TextExtent { width: w, height: h }
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.ops.push(Op::Pixel { x, y, color });
    }
}

/// One row per column in `columns`, all with value `v`, sampled at the column's nominal time.
pub fn flat_rows(columns: impl IntoIterator<Item = usize>, v: f64, from: i64, period: i64, width: u32) -> Vec<BucketRow> {
    columns
        .into_iter()
        .map(|column| BucketRow {
            column,
            count: 1,
            min: v,
            max: v,
            avg: v,
            clock: from + (column as f64 * period as f64 / width as f64) as i64,
        })
        .collect()
}

/// Row with distinct min/avg/max at `column`.
pub fn row(column: usize, min: f64, avg: f64, max: f64, clock: i64) -> BucketRow {
    BucketRow { column, count: 1, min, max, avg, clock }
}
