// File: crates/chart-core/src/canvas.rs
// Summary: Backend-agnostic drawing surface used by the chart renderers.
// Notes:
// - Renderers only talk to this trait. Raster backends (see chart-render-skia)
//   implement it; tests implement it with a recorder.

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};
use crate::geometry::{Point, RectI32};

/// RGBA color; `a` is opacity (255 = opaque).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `RRGGBB` or `#RRGGBB`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ChartError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| ChartError::InvalidColor(hex.to_string()));
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Same color with the given opacity.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Darker variant used for pseudo-3D side walls.
    pub fn shadow(self) -> Self {
        Self {
            r: self.r.saturating_sub(50),
            g: self.g.saturating_sub(50),
            b: self.b.saturating_sub(50),
            a: self.a,
        }
    }

    /// Black or white, whichever contrasts more with `self`.
    pub fn opposite(self) -> Self {
        let luma = 0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32;
        if luma > 127.0 { Color::BLACK } else { Color::WHITE }
    }
}

impl TryFrom<String> for Color {
    type Error = ChartError;
    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// Stroke style for straight lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stroke {
    /// 1px line.
    Normal,
    /// 2px line.
    Bold,
}

impl Stroke {
    pub fn width(self) -> f32 {
        match self {
            Stroke::Normal => 1.0,
            Stroke::Bold => 2.0,
        }
    }
}

/// Measured text box for a given size and rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
}

/// Text placement request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f32,
    /// Counter-clockwise rotation in degrees (0 or 90 in practice).
    pub angle: f32,
    pub color: Color,
}

impl TextStyle {
    pub const fn new(size: f32, color: Color) -> Self {
        Self { size, angle: 0.0, color }
    }

    pub const fn rotated(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }
}

/// Drawing primitives every raster backend provides.
///
/// Coordinates are pixels. Text is anchored at its baseline-left corner
/// before rotation; rotation is counter-clockwise around that anchor.
pub trait Canvas {
    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Fill the whole surface.
    fn clear(&mut self, color: Color);

    /// Straight line; `anti_alias` selects the smoothed variant.
    fn line(&mut self, from: Point, to: Point, color: Color, stroke: Stroke, anti_alias: bool);

    /// Line drawn with a repeating per-pixel pattern; `None` entries are left untouched.
    fn styled_line(&mut self, from: Point, to: Point, pattern: &[Option<Color>]);

    /// Closed polygon outline.
    fn polygon(&mut self, points: &[Point], color: Color);

    /// Filled polygon.
    fn fill_polygon(&mut self, points: &[Point], color: Color);

    /// Elliptic pie sector from `start_deg` to `end_deg` (clockwise, 0° = 3 o'clock).
    /// Filled sectors are wedges; outlined sectors trace both radii and the arc,
    /// except full turns which are plain ellipses.
    fn arc(&mut self, center: Point, size: (f32, f32), start_deg: f32, end_deg: f32, color: Color, filled: bool);

    /// Draw text; see trait docs for anchoring.
    fn text(&mut self, text: &str, at: Point, style: TextStyle);

    /// Bounding box the text would occupy with the given size and rotation.
    fn measure_text(&self, text: &str, size: f32, angle: f32) -> TextExtent;

    /// Blend one pixel with `color` using its opacity.
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color);

    /// Filled axis-aligned rectangle, inclusive of both edges.
    fn fill_rect(&mut self, rect: RectI32, color: Color) {
        self.fill_polygon(&rect.pixel_corners(), color);
    }

    /// Dashed line with two-pixel dashes, the grid style.
    fn dashed_line(&mut self, from: Point, to: Point, color: Color) {
        self.styled_line(from, to, &[Some(color), Some(color), None, None]);
    }

    /// Filled ellipse.
    fn fill_ellipse(&mut self, center: Point, size: (f32, f32), color: Color) {
        self.arc(center, size, 0.0, 360.0, color, true);
    }
}
