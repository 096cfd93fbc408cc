// File: crates/chart-core/src/geometry.rs
// Summary: Pixel points, inclusive integer rectangles, clamping and polar offsets.

/// Pixel coordinate, origin at the image's top-left corner.
pub type Point = (f32, f32);

/// Rectangle whose `right`/`bottom` edges are part of it, as fills address whole pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RectI32 {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl RectI32 {
    pub const fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Outline covering every pixel of the rectangle, clockwise.
    pub fn pixel_corners(&self) -> [Point; 4] {
        let (l, t) = (self.left as f32, self.top as f32);
        let (r, b) = ((self.right + 1) as f32, (self.bottom + 1) as f32);
        [(l, t), (r, t), (r, b), (l, b)]
    }
}

#[inline]
pub fn clamp<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo { lo } else if v > hi { hi } else { v }
}

/// Point at `radius` from `center` along `angle_deg` (0° = 3 o'clock, clockwise on screen).
#[inline]
pub fn polar(center: Point, radius: f32, angle_deg: f32) -> Point {
    let rad = angle_deg.to_radians();
    (center.0 + radius * rad.cos(), center.1 + radius * rad.sin())
}
