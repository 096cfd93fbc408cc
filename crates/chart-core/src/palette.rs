// File: crates/chart-core/src/palette.rs
// Summary: Explicit color rotation for series without an assigned color.

use crate::canvas::Color;

const DEFAULT_COLORS: [Color; 21] = [
    Color::rgb(0x1A, 0x7C, 0x11),
    Color::rgb(0xF6, 0x31, 0x00),
    Color::rgb(0x27, 0x74, 0xA4),
    Color::rgb(0xA5, 0x4F, 0x10),
    Color::rgb(0xFC, 0x6E, 0xA3),
    Color::rgb(0x6C, 0x59, 0xDC),
    Color::rgb(0xAC, 0x8C, 0x14),
    Color::rgb(0x61, 0x1F, 0x27),
    Color::rgb(0xF2, 0x30, 0xE0),
    Color::rgb(0x5C, 0xCD, 0x18),
    Color::rgb(0xBB, 0x2A, 0x02),
    Color::rgb(0x5A, 0x2B, 0x57),
    Color::rgb(0x89, 0xAB, 0xF8),
    Color::rgb(0x7E, 0xC2, 0x5C),
    Color::rgb(0x27, 0x44, 0x82),
    Color::rgb(0x2B, 0x54, 0x29),
    Color::rgb(0x80, 0x48, 0xB4),
    Color::rgb(0xFD, 0x54, 0x34),
    Color::rgb(0x79, 0x0E, 0x1F),
    Color::rgb(0x87, 0xAC, 0x4D),
    Color::rgb(0xE8, 0x9D, 0xF4),
];

/// Shades offered per color once the list has been used up.
const CYCLE_SHADES: usize = 4;

/// Cycles a fixed color list. Every later pass over the list hands out a
/// lighter or darker shade of each color. One palette belongs to one render.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: Vec<Color>,
    next: usize,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(DEFAULT_COLORS.to_vec())
    }
}

impl Palette {
    /// Palette over `colors`; an empty list falls back to the defaults.
    pub fn new(colors: Vec<Color>) -> Self {
        let colors = if colors.is_empty() { DEFAULT_COLORS.to_vec() } else { colors };
        Self { colors, next: 0 }
    }

    pub fn next_color(&mut self) -> Color {
        let len = self.colors.len();
        let (pass, idx) = (self.next / len, self.next % len);
        self.next = self.next.wrapping_add(1);

        let base = self.colors[idx];
        if pass == 0 {
            return base;
        }
        let shades: Vec<Color> = color_variations(base, CYCLE_SHADES).into_iter().filter(|c| *c != base).collect();
        if shades.is_empty() {
            return base;
        }
        shades[(pass - 1) % shades.len()]
    }
}

impl Iterator for Palette {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        Some(self.next_color())
    }
}

/// `count` lighter/darker shades of `base`, centered on it.
pub fn color_variations(base: Color, count: usize) -> Vec<Color> {
    if count <= 1 {
        return vec![base];
    }
    const MAX: f64 = 50.0;
    let step = MAX * 2.0 / count as f64;

    let mut offsets: Vec<f64> = (0..)
        .map(|k| -MAX + k as f64 * step)
        .take_while(|v| *v <= MAX + 1e-9)
        .collect();
    while offsets.len() > count {
        if offsets.len() % 2 == 1 {
            offsets.remove(0);
        } else {
            offsets.pop();
        }
    }

    // 2.55 per percent of white
    let shift = |channel: u8, var: f64| (channel as f64 + 2.55 * var).clamp(0.0, 255.0) as u8;
    offsets
        .into_iter()
        .map(|var| Color::rgba(shift(base.r, var), shift(base.g, var), shift(base.b, var), base.a))
        .collect()
}
