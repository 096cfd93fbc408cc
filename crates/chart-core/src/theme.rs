// File: crates/chart-core/src/theme.rs
// Summary: Named graph color tables (blue/dark/light/high-contrast).

use serde::{Deserialize, Serialize};

use crate::canvas::Color;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub background: Color,
    /// Plot area fill.
    pub graph: Color,
    pub grid_border: Color,
    pub grid: Color,
    pub main_grid: Color,
    pub text: Color,
    /// Main-period labels and window start/end labels.
    pub highlight: Color,
    pub non_work_time: Color,
    pub left_percentile: Color,
    pub right_percentile: Color,
    pub no_data: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::original_blue()
    }
}

impl Theme {
    pub fn original_blue() -> Self {
        Self {
            name: "original-blue".into(),
            background: Color::rgb(0xFF, 0xFF, 0xFF),
            graph: Color::rgb(0xFF, 0xFF, 0xFF),
            grid_border: Color::rgb(0xAC, 0xBB, 0xC2),
            grid: Color::rgb(0xCC, 0xD5, 0xD9),
            main_grid: Color::rgb(0xAC, 0xBB, 0xC2),
            text: Color::rgb(0x1F, 0x2C, 0x33),
            highlight: Color::rgb(0xE3, 0x37, 0x34),
            non_work_time: Color::rgb(0xEB, 0xEB, 0xEB),
            left_percentile: Color::rgb(0x42, 0x9E, 0x47),
            right_percentile: Color::rgb(0xE3, 0x37, 0x34),
            no_data: Color::rgb(0xE3, 0x37, 0x34),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark".into(),
            background: Color::rgb(0x2B, 0x2B, 0x2B),
            graph: Color::rgb(0x2B, 0x2B, 0x2B),
            grid_border: Color::rgb(0x4F, 0x4F, 0x4F),
            grid: Color::rgb(0x45, 0x45, 0x45),
            main_grid: Color::rgb(0x4F, 0x4F, 0x4F),
            text: Color::rgb(0xF2, 0xF2, 0xF2),
            highlight: Color::rgb(0xE4, 0x59, 0x59),
            non_work_time: Color::rgb(0x33, 0x33, 0x33),
            left_percentile: Color::rgb(0x42, 0x9E, 0x47),
            right_percentile: Color::rgb(0xE3, 0x37, 0x34),
            no_data: Color::rgb(0xE4, 0x59, 0x59),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".into(),
            background: Color::rgb(0xFA, 0xFA, 0xFC),
            graph: Color::rgb(0xFF, 0xFF, 0xFF),
            grid_border: Color::rgb(0x3C, 0x3C, 0x46),
            grid: Color::rgb(0xE6, 0xE6, 0xEB),
            main_grid: Color::rgb(0xB4, 0xB4, 0xBE),
            text: Color::rgb(0x14, 0x14, 0x1E),
            highlight: Color::rgb(0x1E, 0x78, 0xF0),
            non_work_time: Color::rgb(0xF0, 0xF0, 0xF2),
            left_percentile: Color::rgb(0x14, 0xA0, 0x5A),
            right_percentile: Color::rgb(0xC8, 0x3C, 0x3C),
            no_data: Color::rgb(0xC8, 0x3C, 0x3C),
        }
    }

    pub fn high_contrast_dark() -> Self {
        Self {
            name: "high-contrast-dark".into(),
            background: Color::rgb(0x00, 0x00, 0x00),
            graph: Color::rgb(0x00, 0x00, 0x00),
            grid_border: Color::rgb(0xFF, 0xFF, 0xFF),
            grid: Color::rgb(0x33, 0x33, 0x33),
            main_grid: Color::rgb(0x77, 0x77, 0x77),
            text: Color::rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::rgb(0xFF, 0xFF, 0x00),
            non_work_time: Color::rgb(0x1A, 0x1A, 0x1A),
            left_percentile: Color::rgb(0x00, 0xFF, 0x00),
            right_percentile: Color::rgb(0xFF, 0x00, 0x00),
            no_data: Color::rgb(0xFF, 0x00, 0x00),
        }
    }

    pub fn percentile(&self, side: crate::types::Side) -> Color {
        match side {
            crate::types::Side::Left => self.left_percentile,
            crate::types::Side::Right => self.right_percentile,
        }
    }
}

/// Return a list of built-in theme presets.
pub fn presets() -> Vec<Theme> {
    vec![
        Theme::original_blue(),
        Theme::dark(),
        Theme::light(),
        Theme::high_contrast_dark(),
    ]
}

/// Find a theme by its `name`, falling back to original-blue.
pub fn find(name: &str) -> Theme {
    presets()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .unwrap_or_default()
}
