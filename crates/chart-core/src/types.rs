// File: crates/chart-core/src/types.rs
// Summary: Shared types and constants (sizes, margins, staleness factors).

use serde::{Deserialize, Serialize};

/// Smallest plot area accepted, in pixels.
pub const GRAPH_WIDTH_MIN: u32 = 20;
pub const GRAPH_HEIGHT_MIN: u32 = 20;

/// Vertical distance from the plot bottom to the first legend row.
pub const LEGEND_OFFSET_Y: u32 = 90;
/// Height of one legend row.
pub const LEGEND_ROW_HEIGHT: u32 = 14;
/// Plot height below which inner-mode sizing skips trigger/percentile legend rows.
pub const LEGEND_FULL_HEIGHT: u32 = 120;

/// Horizontal margin next to a Y axis that carries labels.
pub const AXIS_MARGIN_USED: u32 = 85;
/// Horizontal margin next to an unused Y axis.
pub const AXIS_MARGIN_UNUSED: u32 = 30;
/// Space above the plot reserved for the header.
pub const TOP_PADDING: u32 = 24;

/// Desired pixel width of one time-axis cell.
pub const CELL_WIDTH: u32 = 30;
/// Minimal pixel height of one value-axis cell.
pub const CELL_HEIGHT_MIN: u32 = 30;

/// A segment is stale after this many empty cells (when cells are wider than the polling delay).
pub const MAX_SKIP_CELL: f64 = 16.0;
/// A segment is stale after this many polling delays (when cells are narrower than the delay).
pub const MAX_SKIP_DELAY: f64 = 4.0;
/// Trend resolution in seconds.
pub const MAX_TREND_DIFF: i64 = 3600;

/// Opacity applied to series colors (85% opaque).
pub const SERIES_OPACITY: u8 = 217;

/// Which vertical axis a series or mark belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub const fn label(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Per-side storage indexed by [`Side`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PerSide<T> {
    pub left: T,
    pub right: T,
}

impl<T> PerSide<T> {
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Screen margins around the plot area, in pixels.
/// Contract: all fields are non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insets {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Insets {
    /// Create new insets (non-negative by type).
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self { left, right, top, bottom }
    }

    /// Margins for a line chart with the given axes in use.
    pub const fn for_axes(left_used: bool, right_used: bool) -> Self {
        Self::new(
            if left_used { AXIS_MARGIN_USED } else { AXIS_MARGIN_UNUSED },
            if right_used { AXIS_MARGIN_USED } else { AXIS_MARGIN_UNUSED },
            TOP_PADDING,
            LEGEND_OFFSET_Y,
        )
    }

    /// Total horizontal inset (left + right + the 1px right border).
    pub const fn hsum(&self) -> u32 { self.left + self.right + 1 }
    /// Total vertical inset (top + bottom).
    pub const fn vsum(&self) -> u32 { self.top + self.bottom }
}

impl Default for Insets {
    fn default() -> Self {
        Self::for_axes(true, false)
    }
}
