// File: crates/chart-core/src/chart.rs
// Summary: Chart request model, layout/dimension calculation and the render entry point.
// Notes:
// - A `Chart` is built fresh from a `ChartRequest` for every render and owns
//   all per-render state; nothing is cached across calls.
// - Dimensions depend only on configuration, never on sample data, so the
//   dimensions-only path and the full render agree.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::YAxisBound;
use crate::canvas::Canvas;
use crate::error::{ChartError, Result};
use crate::line::LineChartRenderer;
use crate::palette::Palette;
use crate::pie::PieChartRenderer;
use crate::series::{DrawType, Series, SeriesSpec, TriggerMark};
use crate::stats::PercentileConfig;
use crate::theme::{self, Theme};
use crate::types::{
    Insets, Side, GRAPH_HEIGHT_MIN, GRAPH_WIDTH_MIN, LEGEND_FULL_HEIGHT, LEGEND_ROW_HEIGHT, TOP_PADDING,
};
use crate::workperiod::WorkPeriod;

/// At most this many trigger thresholds are overlaid.
pub const MAX_TRIGGERS: usize = 3;

/// Horizontal margin around a pie.
pub const PIE_MARGIN: u32 = 20;
/// Gap between the pie and its legend.
pub const PIE_LEGEND_GAP: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    #[default]
    Normal,
    Stacked,
    Pie,
    Exploded,
    #[serde(rename = "pie-3d")]
    Pie3d,
    #[serde(rename = "exploded-3d")]
    Exploded3d,
}

impl ChartKind {
    pub const fn is_pie(self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Exploded | ChartKind::Pie3d | ChartKind::Exploded3d)
    }

    pub const fn is_exploded(self) -> bool {
        matches!(self, ChartKind::Exploded | ChartKind::Exploded3d)
    }

    pub const fn is_3d(self) -> bool {
        matches!(self, ChartKind::Pie3d | ChartKind::Exploded3d)
    }
}

/// Whether the requested size is the whole image or only the plot area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeMode {
    #[default]
    Outer,
    Inner,
}

fn default_true() -> bool { true }
fn default_theme() -> String { "original-blue".to_string() }
fn default_timezone() -> String { "UTC".to_string() }
fn default_width() -> u32 { 900 }
fn default_height() -> u32 { 200 }
fn default_period() -> i64 { 3600 }

/// Everything needed to draw one chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    #[serde(default)]
    pub kind: ChartKind,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub size_mode: SizeMode,
    #[serde(default)]
    pub title: String,
    /// Window start (unix seconds).
    pub from: i64,
    /// Window length in seconds.
    #[serde(default = "default_period")]
    pub period: i64,
    /// Reference "now" for data-source selection; wall clock when absent.
    #[serde(default)]
    pub now: Option<i64>,
    #[serde(default)]
    pub series: Vec<SeriesSpec>,
    #[serde(default)]
    pub y_min: YAxisBound,
    #[serde(default)]
    pub y_max: YAxisBound,
    #[serde(default)]
    pub percentile: PercentileConfig,
    #[serde(default = "default_true")]
    pub show_legend: bool,
    #[serde(default = "default_true")]
    pub show_work_period: bool,
    #[serde(default = "default_true")]
    pub show_triggers: bool,
    #[serde(default)]
    pub work_period: WorkPeriod,
    #[serde(default)]
    pub triggers: Vec<TriggerMark>,
    /// Preset name, see [`theme::presets`].
    #[serde(default = "default_theme")]
    pub theme: String,
    /// IANA zone used for the time axis and work-period shading.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ChartRequest {
    fn default() -> Self {
        Self {
            kind: ChartKind::Normal,
            width: default_width(),
            height: default_height(),
            size_mode: SizeMode::Outer,
            title: String::new(),
            from: 0,
            period: default_period(),
            now: None,
            series: Vec::new(),
            y_min: YAxisBound::Calculated,
            y_max: YAxisBound::Calculated,
            percentile: PercentileConfig::default(),
            show_legend: true,
            show_work_period: true,
            show_triggers: true,
            work_period: WorkPeriod::default(),
            triggers: Vec::new(),
            theme: default_theme(),
            timezone: default_timezone(),
        }
    }
}

impl ChartRequest {
    pub fn new(kind: ChartKind, width: u32, height: u32, from: i64, period: i64) -> Self {
        Self { kind, width, height, from, period, ..Self::default() }
    }

    pub fn to(&self) -> i64 {
        self.from + self.period
    }
}

/// Final image size plus where the plot sits inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Whole image.
    pub width: u32,
    pub height: u32,
    /// Plot area.
    pub plot_width: u32,
    pub plot_height: u32,
    pub insets: Insets,
    /// Series rows of the legend fit.
    pub items_legend: bool,
    /// Trigger and percentile rows of the legend fit.
    pub extended_legend: bool,
}

/// Smallest request that still yields a 20×20 plot.
pub fn min_dimensions(kind: ChartKind, mode: SizeMode, left_used: bool, right_used: bool) -> (u32, u32) {
    match mode {
        SizeMode::Inner => (GRAPH_WIDTH_MIN, GRAPH_HEIGHT_MIN),
        SizeMode::Outer if kind.is_pie() => (GRAPH_WIDTH_MIN + 2 * PIE_MARGIN, GRAPH_HEIGHT_MIN + TOP_PADDING + PIE_LEGEND_GAP),
        SizeMode::Outer => {
            let insets = Insets::for_axes(left_used, right_used);
            (GRAPH_WIDTH_MIN + insets.hsum(), GRAPH_HEIGHT_MIN + insets.vsum())
        }
    }
}

/// A validated, resolved render job.
#[derive(Clone, Debug)]
pub struct Chart {
    pub request: ChartRequest,
    pub series: Vec<Series>,
    pub theme: Theme,
    pub tz: Tz,
    pub dims: Dimensions,
    /// Trigger marks that will be overlaid (capped, empty when disabled).
    pub triggers: Vec<TriggerMark>,
    pub now: i64,
}

impl Chart {
    /// Validate `request` and resolve everything that does not need sample data.
    pub fn prepare(request: &ChartRequest) -> Result<Self> {
        if request.width == 0 || request.height == 0 {
            return Err(ChartError::InvalidSize { width: request.width as i64, height: request.height as i64 });
        }
        if request.period <= 0 {
            return Err(ChartError::InvalidWindow(format!("period must be positive, got {}", request.period)));
        }
        let tz: Tz = request
            .timezone
            .parse()
            .map_err(|_| ChartError::InvalidTimezone(request.timezone.clone()))?;

        let triggers: Vec<TriggerMark> = if request.show_triggers && !request.kind.is_pie() {
            request.triggers.iter().take(MAX_TRIGGERS).cloned().collect()
        } else {
            Vec::new()
        };

        let dims = compute_dimensions(request, triggers.len())?;

        let now = request.now.unwrap_or_else(|| {
            SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(request.to())
        });

        let mut palette = Palette::default();
        let mut series = Vec::with_capacity(request.series.len());
        for spec in &request.series {
            let mut s = Series::resolve(spec, &mut palette, (request.from, request.period), now, dims.plot_width)?;
            if request.kind == ChartKind::Stacked {
                s.draw_type = DrawType::FilledRegion;
            }
            series.push(s);
        }

        debug!(
            kind = ?request.kind,
            width = dims.width,
            height = dims.height,
            plot_width = dims.plot_width,
            plot_height = dims.plot_height,
            series = series.len(),
            "prepared chart"
        );

        Ok(Self { request: request.clone(), series, theme: theme::find(&request.theme), tz, dims, triggers, now })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// All series share one host, so captions can omit it.
    pub fn single_host(&self) -> bool {
        match self.series.first() {
            Some(first) => self.series.iter().all(|s| s.host == first.host),
            None => true,
        }
    }

    /// Header text; prefixed with the host when every series shares it.
    pub fn header(&self) -> String {
        let host = self.series.first().map(|s| s.host.as_str()).unwrap_or("");
        if self.single_host() && !host.is_empty() {
            format!("{}: {}", host, self.request.title)
        } else {
            self.request.title.clone()
        }
    }

    /// Draw the chart onto `canvas`, which must be `dimensions()` in size.
    pub fn render(&self, canvas: &mut dyn Canvas) -> Result<()> {
        if self.request.kind.is_pie() {
            PieChartRenderer::prepare(self)?.draw(canvas)
        } else {
            LineChartRenderer::prepare(self)?.draw(canvas)
        }
    }
}

/// Final image size for `request` without drawing anything.
pub fn dimensions(request: &ChartRequest) -> Result<Dimensions> {
    Ok(Chart::prepare(request)?.dimensions())
}

fn compute_dimensions(request: &ChartRequest, triggers: usize) -> Result<Dimensions> {
    let left_used = request.series.iter().any(|s| s.side == Side::Left);
    let right_used = request.series.iter().any(|s| s.side == Side::Right);
    let num = request.series.len() as u32;
    let row = LEGEND_ROW_HEIGHT;

    // one extra item row pads the legend
    let h_items = row * (num + 1);

    if request.kind.is_pie() {
        let insets = Insets::new(PIE_MARGIN, PIE_MARGIN, TOP_PADDING, PIE_LEGEND_GAP);
        return Ok(layout(request, insets, h_items, 0));
    }

    let insets = Insets::for_axes(left_used, right_used);
    let h_ex = row * triggers as u32
        + Side::ALL
            .iter()
            .filter(|&&side| {
                request.percentile.enabled(side) && if side == Side::Left { left_used } else { right_used }
            })
            .count() as u32
            * row;
    Ok(layout(request, insets, h_items, h_ex))
}

fn layout(request: &ChartRequest, insets: Insets, h_items: u32, h_ex: u32) -> Dimensions {
    let (x_offsets, y_offsets) = (insets.hsum(), insets.vsum());
    let legend = request.show_legend;

    match request.size_mode {
        SizeMode::Outer => {
            let plot_width = request.width.saturating_sub(x_offsets).max(GRAPH_WIDTH_MIN);
            let mut plot_height = request.height.saturating_sub(y_offsets).max(GRAPH_HEIGHT_MIN);
            let mut items_legend = false;
            let mut extended_legend = false;
            if legend && plot_height >= h_items + GRAPH_HEIGHT_MIN {
                plot_height -= h_items;
                items_legend = true;
                if plot_height >= h_ex + GRAPH_HEIGHT_MIN {
                    plot_height -= h_ex;
                    extended_legend = true;
                }
            }
            Dimensions {
                width: (plot_width + x_offsets).max(request.width),
                height: (plot_height + y_offsets + if items_legend { h_items } else { 0 } + if extended_legend { h_ex } else { 0 })
                    .max(request.height),
                plot_width,
                plot_height,
                insets,
                items_legend,
                extended_legend,
            }
        }
        SizeMode::Inner => {
            let plot_width = request.width.max(GRAPH_WIDTH_MIN);
            let plot_height = request.height.max(GRAPH_HEIGHT_MIN);
            let mut height = plot_height + y_offsets;
            let mut items_legend = false;
            let mut extended_legend = false;
            if legend {
                height += h_items;
                items_legend = true;
                if plot_height >= LEGEND_FULL_HEIGHT {
                    height += h_ex;
                    extended_legend = true;
                }
            }
            Dimensions {
                width: plot_width + x_offsets,
                height,
                plot_width,
                plot_height,
                insets,
                items_legend,
                extended_legend,
            }
        }
    }
}
