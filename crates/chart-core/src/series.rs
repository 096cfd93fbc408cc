// File: crates/chart-core/src/series.rs
// Summary: Series model (metadata, draw types, aggregation) and per-pixel-column buckets.
// Notes:
// - `SeriesSpec` is the caller-facing description (deserializable).
// - `Series` is the resolved, immutable form the renderers work with.

use serde::{Deserialize, Serialize};

use crate::canvas::Color;
use crate::error::{ChartError, Result};
use crate::palette::Palette;
use crate::types::{Side, MAX_SKIP_CELL, MAX_TREND_DIFF};
use crate::units::parse_time_unit;

/// How a series is drawn on a line chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawType {
    #[default]
    Line,
    FilledRegion,
    BoldLine,
    Dot,
    DashedLine,
    GradientLine,
    BoldDot,
}

impl DrawType {
    /// Types that fill down to the stack baseline.
    pub const fn is_fill(self) -> bool {
        matches!(self, DrawType::FilledRegion | DrawType::GradientLine)
    }
}

/// Which bucket statistic represents the series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Min,
    #[default]
    Avg,
    Max,
    /// Average line with a min/max envelope.
    All,
    /// Most recent value (pie charts).
    Last,
}

impl Aggregation {
    /// Legend abbreviation.
    pub const fn label(self) -> &'static str {
        match self {
            Aggregation::Min => "min",
            Aggregation::Avg => "avg",
            Aggregation::Max => "max",
            Aggregation::All => "all",
            Aggregation::Last => "last",
        }
    }
}

/// Role of a series in stacked and pie charts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackRole {
    #[default]
    Simple,
    /// Graph total; pie charts show it as "total minus the others".
    Sum,
}

/// One aggregated row as delivered by the history store.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketRow {
    /// Pixel column index, `0..=width`.
    pub column: usize,
    pub count: u32,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Representative sample time (unix seconds).
    pub clock: i64,
}

/// Dense per-column statistics after gap filling.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bucket {
    pub count: u32,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub clock: f64,
    pub shift_min: f64,
    pub shift_max: f64,
    pub shift_avg: f64,
}

/// Statistic a bucket contributes to a particular purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stat {
    Min,
    Max,
    Avg,
}

impl Stat {
    /// Statistic drawn as the main curve.
    pub const fn drawn(agg: Aggregation) -> Self {
        match agg {
            Aggregation::Min => Stat::Min,
            Aggregation::Max => Stat::Max,
            _ => Stat::Avg,
        }
    }

    /// Statistic scanned for the lower axis bound.
    pub const fn lower(agg: Aggregation) -> Self {
        match agg {
            Aggregation::Min | Aggregation::All => Stat::Min,
            Aggregation::Max => Stat::Max,
            _ => Stat::Avg,
        }
    }

    /// Statistic scanned for the upper axis bound.
    pub const fn upper(agg: Aggregation) -> Self {
        match agg {
            Aggregation::Max | Aggregation::All => Stat::Max,
            Aggregation::Min => Stat::Min,
            _ => Stat::Avg,
        }
    }
}

impl Bucket {
    pub fn value(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Min => self.min,
            Stat::Max => self.max,
            Stat::Avg => self.avg,
        }
    }

    pub fn shift(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Min => self.shift_min,
            Stat::Max => self.shift_max,
            Stat::Avg => self.shift_avg,
        }
    }

    /// Value plus the stack beneath it.
    pub fn stacked(&self, stat: Stat) -> f64 {
        saturating_sum(self.value(stat), self.shift(stat))
    }
}

/// `a + b` held within the finite `f64` range.
pub fn saturating_sum(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum.is_nan() { sum } else { sum.clamp(f64::MIN, f64::MAX) }
}

/// Shaped data of one series; absent when the window holds no samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesData {
    /// `width + 1` columns.
    pub buckets: Vec<Bucket>,
    /// Mean of the delivered averages, before gap filling.
    pub avg_orig: f64,
}

impl SeriesData {
    /// Most recent sampled value for the aggregation.
    pub fn last_value(&self, agg: Aggregation) -> f64 {
        self.buckets
            .iter()
            .rev()
            .find(|b| b.count > 0)
            .map(|b| b.value(Stat::drawn(agg)))
            .unwrap_or(0.0)
    }

    pub fn min_value(&self) -> f64 {
        self.buckets.iter().map(|b| b.min).fold(f64::INFINITY, f64::min)
    }

    pub fn max_value(&self) -> f64 {
        self.buckets.iter().map(|b| b.max).fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Where the history store reads samples from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    History,
    Trends,
}

impl DataSource {
    /// Raw history when it still covers the window and cells are fine enough, else trends.
    pub fn select(history: i64, trends: i64, now: i64, from: i64, period: i64, width: u32) -> Self {
        let fine = (period as f64 / width.max(1) as f64) <= MAX_TREND_DIFF as f64 / MAX_SKIP_CELL;
        if trends == 0 || (now - history < from && fine) {
            DataSource::History
        } else {
            DataSource::Trends
        }
    }
}

fn default_delay() -> String { "60".to_string() }
fn default_history() -> String { "7d".to_string() }
fn default_trends() -> String { "365d".to_string() }

/// Caller-facing series description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesSpec {
    pub id: u64,
    pub name: String,
    pub host: String,
    /// Unit string, optionally `"short,long form"`.
    pub units: String,
    /// Missing colors are taken from the palette.
    pub color: Option<Color>,
    pub draw_type: DrawType,
    pub side: Side,
    pub aggregation: Aggregation,
    pub role: StackRole,
    /// Polling interval as a time-unit string.
    pub delay: String,
    /// Samples arrive without a fixed schedule (trapper, log, scheduled-only).
    pub irregular: bool,
    /// History retention as a time-unit string.
    pub history: String,
    /// Trend retention as a time-unit string.
    pub trends: String,
    /// Sparse per-column rows from the history store.
    pub buckets: Vec<BucketRow>,
}

impl Default for SeriesSpec {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            host: String::new(),
            units: String::new(),
            color: None,
            draw_type: DrawType::Line,
            side: Side::Left,
            aggregation: Aggregation::Avg,
            role: StackRole::Simple,
            delay: default_delay(),
            irregular: false,
            history: default_history(),
            trends: default_trends(),
            buckets: Vec::new(),
        }
    }
}

impl SeriesSpec {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), ..Self::default() }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_draw_type(mut self, draw_type: DrawType) -> Self {
        self.draw_type = draw_type;
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_role(mut self, role: StackRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_buckets(mut self, buckets: Vec<BucketRow>) -> Self {
        self.buckets = buckets;
        self
    }
}

/// Resolved series, immutable for the duration of a render.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub id: u64,
    pub name: String,
    pub host: String,
    pub units: String,
    /// Long unit caption drawn next to the axis (empty when not given).
    pub units_long: String,
    pub color: Color,
    pub draw_type: DrawType,
    pub side: Side,
    pub aggregation: Aggregation,
    pub role: StackRole,
    /// Polling interval in seconds; `None` for irregular series.
    pub delay: Option<i64>,
    pub history: i64,
    pub trends: i64,
    pub source: DataSource,
}

impl Series {
    /// Parse and validate a [`SeriesSpec`]. Interval strings that do not parse are fatal.
    pub fn resolve(spec: &SeriesSpec, palette: &mut Palette, window: (i64, i64), now: i64, width: u32) -> Result<Self> {
        let delay = parse_time_unit(&spec.delay).ok_or_else(|| ChartError::InvalidInterval {
            field: "delay",
            value: spec.delay.clone(),
        })?;
        let history = parse_time_unit(&spec.history).ok_or_else(|| ChartError::InvalidInterval {
            field: "history",
            value: spec.history.clone(),
        })?;
        let trends = parse_time_unit(&spec.trends).ok_or_else(|| ChartError::InvalidInterval {
            field: "trends",
            value: spec.trends.clone(),
        })?;

        let (units, units_long) = match spec.units.split_once(',') {
            Some((short, long)) => (short.to_string(), long.to_string()),
            None => (spec.units.clone(), String::new()),
        };

        let (from, period) = window;
        let source = DataSource::select(history, trends, now, from, period, width);

        // Trend rows are hourly, so scheduled series never look denser than that.
        let delay = if spec.irregular || delay == 0 {
            None
        } else if source == DataSource::Trends {
            Some(delay.max(MAX_TREND_DIFF))
        } else {
            Some(delay)
        };

        Ok(Self {
            id: spec.id,
            name: spec.name.clone(),
            host: spec.host.clone(),
            units,
            units_long,
            color: spec.color.unwrap_or_else(|| palette.next_color()),
            draw_type: spec.draw_type,
            side: spec.side,
            aggregation: spec.aggregation,
            role: spec.role,
            delay,
            history,
            trends,
            source,
        })
    }

    /// Legend caption; host prefix only when the chart mixes hosts.
    pub fn caption(&self, single_host: bool) -> String {
        if single_host || self.host.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.host, self.name)
        }
    }
}

/// Threshold line overlaid on a line chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerMark {
    #[serde(default)]
    pub side: Side,
    pub value: f64,
    pub color: Color,
    pub description: String,
    /// Comparison shown in the legend, e.g. `[> 90]`.
    #[serde(default)]
    pub constant: String,
}
