// File: crates/chart-core/src/lib.rs
// Summary: Core library entry point; exports public API for chart preparation and rendering.

pub mod axis;
pub mod canvas;
pub mod chart;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod legend;
pub mod line;
pub mod palette;
pub mod pie;
pub mod scale;
pub mod series;
pub mod shaper;
pub mod stats;
pub mod theme;
pub mod types;
pub mod units;
pub mod workperiod;

pub use axis::{AxisScale, YAxisBound};
pub use canvas::{Canvas, Color, Stroke, TextExtent, TextStyle};
pub use chart::{dimensions, min_dimensions, Chart, ChartKind, ChartRequest, Dimensions, SizeMode};
pub use error::{ChartError, Result};
pub use grid::{TimeAxisPlanner, TimePlan};
pub use line::LineChartRenderer;
pub use palette::Palette;
pub use pie::{allocate_angles, PieChartRenderer};
pub use scale::{ScaleEngine, ValueScale};
pub use series::{Aggregation, BucketRow, DrawType, Series, SeriesData, SeriesSpec, StackRole, TriggerMark};
pub use shaper::SeriesShaper;
pub use stats::{nearest_rank, PercentileConfig};
pub use theme::Theme;
pub use types::Side;
pub use workperiod::WorkPeriod;
