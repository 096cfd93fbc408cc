// File: crates/chart-core/src/line.rs
// Summary: Line/stacked chart renderer: grid, scales, series segments, overlays and legend.
// Notes:
// - Draw order: background, header, work period, time grid, value scale,
//   axes, series, then (with a legend) triggers, percentiles and the table.
// - Every pixel is produced through the `Canvas` trait.

use tracing::{debug, trace};

use crate::axis::AxisScale;
use crate::canvas::{Canvas, Color, Stroke, TextStyle};
use crate::chart::{Chart, ChartKind};
use crate::error::Result;
use crate::geometry::{clamp, Point, RectI32};
use crate::grid::TimeAxisPlanner;
use crate::legend::{draw_percentile_marker, draw_trigger_marker, Align, Cell, TextTable};
use crate::scale::{ScaleEngine, ValueScale};
use crate::series::{Aggregation, Bucket, DrawType, Series, SeriesData, Stat};
use crate::shaper::SeriesShaper;
use crate::stats::{side_percentiles, Percentile};
use crate::types::{PerSide, Side, LEGEND_OFFSET_Y, LEGEND_ROW_HEIGHT, MAX_SKIP_CELL, MAX_SKIP_DELAY, SERIES_OPACITY};
use crate::units::{convert_units, ConvertOptions};
use crate::workperiod::MAX_SHADED_PERIOD;

const COLOR_MAX: Color = Color::rgb(255, 100, 100);
const COLOR_MIN: Color = Color::rgb(50, 255, 50);
const COLOR_MINMAX: Color = Color::rgb(255, 255, 150);

const ZERO_LINE_LEFT: Color = Color::rgb(0xAA, 0xAA, 0xAA);
const ZERO_LINE_RIGHT: Color = Color::rgb(0x88, 0x88, 0x88);

/// Plots shorter than this get flat fills instead of gradients.
const GRADIENT_MIN_HEIGHT: u32 = 50;

/// Header font starts here and shrinks until the title fits.
const HEADER_FONT_SIZE: f32 = 11.0;

/// Pixel rectangle of the plot inside the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotArea {
    pub left: f32,
    pub top: f32,
    pub width: u32,
    pub height: u32,
}

impl PlotArea {
    pub fn right(&self) -> f32 {
        self.left + self.width as f32
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height as f32
    }
}

/// Everything a line or stacked chart needs once data has been shaped.
pub struct LineChartRenderer<'a> {
    chart: &'a Chart,
    plot: PlotArea,
    data: Vec<Option<SeriesData>>,
    axes: PerSide<Option<AxisScale>>,
    scales: PerSide<Option<ValueScale>>,
    percentiles: PerSide<Percentile>,
}

impl<'a> LineChartRenderer<'a> {
    /// Shape the series data and resolve both value axes.
    pub fn prepare(chart: &'a Chart) -> Result<Self> {
        let dims = chart.dimensions();
        let stacked = chart.request.kind == ChartKind::Stacked;
        let plot = PlotArea {
            left: dims.insets.left as f32,
            top: dims.insets.top as f32,
            width: dims.plot_width,
            height: dims.plot_height,
        };

        let shaper = SeriesShaper::new(plot.width, chart.request.period, stacked);
        let mut data: Vec<Option<SeriesData>> =
            chart.request.series.iter().map(|spec| shaper.fill(&spec.buckets)).collect();
        if stacked {
            SeriesShaper::stack(&chart.series, &mut data);
        }

        let pairs: Vec<(&Series, Option<&SeriesData>)> =
            chart.series.iter().zip(data.iter()).map(|(s, d)| (s, d.as_ref())).collect();

        let (y_min, y_max) = (chart.request.y_min, chart.request.y_max);
        let share_rows = y_min.is_calculated() && y_max.is_calculated();
        let mut rows = None;
        let mut axes = PerSide::<Option<AxisScale>>::default();
        let mut scales = PerSide::<Option<ValueScale>>::default();
        for side in Side::ALL {
            let axis = ScaleEngine::compute_axis(side, &pairs, y_min, y_max, plot.height, stacked, rows)?;
            if let Some(axis) = axis {
                if share_rows && rows.is_none() {
                    rows = Some(axis.rows);
                }
                *scales.get_mut(side) = Some(ValueScale::from_axis(plot.top, plot.bottom(), &axis));
            }
            *axes.get_mut(side) = axis;
        }

        let percentiles = if chart.request.kind == ChartKind::Normal {
            side_percentiles(&chart.request.percentile, &chart.series, &data)
        } else {
            PerSide::default()
        };

        Ok(Self { chart, plot, data, axes, scales, percentiles })
    }

    pub fn plot(&self) -> PlotArea {
        self.plot
    }

    pub fn axis(&self, side: Side) -> Option<&AxisScale> {
        self.axes.get(side).as_ref()
    }

    pub fn percentile(&self, side: Side) -> Percentile {
        *self.percentiles.get(side)
    }

    pub fn data(&self) -> &[Option<SeriesData>] {
        &self.data
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) -> Result<()> {
        let theme = &self.chart.theme;
        debug!(
            kind = ?self.chart.request.kind,
            plot_width = self.plot.width,
            plot_height = self.plot.height,
            "rendering line chart"
        );

        canvas.clear(theme.background);
        self.draw_header(canvas);
        self.draw_work_period(canvas);
        self.draw_time_grid(canvas)?;
        self.draw_vertical_scale(canvas);
        self.draw_xy_axis(canvas);

        for (series, data) in self.chart.series.iter().zip(&self.data) {
            if let Some(data) = data {
                self.draw_series(canvas, series, data);
            }
        }

        if self.chart.request.show_legend {
            self.draw_triggers(canvas);
            self.draw_percentiles(canvas);
            self.draw_legend(canvas);
        }
        Ok(())
    }

    fn x_at(&self, t: i64) -> f32 {
        let req = &self.chart.request;
        self.plot.left + ((t - req.from) as f64 * self.plot.width as f64 / req.period as f64) as f32
    }

    fn draw_header(&self, canvas: &mut dyn Canvas) {
        draw_header(canvas, &self.chart.header(), self.chart.dimensions().width, self.chart.theme.text);
    }

    fn draw_work_period(&self, canvas: &mut dyn Canvas) {
        let theme = &self.chart.theme;
        let req = &self.chart.request;
        let (l, t) = (self.plot.left as i32 + 1, self.plot.top as i32);
        let (r, b) = (self.plot.right() as i32 - 2, self.plot.bottom() as i32);
        canvas.fill_rect(RectI32::from_ltrb(l, t, r, b), theme.graph);

        if !req.show_work_period || req.period > MAX_SHADED_PERIOD {
            return;
        }
        canvas.fill_rect(RectI32::from_ltrb(l, t, r, b), theme.non_work_time);
        for (start, end) in req.work_period.working_intervals(&self.chart.tz, req.from, req.to()) {
            let x1 = (self.x_at(start).round() as i32).max(l);
            let x2 = (self.x_at(end).round() as i32).min(r);
            if x1 <= x2 {
                canvas.fill_rect(RectI32::from_ltrb(x1, t, x2, b), theme.graph);
            }
        }
    }

    fn draw_time_grid(&self, canvas: &mut dyn Canvas) -> Result<()> {
        let theme = &self.chart.theme;
        let req = &self.chart.request;
        let planner = TimeAxisPlanner::new(self.chart.tz);

        let label_px = canvas.measure_text("WWW", 7.0, 90.0).width as f64;
        let plan = planner.plan(req.from, req.to(), self.plot.width, label_px)?;
        trace!(main = plan.main.len(), sub = plan.sub.len(), "time grid ticks");

        let (top, bottom) = (self.plot.top, self.plot.bottom());
        for tick in &plan.sub {
            let x = (self.plot.left + tick.x(self.plot.width, req.period)).round();
            canvas.dashed_line((x, top), (x, bottom), theme.grid);
            self.draw_date_label(canvas, &tick.label, x, 7.0, theme.text);
        }
        for tick in &plan.main {
            let x = (self.plot.left + tick.x(self.plot.width, req.period)).round();
            canvas.dashed_line((x, top), (x, bottom), theme.main_grid);
            self.draw_date_label(canvas, &tick.label, x, 8.0, theme.highlight);
        }

        let years_differ = planner.format(req.from, "%Y") != planner.format(req.to(), "%Y");
        let format = if years_differ { "%Y-%m-%d" } else { "%m-%d %H:%M" };
        for (t, x) in [(req.from, self.plot.left), (req.to(), self.plot.right())] {
            self.draw_date_label(canvas, &planner.format(t, format), x, 8.0, theme.highlight);
        }
        Ok(())
    }

    /// Vertical label hanging below the plot, centered on `x`.
    fn draw_date_label(&self, canvas: &mut dyn Canvas, label: &str, x: f32, size: f32, color: Color) {
        let ext = canvas.measure_text(label, size, 90.0);
        let at = (x + (ext.width / 2.0).round(), self.plot.bottom() + ext.height + 6.0);
        canvas.text(label, at, TextStyle::new(size, color).rotated(90.0));
    }

    /// Units shared by every series on `side`, else empty.
    fn side_units(&self, side: Side) -> String {
        let mut on_side = self.chart.series.iter().filter(|s| s.side == side);
        let Some(first) = on_side.next() else { return String::new() };
        if on_side.all(|s| s.units == first.units) { first.units.clone() } else { String::new() }
    }

    fn draw_vertical_scale(&self, canvas: &mut dyn Canvas) {
        let theme = &self.chart.theme;
        let full_width = self.chart.dimensions().width as f32;
        let mut grid_drawn = false;

        for side in Side::ALL {
            let (Some(axis), Some(scale)) = (self.axes.get(side), self.scales.get(side)) else { continue };
            let units = self.side_units(side);

            let units_long = self
                .chart
                .series
                .iter()
                .filter(|s| s.side == side && !s.units_long.is_empty())
                .last()
                .map(|s| s.units_long.as_str());
            if let Some(long) = units_long {
                let ext = canvas.measure_text(long, 9.0, 90.0);
                let mut y = self.plot.height as f32 / 2.0 + self.plot.top + ext.height / 2.0;
                if y < ext.height {
                    y = ext.height + 6.0;
                }
                let x = match side {
                    Side::Left => ext.width + 8.0,
                    Side::Right => full_width - ext.width,
                };
                canvas.text(long, (x, y), TextStyle::new(9.0, theme.text).rotated(90.0));
            }

            for value in axis.values() {
                let y = scale.to_px(value).round();
                if !grid_drawn && value > axis.min {
                    canvas.dashed_line((self.plot.left, y), (self.plot.right(), y), theme.grid);
                }

                let label = axis.label(value, &units);
                let x = match side {
                    Side::Left => self.plot.left - canvas.measure_text(&label, 8.0, 0.0).width - 9.0,
                    Side::Right => self.plot.right() + 12.0,
                };
                canvas.text(&label, (x, y + 4.0), TextStyle::new(8.0, theme.text));
            }
            grid_drawn = true;

            if let Some(zero) = scale.zero_row() {
                let color = match side {
                    Side::Left => ZERO_LINE_LEFT,
                    Side::Right => ZERO_LINE_RIGHT,
                };
                let y = zero.round();
                canvas.line((self.plot.left, y), (self.plot.right(), y), color, Stroke::Normal, false);
            }
        }
    }

    fn draw_xy_axis(&self, canvas: &mut dyn Canvas) {
        let theme = &self.chart.theme;
        let (top, bottom) = (self.plot.top, self.plot.bottom());

        for side in Side::ALL {
            let x = match side {
                Side::Left => self.plot.left,
                Side::Right => self.plot.right(),
            };
            if self.axes.get(side).is_some() {
                canvas.line((x, top - 5.0), (x, bottom + 4.0), theme.grid_border, Stroke::Normal, false);
                let arrow = [(x - 3.0, top - 5.0), (x + 3.0, top - 5.0), (x, top - 10.0)];
                canvas.fill_polygon(&arrow, Color::WHITE);
                canvas.polygon(&arrow, theme.grid_border);
            } else {
                canvas.dashed_line((x, top), (x, bottom), theme.grid);
            }
        }

        let y = bottom + 1.0;
        let end = self.plot.right();
        canvas.line((self.plot.left - 3.0, y), (end + 5.0, y), theme.grid_border, Stroke::Normal, false);
        let arrow = [(end + 5.0, y - 3.0), (end + 5.0, y + 3.0), (end + 10.0, y)];
        canvas.fill_polygon(&arrow, Color::WHITE);
        canvas.polygon(&arrow, theme.grid_border);
    }

    /// Whether the gap between two drawn columns is short enough to connect.
    fn connected(&self, series: &Series, diff: f64) -> bool {
        let Some(delay) = series.delay else { return true };
        let cell = self.chart.request.period as f64 / self.plot.width as f64;
        let delay = delay as f64;
        if cell > delay {
            diff < MAX_SKIP_CELL * cell
        } else {
            diff < MAX_SKIP_DELAY * delay
        }
    }

    fn draw_series(&self, canvas: &mut dyn Canvas, series: &Series, data: &SeriesData) {
        let Some(scale) = self.scales.get(series.side) else { return };
        let last = self.plot.width as usize;
        let mut prev_draw = true;
        let mut stale = 0usize;
        let mut j = 0usize;

        for i in 1..=last.min(data.buckets.len().saturating_sub(1)) {
            if data.buckets[i].count == 0 && i != last {
                continue;
            }
            let diff = (data.buckets[i].clock - data.buckets[j].clock).abs();
            let mut draw = self.connected(series, diff);
            let draw_type = if !draw && !prev_draw {
                draw = true;
                DrawType::BoldDot
            } else {
                prev_draw = draw;
                series.draw_type
            };
            if draw {
                self.draw_element(canvas, scale, series, draw_type, (i, &data.buckets[i]), (j, &data.buckets[j]));
            } else {
                stale += 1;
            }
            j = i;
        }
        trace!(series = series.id, stale, "series drawn");
    }

    fn draw_element(
        &self,
        canvas: &mut dyn Canvas,
        scale: &ValueScale,
        series: &Series,
        draw_type: DrawType,
        from: (usize, &Bucket),
        to: (usize, &Bucket),
    ) {
        let (top, bottom) = (self.plot.top, self.plot.bottom());
        let x1 = self.plot.left + from.0 as f32;
        let x2 = self.plot.left + to.0 as f32;
        let color = series.color.with_alpha(SERIES_OPACITY);

        let y_of = |v: f64| scale.to_px(v).round();
        let y_shift = |shift: f64| if shift == 0.0 { scale.zero } else { scale.to_px(shift) };

        let envelope = series.aggregation == Aggregation::All
            && matches!(draw_type, DrawType::Line | DrawType::BoldLine);
        if envelope {
            let (y1max, c1) = clamp_flag(y_of(from.1.stacked(Stat::Max)), top, bottom);
            let (y2max, c2) = clamp_flag(y_of(to.1.stacked(Stat::Max)), top, bottom);
            let (y1min, c3) = clamp_flag(y_of(from.1.stacked(Stat::Min)), top, bottom);
            let (y2min, c4) = clamp_flag(y_of(to.1.stacked(Stat::Min)), top, bottom);

            let band = [(x1, y1max), (x1, y1min), (x2, y2min), (x2, y2max)];
            canvas.fill_polygon(&band, COLOR_MINMAX.with_alpha(SERIES_OPACITY));
            let stroke = if draw_type == DrawType::BoldLine { Stroke::Bold } else { Stroke::Normal };
            if !(c1 && c2) {
                canvas.line((x1, y1max), (x2, y2max), COLOR_MAX.with_alpha(SERIES_OPACITY), stroke, false);
            }
            if !(c3 && c4) {
                canvas.line((x1, y1min), (x2, y2min), COLOR_MIN.with_alpha(SERIES_OPACITY), stroke, false);
            }
        }

        let stat = Stat::drawn(series.aggregation);
        let mut y1 = y_of(from.1.stacked(stat));
        let mut y2 = y_of(to.1.stacked(stat));
        let mut y1s = y_shift(from.1.shift(stat)).round();
        let mut y2s = y_shift(to.1.shift(stat)).round();

        let fill = draw_type.is_fill();
        if !limit_to_bounds(&mut y1, &mut y2, top, bottom, fill) {
            return;
        }
        limit_to_bounds(&mut y1s, &mut y2s, top, bottom, true);

        match draw_type {
            DrawType::Line => canvas.line((x1, y1), (x2, y2), color, Stroke::Normal, true),
            DrawType::BoldLine => canvas.line((x1, y1), (x2, y2), color, Stroke::Bold, true),
            DrawType::Dot => {
                let (x, y) = (x1 as i32, y1 as i32);
                canvas.fill_rect(RectI32::from_ltrb(x - 1, y - 1, x, y), color);
            }
            DrawType::BoldDot => {
                let (x, y) = (x2 as i32, y2 as i32);
                canvas.fill_rect(RectI32::from_ltrb(x - 1, y - 1, x + 1, y + 1), color);
            }
            DrawType::DashedLine => canvas.dashed_line((x1, y1), (x2, y2), color),
            DrawType::FilledRegion => {
                canvas.fill_polygon(&[(x1, y1), (x1, y1s), (x2, y2s), (x2, y2)], color);
            }
            DrawType::GradientLine if self.plot.height <= GRADIENT_MIN_HEIGHT => {
                canvas.fill_polygon(&[(x1, y1), (x1, y1s), (x2, y2s), (x2, y2)], color);
            }
            DrawType::GradientLine => self.draw_gradient(canvas, color, (x1, y1), (x2, y2)),
        }
    }

    /// Line with a vertical fade down to the plot bottom.
    fn draw_gradient(&self, canvas: &mut dyn Canvas, color: Color, p1: Point, p2: Point) {
        let ((x1, y1), (x2, y2)) = (p1, p2);
        canvas.line((x1, y1), (x2, y2), color, Stroke::Normal, false);
        canvas.line((x1, y1 - 1.0), (x2, y2 - 1.0), color, Stroke::Normal, false);

        let top = self.plot.top;
        let bottom = self.plot.bottom();
        let ratio = 110.0 / (self.plot.height - GRADIENT_MIN_HEIGHT) as f32;
        let diff_x = (x1 - x2).max(1.0);
        let incr = (y2 - y1).abs() / diff_x;

        for i in 0..=diff_x as i32 {
            let gy = if y1 > y2 { y2 + incr * i as f32 } else { y2 - incr * i as f32 };
            let steps = (bottom - gy + 1.0).max(0.0) as i32;
            for j in 0..steps {
                let y = gy + j as f32;
                // fade is 0 (opaque) near the top, up to 110 of 127 at the bottom
                let fade = if y < top + GRADIENT_MIN_HEIGHT as f32 {
                    0.0
                } else {
                    127.0 - (127.0 - ratio * (y - top - GRADIENT_MIN_HEIGHT as f32)).abs()
                };
                let alpha = (255.0 - 2.0 * fade).clamp(0.0, 255.0) as u8;
                canvas.blend_pixel((x2 as i32) + i, y.round() as i32, color.with_alpha(alpha));
            }
        }
    }

    fn draw_triggers(&self, canvas: &mut dyn Canvas) {
        for trigger in &self.chart.triggers {
            let (Some(axis), Some(scale)) = (self.axes.get(trigger.side), self.scales.get(trigger.side)) else { continue };
            if !(axis.min < trigger.value && trigger.value < axis.max) {
                continue;
            }
            let y = scale.to_px(trigger.value).round();
            let mut pattern = vec![Some(trigger.color); 5];
            pattern.extend([Some(trigger.color.opposite()); 3]);
            canvas.styled_line((self.plot.left, y), (self.plot.right(), y), &pattern);
            canvas.styled_line((self.plot.left, y + 1.0), (self.plot.right(), y + 1.0), &pattern);
        }
    }

    fn draw_percentiles(&self, canvas: &mut dyn Canvas) {
        for side in Side::ALL {
            let Some(scale) = self.scales.get(side) else { continue };
            let Some(value) = self.percentiles.get(side).value else { continue };
            if value == 0.0 {
                continue;
            }
            let y = scale.to_px(value).round();
            if y < self.plot.top || y > self.plot.bottom() {
                continue;
            }
            canvas.line((self.plot.left, y), (self.plot.right(), y), self.chart.theme.percentile(side), Stroke::Normal, false);
        }
    }

    fn draw_legend(&self, canvas: &mut dyn Canvas) {
        let dims = self.chart.dimensions();
        let theme = &self.chart.theme;
        let top = self.plot.bottom() + LEGEND_OFFSET_Y as f32;
        let single_host = self.chart.single_host();
        let mut rows_used = 0usize;

        if dims.items_legend {
            let mut table = TextTable::new(10.0, top, theme.text);
            table.add_row(
                ["", "", "", "last", "min", "avg", "max"].iter().map(|t| Cell::text(*t).aligned(Align::Center)).collect(),
            );

            let mut order: Vec<usize> = (0..self.chart.series.len()).collect();
            if self.chart.request.kind == ChartKind::Stacked {
                order.reverse();
            }
            for idx in order {
                let series = &self.chart.series[idx];
                let mut row = vec![
                    Cell::swatch(series.color.with_alpha(SERIES_OPACITY)),
                    Cell::text(series.caption(single_host)),
                    Cell::text(format!("[{}]", series.aggregation.label())),
                ];
                match &self.data[idx] {
                    Some(data) => {
                        let fmt = |v: f64| convert_units(v, &series.units, ConvertOptions::default()).to_string();
                        for value in [data.last_value(series.aggregation), data.min_value(), data.avg_orig, data.max_value()] {
                            row.push(Cell::text(fmt(value)).aligned(Align::Right));
                        }
                    }
                    None => row.push(Cell::text("[no data]").colored(theme.no_data)),
                }
                table.add_row(row);
            }
            rows_used = table.num_rows();
            table.draw(canvas);
        }

        if !dims.extended_legend {
            return;
        }

        let row_h = LEGEND_ROW_HEIGHT as f32;
        let mut y = top + row_h * rows_used as f32;
        for side in Side::ALL {
            let percentile = self.percentiles.get(side);
            if !self.chart.request.percentile.enabled(side) || self.axes.get(side).is_none() {
                continue;
            }
            let units = self.side_units(side);
            let value = percentile
                .value
                .map(|v| convert_units(v, &units, ConvertOptions::default()).to_string())
                .unwrap_or_else(|| "-".to_string());
            let color = theme.percentile(side);
            draw_percentile_marker(canvas, 15.0, y + row_h - 2.0, color);
            let text = format!("{}th percentile: {} ({})", percentile.percent, value, side.label());
            canvas.text(&text, (25.0, y + row_h - 3.0), TextStyle::new(9.0, theme.text));
            y += row_h;
        }

        if self.chart.triggers.is_empty() {
            return;
        }
        let mut table = TextTable::new(25.0, y, theme.text);
        for (k, trigger) in self.chart.triggers.iter().enumerate() {
            draw_trigger_marker(canvas, 15.0, y + row_h * k as f32 + row_h / 2.0, trigger.color);
            table.add_row(vec![Cell::text(trigger.description.clone()), Cell::text(trigger.constant.clone())]);
        }
        table.draw(canvas);
    }
}

/// Clamp to `[top, bottom]`, reporting whether the value moved.
fn clamp_flag(y: f32, top: f32, bottom: f32) -> (f32, bool) {
    let c = clamp(y, top, bottom);
    (c, c != y)
}

/// Fit a segment's end rows into the plot. Returns `false` when the segment
/// lies entirely beyond one edge and is not a fill.
fn limit_to_bounds(y1: &mut f32, y2: &mut f32, top: f32, bottom: f32, fill: bool) -> bool {
    let beyond = (*y1 > bottom && *y2 > bottom) || (*y1 < top && *y2 < top);
    if beyond && !fill {
        return false;
    }
    *y1 = clamp(*y1, top, bottom);
    *y2 = clamp(*y2, top, bottom);
    true
}

/// Centered title above the plot, shrinking the font until it fits `width`.
pub(crate) fn draw_header(canvas: &mut dyn Canvas, text: &str, width: u32, color: Color) {
    if text.is_empty() {
        return;
    }
    let mut size = HEADER_FONT_SIZE;
    let mut ext = canvas.measure_text(text, size, 0.0);
    while ext.width > width as f32 && size > 1.0 {
        size -= 1.0;
        ext = canvas.measure_text(text, size, 0.0);
    }
    let x = ((width as f32 - ext.width) / 2.0).max(0.0);
    canvas.text(text, (x, 24.0 - (24.0 - size) / 2.0), TextStyle::new(size, color));
}
