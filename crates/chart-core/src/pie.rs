// File: crates/chart-core/src/pie.rs
// Summary: Pie chart renderer (flat, exploded and pseudo-3D) with its legend.

use tracing::debug;

use crate::canvas::Canvas;
use crate::chart::{Chart, PIE_LEGEND_GAP};
use crate::error::Result;
use crate::geometry::{polar, Point};
use crate::legend::{Align, Cell, TextTable};
use crate::line::draw_header;
use crate::series::{Aggregation, SeriesData, StackRole};
use crate::shaper::SeriesShaper;
use crate::units::{convert_units, format_float, ConvertOptions};

/// Slices are pushed out by this share of the diameter in exploded mode.
const EXPLODE_RATIO: f32 = 0.04;
/// Extrusion depth of 3D pies in pixels.
const DEPTH_3D: u32 = 12;

/// Whole-degree sweep of each slice; zero-weight slices get `0`.
///
/// Every visible slice gets one extra degree for its separator, so visible
/// angles always sum to exactly 360. Slices too thin to earn a degree of their
/// own are dropped smallest first.
pub fn allocate_angles(weights: &[f64]) -> Vec<u32> {
    let mut visible: Vec<usize> = (0..weights.len()).filter(|&i| weights[i] > 0.0 && weights[i].is_finite()).collect();
    let mut out = vec![0u32; weights.len()];

    loop {
        if visible.is_empty() {
            return out;
        }
        let total: f64 = visible.iter().map(|&i| weights[i]).sum();
        let avail = 360.0 - visible.len() as f64;
        let smallest = visible
            .iter()
            .copied()
            .min_by(|&a, &b| weights[a].total_cmp(&weights[b]).then(b.cmp(&a)));
        match smallest {
            Some(i) if visible.len() > 1 && weights[i] / total * avail < 1.0 => visible.retain(|&k| k != i),
            _ => break,
        }
    }

    let total: f64 = visible.iter().map(|&i| weights[i]).sum();
    let avail = 360 - visible.len() as u32;
    let mut given = 0u32;
    for &i in &visible {
        let share = (weights[i] / total * avail as f64).floor() as u32;
        out[i] = share;
        given += share;
    }

    let mut by_weight = visible.clone();
    by_weight.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]).then(a.cmp(&b)));
    let mut k = 0usize;
    while given < avail {
        out[by_weight[k % by_weight.len()]] += 1;
        given += 1;
        k += 1;
    }

    for &i in &visible {
        out[i] += 1;
    }
    out
}

/// Single number a series contributes to the pie.
fn pie_value(aggregation: Aggregation, data: &SeriesData) -> f64 {
    match aggregation {
        Aggregation::Min => data.min_value(),
        Aggregation::Max => data.max_value(),
        Aggregation::Avg | Aggregation::All => data.avg_orig,
        Aggregation::Last => data.last_value(Aggregation::Avg),
    }
}

/// Resolved slices of one pie.
pub struct PieChartRenderer<'a> {
    chart: &'a Chart,
    data: Vec<Option<SeriesData>>,
    values: Vec<f64>,
    angles: Vec<u32>,
    total: f64,
}

impl<'a> PieChartRenderer<'a> {
    pub fn prepare(chart: &'a Chart) -> Result<Self> {
        let dims = chart.dimensions();
        let shaper = SeriesShaper::new(dims.plot_width, chart.request.period, false);
        let data: Vec<Option<SeriesData>> = chart.request.series.iter().map(|spec| shaper.fill(&spec.buckets)).collect();

        let mut values: Vec<f64> = chart
            .series
            .iter()
            .zip(&data)
            .map(|(s, d)| d.as_ref().map(|d| pie_value(s.aggregation, d)).unwrap_or(0.0).max(0.0))
            .collect();

        // a graph total shows only what the other slices leave over
        let others: f64 = chart.series.iter().zip(&values).filter(|(s, _)| s.role == StackRole::Simple).map(|(_, v)| v).sum();
        for (s, v) in chart.series.iter().zip(values.iter_mut()) {
            if s.role == StackRole::Sum {
                *v = (*v - others).max(0.0);
            }
        }

        let total: f64 = values.iter().sum();
        let angles = allocate_angles(&values);
        Ok(Self { chart, data, values, angles, total })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn angles(&self) -> &[u32] {
        &self.angles
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) -> Result<()> {
        let chart = self.chart;
        let dims = chart.dimensions();
        let theme = &chart.theme;
        let kind = chart.request.kind;
        debug!(?kind, slices = self.angles.iter().filter(|&&a| a > 0).count(), total = self.total, "rendering pie chart");

        canvas.clear(theme.background);
        draw_header(canvas, &chart.header(), dims.width, theme.text);

        let depth = if kind.is_3d() { DEPTH_3D.min(dims.plot_height / 4) } else { 0 };
        let diameter = dims.plot_width.min(dims.plot_height.saturating_sub(depth)) as f32;
        let size = if kind.is_3d() { (diameter, diameter / 2.0) } else { (diameter, diameter) };
        let center: Point = (
            dims.insets.left as f32 + dims.plot_width as f32 / 2.0,
            dims.insets.top as f32 + (dims.plot_height - depth) as f32 / 2.0,
        );
        // keep exploded slices inside the plot
        let explode = if kind.is_exploded() { diameter * EXPLODE_RATIO } else { 0.0 };
        let size = (size.0 - 2.0 * explode, size.1 - 2.0 * explode);

        if self.total <= 0.0 {
            canvas.fill_ellipse(center, size, theme.grid);
            canvas.arc(center, size, 0.0, 360.0, theme.grid_border, false);
        } else {
            let slices = self.slices();
            for z in (1..=depth).rev() {
                for &(idx, start, end) in &slices {
                    let c = self.slice_center(center, explode, start, end);
                    let color = self.chart.series[idx].color.shadow();
                    canvas.arc((c.0, c.1 + z as f32), size, start, end, color, true);
                }
            }
            for &(idx, start, end) in &slices {
                let c = self.slice_center(center, explode, start, end);
                canvas.arc(c, size, start, end, self.chart.series[idx].color, true);
                canvas.arc(c, size, start, end, theme.graph, false);
            }
        }

        if dims.items_legend {
            self.draw_legend(canvas, dims.insets.top as f32 + dims.plot_height as f32 + PIE_LEGEND_GAP as f32);
        }
        Ok(())
    }

    /// `(series index, start, end)` in degrees, skipping empty slices.
    fn slices(&self) -> Vec<(usize, f32, f32)> {
        let mut start = 0u32;
        let mut out = Vec::new();
        for (idx, &angle) in self.angles.iter().enumerate() {
            if angle == 0 {
                continue;
            }
            out.push((idx, start as f32, (start + angle) as f32));
            start += angle;
        }
        out
    }

    fn slice_center(&self, center: Point, explode: f32, start: f32, end: f32) -> Point {
        if explode == 0.0 {
            center
        } else {
            polar(center, explode, (start + end) / 2.0)
        }
    }

    fn draw_legend(&self, canvas: &mut dyn Canvas, top: f32) {
        let theme = &self.chart.theme;
        let single_host = self.chart.single_host();
        let mut table = TextTable::new(10.0, top, theme.text);
        table.add_row(["", "", "", "value", "share"].iter().map(|t| Cell::text(*t).aligned(Align::Center)).collect());

        for (idx, series) in self.chart.series.iter().enumerate() {
            let mut row = vec![
                Cell::swatch(series.color),
                Cell::text(series.caption(single_host)),
                Cell::text(format!("[{}]", series.aggregation.label())),
            ];
            if self.data[idx].is_some() {
                let value = self.values[idx];
                let share = if self.total > 0.0 { value / self.total * 100.0 } else { 0.0 };
                row.push(Cell::text(convert_units(value, &series.units, ConvertOptions::default()).to_string()).aligned(Align::Right));
                row.push(Cell::text(format!("({}%)", format_float(share, 2))).aligned(Align::Right));
            } else {
                row.push(Cell::text("[no data]").colored(theme.no_data));
            }
            table.add_row(row);
        }
        table.draw(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles_sum_to_full_turn() {
        for weights in [vec![1.0, 1.0, 1.0], vec![5.0, 3.0, 2.0], vec![1.0, 2.0, 4.0, 8.0, 16.0], vec![7.0]] {
            let sum: u32 = allocate_angles(&weights).iter().sum();
            assert_eq!(sum, 360, "weights {weights:?}");
        }
    }

    #[test]
    fn tiny_and_zero_slices_are_dropped() {
        let angles = allocate_angles(&[1000.0, 0.0, 0.001]);
        assert_eq!(angles[1], 0);
        assert_eq!(angles[2], 0);
        assert_eq!(angles[0], 360);
    }

    #[test]
    fn no_weights_yield_no_angles() {
        assert_eq!(allocate_angles(&[0.0, 0.0]), vec![0, 0]);
        assert!(allocate_angles(&[]).is_empty());
    }
}
