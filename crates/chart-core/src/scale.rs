// File: crates/chart-core/src/scale.rs
// Summary: Y-axis scale computation (nice bounds, unit magnitude) and value-to-pixel mapping.

use tracing::{debug, warn};

use crate::axis::{AxisScale, YAxisBound};
use crate::error::{ChartError, Result};
use crate::series::{saturating_sum, Series, SeriesData, Stat};
use crate::types::{Side, CELL_HEIGHT_MIN};
use crate::units::is_binary_unit;

/// Largest unit prefix power (Y).
const MAX_POWER: i32 = 8;

/// Bounds beyond `f64::MAX / SHRINK_THRESHOLD` are fitted after dividing by [`SHRINK`].
const SHRINK_THRESHOLD: f64 = 16.0;
const SHRINK: f64 = 10.0;

/// Smallest `{1, 2, 5} × 10^k` that is `>= raw`.
pub fn nice_step(raw: f64) -> f64 {
    if !(raw > 0.0) || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    for m in [1.0, 2.0, 5.0, 10.0] {
        // tolerate float noise like 0.30000000000000004
        if m * magnitude >= raw * (1.0 - 1e-9) {
            return m * magnitude;
        }
    }
    10.0 * magnitude
}

/// Next nice step above `step`.
fn next_nice(step: f64) -> f64 {
    nice_step(step * 1.000_001)
}

/// Range of grid rows that keeps cells at least [`CELL_HEIGHT_MIN`] tall.
pub fn row_range(height: u32) -> (u32, u32) {
    let cells = height as f64 / CELL_HEIGHT_MIN as f64;
    let lo = ((cells / 1.5).floor() as u32).max(1);
    let hi = (cells.floor() as u32).max(1);
    (lo, hi.max(lo))
}

/// Inputs for [`ScaleEngine::compute_extremes`], one side at a time.
#[derive(Clone, Copy, Debug)]
pub struct ExtremesInput {
    pub side: Side,
    pub min: f64,
    pub max: f64,
    pub calc_min: bool,
    pub calc_max: bool,
    pub height: u32,
    pub binary: bool,
    /// Pick a unit prefix power from the data magnitude.
    pub calc_power: bool,
    /// Reuse this many rows (grid alignment with the other side).
    pub rows: Option<u32>,
}

/// Y-axis scale computation.
pub struct ScaleEngine;

impl ScaleEngine {
    /// Resolve one side's bounds into an [`AxisScale`].
    ///
    /// Returns `Ok(None)` when no series sits on `side`.
    pub fn compute_axis(
        side: Side,
        series: &[(&Series, Option<&SeriesData>)],
        min_bound: YAxisBound,
        max_bound: YAxisBound,
        height: u32,
        stacked: bool,
        rows: Option<u32>,
    ) -> Result<Option<AxisScale>> {
        let on_side: Vec<_> = series.iter().filter(|(s, _)| s.side == side).collect();
        if on_side.is_empty() {
            return Ok(None);
        }

        let mut data_min = f64::INFINITY;
        let mut data_max = f64::NEG_INFINITY;
        let mut seen = false;
        for (s, data) in &on_side {
            let Some(data) = data else { continue };
            let (lo, hi) = (Stat::lower(s.aggregation), Stat::upper(s.aggregation));
            for b in &data.buckets {
                let (vmin, vmax) = if stacked { (b.stacked(lo), b.stacked(hi)) } else { (b.value(lo), b.value(hi)) };
                if vmin.is_nan() || vmax.is_nan() {
                    continue;
                }
                seen = true;
                data_min = data_min.min(vmin);
                data_max = data_max.max(vmax);
            }
        }
        let (data_min, data_max) = if seen {
            (data_min.clamp(f64::MIN, f64::MAX), data_max.clamp(f64::MIN, f64::MAX))
        } else {
            (0.0, 0.0)
        };

        let (min, calc_min) = resolve_bound(side, "min", min_bound, data_min);
        let (max, calc_max) = resolve_bound(side, "max", max_bound, data_max);
        let min = if stacked && calc_min { min.min(0.0) } else { min };

        let binary = on_side.iter().any(|(s, _)| is_binary_unit(s.units.trim_start_matches('!')));
        let calc_power = on_side.iter().any(|(s, _)| !s.units.starts_with('!'));

        let scale = Self::compute_extremes(ExtremesInput {
            side,
            min,
            max,
            calc_min,
            calc_max,
            height,
            binary,
            calc_power,
            rows,
        })?;
        debug!(side = side.label(), min = scale.min, max = scale.max, interval = scale.interval, rows = scale.rows, power = scale.power, "resolved axis scale");
        Ok(Some(scale))
    }

    /// Extend calculated bounds outward to nice grid boundaries.
    pub fn compute_extremes(input: ExtremesInput) -> Result<AxisScale> {
        let ExtremesInput { side, mut min, mut max, calc_min, calc_max, height, binary, calc_power, rows } = input;

        if !min.is_finite() || !max.is_finite() {
            return Err(ChartError::InvalidScale { side, min, max });
        }
        if !calc_min && !calc_max && min >= max {
            return Err(ChartError::InvalidScale { side, min, max });
        }

        let base = if binary { 1024.0 } else { 1000.0 };

        if min == max {
            let v = min;
            match (calc_min, calc_max) {
                (true, true) => {
                    if v > 0.0 {
                        min = 0.0;
                    } else if v < 0.0 {
                        max = 0.0;
                    } else {
                        max = 1.0;
                    }
                }
                (true, false) => min = saturating_sum(v, -magnitude_unit(v)),
                (false, true) => max = saturating_sum(v, magnitude_unit(v)),
                (false, false) => {}
            }
        } else if min > max {
            // one calculated bound crossed a fixed one
            if calc_min {
                min = saturating_sum(max, -magnitude_unit(max));
            } else {
                max = saturating_sum(min, magnitude_unit(min));
            }
        }

        let power = if calc_power {
            let peak = min.abs().max(max.abs());
            if peak >= 1.0 {
                (peak.log(base).floor() as i32).clamp(0, MAX_POWER) as u32
            } else {
                0
            }
        } else {
            0
        };
        let unit = base.powi(power as i32);

        let (rows_lo, rows_hi) = match rows {
            Some(r) => (r.max(1), r.max(1)),
            None => row_range(height),
        };

        // near the edge of the f64 range the grid is fitted at a tenth of the size
        let shrink = if min.abs().max(max.abs()) > f64::MAX / SHRINK_THRESHOLD { SHRINK } else { 1.0 };
        let (fit_min, fit_max) = (min / shrink, max / shrink);

        let mut best: Option<(f64, AxisScale)> = None;
        for r in rows_lo..=rows_hi {
            let candidate = fit_rows(fit_min, fit_max, calc_min, calc_max, r, unit / shrink);
            let Some(candidate) = candidate else { continue };
            // share of the axis the data actually covers
            let fit = (fit_max - fit_min) / (candidate.max - candidate.min);
            let Some(candidate) = grow(candidate, shrink, (min, calc_min), (max, calc_max)) else { continue };
            let better = match &best {
                None => true,
                Some((best_fit, _)) => fit >= *best_fit - 1e-12,
            };
            if better {
                best = Some((fit, AxisScale { power, binary, ..candidate }));
            }
        }

        match best {
            Some((_, scale)) if scale.min < scale.max => Ok(scale),
            _ => Err(ChartError::InvalidScale { side, min, max }),
        }
    }
}

/// Scale a grid fitted on shrunk bounds back up. Bounds are clamped to the
/// finite range, fixed bounds are restored exactly and calculated ones never
/// stop covering the data.
fn grow(scale: AxisScale, factor: f64, (min, calc_min): (f64, bool), (max, calc_max): (f64, bool)) -> Option<AxisScale> {
    let (lo, hi, interval) = if factor == 1.0 {
        (scale.min, scale.max, scale.interval)
    } else {
        let lo = (scale.min * factor).max(f64::MIN);
        let hi = (scale.max * factor).min(f64::MAX);
        (if calc_min { lo.min(min) } else { min }, if calc_max { hi.max(max) } else { max }, scale.interval * factor)
    };
    if !(lo.is_finite() && hi.is_finite() && interval.is_finite() && interval > 0.0 && lo < hi) {
        return None;
    }
    Some(AxisScale { min: lo, max: hi, interval, ..scale })
}

/// One unit of the value's magnitude, used to widen degenerate ranges.
fn magnitude_unit(v: f64) -> f64 {
    let a = v.abs();
    if a < 1.0 { 1.0 } else { 10f64.powf(a.log10().floor()) }
}

fn fit_rows(min: f64, max: f64, calc_min: bool, calc_max: bool, rows: u32, unit: f64) -> Option<AxisScale> {
    let n = rows as f64;
    let span = max - min;
    let scale = |min, max, interval| AxisScale { min, max, interval, power: 0, binary: false, rows };

    match (calc_min, calc_max) {
        (false, false) => Some(scale(min, max, span / n)),
        (false, true) => {
            let interval = nice_step(span / n / unit) * unit;
            Some(scale(min, min + n * interval, interval))
        }
        (true, false) => {
            let interval = nice_step(span / n / unit) * unit;
            Some(scale(max - n * interval, max, interval))
        }
        (true, true) => {
            let mut interval = nice_step(span / n / unit) * unit;
            for _ in 0..64 {
                let lo = (min / interval).floor() * interval;
                let hi = lo + n * interval;
                if hi >= max - interval * 1e-9 {
                    return Some(scale(lo, hi, interval));
                }
                interval = next_nice(interval / unit) * unit;
            }
            None
        }
    }
}

fn resolve_bound(side: Side, which: &str, bound: YAxisBound, calculated: f64) -> (f64, bool) {
    match bound {
        YAxisBound::Calculated => (calculated, true),
        YAxisBound::Fixed { value } => (value, false),
        YAxisBound::Item { last_value: Some(v), .. } => (v, false),
        YAxisBound::Item { item_id, last_value: None } => {
            warn!(side = side.label(), bound = which, item_id, "reference item has no value, using calculated bound");
            (calculated, true)
        }
    }
}

/// Vertical value scale mapping axis values to pixel rows of the plot area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueScale {
    pub top_px: f32,
    pub bottom_px: f32,
    pub vmin: f64,
    pub vmax: f64,
    /// Pixel row that value `oxy` maps to.
    pub zero: f32,
    pub oxy: f64,
    /// Value per pixel.
    pub unit2px: f64,
}

impl ValueScale {
    /// Anchor at the bottom for positive ranges, at the top for negative
    /// ranges, and at the true zero row otherwise.
    pub fn new(top_px: f32, bottom_px: f32, vmin: f64, vmax: f64) -> Self {
        let h = (bottom_px - top_px) as f64;
        let mut unit2px = if h > 0.0 { vmax / h - vmin / h } else { 0.0 };
        if unit2px == 0.0 {
            unit2px = 1.0;
        }
        let (zero, oxy) = if vmin > 0.0 {
            (bottom_px, vmin)
        } else if vmax < 0.0 {
            (top_px, vmax)
        } else {
            (bottom_px - (vmin / unit2px).abs() as f32, 0.0)
        };
        Self { top_px, bottom_px, vmin, vmax, zero, oxy, unit2px }
    }

    pub fn from_axis(top_px: f32, bottom_px: f32, axis: &AxisScale) -> Self {
        Self::new(top_px, bottom_px, axis.min, axis.max)
    }

    #[inline]
    pub fn to_px(&self, v: f64) -> f32 {
        self.zero - ((v - self.oxy) / self.unit2px) as f32
    }

    #[inline]
    pub fn from_px(&self, py: f32) -> f64 {
        self.oxy + (self.zero - py) as f64 * self.unit2px
    }

    /// Zero row strictly inside the plot, if any.
    pub fn zero_row(&self) -> Option<f32> {
        if self.vmin < 0.0 && self.vmax > 0.0 {
            Some(self.zero)
        } else {
            None
        }
    }
}
