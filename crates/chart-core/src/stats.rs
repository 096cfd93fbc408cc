// File: crates/chart-core/src/stats.rs
// Summary: Percentile statistics for reference lines.

use serde::{Deserialize, Serialize};

use crate::series::{Series, SeriesData, Stat};
use crate::types::{PerSide, Side};

/// Nearest-rank percentile of ascending `sorted` values.
///
/// Index is `ceil(percent / 100 * n) - 1`, clamped to the slice.
pub fn nearest_rank(sorted: &[f64], percent: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (percent / 100.0 * sorted.len() as f64).ceil() as i64 - 1;
    let idx = rank.clamp(0, sorted.len() as i64 - 1) as usize;
    Some(sorted[idx])
}

/// Requested percentile per side; `0` disables the line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentileConfig {
    pub left: f64,
    pub right: f64,
}

impl PercentileConfig {
    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn enabled(&self, side: Side) -> bool {
        self.get(side) > 0.0
    }
}

/// Requested and resolved percentile of one side.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Percentile {
    pub percent: f64,
    pub value: Option<f64>,
}

/// Resolve percentiles over every sampled column (last column excluded) of each side.
pub fn side_percentiles(config: &PercentileConfig, series: &[Series], data: &[Option<SeriesData>]) -> PerSide<Percentile> {
    let mut values: PerSide<Vec<f64>> = PerSide::default();
    for (s, d) in series.iter().zip(data) {
        let Some(d) = d else { continue };
        let stat = Stat::drawn(s.aggregation);
        let n = d.buckets.len().saturating_sub(1);
        values
            .get_mut(s.side)
            .extend(d.buckets[..n].iter().filter(|b| b.count > 0).map(|b| b.value(stat)));
    }

    let mut out = PerSide::<Percentile>::default();
    for side in Side::ALL {
        let percent = config.get(side);
        let vals = values.get_mut(side);
        vals.sort_by(|a, b| a.total_cmp(b));
        let value = if percent > 0.0 { nearest_rank(vals, percent) } else { None };
        *out.get_mut(side) = Percentile { percent, value };
    }
    out
}
