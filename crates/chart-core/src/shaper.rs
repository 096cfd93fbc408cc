// File: crates/chart-core/src/shaper.rs
// Summary: Normalizes sparse per-column buckets: gap interpolation and stack shifts.

use tracing::trace;

use crate::series::{saturating_sum, Bucket, BucketRow, Series, SeriesData};

/// Turns store rows into dense per-column buckets for one chart.
#[derive(Clone, Copy, Debug)]
pub struct SeriesShaper {
    /// Plot width in pixels; buckets span columns `0..=width`.
    pub width: u32,
    /// Window length in seconds.
    pub period: i64,
    pub stacked: bool,
}

impl SeriesShaper {
    pub fn new(width: u32, period: i64, stacked: bool) -> Self {
        Self { width, period, stacked }
    }

    fn seconds_per_column(&self) -> f64 {
        self.period as f64 / self.width.max(1) as f64
    }

    /// Dense buckets with gaps filled; `None` when no column holds samples.
    ///
    /// Leading gaps repeat the first known column, trailing gaps repeat the
    /// last one, and gaps in between are interpolated linearly. Filled columns
    /// keep `count == 0`, except short runs on stacked charts which get
    /// `count == 1` so areas stay closed.
    pub fn fill(&self, rows: &[BucketRow]) -> Option<SeriesData> {
        let columns = self.width as usize + 1;
        let mut buckets = vec![Bucket::default(); columns];

        let mut dropped = 0usize;
        for row in rows {
            if row.column >= columns {
                dropped += 1;
                continue;
            }
            buckets[row.column] = Bucket {
                count: row.count,
                min: row.min,
                max: row.max,
                avg: row.avg,
                clock: row.clock as f64,
                ..Bucket::default()
            };
        }
        if dropped > 0 {
            trace!(dropped, columns, "ignored rows outside the plot");
        }

        let sampled: Vec<f64> = buckets.iter().filter(|b| b.count > 0).map(|b| b.avg).collect();
        if sampled.is_empty() {
            return None;
        }
        let n = sampled.len() as f64;
        let avg_orig = sampled.iter().map(|v| v / n).sum::<f64>();

        let step = self.seconds_per_column();
        let short_run = self.width as f64 / 20.0;

        // run of empty columns ending just before `ci`
        let mut run = 0usize;
        for ci in 0..columns {
            if buckets[ci].count == 0 {
                run += 1;
                continue;
            }
            if run == 0 {
                continue;
            }

            let dx = run + 1;
            let leading = ci < dx;
            let anchor = if leading { buckets[ci] } else { buckets[ci - dx] };
            let current = buckets[ci];
            let mark = self.stacked && (dx as f64) < short_run;

            for k in 1..=run {
                let idx = ci - dx + k;
                let b = &mut buckets[idx];
                if leading {
                    let back = (dx - k) as f64;
                    b.clock = current.clock - step * back;
                    b.min = current.min;
                    b.max = current.max;
                    b.avg = current.avg;
                } else {
                    // weighted form stays finite between far-apart extremes
                    let w = k as f64 / dx as f64;
                    let lerp = |a: f64, c: f64| a * (1.0 - w) + c * w;
                    b.clock = lerp(anchor.clock, current.clock);
                    b.min = lerp(anchor.min, current.min);
                    b.max = lerp(anchor.max, current.max);
                    b.avg = lerp(anchor.avg, current.avg);
                }
                if mark {
                    b.count = 1;
                }
            }
            run = 0;
        }

        if run > 0 {
            let last = columns - run - 1;
            let anchor = buckets[last];
            for k in 1..=run {
                let b = &mut buckets[last + k];
                b.clock = anchor.clock + step * k as f64;
                b.min = anchor.min;
                b.max = anchor.max;
                b.avg = anchor.avg;
            }
        }

        Some(SeriesData { buckets, avg_orig })
    }

    /// Accumulate stack shifts: each series sits on the nearest earlier series
    /// of the same side that has data.
    pub fn stack(series: &[Series], data: &mut [Option<SeriesData>]) {
        for i in 1..series.len().min(data.len()) {
            if data[i].is_none() {
                continue;
            }
            let below = (0..i).rev().find(|&j| series[j].side == series[i].side && data[j].is_some());
            let Some(j) = below else { continue };

            let (head, tail) = data.split_at_mut(i);
            let (Some(prev), Some(curr)) = (head[j].as_ref(), tail[0].as_mut()) else { continue };
            for (c, p) in curr.buckets.iter_mut().zip(prev.buckets.iter()) {
                c.shift_min = saturating_sum(p.min, p.shift_min);
                c.shift_max = saturating_sum(p.max, p.shift_max);
                c.shift_avg = saturating_sum(p.avg, p.shift_avg);
            }
        }
    }
}
