// File: crates/demo/src/samples.rs
// Summary: Loads raw `(clock, value)` samples from CSV and aggregates them into per-column bucket rows.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chart_core::BucketRow;

/// One raw sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub clock: i64,
    pub value: f64,
}

/// Read a CSV with `clock` and `value` columns (header names are case-insensitive;
/// `time`/`timestamp` and `avg` are accepted too). Epoch milliseconds are converted.
pub fn load_csv(path: &Path) -> Result<Vec<Sample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.to_lowercase()).collect::<Vec<_>>();
    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));
    let i_clock = idx(&["clock", "time", "timestamp"]).with_context(|| format!("{}: no clock column", path.display()))?;
    let i_value = idx(&["value", "avg", "v"]).with_context(|| format!("{}: no value column", path.display()))?;

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let clock = rec.get(i_clock).and_then(|s| s.parse::<i64>().ok());
        let value = rec.get(i_value).and_then(|s| s.parse::<f64>().ok());
        match (clock, value) {
            (Some(clock), Some(value)) => {
                // epoch ms -> sec
                let clock = if clock > 10_i64.pow(12) { clock / 1000 } else { clock };
                out.push(Sample { clock, value });
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(file = %path.display(), skipped, "skipped unparsable rows");
    }
    Ok(out)
}

/// Group samples into pixel columns of a `width`-pixel plot covering `[from, from + period]`.
pub fn aggregate(samples: &[Sample], from: i64, period: i64, width: u32) -> Vec<BucketRow> {
    let mut columns: BTreeMap<usize, BucketRow> = BTreeMap::new();
    let mut sums: BTreeMap<usize, f64> = BTreeMap::new();
    for s in samples {
        let offset = s.clock - from;
        if offset < 0 || offset > period || period <= 0 {
            continue;
        }
        let column = (offset as f64 * width as f64 / period as f64).floor() as usize;
        let row = columns.entry(column).or_insert(BucketRow {
            column,
            count: 0,
            min: s.value,
            max: s.value,
            avg: 0.0,
            clock: s.clock,
        });
        row.count += 1;
        row.min = row.min.min(s.value);
        row.max = row.max.max(s.value);
        row.clock = row.clock.max(s.clock);
        *sums.entry(column).or_insert(0.0) += s.value;
    }
    columns
        .into_values()
        .map(|mut row| {
            row.avg = sums.get(&row.column).copied().unwrap_or(0.0) / row.count as f64;
            row
        })
        .collect()
}
