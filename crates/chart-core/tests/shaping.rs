// File: crates/chart-core/tests/shaping.rs
// Purpose: Gap filling, stacking shifts and percentile resolution over shaped buckets.

mod common;

use chart_core::palette::Palette;
use chart_core::stats::side_percentiles;
use chart_core::{nearest_rank, PercentileConfig, Series, SeriesShaper, SeriesSpec, Side};
use common::{flat_rows, row};

fn resolve(spec: SeriesSpec) -> Series {
    Series::resolve(&spec, &mut Palette::default(), (0, 100), 100, 10).expect("resolve")
}

#[test]
fn interior_gaps_are_interpolated_and_edges_repeat() {
    let shaper = SeriesShaper::new(10, 100, false);
    let data = shaper
        .fill(&[row(2, 0.0, 0.0, 0.0, 20), row(6, 40.0, 40.0, 40.0, 60)])
        .expect("has data");

    assert_eq!(data.buckets.len(), 11);
    let avg: Vec<f64> = data.buckets.iter().map(|b| b.avg).collect();
    assert_eq!(&avg[..3], &[0.0, 0.0, 0.0]);
    assert_eq!(avg[4], 20.0);
    assert_eq!(&avg[6..], &[40.0; 5]);

    // only delivered columns count as sampled
    let sampled: Vec<usize> = (0..11).filter(|&i| data.buckets[i].count > 0).collect();
    assert_eq!(sampled, vec![2, 6]);
    assert_eq!(data.avg_orig, 20.0);
}

#[test]
fn gap_between_two_samples_rises_strictly() {
    let shaper = SeriesShaper::new(10, 100, false);
    let data = shaper
        .fill(&[row(0, 0.0, 0.0, 0.0, 0), row(10, 100.0, 100.0, 100.0, 100)])
        .expect("has data");
    let avg: Vec<f64> = data.buckets.iter().map(|b| b.avg).collect();
    assert!(avg.windows(2).all(|w| w[0] < w[1]), "avg {avg:?}");
}

#[test]
fn gap_between_opposite_extremes_stays_finite() {
    let shaper = SeriesShaper::new(10, 100, false);
    let data = shaper
        .fill(&[row(0, -1e308, -1e308, -1e308, 0), row(10, 1e308, 1e308, 1e308, 100)])
        .expect("has data");
    let avg: Vec<f64> = data.buckets.iter().map(|b| b.avg).collect();
    assert!(avg.iter().all(|v| v.is_finite()), "avg {avg:?}");
    assert!(avg.windows(2).all(|w| w[0] < w[1]), "avg {avg:?}");
    assert!(data.avg_orig.is_finite());
}

#[test]
fn short_gaps_on_stacked_charts_count_as_samples() {
    let rows = [row(0, 1.0, 1.0, 1.0, 0), row(4, 1.0, 1.0, 1.0, 4), row(20, 1.0, 1.0, 1.0, 20)];

    let stacked = SeriesShaper::new(100, 100, true).fill(&rows).expect("has data");
    let counts: Vec<u32> = stacked.buckets[..=20].iter().map(|b| b.count).collect();
    assert!(counts[1..4].iter().all(|&c| c == 1), "short run {counts:?}");
    assert!(counts[5..20].iter().all(|&c| c == 0), "long run {counts:?}");
    assert!(stacked.buckets[21..].iter().all(|b| b.count == 0));

    let plain = SeriesShaper::new(100, 100, false).fill(&rows).expect("has data");
    assert!(plain.buckets[1..4].iter().all(|b| b.count == 0));
}

#[test]
fn filled_clocks_are_monotonic() {
    let shaper = SeriesShaper::new(10, 100, false);
    let data = shaper
        .fill(&[row(3, 1.0, 1.0, 1.0, 30), row(7, 2.0, 2.0, 2.0, 70)])
        .expect("has data");
    let clocks: Vec<f64> = data.buckets.iter().map(|b| b.clock).collect();
    assert!(clocks.windows(2).all(|w| w[0] < w[1]), "clocks {clocks:?}");
    assert_eq!(clocks[0], 0.0);
    assert_eq!(clocks[10], 100.0);
}

#[test]
fn empty_window_has_no_data() {
    let shaper = SeriesShaper::new(10, 100, false);
    assert!(shaper.fill(&[]).is_none());
    // rows beyond the plot are ignored
    assert!(shaper.fill(&[row(50, 1.0, 1.0, 1.0, 500)]).is_none());
}

#[test]
fn stacked_series_sit_on_the_ones_below() {
    let shaper = SeriesShaper::new(10, 100, true);
    let series: Vec<Series> = (0..3).map(|i| resolve(SeriesSpec::new(i, format!("s{i}")))).collect();
    let mut data: Vec<_> = [10.0, 20.0, 30.0].iter().map(|&v| shaper.fill(&flat_rows(0..=10, v, 0, 100, 10))).collect();

    SeriesShaper::stack(&series, &mut data);

    let shift = |k: usize| data[k].as_ref().map(|d| d.buckets[5].shift_avg);
    assert_eq!(shift(0), Some(0.0));
    assert_eq!(shift(1), Some(10.0));
    assert_eq!(shift(2), Some(30.0));
}

#[test]
fn stacking_is_per_side() {
    let shaper = SeriesShaper::new(10, 100, true);
    let series = vec![
        resolve(SeriesSpec::new(1, "left")),
        resolve(SeriesSpec::new(2, "right").with_side(Side::Right)),
        resolve(SeriesSpec::new(3, "left again")),
    ];
    let mut data: Vec<_> = [5.0, 7.0, 1.0].iter().map(|&v| shaper.fill(&flat_rows(0..=10, v, 0, 100, 10))).collect();
    SeriesShaper::stack(&series, &mut data);

    assert_eq!(data[1].as_ref().map(|d| d.buckets[0].shift_avg), Some(0.0));
    assert_eq!(data[2].as_ref().map(|d| d.buckets[0].shift_avg), Some(5.0));
}

#[test]
fn nearest_rank_examples() {
    assert_eq!(nearest_rank(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0), Some(3.0));
    assert_eq!(nearest_rank(&[1.0, 2.0, 3.0, 4.0, 5.0], 100.0), Some(5.0));
    assert_eq!(nearest_rank(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.0), Some(1.0));
    assert_eq!(nearest_rank(&[10.0, 20.0, 30.0, 40.0], 25.0), Some(10.0));
    assert_eq!(nearest_rank(&[], 95.0), None);
}

#[test]
fn side_percentile_skips_the_last_column() {
    let shaper = SeriesShaper::new(4, 100, false);
    let rows = vec![
        row(0, 1.0, 1.0, 1.0, 0),
        row(1, 2.0, 2.0, 2.0, 25),
        row(2, 3.0, 3.0, 3.0, 50),
        row(3, 4.0, 4.0, 4.0, 75),
        row(4, 100.0, 100.0, 100.0, 100),
    ];
    let series = vec![resolve(SeriesSpec::new(1, "a"))];
    let data = vec![shaper.fill(&rows)];

    let p = side_percentiles(&PercentileConfig { left: 100.0, right: 0.0 }, &series, &data);
    assert_eq!(p.left.value, Some(4.0));
    assert_eq!(p.right.value, None);
}
