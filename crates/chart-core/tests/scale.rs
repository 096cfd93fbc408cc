// File: crates/chart-core/tests/scale.rs
// Purpose: Value-axis scale selection: nice bounds, fixed bounds, stacking and prefixes.

use chart_core::scale::{row_range, ExtremesInput, ScaleEngine, ValueScale};
use chart_core::{ChartError, Side};

fn input(min: f64, max: f64) -> ExtremesInput {
    ExtremesInput {
        side: Side::Left,
        min,
        max,
        calc_min: true,
        calc_max: true,
        height: 200,
        binary: false,
        calc_power: true,
        rows: None,
    }
}

#[test]
fn calculated_bounds_cover_data_on_nice_steps() {
    for (min, max) in [(0.0, 97.3), (12.5, 13.1), (-40.0, 25.0), (0.001, 0.0042), (3.0e9, 7.7e9)] {
        let s = ScaleEngine::compute_extremes(input(min, max)).expect("valid scale");
        assert!(s.min < s.max, "{min}..{max}: {s:?}");
        assert!(s.min <= min && s.max >= max, "{min}..{max} not covered by {s:?}");
        let (lo, hi) = row_range(200);
        assert!((lo..=hi).contains(&s.rows), "rows {} outside {lo}..={hi}", s.rows);
        let span = s.max - s.min;
        assert!((span - s.interval * s.rows as f64).abs() <= span * 1e-9);
    }
}

#[test]
fn fixed_bounds_are_kept() {
    let s = ScaleEngine::compute_extremes(ExtremesInput { calc_min: false, calc_max: false, ..input(0.0, 100.0) })
        .expect("valid scale");
    assert_eq!((s.min, s.max), (0.0, 100.0));
}

#[test]
fn fixed_min_above_fixed_max_is_rejected() {
    let err = ScaleEngine::compute_extremes(ExtremesInput { calc_min: false, calc_max: false, ..input(10.0, 5.0) })
        .unwrap_err();
    assert!(matches!(err, ChartError::InvalidScale { .. }));
    assert!(err.to_string().contains("Y axis MAX value must be greater than Y axis MIN value"));
}

#[test]
fn flat_series_gets_a_visible_range() {
    let s = ScaleEngine::compute_extremes(input(5.0, 5.0)).expect("valid scale");
    assert!(s.min <= 0.0 && s.max >= 5.0);

    let zero = ScaleEngine::compute_extremes(input(0.0, 0.0)).expect("valid scale");
    assert!(zero.min <= 0.0 && zero.max >= 1.0);
}

#[test]
fn ranges_at_the_edge_of_f64_stay_finite() {
    for (min, max) in [(-1e308, 1e308), (0.0, 1.7e308), (-1.7e308, 0.0)] {
        let s = ScaleEngine::compute_extremes(input(min, max)).expect("valid scale");
        assert!(s.min.is_finite() && s.max.is_finite() && s.interval.is_finite(), "{min}..{max}: {s:?}");
        assert!(s.min < s.max && s.interval > 0.0, "{min}..{max}: {s:?}");
        assert!(s.min <= min && s.max >= max, "{min}..{max} not covered by {s:?}");
    }
}

#[test]
fn binary_units_step_in_powers_of_1024() {
    let s = ScaleEngine::compute_extremes(ExtremesInput { binary: true, ..input(0.0, 3.0 * 1024.0 * 1024.0) })
        .expect("valid scale");
    assert!(s.binary);
    assert_eq!(s.power, 2);
    assert!(s.label(s.max, "B").ends_with("MB"), "label {}", s.label(s.max, "B"));
}

#[test]
fn shared_rows_are_reused() {
    let s = ScaleEngine::compute_extremes(ExtremesInput { rows: Some(4), ..input(0.0, 17.0) }).expect("valid scale");
    assert_eq!(s.rows, 4);
    assert_eq!(s.values().len(), 5);
}

#[test]
fn value_scale_maps_bounds_to_plot_edges() {
    let vs = ValueScale::new(24.0, 224.0, 0.0, 100.0);
    assert_eq!(vs.to_px(0.0), 224.0);
    assert_eq!(vs.to_px(100.0), 24.0);
    assert_eq!(vs.to_px(50.0), 124.0);
    assert!(vs.zero_row().is_none());

    let mixed = ValueScale::new(0.0, 100.0, -50.0, 50.0);
    assert_eq!(mixed.zero_row(), Some(50.0));
    assert!((mixed.from_px(25.0) - 25.0).abs() < 1e-9);
}
