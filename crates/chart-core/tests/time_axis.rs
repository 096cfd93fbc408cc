// File: crates/chart-core/tests/time_axis.rs
// Purpose: Time-axis interval choice and tick enumeration, including DST days.

use chart_core::grid::{select_intervals, MainPeriod, Step, TimeAxisPlanner};

// 2023-11-14 22:00:00 UTC
const START: i64 = 1_699_999_200;

#[test]
fn one_day_at_900px_uses_day_and_hour_intervals() {
    let planner = TimeAxisPlanner::new(chrono_tz::UTC);
    let plan = planner.plan(START, START + 86_400, 900, 12.0).expect("plan");

    assert_eq!(plan.main_period, MainPeriod::Day);
    assert_eq!(plan.sub_step, Step::Seconds(3600));
    assert_eq!(plan.main.len(), 1, "main ticks: {:?}", plan.main);

    let midnight = plan.main[0].time;
    assert_eq!(midnight % 86_400, 0);
    assert_eq!(plan.main[0].label, "11-15");

    // no sub label collides with the main label
    let margin = 2700;
    assert!(!plan.sub.is_empty());
    for tick in &plan.sub {
        assert_eq!(tick.time % 3600, 0, "sub tick off the hour: {tick:?}");
        assert!((tick.time - midnight).abs() >= margin, "sub tick too close to midnight: {tick:?}");
        assert!(tick.offset > 0 && tick.offset < 86_400);
    }

    let after: Vec<i64> = plan.sub.iter().map(|t| t.time).filter(|&t| t > midnight).collect();
    assert!(after.len() > 10);
    assert!(after.windows(2).all(|w| w[1] - w[0] == 3600));
}

#[test]
fn narrow_labels_prefer_the_closest_interval() {
    assert_eq!(select_intervals(300, 10.0), (MainPeriod::Hour, Step::Seconds(300)));
    // wide labels push the sub interval up
    assert_eq!(select_intervals(300, 4000.0), (MainPeriod::Day, Step::Seconds(3 * 3600)));
}

#[test]
fn weeks_align_to_sunday() {
    let planner = TimeAxisPlanner::new(chrono_tz::UTC);
    // Wednesday 2024-01-10 15:00 UTC -> Sunday 2024-01-07 00:00 UTC
    assert_eq!(planner.align(1_704_898_800, MainPeriod::Week), 1_704_585_600);
}

#[test]
fn hourly_boundaries_follow_local_time_across_dst() {
    let planner = TimeAxisPlanner::new(chrono_tz::Europe::Berlin);
    // 2024-03-31 00:00 CET; clocks jump 02:00 -> 03:00
    let start = 1_711_839_600;
    let ticks = planner.boundaries(start, start + 6 * 3600, Step::Seconds(3600), 100);
    let labels: Vec<String> = ticks.iter().map(|&t| planner.format(t, "%H:%M")).collect();
    assert_eq!(&labels[..4], &["00:00", "01:00", "03:00", "04:00"]);
}

#[test]
fn inverted_window_is_rejected() {
    let planner = TimeAxisPlanner::new(chrono_tz::UTC);
    assert!(planner.plan(START, START, 900, 12.0).is_err());
}
