// File: crates/chart-core/src/grid.rs
// Summary: Time-axis grid planning: interval choice, alignment, DST-aware tick enumeration.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike};
use chrono_tz::Tz;
use tracing::trace;

use crate::error::{ChartError, Result};
use crate::types::CELL_WIDTH;
use crate::units::SEC_PER_DAY;

/// Calendar step between two grid boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Seconds(i64),
    Days(i64),
    Months(u32),
}

impl Step {
    /// Duration measured from the unix epoch, so months and years use their 1970 lengths.
    pub fn nominal_seconds(self) -> i64 {
        match self {
            Step::Seconds(s) => s,
            Step::Days(d) => d * SEC_PER_DAY,
            Step::Months(m) => NaiveDate::from_ymd_opt(1970, 1, 1)
                .and_then(|epoch| epoch.checked_add_months(Months::new(m)).map(|d| (d - epoch).num_seconds()))
                .unwrap_or(m as i64 * 30 * SEC_PER_DAY),
        }
    }
}

/// Main grid period; decides alignment and label formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainPeriod {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
    Decade,
}

impl MainPeriod {
    pub const fn step(self) -> Step {
        match self {
            MainPeriod::Minute => Step::Seconds(60),
            MainPeriod::Hour => Step::Seconds(3600),
            MainPeriod::Day => Step::Days(1),
            MainPeriod::Week => Step::Days(7),
            MainPeriod::Month => Step::Months(1),
            MainPeriod::Year => Step::Months(12),
            MainPeriod::Decade => Step::Months(120),
        }
    }

    fn main_format(self, magnitude: Magnitude) -> &'static str {
        match self {
            MainPeriod::Minute | MainPeriod::Hour => "%H:%M",
            MainPeriod::Day | MainPeriod::Week | MainPeriod::Month => {
                if magnitude == Magnitude::Year { "%Y-%m-%d" } else { "%m-%d" }
            }
            MainPeriod::Year | MainPeriod::Decade => "%Y",
        }
    }

    fn sub_format(self) -> &'static str {
        match self {
            MainPeriod::Minute => "%H:%M:%S",
            MainPeriod::Hour | MainPeriod::Day => "%H:%M",
            MainPeriod::Week | MainPeriod::Month => "%m-%d",
            MainPeriod::Year => "%b",
            MainPeriod::Decade => "%Y",
        }
    }
}

/// Main periods with their candidate sub-intervals.
const CATALOGUE: &[(MainPeriod, &[Step])] = &[
    (MainPeriod::Minute, &[Step::Seconds(1), Step::Seconds(5), Step::Seconds(10), Step::Seconds(30)]),
    (
        MainPeriod::Hour,
        &[Step::Seconds(60), Step::Seconds(120), Step::Seconds(300), Step::Seconds(900), Step::Seconds(1800)],
    ),
    (MainPeriod::Day, &[Step::Seconds(3600), Step::Seconds(3 * 3600), Step::Seconds(6 * 3600), Step::Seconds(12 * 3600)]),
    (MainPeriod::Week, &[Step::Days(1)]),
    (MainPeriod::Month, &[Step::Days(3), Step::Days(7), Step::Days(14)]),
    (MainPeriod::Year, &[Step::Months(1), Step::Months(3), Step::Months(4), Step::Months(6)]),
    (MainPeriod::Decade, &[Step::Months(12), Step::Months(60)]),
];

/// Highest date component that differs between window start and end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Magnitude {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// One labelled grid line.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub time: i64,
    /// Seconds from window start.
    pub offset: i64,
    pub label: String,
}

impl Tick {
    /// Horizontal pixel offset within a plot `width` pixels wide.
    pub fn x(&self, width: u32, period: i64) -> f32 {
        (self.offset as f64 * width as f64 / period as f64) as f32
    }
}

/// Result of [`TimeAxisPlanner::plan`].
#[derive(Clone, Debug, PartialEq)]
pub struct TimePlan {
    pub main_period: MainPeriod,
    pub sub_step: Step,
    pub main_format: &'static str,
    pub sub_format: &'static str,
    /// Every aligned main boundary up to the window end.
    pub main_boundaries: Vec<i64>,
    /// Main boundaries far enough from the edges to be labelled.
    pub main: Vec<Tick>,
    pub sub: Vec<Tick>,
}

/// Picks X-axis intervals and enumerates their boundaries in a time zone.
#[derive(Clone, Copy, Debug)]
pub struct TimeAxisPlanner {
    tz: Tz,
}

impl TimeAxisPlanner {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Plan the grid of `[start, end]` drawn `width` pixels wide.
    ///
    /// `label_px` is the pixel extent of a typical label along the axis.
    pub fn plan(&self, start: i64, end: i64, width: u32, label_px: f64) -> Result<TimePlan> {
        if end <= start || width == 0 {
            return Err(ChartError::InvalidWindow(format!("{start}..{end} at {width}px")));
        }
        let period = end - start;

        let label_size = label_px * period as f64 / width as f64 * 2.0;
        let preferred = ((period as f64 * CELL_WIDTH as f64 / width as f64) as i64).max(1);
        let magnitude = self.magnitude(start, end);

        let (main_period, sub_step) = select_intervals(preferred, label_size);
        let main_format = main_period.main_format(magnitude);
        let sub_format = main_period.sub_format();
        trace!(?main_period, ?sub_step, preferred, label_size, "time axis intervals");

        // Enumeration is bounded by the pixel width, never by raw seconds.
        let limit = width as usize + 2;

        let aligned = self.align(start, main_period);
        let main_boundaries = self.boundaries(aligned, end, main_period.step(), limit);

        let main: Vec<Tick> = main_boundaries
            .iter()
            .filter(|&&t| {
                let pos = t - start;
                pos as f64 >= label_size && pos as f64 <= period as f64 - label_size
            })
            .map(|&t| self.tick(t, start, main_format))
            .collect();

        let margin = label_size.max((sub_step.nominal_seconds() as f64 * 0.75).floor());
        let mut edges = main_boundaries.clone();
        edges.push(end);

        let mut sub = Vec::new();
        for pair in edges.windows(2) {
            let pos_min = (pair[0] - start) as f64 + margin;
            let pos_max = (pair[1] - start) as f64 - margin;
            let lo = pos_min.max(label_size);
            let hi = pos_max.min(period as f64 - label_size);
            for t in self.boundaries(pair[0], pair[1], sub_step, limit) {
                let pos = (t - start) as f64;
                if pos >= lo && pos <= hi {
                    sub.push(self.tick(t, start, sub_format));
                }
                if sub.len() > limit {
                    break;
                }
            }
        }

        Ok(TimePlan { main_period, sub_step, main_format, sub_format, main_boundaries, main, sub })
    }

    fn tick(&self, t: i64, start: i64, format: &str) -> Tick {
        Tick { time: t, offset: t - start, label: self.format(t, format) }
    }

    /// Format `t` in the planner's zone.
    pub fn format(&self, t: i64, format: &str) -> String {
        match DateTime::from_timestamp(t, 0) {
            Some(utc) => utc.with_timezone(&self.tz).format(format).to_string(),
            None => t.to_string(),
        }
    }

    fn local(&self, t: i64) -> Option<NaiveDateTime> {
        DateTime::from_timestamp(t, 0).map(|utc| utc.with_timezone(&self.tz).naive_local())
    }

    fn from_local(&self, naive: NaiveDateTime) -> i64 {
        if let Some(dt) = self.tz.from_local_datetime(&naive).earliest() {
            return dt.timestamp();
        }
        // skipped by a DST gap; the hour after it exists
        let shifted = naive + Duration::hours(1);
        self.tz
            .from_local_datetime(&shifted)
            .earliest()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| naive.and_utc().timestamp())
    }

    fn offset(&self, t: i64) -> i64 {
        DateTime::from_timestamp(t, 0)
            .map(|utc| self.tz.offset_from_utc_datetime(&utc.naive_utc()).fix().local_minus_utc() as i64)
            .unwrap_or(0)
    }

    fn magnitude(&self, start: i64, end: i64) -> Magnitude {
        let (Some(a), Some(b)) = (self.local(start), self.local(end)) else {
            return Magnitude::Year;
        };
        if a.year() != b.year() {
            Magnitude::Year
        } else if a.month() != b.month() {
            Magnitude::Month
        } else if a.day() != b.day() {
            Magnitude::Day
        } else if a.hour() != b.hour() {
            Magnitude::Hour
        } else if a.minute() != b.minute() {
            Magnitude::Minute
        } else {
            Magnitude::Second
        }
    }

    /// Trim `t` down to the natural boundary of `period` in local time.
    /// Weeks start on the Sunday on or before `t`.
    pub fn align(&self, t: i64, period: MainPeriod) -> i64 {
        let Some(local) = self.local(t) else { return t };
        let date = local.date();
        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0);

        let naive = match period {
            MainPeriod::Minute => date.and_hms_opt(local.hour(), local.minute(), 0),
            MainPeriod::Hour => date.and_hms_opt(local.hour(), 0, 0),
            MainPeriod::Day => midnight(date),
            MainPeriod::Week => {
                let back = date.weekday().num_days_from_sunday() as i64;
                midnight(date - Duration::days(back))
            }
            MainPeriod::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).and_then(midnight),
            MainPeriod::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).and_then(midnight),
            MainPeriod::Decade => NaiveDate::from_ymd_opt(1970, 1, 1).and_then(midnight),
        };
        naive.map_or(t, |n| self.from_local(n))
    }

    /// Boundaries `start, start+step, ...` up to and including `end`.
    pub fn boundaries(&self, start: i64, end: i64, step: Step, limit: usize) -> Vec<i64> {
        let nominal = step.nominal_seconds();
        let mut out = Vec::new();

        if nominal >= SEC_PER_DAY {
            let Some(origin) = self.local(start) else { return out };
            for k in 0.. {
                let naive = match step {
                    Step::Months(m) => origin.checked_add_months(Months::new(m * k)),
                    Step::Days(d) => origin.checked_add_signed(Duration::days(d * k as i64)),
                    Step::Seconds(s) => origin.checked_add_signed(Duration::seconds(s * k as i64)),
                };
                let Some(naive) = naive else { break };
                let t = self.from_local(naive);
                if t > end || out.len() >= limit {
                    break;
                }
                out.push(t);
            }
            return out;
        }

        // Sub-day steps advance in UTC; crossing an offset change shifts the
        // grid back onto local boundaries when the step outgrows the jump.
        let mut t = start;
        let mut prev_offset = self.offset(start);
        while t <= end && out.len() < limit {
            let offset = self.offset(t);
            if offset != prev_offset {
                let diff = offset - prev_offset;
                if nominal > diff.abs() {
                    t -= diff;
                }
                prev_offset = offset;
            }
            out.push(t);
            t += nominal;
        }
        out
    }
}

/// Choose the catalogue pair whose sub-interval best matches `preferred`,
/// favouring sub-intervals at least `min_sub` long.
pub fn select_intervals(preferred: i64, min_sub: f64) -> (MainPeriod, Step) {
    let preferred = preferred.max(1) as f64;
    let mut best = (MainPeriod::Minute, Step::Seconds(1));
    let mut best_ts = 0i64;
    let mut best_prop = f64::INFINITY;

    for (main, subs) in CATALOGUE {
        for &sub in subs.iter() {
            let ts = sub.nominal_seconds();
            let prop = preferred.max(ts as f64) / preferred.min(ts as f64);
            let is_better = if (best_ts as f64) < min_sub { ts > best_ts } else { prop < best_prop };
            if is_better {
                best = (*main, sub);
                best_ts = ts;
                best_prop = prop;
            }
        }
    }
    best
}
