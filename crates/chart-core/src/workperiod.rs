// File: crates/chart-core/src/workperiod.rs
// Summary: Weekly working-time schedule (`"1-5,09:00-18:00;..."`) and its spans inside a window.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};
use crate::units::SEC_PER_MONTH;

/// Windows longer than this are drawn without work-time shading.
pub const MAX_SHADED_PERIOD: i64 = 3 * SEC_PER_MONTH;

/// One `day-day,hh:mm-hh:mm` entry; days are 1 (Monday) to 7 (Sunday).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkSpan {
    pub first_day: u32,
    pub last_day: u32,
    /// Minutes since local midnight.
    pub start: u32,
    pub end: u32,
}

/// Parsed weekly schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkPeriod {
    spans: Vec<WorkSpan>,
    source: String,
}

fn parse_hm(s: &str) -> Option<u32> {
    let (h, m) = s.split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let (h, m): (u32, u32) = (h.parse().ok()?, m.parse().ok()?);
    if m >= 60 || h > 24 || (h == 24 && m != 0) {
        return None;
    }
    Some(h * 60 + m)
}

fn parse_day(s: &str) -> Option<u32> {
    let d: u32 = s.parse().ok()?;
    (1..=7).contains(&d).then_some(d)
}

impl FromStr for WorkPeriod {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || ChartError::InvalidWorkPeriod(s.to_string());
        let mut spans = Vec::new();
        for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (days, hours) = part.split_once(',').ok_or_else(bad)?;
            let (first_day, last_day) = match days.split_once('-') {
                Some((a, b)) => (parse_day(a).ok_or_else(bad)?, parse_day(b).ok_or_else(bad)?),
                None => {
                    let d = parse_day(days).ok_or_else(bad)?;
                    (d, d)
                }
            };
            let (from, to) = hours.split_once('-').ok_or_else(bad)?;
            let (start, end) = (parse_hm(from).ok_or_else(bad)?, parse_hm(to).ok_or_else(bad)?);
            if first_day > last_day || start >= end {
                return Err(bad());
            }
            spans.push(WorkSpan { first_day, last_day, start, end });
        }
        if spans.is_empty() {
            return Err(bad());
        }
        Ok(Self { spans, source: s.to_string() })
    }
}

impl TryFrom<String> for WorkPeriod {
    type Error = ChartError;
    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<WorkPeriod> for String {
    fn from(w: WorkPeriod) -> Self {
        w.source
    }
}

impl Default for WorkPeriod {
    fn default() -> Self {
        Self::office_hours()
    }
}

impl WorkPeriod {
    /// Monday to Friday, 09:00 to 18:00.
    pub fn office_hours() -> Self {
        Self {
            spans: vec![WorkSpan { first_day: 1, last_day: 5, start: 9 * 60, end: 18 * 60 }],
            source: "1-5,09:00-18:00".to_string(),
        }
    }

    pub fn spans(&self) -> &[WorkSpan] {
        &self.spans
    }

    /// Working intervals `[start, end)` clipped to `[from, to]`, merged and ordered.
    pub fn working_intervals(&self, tz: &Tz, from: i64, to: i64) -> Vec<(i64, i64)> {
        let Some(first) = DateTime::from_timestamp(from, 0) else { return Vec::new() };
        let first_day = first.with_timezone(tz).date_naive() - Duration::days(1);

        let mut out: Vec<(i64, i64)> = Vec::new();
        let mut day: NaiveDate = first_day;
        // window is at most a few months, so walking days stays cheap
        loop {
            let Some(midnight) = day.and_hms_opt(0, 0, 0) else { break };
            let Some(day_start) = tz.from_local_datetime(&midnight).earliest() else {
                day += Duration::days(1);
                continue;
            };
            if day_start.timestamp() > to {
                break;
            }
            let weekday = day.weekday().number_from_monday();
            for span in self.spans.iter().filter(|s| (s.first_day..=s.last_day).contains(&weekday)) {
                let at = |minutes: u32| {
                    let naive = midnight + Duration::minutes(minutes as i64);
                    tz.from_local_datetime(&naive)
                        .earliest()
                        .map(|t| t.timestamp())
                        .unwrap_or(day_start.timestamp() + minutes as i64 * 60)
                };
                let (s, e) = (at(span.start).max(from), at(span.end).min(to));
                if s < e {
                    out.push((s, e));
                }
            }
            day += Duration::days(1);
        }

        out.sort_unstable();
        let mut merged: Vec<(i64, i64)> = Vec::with_capacity(out.len());
        for (s, e) in out {
            match merged.last_mut() {
                Some(last) if s <= last.1 => last.1 = last.1.max(e),
                _ => merged.push((s, e)),
            }
        }
        merged
    }
}
