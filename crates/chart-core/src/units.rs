// File: crates/chart-core/src/units.rs
// Summary: Time-unit parsing and value-with-unit formatting for axis labels and legends.

use chrono::{TimeZone, Utc};

const POWER_PREFIXES: [&str; 9] = ["", "K", "M", "G", "T", "P", "E", "Z", "Y"];

/// Decimals kept when no metric prefix is applied.
pub const ROUNDOFF_UNSUFFIXED: i32 = 4;
/// Decimals kept after a metric prefix.
pub const ROUNDOFF_SUFFIXED: i32 = 2;

/// Significant digits an f64 holds reliably.
const FLOAT_DIG: i32 = 15;

pub const SEC_PER_MIN: i64 = 60;
pub const SEC_PER_HOUR: i64 = 3600;
pub const SEC_PER_DAY: i64 = 86_400;
pub const SEC_PER_WEEK: i64 = 7 * SEC_PER_DAY;
pub const SEC_PER_MONTH: i64 = 30 * SEC_PER_DAY;
pub const SEC_PER_YEAR: i64 = 365 * SEC_PER_DAY;

/// Parse `"<int>[smhdw]"` into seconds; plain integers are seconds.
pub fn parse_time_unit(input: &str) -> Option<i64> {
    let s = input.trim();
    let (digits, multiplier) = match s.chars().last()? {
        's' => (&s[..s.len() - 1], 1),
        'm' => (&s[..s.len() - 1], SEC_PER_MIN),
        'h' => (&s[..s.len() - 1], SEC_PER_HOUR),
        'd' => (&s[..s.len() - 1], SEC_PER_DAY),
        'w' => (&s[..s.len() - 1], SEC_PER_WEEK),
        c if c.is_ascii_digit() => (s, 1),
        _ => return None,
    };
    let unsigned = digits.strip_prefix('-').unwrap_or(digits);
    if unsigned.is_empty() || !unsigned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok()?.checked_mul(multiplier)
}

/// Units that step in powers of 1024.
pub fn is_binary_unit(units: &str) -> bool {
    matches!(units, "B" | "Bps")
}

/// Base used for metric prefixes of `units`.
pub fn unit_base(units: &str) -> f64 {
    if is_binary_unit(units) { 1024.0 } else { 1000.0 }
}

/// Whether `units` may receive K/M/G prefixes.
pub fn allows_power(units: &str) -> bool {
    !units.is_empty()
        && !units.starts_with('!')
        && !matches!(units, "%" | "ms" | "rpm" | "RPM" | "s" | "uptime" | "unixtime")
}

/// Knobs for [`convert_units`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConvertOptions {
    /// Force this prefix power instead of picking the smallest that fits.
    pub power: Option<u32>,
    /// Decimal places; defaults to 4 without prefix and 2 with one.
    pub decimals: Option<i32>,
    /// Drop milliseconds in `s` formatting.
    pub ignore_millis: bool,
}

/// Value and unit string, kept apart so callers can align them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Converted {
    pub value: String,
    pub units: String,
}

impl std::fmt::Display for Converted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.units.is_empty() {
            f.write_str(&self.value)
        } else {
            write!(f, "{} {}", self.value, self.units)
        }
    }
}

/// Format `value` with `units` the way the monitoring frontend shows it.
pub fn convert_units(value: f64, units: &str, opts: ConvertOptions) -> Converted {
    match units {
        "unixtime" => {
            let text = Utc
                .timestamp_opt(value as i64, 0)
                .single()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| format_float(value, ROUNDOFF_UNSUFFIXED));
            return Converted { value: text, units: String::new() };
        }
        "uptime" => return Converted { value: format_uptime(value), units: String::new() },
        "s" => return Converted { value: format_seconds(value, opts.ignore_millis), units: String::new() },
        _ => {}
    }

    let (units, forced_plain) = match units.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (units, false),
    };

    let plain = forced_plain || !allows_power(units) || value.abs() < 1.0;
    if plain {
        let decimals = opts.decimals.unwrap_or(ROUNDOFF_UNSUFFIXED);
        return Converted { value: format_float(value, decimals), units: units.to_string() };
    }

    let base = unit_base(units);
    let (text, prefix) = match opts.power {
        Some(power) => {
            let power = if value == 0.0 { 0 } else { power.min(8) };
            let prefix = POWER_PREFIXES[power as usize];
            let decimals = opts.decimals.unwrap_or(if prefix.is_empty() { ROUNDOFF_UNSUFFIXED } else { ROUNDOFF_SUFFIXED });
            (format_float(value / base.powi(power as i32), decimals), prefix)
        }
        None => {
            let mut picked = (String::new(), "");
            for (power, prefix) in POWER_PREFIXES.iter().enumerate() {
                let decimals = opts.decimals.unwrap_or(if prefix.is_empty() { ROUNDOFF_UNSUFFIXED } else { ROUNDOFF_SUFFIXED });
                let scaled = value / base.powi(power as i32);
                picked = (format_float(scaled, decimals), prefix);
                if round_to(scaled, decimals).abs() < base {
                    break;
                }
            }
            picked
        }
    };

    let prefix = if text == "0" { "" } else { prefix };
    Converted { value: text, units: format!("{prefix}{units}") }
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let m = 10f64.powi(decimals);
    (v * m).round() / m
}

/// Round to `decimals` places (significant places for |v| < 1), trimming trailing zeros.
pub fn format_float(v: f64, decimals: i32) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() };
    }
    if v.is_nan() {
        return "NaN".to_string();
    }

    let exponent = v.abs().log10().floor() as i32;
    if exponent >= FLOAT_DIG {
        return format!("{:.*E}", decimals.max(0) as usize, v);
    }

    let places = if exponent < 0 {
        (decimals - exponent - 1).max(0)
    } else {
        decimals.min(FLOAT_DIG - exponent - 1).max(0)
    };
    let rounded = round_to(v, places);
    if rounded == 0.0 {
        return "0".to_string();
    }
    let mut s = format!("{:.*}", places as usize, rounded);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" { "0".to_string() } else { s }
}

/// `"N days, HH:MM:SS"`.
pub fn format_uptime(value: f64) -> String {
    let v = value.round() as i64;
    let mut abs = v.abs();
    let days = abs / SEC_PER_DAY;
    abs -= days * SEC_PER_DAY;
    let (h, m, s) = (abs / SEC_PER_HOUR, (abs % SEC_PER_HOUR) / SEC_PER_MIN, abs % SEC_PER_MIN);

    let mut out = String::new();
    if v < 0 {
        out.push('-');
    }
    match days {
        0 => {}
        1 => out.push_str("1 day, "),
        n => out.push_str(&format!("{n} days, ")),
    }
    out.push_str(&format!("{h:02}:{m:02}:{s:02}"));
    out
}

/// Up to three most significant parts of a duration, e.g. `"1d 2h 3m"`.
pub fn format_seconds(value: f64, ignore_millis: bool) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let abs = value.abs();
    let mut rest = abs.floor() as i64;
    let millis = ((abs - abs.floor()) * 1000.0).round() as i64;

    let table = [
        (SEC_PER_YEAR, "y"),
        (SEC_PER_MONTH, "m"),
        (SEC_PER_DAY, "d"),
        (SEC_PER_HOUR, "h"),
        (SEC_PER_MIN, "m"),
        (1, "s"),
    ];

    let mut parts: Vec<String> = Vec::new();
    let mut started_at: Option<usize> = None;
    for (level, (secs, suffix)) in table.iter().enumerate() {
        if let Some(start) = started_at {
            if level - start >= 3 {
                break;
            }
        }
        let n = rest / secs;
        if n > 0 {
            parts.push(format!("{n}{suffix}"));
            rest -= n * secs;
            started_at.get_or_insert(level);
        }
    }

    let within_seconds = started_at.map_or(true, |s| s >= table.len() - 2);
    if !ignore_millis && millis > 0 && within_seconds {
        parts.push(format!("{millis}ms"));
    }

    let body = if parts.is_empty() { "0".to_string() } else { parts.join(" ") };
    if value < 0.0 { format!("-{body}") } else { body }
}
