// File: crates/chart-core/src/axis.rs
// Summary: Y-axis bound configuration and the resolved per-side axis scale.

use serde::{Deserialize, Serialize};

use crate::units::{allows_power, convert_units, ConvertOptions};

/// How one Y-axis bound is obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum YAxisBound {
    /// Derived from the plotted data.
    #[default]
    Calculated,
    Fixed { value: f64 },
    /// Most recent value of a reference item; `None` when the item is gone.
    Item {
        item_id: u64,
        #[serde(default)]
        last_value: Option<f64>,
    },
}

impl YAxisBound {
    pub const fn is_calculated(&self) -> bool {
        matches!(self, YAxisBound::Calculated)
    }
}

/// Resolved scale of one side. Contract: `min < max`, `rows >= 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
    /// Value distance between two grid rows.
    pub interval: f64,
    /// Exponent of the unit prefix (K = 1, M = 2, ...).
    pub power: u32,
    /// Steps in powers of 1024 instead of 1000.
    pub binary: bool,
    /// Number of grid rows.
    pub rows: u32,
}

impl AxisScale {
    pub fn base(&self) -> f64 {
        if self.binary { 1024.0 } else { 1000.0 }
    }

    /// Grid values from `min` to `max` inclusive.
    pub fn values(&self) -> Vec<f64> {
        let mut out: Vec<f64> = (0..self.rows).map(|k| (self.min + k as f64 * self.interval).min(self.max)).collect();
        out.push(self.max);
        out
    }

    /// Decimal places needed to tell neighbouring grid values apart.
    fn label_decimals(&self) -> i32 {
        let step = self.interval / self.base().powi(self.power as i32);
        if step >= 1.0 || step <= 0.0 {
            0
        } else {
            (-step.log10()).ceil() as i32
        }
    }

    /// Axis label for `value` in `units`, sharing one prefix across the axis.
    pub fn label(&self, value: f64, units: &str) -> String {
        let power = if allows_power(units) { Some(self.power) } else { None };
        let opts = ConvertOptions { power, decimals: Some(self.label_decimals()), ..ConvertOptions::default() };
        convert_units(value, units, opts).to_string()
    }
}
