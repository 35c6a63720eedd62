//! Percentage change formatting for production trend cards.

use serde::Serialize;

/// Variance reported when the previous window produced nothing.
pub const ZERO_BASELINE_VARIANCE: &str = "+100%";

/// Formats the change from `previous` to `current` as a signed percentage.
///
/// A zero baseline always yields `"+100%"`. Otherwise the change is rendered
/// with one decimal place and a leading `+` for non-negative values.
pub fn variance(current: f64, previous: f64) -> String {
    if previous == 0.0 {
        return ZERO_BASELINE_VARIANCE.to_string();
    }

    let percent = (current - previous) / previous * 100.0;
    if percent >= 0.0 {
        format!("+{:.1}%", percent.abs())
    } else {
        format!("{:.1}%", percent)
    }
}

/// Direction of a formatted variance, used to style trend cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceDirection {
    Up,
    Down,
}

impl VarianceDirection {
    pub fn of(formatted: &str) -> Self {
        if formatted.starts_with('+') {
            VarianceDirection::Up
        } else {
            VarianceDirection::Down
        }
    }
}
