//! Dense time-series grids for charting.
//!
//! Production endpoints return sparse `(date, series, value)` records: a day
//! or group without production is simply missing. Charts need every series
//! present on every x-axis point, so the builder expands the samples into a
//! grid where each row holds a value for every series key observed anywhere
//! in the input. Missing combinations are filled with zero, because the
//! absence of a production record means nothing was produced.

use chrono::{Days, NaiveDate};
use serde::ser::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

use shared::dates::format_day_month;

use crate::models::production::TimeSeriesSample;

/// One x-axis point of a grid.
///
/// Serializes flat, e.g. `{"date": "2025-06-01", "Group A": 5.0, "Group B": 0.0}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TimeSeriesRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl TimeSeriesRow {
    pub fn value(&self, series_key: &str) -> Option<f64> {
        self.values.get(series_key).copied()
    }
}

/// Rows sorted by ascending date, all sharing the same key set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesGrid {
    series_keys: Vec<String>,
    rows: Vec<TimeSeriesRow>,
}

impl TimeSeriesGrid {
    pub fn rows(&self) -> &[TimeSeriesRow] {
        &self.rows
    }

    /// Series keys in sorted order.
    pub fn series_keys(&self) -> &[String] {
        &self.series_keys
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|row| row.date).collect()
    }

    /// X-axis labels (`dd-mm`), one per row.
    pub fn axis_labels(&self) -> Vec<String> {
        self.rows.iter().map(|row| format_day_month(row.date)).collect()
    }

    /// Values of one series in date order, or `None` for an unknown key.
    pub fn column(&self, series_key: &str) -> Option<Vec<f64>> {
        if !self.series_keys.iter().any(|key| key == series_key) {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.value(series_key).unwrap_or(0.0))
                .collect(),
        )
    }

    /// Sum of each series over the whole grid.
    pub fn totals(&self) -> BTreeMap<String, f64> {
        let mut totals: BTreeMap<String, f64> = self
            .series_keys
            .iter()
            .map(|key| (key.clone(), 0.0))
            .collect();
        for row in &self.rows {
            for (key, value) in &row.values {
                *totals.entry(key.clone()).or_insert(0.0) += value;
            }
        }
        totals
    }
}

impl Serialize for TimeSeriesGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.rows)
    }
}

/// Builds a dense grid from sparse samples.
///
/// The key set is exactly the set of keys present in `samples`; keys are
/// never synthesized. The date axis is `date_range` when given (sorted
/// ascending, one row per entry), otherwise the distinct sample dates.
/// Samples sharing a date and key are summed.
pub fn build(samples: &[TimeSeriesSample], date_range: Option<&[NaiveDate]>) -> TimeSeriesGrid {
    let series_keys: BTreeSet<&str> = samples.iter().map(|s| s.series_key.as_str()).collect();

    let mut observed: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();
    for sample in samples {
        *observed
            .entry((sample.date, sample.series_key.as_str()))
            .or_insert(0.0) += sample.value;
    }

    let dates: Vec<NaiveDate> = match date_range {
        Some(range) => {
            let mut dates = range.to_vec();
            dates.sort();
            dates
        }
        None => samples
            .iter()
            .map(|s| s.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    };

    let rows: Vec<TimeSeriesRow> = dates
        .into_iter()
        .map(|date| TimeSeriesRow {
            date,
            values: series_keys
                .iter()
                .map(|key| {
                    let value = observed.get(&(date, *key)).copied().unwrap_or(0.0);
                    (key.to_string(), value)
                })
                .collect(),
        })
        .collect();

    tracing::debug!(
        samples = samples.len(),
        series = series_keys.len(),
        rows = rows.len(),
        "Built time-series grid"
    );

    TimeSeriesGrid {
        series_keys: series_keys.into_iter().map(String::from).collect(),
        rows,
    }
}

/// The `days` calendar days ending at `today`, oldest first.
pub fn trailing_days(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..u64::from(days))
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .collect()
}
