//! Milk production domain models.
//!
//! Production aggregates arrive sparse: a day or group without records is
//! simply absent from the server response.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::group::GroupId;

/// Series key used for the farm-wide total, which has no group.
pub const TOTAL_SERIES_KEY: &str = "total";

/// One point of a sparse time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimeSeriesSample {
    pub date: NaiveDate,
    pub series_key: String,
    pub value: f64,
}

impl TimeSeriesSample {
    pub fn new(date: NaiveDate, series_key: impl Into<String>, value: f64) -> Self {
        Self {
            date,
            series_key: series_key.into(),
            value,
        }
    }
}

/// Farm-wide production for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_volume: f64,
}

impl From<DailyTotal> for TimeSeriesSample {
    fn from(total: DailyTotal) -> Self {
        TimeSeriesSample::new(total.date, TOTAL_SERIES_KEY, total.total_volume)
    }
}

/// Production of one group for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DailyGroupTotal {
    pub date: NaiveDate,
    pub group_id: Option<GroupId>,
    pub group_name: String,
    pub total_volume: f64,
}

impl From<DailyGroupTotal> for TimeSeriesSample {
    fn from(total: DailyGroupTotal) -> Self {
        TimeSeriesSample::new(total.date, total.group_name, total.total_volume)
    }
}

/// Production of one group over a whole period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupVolume {
    pub group_id: Option<GroupId>,
    pub group_name: String,
    pub total_volume: f64,
}

/// Aggregation windows the server exposes totals for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionPeriod {
    Today,
    Yesterday,
    Last7Days,
    WeekBefore,
}

impl ProductionPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionPeriod::Today => "today",
            ProductionPeriod::Yesterday => "yesterday",
            ProductionPeriod::Last7Days => "last_7_days",
            ProductionPeriod::WeekBefore => "week_before",
        }
    }

    /// The window a card compares this period against, if any.
    pub fn previous(&self) -> Option<ProductionPeriod> {
        match self {
            ProductionPeriod::Today => Some(ProductionPeriod::Yesterday),
            ProductionPeriod::Last7Days => Some(ProductionPeriod::WeekBefore),
            ProductionPeriod::Yesterday | ProductionPeriod::WeekBefore => None,
        }
    }
}

impl fmt::Display for ProductionPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A production summary card: current volume and its change against the
/// previous window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProductionCard {
    pub period: ProductionPeriod,
    pub volume: f64,
    pub previous_volume: f64,
    pub variance: String,
}

/// Request payload recording one animal's milk yield for a day.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct MilkYieldRequest {
    pub date: NaiveDate,

    #[validate(range(min = 0.0, message = "Volume must be non-negative"))]
    pub volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_daily_total_into_sample() {
        let sample: TimeSeriesSample = DailyTotal {
            date: date(1),
            total_volume: 12.5,
        }
        .into();
        assert_eq!(sample.series_key, TOTAL_SERIES_KEY);
        assert_eq!(sample.value, 12.5);
    }

    #[test]
    fn test_group_total_into_sample_uses_name() {
        let sample: TimeSeriesSample = DailyGroupTotal {
            date: date(2),
            group_id: Some(GroupId(3)),
            group_name: "Group A".to_string(),
            total_volume: 7.0,
        }
        .into();
        assert_eq!(sample.series_key, "Group A");
        assert_eq!(sample.date, date(2));
    }

    #[test]
    fn test_period_previous() {
        assert_eq!(
            ProductionPeriod::Today.previous(),
            Some(ProductionPeriod::Yesterday)
        );
        assert_eq!(
            ProductionPeriod::Last7Days.previous(),
            Some(ProductionPeriod::WeekBefore)
        );
        assert_eq!(ProductionPeriod::WeekBefore.previous(), None);
    }

    #[test]
    fn test_milk_yield_validation() {
        let ok = MilkYieldRequest {
            date: date(1),
            volume: 2.4,
        };
        assert!(ok.validate().is_ok());

        let negative = MilkYieldRequest {
            date: date(1),
            volume: -1.0,
        };
        assert!(negative.validate().is_err());
    }
}
