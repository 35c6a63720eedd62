//! Production charts and trend cards.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::{try_join, try_join3, try_join_all};
use serde::Serialize;

use domain::models::{ProductionCard, ProductionPeriod, TimeSeriesSample};
use domain::services::{build, trailing_days, variance, TimeSeriesGrid};

use crate::config::DashboardConfig;
use crate::error::ClientResult;
use crate::remote::FarmApi;

/// Periods that get a card, each compared with [`ProductionPeriod::previous`].
const CARD_PERIODS: [ProductionPeriod; 2] = [ProductionPeriod::Today, ProductionPeriod::Last7Days];

/// Everything the dashboard page shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub cards: Vec<ProductionCard>,
    pub by_group: TimeSeriesGrid,
    pub total: TimeSeriesGrid,
}

pub struct DashboardService {
    api: Arc<dyn FarmApi>,
    trailing_days: u32,
}

impl DashboardService {
    pub fn new(api: Arc<dyn FarmApi>, config: &DashboardConfig) -> Self {
        Self {
            api,
            trailing_days: config.trailing_days,
        }
    }

    /// Daily production per group over the `days` days ending at `today`.
    ///
    /// Every day of the window is a row; groups without production on a day
    /// read zero. Only groups with at least one record become columns.
    pub async fn production_by_group(
        &self,
        today: NaiveDate,
        days: u32,
    ) -> ClientResult<TimeSeriesGrid> {
        let range = trailing_days(today, days);
        let Some(&from) = range.first() else {
            return Ok(TimeSeriesGrid::default());
        };

        let totals = self.api.daily_group_totals(from, today).await?;
        let samples: Vec<TimeSeriesSample> = totals.into_iter().map(Into::into).collect();
        Ok(build(&samples, Some(range.as_slice())))
    }

    /// Farm-wide daily production over the `days` days ending at `today`,
    /// as a single `total` column.
    pub async fn production_total(
        &self,
        today: NaiveDate,
        days: u32,
    ) -> ClientResult<TimeSeriesGrid> {
        let range = trailing_days(today, days);
        let Some(&from) = range.first() else {
            return Ok(TimeSeriesGrid::default());
        };

        let totals = self.api.daily_totals(from, today).await?;
        let samples: Vec<TimeSeriesSample> = totals.into_iter().map(Into::into).collect();
        Ok(build(&samples, Some(range.as_slice())))
    }

    /// Last 24 hours against the day before, and the last 7 days against
    /// the week before.
    pub async fn production_cards(&self) -> ClientResult<Vec<ProductionCard>> {
        let cards = CARD_PERIODS.iter().filter_map(|&period| {
            let previous = period.previous()?;
            Some(async move {
                let (volume, previous_volume) = try_join(
                    self.api.period_total(period),
                    self.api.period_total(previous),
                )
                .await?;
                Ok::<_, crate::error::ClientError>(ProductionCard {
                    period,
                    volume,
                    previous_volume,
                    variance: variance(volume, previous_volume),
                })
            })
        });
        try_join_all(cards).await
    }

    /// Cards and both charts over the configured window.
    pub async fn overview(&self, today: NaiveDate) -> ClientResult<DashboardOverview> {
        let (cards, by_group, total) = try_join3(
            self.production_cards(),
            self.production_by_group(today, self.trailing_days),
            self.production_total(today, self.trailing_days),
        )
        .await?;

        tracing::debug!(
            days = self.trailing_days,
            groups = by_group.series_keys().len(),
            "Dashboard overview loaded"
        );

        Ok(DashboardOverview {
            cards,
            by_group,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MockFarmApi;
    use domain::models::{DailyGroupTotal, DailyTotal, GroupId, TOTAL_SERIES_KEY};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn service(api: MockFarmApi) -> DashboardService {
        DashboardService::new(Arc::new(api), &DashboardConfig { trailing_days: 7 })
    }

    fn group_total(d: u32, id: i64, name: &str, volume: f64) -> DailyGroupTotal {
        DailyGroupTotal {
            date: day(d),
            group_id: Some(GroupId(id)),
            group_name: name.to_string(),
            total_volume: volume,
        }
    }

    #[tokio::test]
    async fn test_production_by_group_is_dense_over_window() {
        let dashboard = service(MockFarmApi::new().with_daily_group_totals([
            group_total(2, 1, "Lactating", 5.0),
            group_total(4, 2, "Dry", 1.0),
            group_total(4, 1, "Lactating", 6.0),
        ]));

        let grid = dashboard.production_by_group(day(7), 7).await.unwrap();

        assert_eq!(grid.len(), 7);
        assert_eq!(grid.dates().first(), Some(&day(1)));
        assert_eq!(
            grid.column("Lactating"),
            Some(vec![0.0, 5.0, 0.0, 6.0, 0.0, 0.0, 0.0])
        );
        assert_eq!(
            grid.column("Dry"),
            Some(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0])
        );
    }

    #[tokio::test]
    async fn test_production_total_single_column() {
        let dashboard = service(MockFarmApi::new().with_daily_totals([
            DailyTotal {
                date: day(6),
                total_volume: 10.0,
            },
            DailyTotal {
                date: day(7),
                total_volume: 12.5,
            },
        ]));

        let grid = dashboard.production_total(day(7), 3).await.unwrap();

        assert_eq!(grid.series_keys(), &[TOTAL_SERIES_KEY.to_string()]);
        assert_eq!(grid.column(TOTAL_SERIES_KEY), Some(vec![0.0, 10.0, 12.5]));
    }

    #[tokio::test]
    async fn test_zero_day_window_sends_nothing() {
        let api = Arc::new(MockFarmApi::new());
        let dashboard = DashboardService::new(api.clone(), &DashboardConfig::default());

        assert!(dashboard.production_total(day(7), 0).await.unwrap().is_empty());
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_production_cards() {
        let dashboard = service(
            MockFarmApi::new()
                .with_period_total(ProductionPeriod::Today, 15.0)
                .with_period_total(ProductionPeriod::Yesterday, 10.0)
                .with_period_total(ProductionPeriod::Last7Days, 70.0),
        );

        let cards = dashboard.production_cards().await.unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].period, ProductionPeriod::Today);
        assert_eq!(cards[0].variance, "+50.0%");
        assert_eq!(cards[1].period, ProductionPeriod::Last7Days);
        assert_eq!(cards[1].previous_volume, 0.0);
        assert_eq!(cards[1].variance, "+100%");
    }

    #[tokio::test]
    async fn test_cards_fail_when_a_total_fails() {
        let dashboard = service(MockFarmApi::new().fail_request("period_total"));
        assert!(dashboard.production_cards().await.is_err());
    }
}
