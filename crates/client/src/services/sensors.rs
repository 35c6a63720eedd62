//! Environment sensor monitoring.

use serde::Serialize;

use domain::models::sensor::SensorRequest;
use domain::models::Sensor;

use super::batch_mutation::{BatchMutationExecutor, RemoteMutation};
use crate::error::ClientResult;
use crate::store::FarmStore;

/// A sensor with its alert state, as shown on the monitoring page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorCard {
    pub sensor: Sensor,
    pub alert: bool,
}

/// Result of a sensor write that the server accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorWrite<T> {
    pub value: T,
    /// False when the sensor list could not be refetched afterwards; the
    /// store still holds the list from before the write.
    pub refreshed: bool,
}

impl<T> SensorWrite<T> {
    pub fn is_stale(&self) -> bool {
        !self.refreshed
    }
}

pub struct SensorService {
    executor: BatchMutationExecutor,
}

impl SensorService {
    pub fn new(executor: BatchMutationExecutor) -> Self {
        Self { executor }
    }

    /// Cards for every cached sensor, in id order.
    pub fn cards(store: &FarmStore) -> Vec<SensorCard> {
        store
            .sensors()
            .iter()
            .map(|sensor| SensorCard {
                alert: sensor.is_alert(),
                sensor: sensor.clone(),
            })
            .collect()
    }

    pub fn alert_count(store: &FarmStore) -> usize {
        store.sensors().iter().filter(|s| s.is_alert()).count()
    }

    /// Creates a sensor, or updates `sensor_id` when given, then refetches
    /// the sensor list.
    pub async fn save(
        &self,
        store: &mut FarmStore,
        sensor_id: Option<i64>,
        request: SensorRequest,
    ) -> ClientResult<SensorWrite<Sensor>> {
        let mutation = match sensor_id {
            Some(sensor_id) => RemoteMutation::UpdateSensor { sensor_id, request },
            None => RemoteMutation::CreateSensor(request),
        };
        let sensor = self.executor.apply_one(mutation).await?.into_sensor()?;
        Ok(SensorWrite {
            value: sensor,
            refreshed: self.refresh(store).await,
        })
    }

    pub async fn delete(
        &self,
        store: &mut FarmStore,
        sensor_id: i64,
    ) -> ClientResult<SensorWrite<()>> {
        self.executor
            .apply_one(RemoteMutation::DeleteSensor(sensor_id))
            .await?;
        Ok(SensorWrite {
            value: (),
            refreshed: self.refresh(store).await,
        })
    }

    /// Refetches the sensor list; returns whether it succeeded.
    async fn refresh(&self, store: &mut FarmStore) -> bool {
        match store.refresh_sensors(self.executor.api()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Refetch of sensors failed; store is stale");
                false
            }
        }
    }
}
