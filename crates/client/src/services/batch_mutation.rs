//! Concurrent fan-out of remote writes.
//!
//! Every operation of a batch is dispatched at once and the executor waits
//! for all of them before reporting. There is no server-side transaction: a
//! failed operation is reported, never retried or compensated, so after a
//! partial failure the remote state matches neither the old nor the new
//! snapshot and the caller must refetch.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use uuid::Uuid;
use validator::Validate;

use domain::models::appointment::{CreateAppointmentRequest, UpdateAppointmentRequest};
use domain::models::inventory::InventoryItemRequest;
use domain::models::production::MilkYieldRequest;
use domain::models::sensor::SensorRequest;
use domain::models::{
    AnimalId, Appointment, GroupId, InventoryItem, MembershipOperation, Sensor,
};

use crate::error::{ClientError, ClientResult, DecodeError};
use crate::metrics::record_batch;
use crate::remote::FarmApi;

/// Aggregated outcome of one batch.
#[derive(Debug)]
pub struct BatchResult<Op> {
    /// Correlates the batch's log events.
    pub batch_id: Uuid,
    pub succeeded: usize,
    /// Failed operations with their errors, in submission order.
    pub failures: Vec<(Op, ClientError)>,
}

impl<Op> BatchResult<Op> {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    pub fn failed_operations(&self) -> impl Iterator<Item = &Op> {
        self.failures.iter().map(|(op, _)| op)
    }
}

/// A single create, update or delete against the backend.
#[derive(Debug, Clone)]
pub enum RemoteMutation {
    ChangeAnimalGroup {
        animal_id: AnimalId,
        group_id: Option<GroupId>,
    },
    RecordMilkYield {
        animal_id: AnimalId,
        request: MilkYieldRequest,
    },
    CreateSensor(SensorRequest),
    UpdateSensor {
        sensor_id: i64,
        request: SensorRequest,
    },
    DeleteSensor(i64),
    CreateInventoryItem(InventoryItemRequest),
    UpdateInventoryItem {
        item_id: i64,
        request: InventoryItemRequest,
    },
    DeleteInventoryItem(i64),
    CreateAppointment(CreateAppointmentRequest),
    UpdateAppointment {
        appointment_id: i64,
        request: UpdateAppointmentRequest,
    },
}

impl RemoteMutation {
    pub fn name(&self) -> &'static str {
        match self {
            RemoteMutation::ChangeAnimalGroup { .. } => "change_animal_group",
            RemoteMutation::RecordMilkYield { .. } => "record_milk_yield",
            RemoteMutation::CreateSensor(_) => "create_sensor",
            RemoteMutation::UpdateSensor { .. } => "update_sensor",
            RemoteMutation::DeleteSensor(_) => "delete_sensor",
            RemoteMutation::CreateInventoryItem(_) => "create_inventory_item",
            RemoteMutation::UpdateInventoryItem { .. } => "update_inventory_item",
            RemoteMutation::DeleteInventoryItem(_) => "delete_inventory_item",
            RemoteMutation::CreateAppointment(_) => "create_appointment",
            RemoteMutation::UpdateAppointment { .. } => "update_appointment",
        }
    }

    /// Checks the request payload before anything is sent.
    pub fn validate(&self) -> ClientResult<()> {
        match self {
            RemoteMutation::RecordMilkYield { request, .. } => request.validate()?,
            RemoteMutation::CreateSensor(request)
            | RemoteMutation::UpdateSensor { request, .. } => request.check()?,
            RemoteMutation::CreateInventoryItem(request)
            | RemoteMutation::UpdateInventoryItem { request, .. } => request.validate()?,
            RemoteMutation::CreateAppointment(request) => request.validate()?,
            RemoteMutation::UpdateAppointment { request, .. } => request.validate()?,
            RemoteMutation::ChangeAnimalGroup { .. }
            | RemoteMutation::DeleteSensor(_)
            | RemoteMutation::DeleteInventoryItem(_) => {}
        }
        Ok(())
    }
}

/// What the server returned for a successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Done,
    Sensor(Sensor),
    InventoryItem(InventoryItem),
    Appointment(Appointment),
}

impl MutationOutcome {
    pub fn into_sensor(self) -> ClientResult<Sensor> {
        match self {
            MutationOutcome::Sensor(sensor) => Ok(sensor),
            other => Err(unexpected("sensor", &other)),
        }
    }

    pub fn into_inventory_item(self) -> ClientResult<InventoryItem> {
        match self {
            MutationOutcome::InventoryItem(item) => Ok(item),
            other => Err(unexpected("inventory item", &other)),
        }
    }

    pub fn into_appointment(self) -> ClientResult<Appointment> {
        match self {
            MutationOutcome::Appointment(appointment) => Ok(appointment),
            other => Err(unexpected("appointment", &other)),
        }
    }
}

fn unexpected(expected: &str, outcome: &MutationOutcome) -> ClientError {
    ClientError::Decode(DecodeError::Shape(format!(
        "expected {} in response, got {:?}",
        expected, outcome
    )))
}

/// Dispatches remote writes and aggregates their results.
#[derive(Clone)]
pub struct BatchMutationExecutor {
    api: Arc<dyn FarmApi>,
}

impl BatchMutationExecutor {
    pub fn new(api: Arc<dyn FarmApi>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &dyn FarmApi {
        self.api.as_ref()
    }

    /// Applies membership operations for `group_id` concurrently.
    ///
    /// Each operation becomes one group change: `Add` moves the animal into
    /// `group_id`, `Remove` clears its group. Returns once every request has
    /// completed. An empty batch sends nothing.
    pub async fn apply(
        &self,
        group_id: GroupId,
        operations: &[MembershipOperation],
    ) -> BatchResult<MembershipOperation> {
        let batch_id = Uuid::new_v4();
        if operations.is_empty() {
            return BatchResult {
                batch_id,
                succeeded: 0,
                failures: Vec::new(),
            };
        }

        let start = Instant::now();
        let requests = operations.iter().map(|op| async move {
            let result = self
                .api
                .change_animal_group(op.animal_id(), op.target_group(group_id))
                .await;
            (*op, result)
        });
        let results = join_all(requests).await;

        let mut succeeded = 0;
        let mut failures = Vec::new();
        for (op, result) in results {
            match result {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    tracing::warn!(
                        batch_id = %batch_id,
                        group_id = %group_id,
                        animal_id = %op.animal_id(),
                        operation = %op,
                        error = %e,
                        "Membership change failed"
                    );
                    failures.push((op, e));
                }
            }
        }

        let duration = start.elapsed().as_secs_f64();
        record_batch("membership", operations.len(), failures.len(), duration);
        tracing::info!(
            batch_id = %batch_id,
            group_id = %group_id,
            operations = operations.len(),
            succeeded = succeeded,
            failed = failures.len(),
            duration_ms = (duration * 1000.0) as u64,
            "Membership batch completed"
        );

        BatchResult {
            batch_id,
            succeeded,
            failures,
        }
    }

    /// Validates and sends a single mutation.
    ///
    /// Invalid payloads fail with [`ClientError::Validation`] without a
    /// request being made.
    pub async fn apply_one(&self, mutation: RemoteMutation) -> ClientResult<MutationOutcome> {
        mutation.validate()?;

        let batch_id = Uuid::new_v4();
        let operation = mutation.name();
        let start = Instant::now();
        let result = self.dispatch(mutation).await;
        let duration = start.elapsed().as_secs_f64();

        let failed = usize::from(result.is_err());
        record_batch(operation, 1, failed, duration);
        match &result {
            Ok(_) => tracing::info!(
                batch_id = %batch_id,
                operation = %operation,
                "Mutation applied"
            ),
            Err(e) => tracing::warn!(
                batch_id = %batch_id,
                operation = %operation,
                error = %e,
                "Mutation failed"
            ),
        }
        result
    }

    async fn dispatch(&self, mutation: RemoteMutation) -> ClientResult<MutationOutcome> {
        let api = self.api.as_ref();
        let outcome = match mutation {
            RemoteMutation::ChangeAnimalGroup {
                animal_id,
                group_id,
            } => {
                api.change_animal_group(animal_id, group_id).await?;
                MutationOutcome::Done
            }
            RemoteMutation::RecordMilkYield { animal_id, request } => {
                api.record_milk_yield(animal_id, &request).await?;
                MutationOutcome::Done
            }
            RemoteMutation::CreateSensor(request) => {
                MutationOutcome::Sensor(api.create_sensor(&request).await?)
            }
            RemoteMutation::UpdateSensor { sensor_id, request } => {
                MutationOutcome::Sensor(api.update_sensor(sensor_id, &request).await?)
            }
            RemoteMutation::DeleteSensor(sensor_id) => {
                api.delete_sensor(sensor_id).await?;
                MutationOutcome::Done
            }
            RemoteMutation::CreateInventoryItem(request) => {
                MutationOutcome::InventoryItem(api.create_inventory_item(&request).await?)
            }
            RemoteMutation::UpdateInventoryItem { item_id, request } => {
                MutationOutcome::InventoryItem(api.update_inventory_item(item_id, &request).await?)
            }
            RemoteMutation::DeleteInventoryItem(item_id) => {
                api.delete_inventory_item(item_id).await?;
                MutationOutcome::Done
            }
            RemoteMutation::CreateAppointment(request) => {
                MutationOutcome::Appointment(api.create_appointment(&request).await?)
            }
            RemoteMutation::UpdateAppointment {
                appointment_id,
                request,
            } => MutationOutcome::Appointment(
                api.update_appointment(appointment_id, &request).await?,
            ),
        };
        Ok(outcome)
    }
}
