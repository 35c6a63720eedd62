//! Inventory, veterinary appointments and milk yield records.

use chrono::{DateTime, Utc};

use domain::models::appointment::{
    partition_by_date, CreateAppointmentRequest, UpdateAppointmentRequest,
};
use domain::models::inventory::InventoryItemRequest;
use domain::models::production::MilkYieldRequest;
use domain::models::{AnimalId, Appointment, InventoryItem};

use super::batch_mutation::{BatchMutationExecutor, RemoteMutation};
use crate::error::ClientResult;

/// Appointments split around a point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentSchedule {
    /// Soonest first.
    pub upcoming: Vec<Appointment>,
    /// Most recent first.
    pub past: Vec<Appointment>,
}

pub struct RecordService {
    executor: BatchMutationExecutor,
}

impl RecordService {
    pub fn new(executor: BatchMutationExecutor) -> Self {
        Self { executor }
    }

    // ===== Inventory =====

    /// Inventory items sorted by name.
    pub async fn inventory(&self) -> ClientResult<Vec<InventoryItem>> {
        let mut items = self.executor.api().list_inventory().await?;
        items.sort_by(|a, b| a.item_name.to_lowercase().cmp(&b.item_name.to_lowercase()));
        Ok(items)
    }

    /// Creates an item, or updates `item_id` when given.
    pub async fn save_inventory_item(
        &self,
        item_id: Option<i64>,
        request: InventoryItemRequest,
    ) -> ClientResult<InventoryItem> {
        let mutation = match item_id {
            Some(item_id) => RemoteMutation::UpdateInventoryItem { item_id, request },
            None => RemoteMutation::CreateInventoryItem(request),
        };
        self.executor.apply_one(mutation).await?.into_inventory_item()
    }

    pub async fn delete_inventory_item(&self, item_id: i64) -> ClientResult<()> {
        self.executor
            .apply_one(RemoteMutation::DeleteInventoryItem(item_id))
            .await
            .map(|_| ())
    }

    // ===== Appointments =====

    pub async fn appointments(&self, now: DateTime<Utc>) -> ClientResult<AppointmentSchedule> {
        let appointments = self.executor.api().list_appointments().await?;
        let (upcoming, past) = partition_by_date(appointments, now);
        Ok(AppointmentSchedule { upcoming, past })
    }

    /// Past appointments of one animal, most recent first.
    pub async fn history(
        &self,
        animal_id: AnimalId,
        now: DateTime<Utc>,
    ) -> ClientResult<Vec<Appointment>> {
        let schedule = self.appointments(now).await?;
        Ok(schedule
            .past
            .into_iter()
            .filter(|a| a.sheep_id == animal_id)
            .collect())
    }

    pub async fn schedule_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> ClientResult<Appointment> {
        self.executor
            .apply_one(RemoteMutation::CreateAppointment(request))
            .await?
            .into_appointment()
    }

    pub async fn update_appointment(
        &self,
        appointment_id: i64,
        request: UpdateAppointmentRequest,
    ) -> ClientResult<Appointment> {
        self.executor
            .apply_one(RemoteMutation::UpdateAppointment {
                appointment_id,
                request,
            })
            .await?
            .into_appointment()
    }

    // ===== Milk yield =====

    pub async fn record_milk_yield(
        &self,
        animal_id: AnimalId,
        request: MilkYieldRequest,
    ) -> ClientResult<()> {
        self.executor
            .apply_one(RemoteMutation::RecordMilkYield { animal_id, request })
            .await
            .map(|_| ())
    }
}
