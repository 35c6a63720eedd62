//! Remote farm backend.
//!
//! [`FarmApi`] is the seam between the client core and the server. The
//! production implementation is [`HttpFarmApi`]; [`MockFarmApi`] keeps the
//! whole farm in memory for tests and offline development.

pub mod http;
pub mod mock;
pub mod wire;

use chrono::NaiveDate;

use domain::models::appointment::{CreateAppointmentRequest, UpdateAppointmentRequest};
use domain::models::group::{CreateGroupRequest, UpdateGroupRequest};
use domain::models::inventory::InventoryItemRequest;
use domain::models::production::MilkYieldRequest;
use domain::models::sensor::SensorRequest;
use domain::models::{
    Animal, AnimalId, Appointment, DailyGroupTotal, DailyTotal, GroupId, GroupRecord,
    InventoryItem, ProductionPeriod, Sensor,
};

use crate::error::ClientResult;

pub use http::HttpFarmApi;
pub use mock::{MockFarmApi, MockRequest};

/// Operations the farm backend exposes to the client.
#[async_trait::async_trait]
pub trait FarmApi: Send + Sync {
    // ===== Animals & groups =====

    async fn list_animals(&self) -> ClientResult<Vec<Animal>>;

    async fn list_groups(&self) -> ClientResult<Vec<GroupRecord>>;

    /// Creates an empty group and returns the stored record.
    async fn create_group(&self, request: &CreateGroupRequest) -> ClientResult<GroupRecord>;

    /// Updates a group's own fields. Membership is not touched.
    async fn update_group(
        &self,
        group_id: GroupId,
        request: &UpdateGroupRequest,
    ) -> ClientResult<GroupRecord>;

    /// Moves one animal into `group_id`, or out of every group when `None`.
    async fn change_animal_group(
        &self,
        animal_id: AnimalId,
        group_id: Option<GroupId>,
    ) -> ClientResult<()>;

    async fn record_milk_yield(
        &self,
        animal_id: AnimalId,
        request: &MilkYieldRequest,
    ) -> ClientResult<()>;

    // ===== Sensors =====

    async fn list_sensors(&self) -> ClientResult<Vec<Sensor>>;

    async fn create_sensor(&self, request: &SensorRequest) -> ClientResult<Sensor>;

    async fn update_sensor(&self, sensor_id: i64, request: &SensorRequest)
        -> ClientResult<Sensor>;

    async fn delete_sensor(&self, sensor_id: i64) -> ClientResult<()>;

    // ===== Milk production =====

    /// Farm-wide production per day in `[from, to]`. Days without production
    /// may be absent.
    async fn daily_totals(&self, from: NaiveDate, to: NaiveDate)
        -> ClientResult<Vec<DailyTotal>>;

    /// Production per day and group in `[from, to]`, sparse like
    /// [`FarmApi::daily_totals`].
    async fn daily_group_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ClientResult<Vec<DailyGroupTotal>>;

    /// Total volume produced during `period`.
    async fn period_total(&self, period: ProductionPeriod) -> ClientResult<f64>;

    // ===== Appointments =====

    async fn list_appointments(&self) -> ClientResult<Vec<Appointment>>;

    async fn create_appointment(
        &self,
        request: &CreateAppointmentRequest,
    ) -> ClientResult<Appointment>;

    async fn update_appointment(
        &self,
        appointment_id: i64,
        request: &UpdateAppointmentRequest,
    ) -> ClientResult<Appointment>;

    // ===== Inventory =====

    async fn list_inventory(&self) -> ClientResult<Vec<InventoryItem>>;

    async fn create_inventory_item(
        &self,
        request: &InventoryItemRequest,
    ) -> ClientResult<InventoryItem>;

    async fn update_inventory_item(
        &self,
        item_id: i64,
        request: &InventoryItemRequest,
    ) -> ClientResult<InventoryItem>;

    async fn delete_inventory_item(&self, item_id: i64) -> ClientResult<()>;
}
