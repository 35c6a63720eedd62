//! In-memory farm backend for development and testing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;

use domain::models::appointment::{CreateAppointmentRequest, UpdateAppointmentRequest};
use domain::models::group::{CreateGroupRequest, UpdateGroupRequest};
use domain::models::inventory::InventoryItemRequest;
use domain::models::production::MilkYieldRequest;
use domain::models::sensor::SensorRequest;
use domain::models::{
    Animal, AnimalId, Appointment, DailyGroupTotal, DailyTotal, GroupId, GroupRecord,
    InventoryItem, ProductionPeriod, Sensor,
};

use super::FarmApi;
use crate::error::{ClientError, ClientResult};

/// A call received by [`MockFarmApi`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockRequest {
    ListAnimals,
    ListGroups,
    CreateGroup { name: String },
    UpdateGroup { group_id: GroupId, name: String },
    ChangeAnimalGroup { animal_id: AnimalId, group_id: Option<GroupId> },
    RecordMilkYield { animal_id: AnimalId, date: NaiveDate, volume: f64 },
    ListSensors,
    CreateSensor { name: String },
    UpdateSensor { sensor_id: i64 },
    DeleteSensor { sensor_id: i64 },
    DailyTotals { from: NaiveDate, to: NaiveDate },
    DailyGroupTotals { from: NaiveDate, to: NaiveDate },
    PeriodTotal(ProductionPeriod),
    ListAppointments,
    CreateAppointment { sheep_id: AnimalId },
    UpdateAppointment { appointment_id: i64 },
    ListInventory,
    CreateInventoryItem { item_name: String },
    UpdateInventoryItem { item_id: i64 },
    DeleteInventoryItem { item_id: i64 },
}

impl MockRequest {
    /// Operation name, matching the [`FarmApi`] method.
    pub fn name(&self) -> &'static str {
        match self {
            MockRequest::ListAnimals => "list_animals",
            MockRequest::ListGroups => "list_groups",
            MockRequest::CreateGroup { .. } => "create_group",
            MockRequest::UpdateGroup { .. } => "update_group",
            MockRequest::ChangeAnimalGroup { .. } => "change_animal_group",
            MockRequest::RecordMilkYield { .. } => "record_milk_yield",
            MockRequest::ListSensors => "list_sensors",
            MockRequest::CreateSensor { .. } => "create_sensor",
            MockRequest::UpdateSensor { .. } => "update_sensor",
            MockRequest::DeleteSensor { .. } => "delete_sensor",
            MockRequest::DailyTotals { .. } => "daily_totals",
            MockRequest::DailyGroupTotals { .. } => "daily_group_totals",
            MockRequest::PeriodTotal(_) => "period_total",
            MockRequest::ListAppointments => "list_appointments",
            MockRequest::CreateAppointment { .. } => "create_appointment",
            MockRequest::UpdateAppointment { .. } => "update_appointment",
            MockRequest::ListInventory => "list_inventory",
            MockRequest::CreateInventoryItem { .. } => "create_inventory_item",
            MockRequest::UpdateInventoryItem { .. } => "update_inventory_item",
            MockRequest::DeleteInventoryItem { .. } => "delete_inventory_item",
        }
    }

    /// True for requests that change server state.
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            MockRequest::ListAnimals
                | MockRequest::ListGroups
                | MockRequest::ListSensors
                | MockRequest::DailyTotals { .. }
                | MockRequest::DailyGroupTotals { .. }
                | MockRequest::PeriodTotal(_)
                | MockRequest::ListAppointments
                | MockRequest::ListInventory
        )
    }
}

#[derive(Debug, Default)]
struct MockState {
    animals: BTreeMap<AnimalId, Animal>,
    groups: BTreeMap<GroupId, GroupRecord>,
    sensors: BTreeMap<i64, Sensor>,
    appointments: BTreeMap<i64, Appointment>,
    inventory: BTreeMap<i64, InventoryItem>,
    daily_totals: Vec<DailyTotal>,
    daily_group_totals: Vec<DailyGroupTotal>,
    period_totals: HashMap<ProductionPeriod, f64>,
    milk_yields: Vec<(AnimalId, MilkYieldRequest)>,
    calls: Vec<MockRequest>,
    next_id: i64,
}

impl MockState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Mock farm backend for development and testing.
///
/// Keeps the farm in memory, records every call, and can be told to fail
/// individual animals' group changes or whole operations.
#[derive(Debug, Default)]
pub struct MockFarmApi {
    state: Mutex<MockState>,
    failing_animals: HashSet<AnimalId>,
    failing_requests: HashSet<&'static str>,
    /// Whether every call fails.
    simulate_failure: bool,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFarmApi {
    /// Create an empty mock backend.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1000,
                ..MockState::default()
            }),
            ..Self::default()
        }
    }

    /// Create a mock backend where every call fails.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::new()
        }
    }

    pub fn with_animals(mut self, animals: impl IntoIterator<Item = Animal>) -> Self {
        let state = self.state.get_mut();
        for animal in animals {
            state.animals.insert(animal.id, animal);
        }
        self
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupRecord>) -> Self {
        let state = self.state.get_mut();
        for group in groups {
            state.groups.insert(group.id, group);
        }
        self
    }

    pub fn with_sensors(mut self, sensors: impl IntoIterator<Item = Sensor>) -> Self {
        let state = self.state.get_mut();
        for sensor in sensors {
            state.sensors.insert(sensor.id, sensor);
        }
        self
    }

    pub fn with_appointments(
        mut self,
        appointments: impl IntoIterator<Item = Appointment>,
    ) -> Self {
        let state = self.state.get_mut();
        for appointment in appointments {
            state.appointments.insert(appointment.id, appointment);
        }
        self
    }

    pub fn with_inventory(mut self, items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let state = self.state.get_mut();
        for item in items {
            state.inventory.insert(item.id, item);
        }
        self
    }

    pub fn with_daily_totals(mut self, totals: impl IntoIterator<Item = DailyTotal>) -> Self {
        self.state.get_mut().daily_totals.extend(totals);
        self
    }

    pub fn with_daily_group_totals(
        mut self,
        totals: impl IntoIterator<Item = DailyGroupTotal>,
    ) -> Self {
        self.state.get_mut().daily_group_totals.extend(totals);
        self
    }

    pub fn with_period_total(mut self, period: ProductionPeriod, volume: f64) -> Self {
        self.state.get_mut().period_totals.insert(period, volume);
        self
    }

    /// Make every group change of `animal_id` fail.
    pub fn fail_animal(mut self, animal_id: AnimalId) -> Self {
        self.failing_animals.insert(animal_id);
        self
    }

    /// Make every call of the named operation fail, e.g. `"update_group"`.
    pub fn fail_request(mut self, operation: &'static str) -> Self {
        self.failing_requests.insert(operation);
        self
    }

    /// Delay every write by `latency`, so concurrent calls overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    // ===== Inspection =====

    /// Every call received so far, in arrival order.
    pub async fn calls(&self) -> Vec<MockRequest> {
        self.state.lock().await.calls.clone()
    }

    /// Calls that change server state.
    pub async fn writes(&self) -> Vec<MockRequest> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|call| call.is_write())
            .cloned()
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Current group of an animal, or `None` for an unknown animal.
    pub async fn group_of(&self, animal_id: AnimalId) -> Option<Option<GroupId>> {
        self.state
            .lock()
            .await
            .animals
            .get(&animal_id)
            .map(|animal| animal.group_id)
    }

    pub async fn group_record(&self, group_id: GroupId) -> Option<GroupRecord> {
        self.state.lock().await.groups.get(&group_id).cloned()
    }

    pub async fn milk_yields(&self) -> Vec<(AnimalId, MilkYieldRequest)> {
        self.state.lock().await.milk_yields.clone()
    }

    /// Highest number of writes that were in flight at the same time.
    pub fn max_concurrent_writes(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    // ===== Internals =====

    fn should_fail(&self, request: &MockRequest) -> bool {
        if self.simulate_failure || self.failing_requests.contains(request.name()) {
            return true;
        }
        matches!(
            request,
            MockRequest::ChangeAnimalGroup { animal_id, .. } if self.failing_animals.contains(animal_id)
        )
    }

    /// Records the call and decides whether it fails.
    async fn receive(&self, request: MockRequest) -> ClientResult<()> {
        if request.is_write() {
            self.enter_write().await;
        }

        let fail = self.should_fail(&request);
        if fail {
            tracing::warn!(
                operation = %request.name(),
                request = ?request,
                "Mock farm API simulating failure"
            );
        } else {
            tracing::debug!(operation = %request.name(), "Mock farm API request");
        }

        self.state.lock().await.calls.push(request);

        if fail {
            Err(ClientError::status(503, "Simulated failure"))
        } else {
            Ok(())
        }
    }

    async fn enter_write(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        match self.latency {
            Some(latency) => tokio::time::sleep(latency).await,
            None => tokio::task::yield_now().await,
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

fn not_found(entity: &str, id: impl std::fmt::Display) -> ClientError {
    ClientError::status(404, format!("{} {} not found", entity, id))
}

#[async_trait::async_trait]
impl FarmApi for MockFarmApi {
    async fn list_animals(&self) -> ClientResult<Vec<Animal>> {
        self.receive(MockRequest::ListAnimals).await?;
        Ok(self.state.lock().await.animals.values().cloned().collect())
    }

    async fn list_groups(&self) -> ClientResult<Vec<GroupRecord>> {
        self.receive(MockRequest::ListGroups).await?;
        Ok(self.state.lock().await.groups.values().cloned().collect())
    }

    async fn create_group(&self, request: &CreateGroupRequest) -> ClientResult<GroupRecord> {
        self.receive(MockRequest::CreateGroup {
            name: request.name.clone(),
        })
        .await?;

        let mut state = self.state.lock().await;
        let record = GroupRecord {
            id: GroupId(state.allocate_id()),
            name: request.name.trim().to_string(),
            description: request.description.clone(),
        };
        state.groups.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_group(
        &self,
        group_id: GroupId,
        request: &UpdateGroupRequest,
    ) -> ClientResult<GroupRecord> {
        self.receive(MockRequest::UpdateGroup {
            group_id,
            name: request.name.clone(),
        })
        .await?;

        let mut state = self.state.lock().await;
        let record = state
            .groups
            .get_mut(&group_id)
            .ok_or_else(|| not_found("Group", group_id))?;
        record.name = request.name.trim().to_string();
        record.description = request.description.clone();
        Ok(record.clone())
    }

    async fn change_animal_group(
        &self,
        animal_id: AnimalId,
        group_id: Option<GroupId>,
    ) -> ClientResult<()> {
        self.receive(MockRequest::ChangeAnimalGroup {
            animal_id,
            group_id,
        })
        .await?;

        let mut state = self.state.lock().await;
        if let Some(id) = group_id {
            if !state.groups.contains_key(&id) {
                return Err(not_found("Group", id));
            }
        }
        let animal = state
            .animals
            .get_mut(&animal_id)
            .ok_or_else(|| not_found("Sheep", animal_id))?;
        animal.group_id = group_id;
        Ok(())
    }

    async fn record_milk_yield(
        &self,
        animal_id: AnimalId,
        request: &MilkYieldRequest,
    ) -> ClientResult<()> {
        self.receive(MockRequest::RecordMilkYield {
            animal_id,
            date: request.date,
            volume: request.volume,
        })
        .await?;

        let mut state = self.state.lock().await;
        if !state.animals.contains_key(&animal_id) {
            return Err(not_found("Sheep", animal_id));
        }
        state.milk_yields.push((animal_id, request.clone()));
        Ok(())
    }

    async fn list_sensors(&self) -> ClientResult<Vec<Sensor>> {
        self.receive(MockRequest::ListSensors).await?;
        Ok(self.state.lock().await.sensors.values().cloned().collect())
    }

    async fn create_sensor(&self, request: &SensorRequest) -> ClientResult<Sensor> {
        self.receive(MockRequest::CreateSensor {
            name: request.name.clone(),
        })
        .await?;

        let mut state = self.state.lock().await;
        let sensor = Sensor {
            id: state.allocate_id(),
            name: request.name.clone(),
            current_value: request.current_value,
            min_value: request.min_value,
            max_value: request.max_value,
            unit: request.unit.clone(),
            timestamp: Some(Utc::now()),
        };
        state.sensors.insert(sensor.id, sensor.clone());
        Ok(sensor)
    }

    async fn update_sensor(
        &self,
        sensor_id: i64,
        request: &SensorRequest,
    ) -> ClientResult<Sensor> {
        self.receive(MockRequest::UpdateSensor { sensor_id }).await?;

        let mut state = self.state.lock().await;
        let sensor = state
            .sensors
            .get_mut(&sensor_id)
            .ok_or_else(|| not_found("Sensor", sensor_id))?;
        sensor.name = request.name.clone();
        sensor.current_value = request.current_value;
        sensor.min_value = request.min_value;
        sensor.max_value = request.max_value;
        sensor.unit = request.unit.clone();
        sensor.timestamp = Some(Utc::now());
        Ok(sensor.clone())
    }

    async fn delete_sensor(&self, sensor_id: i64) -> ClientResult<()> {
        self.receive(MockRequest::DeleteSensor { sensor_id }).await?;
        self.state
            .lock()
            .await
            .sensors
            .remove(&sensor_id)
            .map(|_| ())
            .ok_or_else(|| not_found("Sensor", sensor_id))
    }

    async fn daily_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ClientResult<Vec<DailyTotal>> {
        self.receive(MockRequest::DailyTotals { from, to }).await?;
        Ok(self
            .state
            .lock()
            .await
            .daily_totals
            .iter()
            .filter(|t| t.date >= from && t.date <= to)
            .cloned()
            .collect())
    }

    async fn daily_group_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ClientResult<Vec<DailyGroupTotal>> {
        self.receive(MockRequest::DailyGroupTotals { from, to })
            .await?;
        Ok(self
            .state
            .lock()
            .await
            .daily_group_totals
            .iter()
            .filter(|t| t.date >= from && t.date <= to)
            .cloned()
            .collect())
    }

    async fn period_total(&self, period: ProductionPeriod) -> ClientResult<f64> {
        self.receive(MockRequest::PeriodTotal(period)).await?;
        Ok(self
            .state
            .lock()
            .await
            .period_totals
            .get(&period)
            .copied()
            .unwrap_or(0.0))
    }

    async fn list_appointments(&self) -> ClientResult<Vec<Appointment>> {
        self.receive(MockRequest::ListAppointments).await?;
        Ok(self
            .state
            .lock()
            .await
            .appointments
            .values()
            .cloned()
            .collect())
    }

    async fn create_appointment(
        &self,
        request: &CreateAppointmentRequest,
    ) -> ClientResult<Appointment> {
        self.receive(MockRequest::CreateAppointment {
            sheep_id: request.sheep_id,
        })
        .await?;

        let mut state = self.state.lock().await;
        if !state.animals.contains_key(&request.sheep_id) {
            return Err(not_found("Sheep", request.sheep_id));
        }
        let appointment = Appointment {
            id: state.allocate_id(),
            sheep_id: request.sheep_id,
            vet_id: request.vet_id,
            date: Utc::now(),
            reason: request.reason.clone(),
            comments: request.comments.clone(),
        };
        state
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        appointment_id: i64,
        request: &UpdateAppointmentRequest,
    ) -> ClientResult<Appointment> {
        self.receive(MockRequest::UpdateAppointment { appointment_id })
            .await?;

        let mut state = self.state.lock().await;
        let appointment = state
            .appointments
            .get_mut(&appointment_id)
            .ok_or_else(|| not_found("Appointment", appointment_id))?;
        if request.reason.is_some() {
            appointment.reason = request.reason.clone();
        }
        if request.comments.is_some() {
            appointment.comments = request.comments.clone();
        }
        Ok(appointment.clone())
    }

    async fn list_inventory(&self) -> ClientResult<Vec<InventoryItem>> {
        self.receive(MockRequest::ListInventory).await?;
        Ok(self.state.lock().await.inventory.values().cloned().collect())
    }

    async fn create_inventory_item(
        &self,
        request: &InventoryItemRequest,
    ) -> ClientResult<InventoryItem> {
        self.receive(MockRequest::CreateInventoryItem {
            item_name: request.item_name.clone(),
        })
        .await?;

        let mut state = self.state.lock().await;
        let item = InventoryItem {
            id: state.allocate_id(),
            item_name: request.item_name.clone(),
            quantity: request.quantity,
            unit: request.unit.clone(),
            consumption_rate: request.consumption_rate,
            category: request.category.clone(),
            last_updated: Some(Utc::now()),
        };
        state.inventory.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_inventory_item(
        &self,
        item_id: i64,
        request: &InventoryItemRequest,
    ) -> ClientResult<InventoryItem> {
        self.receive(MockRequest::UpdateInventoryItem { item_id })
            .await?;

        let mut state = self.state.lock().await;
        let item = state
            .inventory
            .get_mut(&item_id)
            .ok_or_else(|| not_found("Inventory item", item_id))?;
        item.item_name = request.item_name.clone();
        item.quantity = request.quantity;
        item.unit = request.unit.clone();
        item.consumption_rate = request.consumption_rate;
        item.category = request.category.clone();
        item.last_updated = Some(Utc::now());
        Ok(item.clone())
    }

    async fn delete_inventory_item(&self, item_id: i64) -> ClientResult<()> {
        self.receive(MockRequest::DeleteInventoryItem { item_id })
            .await?;
        self.state
            .lock()
            .await
            .inventory
            .remove(&item_id)
            .map(|_| ())
            .ok_or_else(|| not_found("Inventory item", item_id))
    }
}
