//! HTTP implementation of [`FarmApi`] on top of `reqwest`.

use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;

use domain::models::appointment::{CreateAppointmentRequest, UpdateAppointmentRequest};
use domain::models::group::{ChangeGroupRequest, CreateGroupRequest, UpdateGroupRequest};
use domain::models::inventory::InventoryItemRequest;
use domain::models::production::MilkYieldRequest;
use domain::models::sensor::SensorRequest;
use domain::models::{
    Animal, AnimalId, Appointment, DailyGroupTotal, DailyTotal, GroupId, GroupRecord,
    InventoryItem, ProductionPeriod, Sensor,
};
use shared::dates::format_iso_date;

use super::{wire, FarmApi};
use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::metrics::RequestTimer;

/// Farm backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFarmApi {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpFarmApi {
    /// Builds the HTTP client from configuration.
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config
                .auth_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
        })
    }

    /// Replaces the bearer token, e.g. after a new login.
    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.auth_token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and returns the decoded JSON body.
    ///
    /// An empty body decodes as `null`. Non-2xx responses become
    /// [`ClientError::Status`] carrying the server's `detail` message.
    async fn send(&self, endpoint: &'static str, builder: RequestBuilder) -> ClientResult<Value> {
        let timer = RequestTimer::new(endpoint);
        let result = Self::execute(builder).await;
        timer.record();

        if let Err(e) = &result {
            tracing::debug!(endpoint = %endpoint, error = %e, "Farm API request failed");
        }
        result
    }

    async fn execute(builder: RequestBuilder) -> ClientResult<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }

    async fn get(&self, endpoint: &'static str, path: &str) -> ClientResult<Value> {
        self.send(endpoint, self.request(Method::GET, path)).await
    }

    async fn send_json<B: Serialize + ?Sized + Sync>(
        &self,
        endpoint: &'static str,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<Value> {
        self.send(endpoint, self.request(method, path).json(body))
            .await
    }

    async fn delete(&self, endpoint: &'static str, path: &str) -> ClientResult<()> {
        self.send(endpoint, self.request(Method::DELETE, path))
            .await
            .map(|_| ())
    }

    fn date_range(from: NaiveDate, to: NaiveDate) -> [(&'static str, String); 2] {
        [("from", format_iso_date(from)), ("to", format_iso_date(to))]
    }
}

/// Turns a completed response into its JSON body.
fn decode_response(status: StatusCode, body: &str) -> ClientResult<Value> {
    if !status.is_success() {
        return Err(ClientError::status(
            status.as_u16(),
            wire::error_message(body),
        ));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

fn period_path(period: ProductionPeriod) -> &'static str {
    match period {
        ProductionPeriod::Today => "/milk-production/total-today",
        ProductionPeriod::Yesterday => "/milk-production/total-yesterday",
        ProductionPeriod::Last7Days => "/milk-production/total-last-7-days",
        ProductionPeriod::WeekBefore => "/milk-production/total-week-before",
    }
}

#[async_trait::async_trait]
impl FarmApi for HttpFarmApi {
    async fn list_animals(&self) -> ClientResult<Vec<Animal>> {
        let body = self.get("list_animals", "/sheep/").await?;
        Ok(wire::animals(&body)?)
    }

    async fn list_groups(&self) -> ClientResult<Vec<GroupRecord>> {
        let body = self.get("list_groups", "/sheep-group").await?;
        Ok(wire::groups(&body)?)
    }

    async fn create_group(&self, request: &CreateGroupRequest) -> ClientResult<GroupRecord> {
        let body = self
            .send_json("create_group", Method::POST, "/sheep-group", request)
            .await?;
        Ok(wire::group(&body)?)
    }

    async fn update_group(
        &self,
        group_id: GroupId,
        request: &UpdateGroupRequest,
    ) -> ClientResult<GroupRecord> {
        let path = format!("/sheep-group/{}", group_id);
        let body = self
            .send_json("update_group", Method::PUT, &path, request)
            .await?;
        Ok(wire::group(&body)?)
    }

    async fn change_animal_group(
        &self,
        animal_id: AnimalId,
        group_id: Option<GroupId>,
    ) -> ClientResult<()> {
        let path = format!("/sheep-group/{}/change-group", animal_id);
        let request = ChangeGroupRequest {
            new_group_id: group_id,
        };
        self.send_json("change_animal_group", Method::PATCH, &path, &request)
            .await
            .map(|_| ())
    }

    async fn record_milk_yield(
        &self,
        animal_id: AnimalId,
        request: &MilkYieldRequest,
    ) -> ClientResult<()> {
        let path = format!("/sheep/{}/milk-yield", animal_id);
        self.send_json("record_milk_yield", Method::PATCH, &path, request)
            .await
            .map(|_| ())
    }

    async fn list_sensors(&self) -> ClientResult<Vec<Sensor>> {
        let body = self.get("list_sensors", "/sensor/").await?;
        Ok(wire::sensors(&body)?)
    }

    async fn create_sensor(&self, request: &SensorRequest) -> ClientResult<Sensor> {
        let body = self
            .send_json("create_sensor", Method::POST, "/sensor/", request)
            .await?;
        Ok(wire::sensor(&body)?)
    }

    async fn update_sensor(
        &self,
        sensor_id: i64,
        request: &SensorRequest,
    ) -> ClientResult<Sensor> {
        let path = format!("/sensor/{}", sensor_id);
        let body = self
            .send_json("update_sensor", Method::PUT, &path, request)
            .await?;
        Ok(wire::sensor(&body)?)
    }

    async fn delete_sensor(&self, sensor_id: i64) -> ClientResult<()> {
        self.delete("delete_sensor", &format!("/sensor/{}", sensor_id))
            .await
    }

    async fn daily_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ClientResult<Vec<DailyTotal>> {
        let builder = self
            .request(Method::GET, "/milk-production/daily")
            .query(&Self::date_range(from, to));
        let body = self.send("daily_totals", builder).await?;
        Ok(wire::daily_totals(&body)?)
    }

    async fn daily_group_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ClientResult<Vec<DailyGroupTotal>> {
        let builder = self
            .request(Method::GET, "/milk-production/daily-by-group")
            .query(&Self::date_range(from, to));
        let body = self.send("daily_group_totals", builder).await?;
        Ok(wire::daily_group_totals(&body)?)
    }

    async fn period_total(&self, period: ProductionPeriod) -> ClientResult<f64> {
        let body = self.get("period_total", period_path(period)).await?;
        Ok(wire::period_total(&body)?)
    }

    async fn list_appointments(&self) -> ClientResult<Vec<Appointment>> {
        let body = self.get("list_appointments", "/appointment/").await?;
        Ok(wire::appointments(&body)?)
    }

    async fn create_appointment(
        &self,
        request: &CreateAppointmentRequest,
    ) -> ClientResult<Appointment> {
        let body = self
            .send_json("create_appointment", Method::POST, "/appointment/", request)
            .await?;
        Ok(wire::appointment(&body)?)
    }

    async fn update_appointment(
        &self,
        appointment_id: i64,
        request: &UpdateAppointmentRequest,
    ) -> ClientResult<Appointment> {
        let path = format!("/appointment/{}", appointment_id);
        let body = self
            .send_json("update_appointment", Method::PUT, &path, request)
            .await?;
        Ok(wire::appointment(&body)?)
    }

    async fn list_inventory(&self) -> ClientResult<Vec<InventoryItem>> {
        let body = self.get("list_inventory", "/inventory/").await?;
        Ok(wire::inventory(&body)?)
    }

    async fn create_inventory_item(
        &self,
        request: &InventoryItemRequest,
    ) -> ClientResult<InventoryItem> {
        let body = self
            .send_json("create_inventory_item", Method::POST, "/inventory/", request)
            .await?;
        Ok(wire::inventory_item(&body)?)
    }

    async fn update_inventory_item(
        &self,
        item_id: i64,
        request: &InventoryItemRequest,
    ) -> ClientResult<InventoryItem> {
        let path = format!("/inventory/{}", item_id);
        let body = self
            .send_json("update_inventory_item", Method::PUT, &path, request)
            .await?;
        Ok(wire::inventory_item(&body)?)
    }

    async fn delete_inventory_item(&self, item_id: i64) -> ClientResult<()> {
        self.delete("delete_inventory_item", &format!("/inventory/{}", item_id))
            .await
    }
}
