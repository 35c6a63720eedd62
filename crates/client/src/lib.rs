//! Client core of the Farm Manager.
//!
//! Wraps the farm backend behind [`remote::FarmApi`], keeps an explicit
//! [`store::FarmStore`] cache, and exposes the services the views use:
//! group editing with concurrent membership updates, production charts and
//! cards, sensor monitoring, and record keeping.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod remote;
pub mod services;
pub mod store;

use std::sync::Arc;

pub use domain;

use config::Config;
use error::{ClientError, ClientResult};
use remote::{FarmApi, HttpFarmApi};
use services::{BatchMutationExecutor, DashboardService, GroupEditor, RecordService, SensorService};
use store::FarmStore;

/// Everything a session needs, wired from one configuration.
pub struct FarmClient {
    pub store: FarmStore,
    pub groups: GroupEditor,
    pub dashboard: DashboardService,
    pub sensors: SensorService,
    pub records: RecordService,
    api: Arc<dyn FarmApi>,
}

impl FarmClient {
    /// Connects to the backend described by `config` over HTTP.
    pub fn connect(config: &Config) -> ClientResult<Self> {
        config
            .validate()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        let api = HttpFarmApi::new(&config.api)?;
        Ok(Self::with_api(Arc::new(api), config))
    }

    /// Builds a client on any backend, e.g. [`remote::MockFarmApi`].
    pub fn with_api(api: Arc<dyn FarmApi>, config: &Config) -> Self {
        let executor = BatchMutationExecutor::new(api.clone());
        Self {
            store: FarmStore::new(),
            groups: GroupEditor::new(executor.clone()),
            dashboard: DashboardService::new(api.clone(), &config.dashboard),
            sensors: SensorService::new(executor.clone()),
            records: RecordService::new(executor),
            api,
        }
    }

    pub fn api(&self) -> &dyn FarmApi {
        self.api.as_ref()
    }

    /// Loads animals, groups and sensors into the store.
    pub async fn refresh(&mut self) -> ClientResult<()> {
        self.store.refresh_all(self.api.as_ref()).await
    }
}
