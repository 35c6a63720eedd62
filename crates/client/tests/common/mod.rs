//! Common test utilities for integration tests.
//!
//! Builds an in-memory farm on [`MockFarmApi`] and a client wired to it.

// Not every helper is used by every test binary.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use fake::faker::lorem::en::Word;
use fake::Fake;

use farm_manager_client::config::{ApiConfig, Config, DashboardConfig, LoggingConfig};
use farm_manager_client::domain::models::{
    Animal, AnimalId, DailyGroupTotal, Gender, GroupId, GroupRecord,
};
use farm_manager_client::remote::MockFarmApi;
use farm_manager_client::FarmClient;

/// Test configuration pointing at a local backend.
pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            base_url: "http://localhost:8000".to_string(),
            auth_token: Some("test-token".to_string()),
            request_timeout_secs: 5,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        dashboard: DashboardConfig { trailing_days: 7 },
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn test_animal(id: i64, group: Option<i64>) -> Animal {
    Animal {
        id: AnimalId(id),
        gender: if id % 2 == 0 { Gender::Male } else { Gender::Female },
        group_id: group.map(GroupId),
        birth_date: Some(date(2022, 1, 1 + (id % 28) as u32)),
        farm_id: Some(1),
    }
}

/// A group with a generated name.
pub fn test_group(id: i64) -> GroupRecord {
    let word: String = Word().fake();
    GroupRecord {
        id: GroupId(id),
        name: format!("Group {} {}", word, id),
        description: None,
    }
}

/// A generated production record for one group on one day.
pub fn test_group_total(day: NaiveDate, group: &GroupRecord) -> DailyGroupTotal {
    DailyGroupTotal {
        date: day,
        group_id: Some(group.id),
        group_name: group.name.clone(),
        total_volume: (1.0..40.0).fake::<f64>(),
    }
}

/// Farm with two groups: group 10 holds animals 1-3, group 20 holds 4-5,
/// animals 6-8 are ungrouped.
pub fn test_farm() -> MockFarmApi {
    let animals = (1..=8).map(|id| {
        let group = match id {
            1..=3 => Some(10),
            4..=5 => Some(20),
            _ => None,
        };
        test_animal(id, group)
    });
    MockFarmApi::new()
        .with_animals(animals)
        .with_groups([test_group(10), test_group(20)])
}

/// A client over `api` with its store already loaded.
pub async fn create_test_client(api: MockFarmApi) -> (Arc<MockFarmApi>, FarmClient) {
    let api = Arc::new(api);
    let mut client = FarmClient::with_api(api.clone(), &test_config());
    client.refresh().await.expect("Failed to load farm");
    api.clear_calls().await;
    (api, client)
}
