//! Client-side cache of server state.
//!
//! The store only changes at explicit refresh points. Writes never patch it
//! optimistically; callers refetch after every write.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use domain::models::{
    derive_groups, Animal, AnimalFilter, AnimalId, Group, GroupId, GroupRecord, Sensor,
};

use crate::error::ClientResult;
use crate::remote::FarmApi;

/// Member count of one group, for the distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSize {
    pub group_id: GroupId,
    pub name: String,
    pub members: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FarmStore {
    animals: Vec<Animal>,
    groups: Vec<Group>,
    sensors: Vec<Sensor>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl FarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Refresh =====

    /// Refetches animals and groups concurrently and rebuilds memberships.
    ///
    /// On error the store keeps its previous contents.
    pub async fn refresh_memberships(&mut self, api: &dyn FarmApi) -> ClientResult<()> {
        let (animals, groups) =
            futures::future::try_join(api.list_animals(), api.list_groups()).await?;
        self.replace_memberships(animals, groups);
        Ok(())
    }

    pub async fn refresh_sensors(&mut self, api: &dyn FarmApi) -> ClientResult<()> {
        let sensors = api.list_sensors().await?;
        self.replace_sensors(sensors);
        Ok(())
    }

    pub async fn refresh_all(&mut self, api: &dyn FarmApi) -> ClientResult<()> {
        let ((animals, groups), sensors) = futures::future::try_join(
            futures::future::try_join(api.list_animals(), api.list_groups()),
            api.list_sensors(),
        )
        .await?;
        self.replace_memberships(animals, groups);
        self.replace_sensors(sensors);
        Ok(())
    }

    /// Replaces animals and groups with a fresh server snapshot.
    pub fn replace_memberships(&mut self, mut animals: Vec<Animal>, groups: Vec<GroupRecord>) {
        animals.sort_by_key(|animal| animal.id);
        self.groups = derive_groups(groups, &animals);
        self.animals = animals;
        self.refreshed_at = Some(Utc::now());

        tracing::debug!(
            animals = self.animals.len(),
            groups = self.groups.len(),
            "Farm store memberships refreshed"
        );
    }

    pub fn replace_sensors(&mut self, mut sensors: Vec<Sensor>) {
        sensors.sort_by_key(|sensor| sensor.id);
        self.sensors = sensors;
        self.refreshed_at = Some(Utc::now());
    }

    // ===== Accessors =====

    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// When the store last received server data.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.animals
            .binary_search_by_key(&id, |animal| animal.id)
            .ok()
            .map(|index| &self.animals[index])
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn group_name(&self, id: GroupId) -> Option<&str> {
        self.group(id).map(|group| group.name.as_str())
    }

    pub fn members_of(&self, id: GroupId) -> Option<&BTreeSet<AnimalId>> {
        self.group(id).map(|group| &group.members)
    }

    pub fn sensor(&self, id: i64) -> Option<&Sensor> {
        self.sensors.iter().find(|sensor| sensor.id == id)
    }

    /// Animals that belong to no known group.
    pub fn ungrouped_animals(&self) -> Vec<&Animal> {
        self.animals
            .iter()
            .filter(|animal| match animal.group_id {
                None => true,
                Some(id) => self.group(id).is_none(),
            })
            .collect()
    }

    pub fn group_sizes(&self) -> Vec<GroupSize> {
        self.groups
            .iter()
            .map(|group| GroupSize {
                group_id: group.id,
                name: group.name.clone(),
                members: group.member_count(),
            })
            .collect()
    }

    pub fn animals_matching(&self, filter: &AnimalFilter) -> Vec<&Animal> {
        self.animals
            .iter()
            .filter(|animal| filter.matches(animal))
            .collect()
    }
}
