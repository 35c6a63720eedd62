//! Group domain models for animal groups.
//!
//! Group membership is never stored on the group itself. It is rebuilt from
//! the animals' `group_id` references every time the client refetches.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::animal::{Animal, AnimalId};

/// Server-assigned group identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GroupId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(GroupId)
            .map_err(|_| format!("Invalid group id: {}", s))
    }
}

impl From<i64> for GroupId {
    fn from(id: i64) -> Self {
        GroupId(id)
    }
}

/// A group record as the server stores it (no member list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A group together with its derived member set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub members: BTreeSet<AnimalId>,
}

impl Group {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, animal_id: AnimalId) -> bool {
        self.members.contains(&animal_id)
    }
}

/// Rebuilds every group's member set from the animals' group references.
///
/// Groups keep the order the server listed them in. Animals that reference a
/// group missing from `records` are ignored.
pub fn derive_groups(records: Vec<GroupRecord>, animals: &[Animal]) -> Vec<Group> {
    let mut members: BTreeMap<GroupId, BTreeSet<AnimalId>> = BTreeMap::new();
    for animal in animals {
        if let Some(group_id) = animal.group_id {
            members.entry(group_id).or_default().insert(animal.id);
        }
    }

    records
        .into_iter()
        .map(|record| Group {
            members: members.remove(&record.id).unwrap_or_default(),
            id: record.id,
            name: record.name,
            description: record.description,
        })
        .collect()
}

/// Request payload for creating a group.
///
/// Members are not part of the payload; they are assigned afterwards through
/// per-animal group changes.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupRequest {
    #[validate(custom(function = "shared::validation::validate_group_name"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request payload for updating a group's own fields.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateGroupRequest {
    #[validate(custom(function = "shared::validation::validate_group_name"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// Membership DTOs
// ============================================================================

/// Request body moving one animal into a group, or out of every group.
///
/// `new_group_id` is always serialized, as `null` when clearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ChangeGroupRequest {
    pub new_group_id: Option<GroupId>,
}
