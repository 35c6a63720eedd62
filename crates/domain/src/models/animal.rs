//! Animal domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::group::GroupId;

/// Server-assigned animal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimalId(pub i64);

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AnimalId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(AnimalId)
            .map_err(|_| format!("Invalid animal id: {}", s))
    }
}

impl From<i64> for AnimalId {
    fn from(id: i64) -> Self {
        AnimalId(id)
    }
}

/// Gender of an animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "macho" => Ok(Gender::Male),
            "female" | "f" | "fêmea" | "femea" => Ok(Gender::Female),
            _ => Err(format!("Invalid gender: {}", s)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An animal as last reported by the server.
///
/// The `group_id` field is the single source of truth for group membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Animal {
    pub id: AnimalId,
    pub gender: Gender,
    pub group_id: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<i64>,
}

impl Animal {
    /// Returns true if the animal currently belongs to the given group.
    pub fn is_member_of(&self, group_id: GroupId) -> bool {
        self.group_id == Some(group_id)
    }
}

/// Filter applied to the animal list.
///
/// Empty criteria match everything; an animal without a group never matches
/// a non-empty group filter.
#[derive(Debug, Clone, Default)]
pub struct AnimalFilter {
    pub genders: Vec<Gender>,
    pub groups: Vec<GroupId>,
}

impl AnimalFilter {
    pub fn matches(&self, animal: &Animal) -> bool {
        let matches_gender = self.genders.is_empty() || self.genders.contains(&animal.gender);
        let matches_group = self.groups.is_empty()
            || animal
                .group_id
                .map(|group_id| self.groups.contains(&group_id))
                .unwrap_or(false);
        matches_gender && matches_group
    }
}
