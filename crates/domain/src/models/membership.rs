//! Membership editing models.
//!
//! A [`MembershipEdit`] lives only while the user has one group open for
//! editing. It is consumed by save or dropped by cancel.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::animal::AnimalId;
use super::group::{Group, GroupId};
use crate::services::membership_diff::{diff, MembershipDiff};

/// A single change to one group's membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "animal_id", rename_all = "lowercase")]
pub enum MembershipOperation {
    Add(AnimalId),
    Remove(AnimalId),
}

impl MembershipOperation {
    pub fn animal_id(&self) -> AnimalId {
        match self {
            MembershipOperation::Add(id) | MembershipOperation::Remove(id) => *id,
        }
    }

    /// The group reference the animal must carry once this operation is applied.
    pub fn target_group(&self, group_id: GroupId) -> Option<GroupId> {
        match self {
            MembershipOperation::Add(_) => Some(group_id),
            MembershipOperation::Remove(_) => None,
        }
    }
}

impl fmt::Display for MembershipOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipOperation::Add(id) => write!(f, "add {}", id),
            MembershipOperation::Remove(id) => write!(f, "remove {}", id),
        }
    }
}

/// Name and member set of a group at one point of an edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub name: String,
    pub members: BTreeSet<AnimalId>,
}

/// Pairs the committed state of one group with the state the user is building.
#[derive(Debug, Clone)]
pub struct MembershipEdit {
    group_id: Option<GroupId>,
    committed: GroupSnapshot,
    pending: GroupSnapshot,
}

impl MembershipEdit {
    /// Starts editing an existing group.
    pub fn for_group(group: &Group) -> Self {
        let committed = GroupSnapshot {
            name: group.name.clone(),
            members: group.members.clone(),
        };
        Self {
            group_id: Some(group.id),
            pending: committed.clone(),
            committed,
        }
    }

    /// Starts building a group that does not exist yet.
    pub fn for_new_group() -> Self {
        Self {
            group_id: None,
            committed: GroupSnapshot::default(),
            pending: GroupSnapshot::default(),
        }
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    pub fn is_new_group(&self) -> bool {
        self.group_id.is_none()
    }

    pub fn committed(&self) -> &GroupSnapshot {
        &self.committed
    }

    pub fn pending(&self) -> &GroupSnapshot {
        &self.pending
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.pending.name = name.into();
    }

    /// Returns false if the animal was already selected.
    pub fn add_member(&mut self, animal_id: AnimalId) -> bool {
        self.pending.members.insert(animal_id)
    }

    /// Returns false if the animal was not selected.
    pub fn remove_member(&mut self, animal_id: AnimalId) -> bool {
        self.pending.members.remove(&animal_id)
    }

    pub fn toggle_member(&mut self, animal_id: AnimalId) {
        if !self.pending.members.remove(&animal_id) {
            self.pending.members.insert(animal_id);
        }
    }

    pub fn set_members(&mut self, members: impl IntoIterator<Item = AnimalId>) {
        self.pending.members = members.into_iter().collect();
    }

    /// Compares names after trimming, since the trimmed name is what gets saved.
    pub fn name_changed(&self) -> bool {
        self.pending.name.trim() != self.committed.name.trim()
    }

    pub fn has_changes(&self) -> bool {
        self.name_changed() || self.pending.members != self.committed.members
    }

    /// Operations that turn the committed member set into the pending one.
    pub fn diff(&self) -> MembershipDiff {
        diff(&self.committed.members, &self.pending.members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(members: &[i64]) -> Group {
        Group {
            id: GroupId(1),
            name: "Group A".to_string(),
            description: None,
            members: members.iter().copied().map(AnimalId).collect(),
        }
    }

    #[test]
    fn test_operation_target_group() {
        assert_eq!(
            MembershipOperation::Add(AnimalId(3)).target_group(GroupId(9)),
            Some(GroupId(9))
        );
        assert_eq!(
            MembershipOperation::Remove(AnimalId(3)).target_group(GroupId(9)),
            None
        );
        assert_eq!(MembershipOperation::Remove(AnimalId(3)).animal_id(), AnimalId(3));
    }

    #[test]
    fn test_operation_display_and_serialization() {
        assert_eq!(MembershipOperation::Add(AnimalId(4)).to_string(), "add 4");
        let json = serde_json::to_value(MembershipOperation::Remove(AnimalId(4))).unwrap();
        assert_eq!(json, serde_json::json!({"op": "remove", "animal_id": 4}));
    }

    #[test]
    fn test_fresh_edit_has_no_changes() {
        let edit = MembershipEdit::for_group(&group(&[1, 2]));
        assert!(!edit.has_changes());
        assert!(edit.diff().is_empty());
        assert_eq!(edit.group_id(), Some(GroupId(1)));
    }

    #[test]
    fn test_toggle_back_and_forth_is_no_change() {
        let mut edit = MembershipEdit::for_group(&group(&[1, 2]));
        edit.toggle_member(AnimalId(2));
        assert!(edit.has_changes());
        edit.toggle_member(AnimalId(2));
        assert!(!edit.has_changes());
    }

    #[test]
    fn test_whitespace_only_rename_is_no_change() {
        let mut edit = MembershipEdit::for_group(&group(&[]));
        edit.set_name("  Group A ");
        assert!(!edit.name_changed());
        edit.set_name("Group B");
        assert!(edit.name_changed());
        assert!(edit.has_changes());
    }

    #[test]
    fn test_edit_diff() {
        let mut edit = MembershipEdit::for_group(&group(&[1, 2, 3]));
        edit.remove_member(AnimalId(1));
        edit.add_member(AnimalId(4));

        let diff = edit.diff();
        assert_eq!(diff.to_remove, [AnimalId(1)].into_iter().collect());
        assert_eq!(diff.to_add, [AnimalId(4)].into_iter().collect());
    }

    #[test]
    fn test_new_group_diff_is_pure_add() {
        let mut edit = MembershipEdit::for_new_group();
        assert!(edit.is_new_group());
        edit.set_name("Dry ewes");
        edit.set_members([AnimalId(5), AnimalId(6)]);

        let diff = edit.diff();
        assert!(diff.to_remove.is_empty());
        assert_eq!(diff.to_add.len(), 2);
    }
}
