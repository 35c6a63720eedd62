//! Membership reconciliation for a single group.
//!
//! Computes the minimal set of add/remove operations that moves a group's
//! committed member set to the desired one. Members present in both sets are
//! left untouched, so the number of operations always equals the size of the
//! symmetric difference.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::animal::AnimalId;
use crate::models::membership::MembershipOperation;

/// Result of reconciling two member sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MembershipDiff {
    pub to_add: BTreeSet<AnimalId>,
    pub to_remove: BTreeSet<AnimalId>,
}

impl MembershipDiff {
    /// True when there is nothing to save.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Number of remote writes this diff will produce.
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }

    /// Flattens the diff into operations, removals first.
    pub fn operations(&self) -> Vec<MembershipOperation> {
        self.to_remove
            .iter()
            .map(|id| MembershipOperation::Remove(*id))
            .chain(self.to_add.iter().map(|id| MembershipOperation::Add(*id)))
            .collect()
    }

    /// Applies the diff to a member set locally.
    pub fn apply_to(&self, members: &BTreeSet<AnimalId>) -> BTreeSet<AnimalId> {
        members
            .difference(&self.to_remove)
            .chain(self.to_add.iter())
            .copied()
            .collect()
    }
}

/// Reconciles the committed member set `original` with `desired`.
pub fn diff(original: &BTreeSet<AnimalId>, desired: &BTreeSet<AnimalId>) -> MembershipDiff {
    MembershipDiff {
        to_add: desired.difference(original).copied().collect(),
        to_remove: original.difference(desired).copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[i64]) -> BTreeSet<AnimalId> {
        ids.iter().copied().map(AnimalId).collect()
    }

    #[test]
    fn test_diff_identical_sets() {
        let a = set(&[1, 2, 3]);
        let result = diff(&a, &a);
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
        assert!(result.operations().is_empty());
    }

    #[test]
    fn test_diff_empty_original_is_pure_add() {
        let result = diff(&set(&[]), &set(&[1, 2, 3]));
        assert_eq!(result.to_add, set(&[1, 2, 3]));
        assert!(result.to_remove.is_empty());
    }

    #[test]
    fn test_diff_empty_desired_removes_everything() {
        let result = diff(&set(&[4, 5]), &set(&[]));
        assert!(result.to_add.is_empty());
        assert_eq!(result.to_remove, set(&[4, 5]));
    }

    #[test]
    fn test_diff_overlap_leaves_common_members_alone() {
        let result = diff(&set(&[1, 2, 3]), &set(&[2, 3, 4, 5]));
        assert_eq!(result.to_add, set(&[4, 5]));
        assert_eq!(result.to_remove, set(&[1]));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_operations_order() {
        let result = diff(&set(&[1, 9]), &set(&[2, 9]));
        assert_eq!(
            result.operations(),
            vec![
                MembershipOperation::Remove(AnimalId(1)),
                MembershipOperation::Add(AnimalId(2)),
            ]
        );
    }

    #[test]
    fn test_apply_to_reaches_desired() {
        let original = set(&[1, 2, 3]);
        let desired = set(&[3, 4]);
        let result = diff(&original, &desired);
        assert_eq!(result.apply_to(&original), desired);
        assert!(diff(&desired, &desired).is_empty());
    }
}
