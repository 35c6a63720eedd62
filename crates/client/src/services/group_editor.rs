//! Group create/edit sessions.
//!
//! At most one edit is live at a time. Saving renames or creates the group,
//! applies the membership diff through the batch executor and then refetches
//! animals and groups, whatever the batch outcome. When that refetch fails the
//! outcome says so, since the store then still holds the previous snapshot.

use validator::Validate;

use domain::models::group::{CreateGroupRequest, UpdateGroupRequest};
use domain::models::{GroupId, MembershipEdit, MembershipOperation};

use super::batch_mutation::BatchMutationExecutor;
use crate::error::EditorError;
use crate::store::FarmStore;

/// Result of [`GroupEditor::save`].
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Nothing differed from the committed state; no request was sent.
    NoChanges,
    /// Every write succeeded.
    Saved {
        group_id: GroupId,
        created: bool,
        renamed: bool,
        added: usize,
        removed: usize,
        /// False when the refetch failed and the store is stale.
        refreshed: bool,
    },
    /// Some membership changes failed. The server kept the ones that
    /// succeeded; the store reflects that mixed state only if `refreshed`.
    PartiallyApplied {
        group_id: GroupId,
        succeeded: usize,
        failed: Vec<MembershipOperation>,
        refreshed: bool,
    },
}

impl SaveOutcome {
    pub fn is_complete(&self) -> bool {
        !matches!(self, SaveOutcome::PartiallyApplied { .. })
    }

    /// True when writes were sent but the store could not be refetched.
    /// The view must not present the store as the server's state.
    pub fn is_stale(&self) -> bool {
        match self {
            SaveOutcome::NoChanges => false,
            SaveOutcome::Saved { refreshed, .. }
            | SaveOutcome::PartiallyApplied { refreshed, .. } => !refreshed,
        }
    }
}

pub struct GroupEditor {
    executor: BatchMutationExecutor,
    edit: Option<MembershipEdit>,
}

impl GroupEditor {
    pub fn new(executor: BatchMutationExecutor) -> Self {
        Self {
            executor,
            edit: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    pub fn edit(&self) -> Option<&MembershipEdit> {
        self.edit.as_ref()
    }

    /// Starts editing a group known to `store`.
    pub fn begin_edit(
        &mut self,
        store: &FarmStore,
        group_id: GroupId,
    ) -> Result<&mut MembershipEdit, EditorError> {
        if self.edit.is_some() {
            return Err(EditorError::EditInProgress);
        }
        let group = store
            .group(group_id)
            .ok_or(EditorError::GroupNotFound(group_id))?;

        tracing::debug!(group_id = %group_id, members = group.member_count(), "Group edit started");
        Ok(self.edit.insert(MembershipEdit::for_group(group)))
    }

    /// Starts building a new group.
    pub fn begin_create(&mut self) -> Result<&mut MembershipEdit, EditorError> {
        if self.edit.is_some() {
            return Err(EditorError::EditInProgress);
        }
        tracing::debug!("Group creation started");
        Ok(self.edit.insert(MembershipEdit::for_new_group()))
    }

    pub fn edit_mut(&mut self) -> Result<&mut MembershipEdit, EditorError> {
        self.edit.as_mut().ok_or(EditorError::NoActiveEdit)
    }

    /// Discards the live edit. Nothing is sent.
    pub fn cancel(&mut self) -> Result<(), EditorError> {
        match self.edit.take() {
            Some(edit) => {
                tracing::debug!(group_id = ?edit.group_id(), "Group edit cancelled");
                Ok(())
            }
            None => Err(EditorError::NoActiveEdit),
        }
    }

    /// Persists the live edit and refreshes `store`.
    ///
    /// A validation error or a failed rename/create leaves the edit live so
    /// it can be corrected and saved again; no membership change has been
    /// sent at that point. Once membership changes are dispatched the edit
    /// is always closed, even when some of them failed.
    pub async fn save(&mut self, store: &mut FarmStore) -> Result<SaveOutcome, EditorError> {
        let edit = self.edit.as_ref().ok_or(EditorError::NoActiveEdit)?;

        if !edit.has_changes() {
            self.edit = None;
            return Ok(SaveOutcome::NoChanges);
        }

        let name = edit.pending().name.trim().to_string();
        let api = self.executor.api();

        let (group_id, created, renamed) = match edit.group_id() {
            Some(group_id) => {
                let renamed = edit.name_changed();
                if renamed {
                    let request = UpdateGroupRequest {
                        name,
                        description: store
                            .group(group_id)
                            .and_then(|group| group.description.clone()),
                    };
                    request.validate()?;
                    api.update_group(group_id, &request).await?;
                }
                (group_id, false, renamed)
            }
            None => {
                let request = CreateGroupRequest {
                    name,
                    description: None,
                };
                request.validate()?;
                let record = api.create_group(&request).await?;
                tracing::info!(group_id = %record.id, name = %record.name, "Group created");
                (record.id, true, false)
            }
        };

        let diff = edit.diff();
        let operations = diff.operations();
        let result = self.executor.apply(group_id, &operations).await;

        let refreshed = match store.refresh_memberships(api).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    group_id = %group_id,
                    error = %e,
                    "Refetch after group save failed; store is stale"
                );
                false
            }
        };
        self.edit = None;

        if result.all_succeeded() {
            Ok(SaveOutcome::Saved {
                group_id,
                created,
                renamed,
                added: diff.to_add.len(),
                removed: diff.to_remove.len(),
                refreshed,
            })
        } else {
            tracing::warn!(
                batch_id = %result.batch_id,
                group_id = %group_id,
                failed = result.failed(),
                "Group saved with failed membership changes"
            );
            Ok(SaveOutcome::PartiallyApplied {
                group_id,
                succeeded: result.succeeded,
                failed: result.failed_operations().copied().collect(),
                refreshed,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::remote::{MockFarmApi, MockRequest};
    use domain::models::{Animal, AnimalId, Gender, GroupRecord};
    use std::sync::Arc;

    fn animal(id: i64, group: Option<i64>) -> Animal {
        Animal {
            id: AnimalId(id),
            gender: Gender::Female,
            group_id: group.map(GroupId),
            birth_date: None,
            farm_id: Some(1),
        }
    }

    fn mock() -> MockFarmApi {
        MockFarmApi::new()
            .with_animals([
                animal(1, Some(10)),
                animal(2, Some(10)),
                animal(3, None),
                animal(4, None),
            ])
            .with_groups([GroupRecord {
                id: GroupId(10),
                name: "Lactating".to_string(),
                description: Some("Milking herd".to_string()),
            }])
    }

    async fn setup(api: MockFarmApi) -> (Arc<MockFarmApi>, GroupEditor, FarmStore) {
        let api = Arc::new(api);
        let mut store = FarmStore::new();
        store.refresh_memberships(api.as_ref()).await.unwrap();
        api.clear_calls().await;
        let editor = GroupEditor::new(BatchMutationExecutor::new(api.clone()));
        (api, editor, store)
    }

    #[tokio::test]
    async fn test_begin_edit_guards() {
        let (_api, mut editor, store) = setup(mock()).await;

        assert!(matches!(
            editor.begin_edit(&store, GroupId(99)),
            Err(EditorError::GroupNotFound(GroupId(99)))
        ));
        assert!(matches!(editor.edit_mut(), Err(EditorError::NoActiveEdit)));

        editor.begin_edit(&store, GroupId(10)).unwrap();
        assert!(matches!(
            editor.begin_create(),
            Err(EditorError::EditInProgress)
        ));
        assert!(matches!(
            editor.begin_edit(&store, GroupId(10)),
            Err(EditorError::EditInProgress)
        ));
    }

    #[tokio::test]
    async fn test_cancel_sends_nothing() {
        let (api, mut editor, store) = setup(mock()).await;

        editor.begin_edit(&store, GroupId(10)).unwrap().add_member(AnimalId(3));
        editor.cancel().unwrap();

        assert!(!editor.is_editing());
        assert!(api.calls().await.is_empty());
        assert!(matches!(editor.cancel(), Err(EditorError::NoActiveEdit)));
    }

    #[tokio::test]
    async fn test_save_without_changes() {
        let (api, mut editor, mut store) = setup(mock()).await;

        editor.begin_edit(&store, GroupId(10)).unwrap();
        let outcome = editor.save(&mut store).await.unwrap();

        assert_eq!(outcome, SaveOutcome::NoChanges);
        assert!(!editor.is_editing());
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_membership_only_skips_rename() {
        let (api, mut editor, mut store) = setup(mock()).await;

        let edit = editor.begin_edit(&store, GroupId(10)).unwrap();
        edit.remove_member(AnimalId(2));
        edit.add_member(AnimalId(3));
        let outcome = editor.save(&mut store).await.unwrap();

        assert_eq!(
            outcome,
            SaveOutcome::Saved {
                group_id: GroupId(10),
                created: false,
                renamed: false,
                added: 1,
                removed: 1,
                refreshed: true,
            }
        );
        assert!(!api
            .writes()
            .await
            .iter()
            .any(|call| matches!(call, MockRequest::UpdateGroup { .. })));

        let members: Vec<_> = store.members_of(GroupId(10)).unwrap().iter().copied().collect();
        assert_eq!(members, vec![AnimalId(1), AnimalId(3)]);
    }

    #[tokio::test]
    async fn test_rename_keeps_description() {
        let (api, mut editor, mut store) = setup(mock()).await;

        editor.begin_edit(&store, GroupId(10)).unwrap().set_name("  Milking  ");
        editor.save(&mut store).await.unwrap();

        let record = api.group_record(GroupId(10)).await.unwrap();
        assert_eq!(record.name, "Milking");
        assert_eq!(record.description.as_deref(), Some("Milking herd"));
        assert_eq!(store.group_name(GroupId(10)), Some("Milking"));
    }

    #[tokio::test]
    async fn test_invalid_name_keeps_edit_live() {
        let (api, mut editor, mut store) = setup(mock()).await;

        editor.begin_edit(&store, GroupId(10)).unwrap().set_name("   ");
        let err = editor.save(&mut store).await.unwrap_err();

        assert!(matches!(err, EditorError::Client(ClientError::Validation(_))));
        assert!(editor.is_editing());
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_rename_sends_no_membership_changes() {
        let (api, mut editor, mut store) = setup(mock().fail_request("update_group")).await;

        let edit = editor.begin_edit(&store, GroupId(10)).unwrap();
        edit.set_name("Dry");
        edit.add_member(AnimalId(4));

        assert!(editor.save(&mut store).await.is_err());
        assert!(editor.is_editing());
        assert_eq!(api.writes().await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_group_then_assign_members() {
        let (api, mut editor, mut store) = setup(mock()).await;

        let edit = editor.begin_create().unwrap();
        edit.set_name("Weaned");
        edit.set_members([AnimalId(3), AnimalId(4)]);
        let outcome = editor.save(&mut store).await.unwrap();

        let group_id = match outcome {
            SaveOutcome::Saved {
                group_id,
                created: true,
                added: 2,
                removed: 0,
                ..
            } => group_id,
            other => panic!("Unexpected outcome {:?}", other),
        };

        let writes = api.writes().await;
        assert_eq!(
            writes[0],
            MockRequest::CreateGroup {
                name: "Weaned".to_string()
            }
        );
        assert_eq!(writes.len(), 3);
        assert_eq!(store.members_of(group_id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_partial_failure_closes_edit_and_refetches() {
        let (api, mut editor, mut store) = setup(mock().fail_animal(AnimalId(3))).await;

        let edit = editor.begin_edit(&store, GroupId(10)).unwrap();
        edit.add_member(AnimalId(3));
        edit.add_member(AnimalId(4));
        let outcome = editor.save(&mut store).await.unwrap();

        assert_eq!(
            outcome,
            SaveOutcome::PartiallyApplied {
                group_id: GroupId(10),
                succeeded: 1,
                failed: vec![MembershipOperation::Add(AnimalId(3))],
                refreshed: true,
            }
        );
        assert!(!outcome.is_complete());
        assert!(!outcome.is_stale());
        assert!(!editor.is_editing());

        let calls = api.calls().await;
        assert!(calls.contains(&MockRequest::ListAnimals));
        assert!(calls.contains(&MockRequest::ListGroups));
        assert!(store.group(GroupId(10)).unwrap().contains(AnimalId(4)));
        assert!(!store.group(GroupId(10)).unwrap().contains(AnimalId(3)));
    }

    #[tokio::test]
    async fn test_failed_refetch_marks_outcome_stale() {
        // Load the store from a healthy backend, then save against one whose
        // animal listing fails.
        let mut store = FarmStore::new();
        store.refresh_memberships(&mock()).await.unwrap();
        let loaded_at = store.refreshed_at();

        let api = Arc::new(
            mock()
                .fail_animal(AnimalId(3))
                .fail_request("list_animals"),
        );
        let mut editor = GroupEditor::new(BatchMutationExecutor::new(api.clone()));

        let edit = editor.begin_edit(&store, GroupId(10)).unwrap();
        edit.add_member(AnimalId(3));
        edit.add_member(AnimalId(4));
        let outcome = editor.save(&mut store).await.unwrap();

        assert_eq!(
            outcome,
            SaveOutcome::PartiallyApplied {
                group_id: GroupId(10),
                succeeded: 1,
                failed: vec![MembershipOperation::Add(AnimalId(3))],
                refreshed: false,
            }
        );
        assert!(outcome.is_stale());
        assert!(!editor.is_editing());

        // The server moved animal 4; the store still shows the old snapshot.
        assert_eq!(api.group_of(AnimalId(4)).await, Some(Some(GroupId(10))));
        assert!(!store.group(GroupId(10)).unwrap().contains(AnimalId(4)));
        assert_eq!(store.refreshed_at(), loaded_at);
    }

    #[tokio::test]
    async fn test_successful_save_with_failed_refetch_is_stale() {
        let mut store = FarmStore::new();
        store.refresh_memberships(&mock()).await.unwrap();

        let api = Arc::new(mock().fail_request("list_groups"));
        let mut editor = GroupEditor::new(BatchMutationExecutor::new(api));

        editor
            .begin_edit(&store, GroupId(10))
            .unwrap()
            .remove_member(AnimalId(2));
        let outcome = editor.save(&mut store).await.unwrap();

        assert!(outcome.is_complete());
        assert!(outcome.is_stale());
        assert!(matches!(
            outcome,
            SaveOutcome::Saved {
                removed: 1,
                refreshed: false,
                ..
            }
        ));
    }
}
