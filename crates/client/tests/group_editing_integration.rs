//! Integration tests for group editing against the in-memory backend.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::{create_test_client, test_animal, test_farm, test_group};
use farm_manager_client::domain::models::{AnimalId, GroupId, MembershipOperation};
use farm_manager_client::error::EditorError;
use farm_manager_client::remote::{MockFarmApi, MockRequest};
use farm_manager_client::services::{BatchMutationExecutor, SaveOutcome};

fn ids(values: &[i64]) -> BTreeSet<AnimalId> {
    values.iter().copied().map(AnimalId).collect()
}

// ============================================================================
// Batch Execution Tests
// ============================================================================

#[tokio::test]
async fn test_three_operations_with_second_failing() {
    let api = Arc::new(
        MockFarmApi::new()
            .with_animals([test_animal(1, None), test_animal(2, None), test_animal(3, Some(10))])
            .with_groups([test_group(10)])
            .fail_animal(AnimalId(2)),
    );
    let executor = BatchMutationExecutor::new(api.clone());

    let ops = [
        MembershipOperation::Add(AnimalId(1)),
        MembershipOperation::Add(AnimalId(2)),
        MembershipOperation::Remove(AnimalId(3)),
    ];
    let result = executor.apply(GroupId(10), &ops).await;

    assert!(!result.all_succeeded());
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].0, MembershipOperation::Add(AnimalId(2)));
    assert_eq!(result.succeeded, 2);

    let writes = api.writes().await;
    assert_eq!(writes.len(), 3);
    assert!(writes.contains(&MockRequest::ChangeAnimalGroup {
        animal_id: AnimalId(2),
        group_id: Some(GroupId(10)),
    }));

    assert_eq!(api.group_of(AnimalId(1)).await, Some(Some(GroupId(10))));
    assert_eq!(api.group_of(AnimalId(2)).await, Some(None));
    assert_eq!(api.group_of(AnimalId(3)).await, Some(None));
}

// ============================================================================
// Edit Session Tests
// ============================================================================

#[tokio::test]
async fn test_edit_sends_only_the_difference() {
    let (api, mut client) = create_test_client(test_farm()).await;

    let edit = client.groups.begin_edit(&client.store, GroupId(10)).unwrap();
    edit.set_members([AnimalId(1), AnimalId(2), AnimalId(6)]);
    let outcome = client.groups.save(&mut client.store).await.unwrap();

    assert!(matches!(
        outcome,
        SaveOutcome::Saved {
            added: 1,
            removed: 1,
            renamed: false,
            ..
        }
    ));

    let mut changes: Vec<MockRequest> = api
        .writes()
        .await
        .into_iter()
        .filter(|w| matches!(w, MockRequest::ChangeAnimalGroup { .. }))
        .collect();
    changes.sort_by_key(|w| match w {
        MockRequest::ChangeAnimalGroup { animal_id, .. } => *animal_id,
        _ => AnimalId(0),
    });
    assert_eq!(
        changes,
        vec![
            MockRequest::ChangeAnimalGroup {
                animal_id: AnimalId(3),
                group_id: None,
            },
            MockRequest::ChangeAnimalGroup {
                animal_id: AnimalId(6),
                group_id: Some(GroupId(10)),
            },
        ]
    );

    assert_eq!(client.store.members_of(GroupId(10)), Some(&ids(&[1, 2, 6])));
}

#[tokio::test]
async fn test_moving_an_animal_between_groups() {
    let (api, mut client) = create_test_client(test_farm()).await;

    client
        .groups
        .begin_edit(&client.store, GroupId(20))
        .unwrap()
        .add_member(AnimalId(1));
    client.groups.save(&mut client.store).await.unwrap();

    assert_eq!(api.group_of(AnimalId(1)).await, Some(Some(GroupId(20))));
    assert_eq!(client.store.members_of(GroupId(10)), Some(&ids(&[2, 3])));
    assert_eq!(client.store.members_of(GroupId(20)), Some(&ids(&[1, 4, 5])));
}

#[tokio::test]
async fn test_emptying_a_group_keeps_the_record() {
    let (api, mut client) = create_test_client(test_farm()).await;

    client
        .groups
        .begin_edit(&client.store, GroupId(20))
        .unwrap()
        .set_members([]);
    client.groups.save(&mut client.store).await.unwrap();

    assert!(api.group_record(GroupId(20)).await.is_some());
    assert_eq!(client.store.members_of(GroupId(20)), Some(&BTreeSet::new()));
    assert_eq!(client.store.ungrouped_animals().len(), 5);
}

#[tokio::test]
async fn test_create_group_with_members() {
    let (_api, mut client) = create_test_client(test_farm()).await;

    let edit = client.groups.begin_create().unwrap();
    edit.set_name("Weaned lambs");
    edit.toggle_member(AnimalId(7));
    edit.toggle_member(AnimalId(8));
    let outcome = client.groups.save(&mut client.store).await.unwrap();

    let SaveOutcome::Saved {
        group_id,
        created: true,
        ..
    } = outcome
    else {
        panic!("Unexpected outcome {:?}", outcome);
    };
    assert_eq!(client.store.group_name(group_id), Some("Weaned lambs"));
    assert_eq!(client.store.members_of(group_id), Some(&ids(&[7, 8])));
}

#[tokio::test]
async fn test_partial_failure_refetches_mixed_state() {
    let (api, mut client) = create_test_client(test_farm().fail_animal(AnimalId(7))).await;

    let edit = client.groups.begin_edit(&client.store, GroupId(10)).unwrap();
    edit.set_name("Lactating ewes");
    edit.add_member(AnimalId(6));
    edit.add_member(AnimalId(7));
    edit.remove_member(AnimalId(1));
    let outcome = client.groups.save(&mut client.store).await.unwrap();

    assert_eq!(
        outcome,
        SaveOutcome::PartiallyApplied {
            group_id: GroupId(10),
            succeeded: 2,
            failed: vec![MembershipOperation::Add(AnimalId(7))],
            refreshed: true,
        }
    );
    assert!(!client.groups.is_editing());

    // The store shows what the server holds, not what was requested.
    assert_eq!(client.store.members_of(GroupId(10)), Some(&ids(&[2, 3, 6])));
    assert_eq!(client.store.group_name(GroupId(10)), Some("Lactating ewes"));
    let calls = api.calls().await;
    assert!(calls.contains(&MockRequest::UpdateGroup {
        group_id: GroupId(10),
        name: "Lactating ewes".to_string(),
    }));
    assert!(calls.contains(&MockRequest::ListAnimals));
}

#[tokio::test]
async fn test_cancel_then_edit_another_group() {
    let (api, mut client) = create_test_client(test_farm()).await;

    client
        .groups
        .begin_edit(&client.store, GroupId(10))
        .unwrap()
        .add_member(AnimalId(8));
    assert!(matches!(
        client.groups.begin_edit(&client.store, GroupId(20)),
        Err(EditorError::EditInProgress)
    ));

    client.groups.cancel().unwrap();
    client.groups.begin_edit(&client.store, GroupId(20)).unwrap();

    assert!(api.calls().await.is_empty());
    assert_eq!(client.store.members_of(GroupId(10)), Some(&ids(&[1, 2, 3])));
}
