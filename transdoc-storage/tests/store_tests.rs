//! Tests for the in-memory reference collaborator.

use pretty_assertions::assert_eq;
use transdoc_model::{address, Address};
use transdoc_storage::{AuthStore, EntityOps, MemAuthStore, MemTable, StorageError};
use transdoc_types::Id;

fn address(id: &str, city: &str) -> Address {
    Address {
        id: Id::new(id),
        name: None,
        street_name: "Lindenallee".into(),
        house_number: "3".into(),
        country: "DE".into(),
        post_code: "50667".into(),
        city: city.into(),
    }
}

#[tokio::test]
async fn create_get_roundtrip_with_version() {
    let table: MemTable<Address> = MemTable::new();
    table.create(address("a-1", "Köln")).await.unwrap();

    let stored = table.get("a-1").await.unwrap().unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.record.city, "Köln");

    assert!(table.get("a-2").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_create_is_rejected() {
    let table: MemTable<Address> = MemTable::new();
    table.create(address("a-1", "Köln")).await.unwrap();

    let err = table.create(address("a-1", "Bonn")).await.unwrap_err();
    assert!(matches!(err, StorageError::DuplicateId { .. }));
}

#[tokio::test]
async fn compare_and_swap_detects_stale_writers() {
    let table: MemTable<Address> = MemTable::new();
    table.create(address("a-1", "Köln")).await.unwrap();

    // Both writers read version 1.
    let v = table.get("a-1").await.unwrap().unwrap().version;

    table.update(v, address("a-1", "Bonn")).await.unwrap();

    // The second writer is stale now.
    let err = table.update(v, address("a-1", "Essen")).await.unwrap_err();
    match err {
        StorageError::Conflict {
            expected, actual, ..
        } => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("expected Conflict, got: {other:?}"),
    }

    // The winner's write survived untouched.
    let stored = table.get("a-1").await.unwrap().unwrap();
    assert_eq!(stored.record.city, "Bonn");
}

#[tokio::test]
async fn get_list_preserves_insertion_order() {
    let table: MemTable<Address> = MemTable::new();
    for (id, city) in [("a-1", "Köln"), ("a-2", "Bonn"), ("a-3", "Köln")] {
        table.create(address(id, city)).await.unwrap();
    }

    let all = table.get_list(&address::Filter::default()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|a| a.id.value().to_string()).collect();
    assert_eq!(ids, vec!["a-1", "a-2", "a-3"]);

    let koeln = table
        .get_list(&address::Filter {
            city: Some("köln".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(koeln.len(), 2, "ASCII letters fold, umlauts match byte-wise");

    let bonn = table
        .get_list(&address::Filter {
            city: Some("Bonn".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(bonn.len(), 1);
}

#[tokio::test]
async fn delete_removes_from_listing() {
    let table: MemTable<Address> = MemTable::new();
    table.create(address("a-1", "Köln")).await.unwrap();
    table.create(address("a-2", "Bonn")).await.unwrap();

    table.delete("a-1").await.unwrap();
    let err = table.delete("a-1").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));

    let all = table.get_list(&address::Filter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn auth_store_verifies_without_revealing_existence() {
    let auth = MemAuthStore::new();
    let user_id: Id<transdoc_model::User> = Id::generate();
    auth.put_credentials("doc.weber", "correct horse", user_id.clone())
        .await
        .unwrap();

    assert_eq!(
        auth.verify("doc.weber", "correct horse").await.unwrap(),
        Some(user_id)
    );
    // Wrong password and unknown user are indistinguishable.
    assert_eq!(auth.verify("doc.weber", "wrong").await.unwrap(), None);
    assert_eq!(auth.verify("nobody", "wrong").await.unwrap(), None);
}

#[tokio::test]
async fn auth_store_rejects_taken_names() {
    let auth = MemAuthStore::new();
    auth.put_credentials("doc.weber", "pw1", Id::generate())
        .await
        .unwrap();

    let err = auth
        .put_credentials("doc.weber", "pw2", Id::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::UserNameTaken { .. }));
}

#[tokio::test]
async fn credentials_update_requires_old_pair() {
    let auth = MemAuthStore::new();
    let user_id: Id<transdoc_model::User> = Id::generate();
    auth.put_credentials("doc.weber", "old-pw", user_id.clone())
        .await
        .unwrap();

    // Wrong old password: no change applied.
    let changed = auth
        .update_credentials("doc.weber", "dr.weber", "bad", "new-pw")
        .await
        .unwrap();
    assert!(!changed);
    assert!(auth.verify("doc.weber", "old-pw").await.unwrap().is_some());

    let changed = auth
        .update_credentials("doc.weber", "dr.weber", "old-pw", "new-pw")
        .await
        .unwrap();
    assert!(changed);
    assert_eq!(auth.verify("dr.weber", "new-pw").await.unwrap(), Some(user_id));
    assert!(auth.verify("doc.weber", "old-pw").await.unwrap().is_none());
}
