//! Integration tests for listing objects by owner

mod common;

use ::common::custody::CustodyError;

#[tokio::test]
async fn test_list_by_owner() {
    let env = common::setup_test_env().await;

    let first = env.upload("1.txt", b"one", Some("alice")).await.unwrap();
    let second = env.upload("2.txt", b"two", Some("alice")).await.unwrap();
    env.upload("3.txt", b"three", Some("bob")).await.unwrap();
    env.upload("4.txt", b"four", None).await.unwrap();

    let listed = env.custody.list_by_owner("alice").await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.object_id);
    assert_eq!(listed[1].id, first.object_id);
    assert!(listed
        .iter()
        .all(|m| m.owner_id.as_deref() == Some("alice")));

    env.custody
        .delete(second.object_id, &second.credential, &env.cancel)
        .await
        .unwrap();
    let listed = env.custody.list_by_owner("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].original_name, "1.txt");

    assert!(env.custody.list_by_owner("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_requires_owner() {
    let env = common::setup_test_env().await;
    let result = env.custody.list_by_owner("").await;
    assert!(matches!(result, Err(CustodyError::Validation(_))));
}
