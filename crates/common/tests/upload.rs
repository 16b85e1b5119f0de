//! Integration tests for custody uploads

mod common;

use std::collections::HashSet;

use ::common::custody::{
    CustodyError, ObjectRepository, UploadRequest, AUTHENTICATION_ALG, ENCRYPTION_ALG,
};
use ::common::testkit::{TestCustody, TEST_TTL};
use object_store::StoreError;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_hello_roundtrip() {
    let env = common::setup_test_env().await;

    let receipt = env
        .custody
        .upload(
            UploadRequest {
                display_name: "hello.txt".to_string(),
                content: b"hello".to_vec(),
                content_type: "text/plain".to_string(),
                owner_id: Some("alice".to_string()),
            },
            &env.cancel,
        )
        .await
        .unwrap();

    assert_eq!(receipt.expires_in, TEST_TTL.as_secs());
    assert_eq!(receipt.size_bytes, 5);
    assert_eq!(receipt.content_type, "text/plain");
    assert_eq!(env.blob_count(), 1);

    let object = env
        .custody
        .retrieve(receipt.object_id, &receipt.credential, &env.cancel)
        .await
        .unwrap();
    assert_eq!(object.content, b"hello");
    assert_eq!(object.content_type, "text/plain");
    assert_eq!(object.display_name, "hello.txt");

    let metadata = env
        .custody
        .metadata(receipt.object_id, &receipt.credential)
        .await
        .unwrap();
    assert_eq!(metadata.id, receipt.object_id);
    assert_eq!(metadata.original_name, "hello.txt");
    assert_eq!(metadata.size_bytes, 5);
    assert_eq!(metadata.owner_id.as_deref(), Some("alice"));
    assert_eq!(metadata.encryption_alg, ENCRYPTION_ALG);
    assert_eq!(metadata.authentication_alg, AUTHENTICATION_ALG);
}

#[tokio::test]
async fn test_stored_blob_is_not_plaintext() {
    let env = common::setup_test_env().await;
    let plaintext = b"a very recognisable plaintext string";

    let receipt = env.upload("secret.txt", plaintext, None).await.unwrap();

    let record = env
        .custody
        .repository()
        .find(receipt.object_id)
        .await
        .unwrap()
        .unwrap();
    let blob = env
        .custody
        .store()
        .load_encrypted(&record.locator, &env.cancel)
        .await
        .unwrap();

    assert_ne!(blob.ciphertext, plaintext.to_vec());
    assert!(!blob
        .ciphertext
        .windows(plaintext.len())
        .any(|w| w == plaintext));
    assert!(!receipt.credential.contains("secret.txt"));
}

#[tokio::test]
async fn test_empty_file_roundtrip() {
    let env = common::setup_test_env().await;

    let receipt = env.upload("empty.txt", b"", None).await.unwrap();
    assert_eq!(receipt.size_bytes, 0);

    let object = env
        .custody
        .retrieve(receipt.object_id, &receipt.credential, &env.cancel)
        .await
        .unwrap();
    assert!(object.content.is_empty());
}

#[tokio::test]
async fn test_upload_validation() {
    let env = common::setup_test_env().await;

    for (name, content_type) in [("", "text/plain"), ("   ", "text/plain"), ("a.txt", "")] {
        let result = env
            .custody
            .upload(
                UploadRequest {
                    display_name: name.to_string(),
                    content: b"data".to_vec(),
                    content_type: content_type.to_string(),
                    owner_id: None,
                },
                &env.cancel,
            )
            .await;
        assert!(matches!(result, Err(CustodyError::Validation(_))));
    }

    let result = env.upload("a.txt", b"data", Some("")).await;
    assert!(matches!(result, Err(CustodyError::Validation(_))));

    assert_eq!(env.blob_count(), 0);
}

#[tokio::test]
async fn test_concurrent_uploads_are_distinct() {
    let env = common::setup_test_env().await;

    let mut handles = Vec::new();
    for i in 0..24 {
        let custody = env.custody.clone();
        let cancel = env.cancel.clone();
        handles.push(tokio::spawn(async move {
            custody
                .upload(
                    UploadRequest {
                        display_name: format!("file-{}.txt", i),
                        content: format!("content {}", i).into_bytes(),
                        content_type: "text/plain".to_string(),
                        owner_id: None,
                    },
                    &cancel,
                )
                .await
                .unwrap()
        }));
    }

    let mut ids = HashSet::new();
    let mut receipts = Vec::new();
    for handle in handles {
        let receipt = handle.await.unwrap();
        assert!(ids.insert(receipt.object_id));
        receipts.push(receipt);
    }

    let locators: HashSet<_> = env
        .custody
        .repository()
        .all_records()
        .into_iter()
        .map(|r| r.locator)
        .collect();
    assert_eq!(locators.len(), 24);
    assert_eq!(env.blob_count(), 24);

    // Every credential still opens exactly its own object
    for receipt in receipts {
        let object = env
            .custody
            .retrieve(receipt.object_id, &receipt.credential, &env.cancel)
            .await
            .unwrap();
        assert!(String::from_utf8(object.content)
            .unwrap()
            .starts_with("content "));
    }
}

#[tokio::test]
async fn test_repository_failure_removes_blob() {
    let env = TestCustody::with_repository(common::FailingRepository)
        .await
        .unwrap();

    let result = env.upload("orphan.txt", b"never recorded", None).await;
    assert!(matches!(result, Err(CustodyError::Repository(_))));
    assert_eq!(env.blob_count(), 0);
}

#[tokio::test]
async fn test_cancelled_upload_touches_nothing() {
    let env = common::setup_test_env().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = env
        .custody
        .upload(
            UploadRequest {
                display_name: "late.txt".to_string(),
                content: b"data".to_vec(),
                content_type: "text/plain".to_string(),
                owner_id: None,
            },
            &cancel,
        )
        .await;

    assert!(matches!(
        result,
        Err(CustodyError::Storage(StoreError::Cancelled))
    ));
    assert_eq!(env.blob_count(), 0);
    assert!(env.custody.repository().all_records().is_empty());
}
