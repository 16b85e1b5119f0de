//! Integration tests for credential checks on retrieval and metadata reads

mod common;

use std::time::Duration;

use ::common::capability::{CapabilityAuthority, CapabilityError};
use ::common::crypto::{Secret, SigningSecret};
use ::common::custody::{CustodyError, ObjectRepository};
use ::common::testkit::TestCustody;
use time::OffsetDateTime;

#[tokio::test]
async fn test_credential_for_other_object_rejected_before_lookup() {
    let env = TestCustody::with_repository(common::CountingRepository::default())
        .await
        .unwrap();

    let a = env.upload("a.txt", b"object a", None).await.unwrap();
    let b = env.upload("b.txt", b"object b", None).await.unwrap();
    let calls_before = env.custody.repository().calls();

    let result = env
        .custody
        .retrieve(b.object_id, &a.credential, &env.cancel)
        .await;
    assert!(matches!(result, Err(CustodyError::ObjectMismatch)));

    let result = env.custody.metadata(b.object_id, &a.credential).await;
    assert!(matches!(result, Err(CustodyError::ObjectMismatch)));

    let result = env
        .custody
        .delete(b.object_id, &a.credential, &env.cancel)
        .await;
    assert!(matches!(result, Err(CustodyError::ObjectMismatch)));

    assert_eq!(env.custody.repository().calls(), calls_before);

    // B is untouched
    let object = env
        .custody
        .retrieve(b.object_id, &b.credential, &env.cancel)
        .await
        .unwrap();
    assert_eq!(object.content, b"object b");
}

#[tokio::test]
async fn test_expired_credential() {
    let env = common::setup_test_env().await;
    let receipt = env.upload("old.txt", b"stale", None).await.unwrap();

    let key = Secret::generate().unwrap();
    let an_hour_ago = OffsetDateTime::now_utc() - time::Duration::hours(1);
    let expired = env
        .custody
        .authority()
        .issue_at(&receipt.object_id.to_string(), &key, None, an_hour_ago)
        .unwrap();

    let result = env
        .custody
        .retrieve(receipt.object_id, &expired, &env.cancel)
        .await;
    assert!(matches!(result, Err(CustodyError::CredentialExpired)));
    assert!(result.unwrap_err().is_authorization());
}

#[tokio::test]
async fn test_credential_from_another_authority_rejected() {
    let env = common::setup_test_env().await;
    let receipt = env.upload("a.txt", b"data", None).await.unwrap();

    let rogue = CapabilityAuthority::new(
        SigningSecret::from_bytes(b"not-the-server-secret".to_vec()).unwrap(),
        Duration::from_secs(900),
    )
    .unwrap();
    let key = Secret::generate().unwrap();
    let forged = rogue
        .issue(&receipt.object_id.to_string(), &key, None)
        .unwrap();

    let result = env
        .custody
        .retrieve(receipt.object_id, &forged, &env.cancel)
        .await;
    assert!(matches!(
        result,
        Err(CustodyError::CredentialInvalid(
            CapabilityError::InvalidSignature
        ))
    ));
}

#[tokio::test]
async fn test_garbage_credential_rejected() {
    let env = common::setup_test_env().await;
    let receipt = env.upload("a.txt", b"data", None).await.unwrap();

    for credential in ["", "not-a-token", "a.b.c"] {
        let result = env.custody.metadata(receipt.object_id, credential).await;
        assert!(matches!(result, Err(CustodyError::CredentialInvalid(_))));
    }
}

#[tokio::test]
async fn test_wrong_key_is_decryption_failure() {
    let env = common::setup_test_env().await;
    let receipt = env.upload("a.txt", b"data", None).await.unwrap();

    // Genuinely signed, right object, wrong key
    let wrong_key = Secret::generate().unwrap();
    let credential = env
        .custody
        .authority()
        .issue(&receipt.object_id.to_string(), &wrong_key, None)
        .unwrap();

    let result = env
        .custody
        .retrieve(receipt.object_id, &credential, &env.cancel)
        .await;
    assert!(matches!(result, Err(CustodyError::DecryptionFailed)));

    // Metadata does not need the key
    let metadata = env
        .custody
        .metadata(receipt.object_id, &credential)
        .await
        .unwrap();
    assert_eq!(metadata.id, receipt.object_id);
}

#[tokio::test]
async fn test_vanished_blob_is_not_found() {
    let env = common::setup_test_env().await;
    let receipt = env.upload("a.txt", b"data", None).await.unwrap();

    let record = env
        .custody
        .repository()
        .find(receipt.object_id)
        .await
        .unwrap()
        .unwrap();
    env.custody
        .store()
        .delete(&record.locator, &env.cancel)
        .await
        .unwrap();

    let result = env
        .custody
        .retrieve(receipt.object_id, &receipt.credential, &env.cancel)
        .await;
    assert!(matches!(result, Err(CustodyError::NotFound(id)) if id == receipt.object_id));
}
