//! Integration tests for the identity lifecycle: create, restore, update,
//! and soft delete.

mod helpers;

use std::time::Duration;

use uuid::Uuid;

use gatehouse_core::error::ErrorKind;
use gatehouse_service::identity::{CreateIdentityRequest, UpdateIdentityRequest};

#[tokio::test]
async fn test_create_identity_with_roles() {
    let app = helpers::TestApp::new().await;

    let super_admin = app.super_admin_role_id().await;
    let identity = app
        .create_identity(
            &helpers::unique_username("creator"),
            &helpers::unique_email("creator"),
            vec![super_admin],
        )
        .await;

    assert!(identity.is_active);
    assert!(!identity.is_deleted);
    assert_eq!(identity.roles.len(), 1);
    assert!(!identity.roles[0].permissions.is_empty());
}

#[tokio::test]
async fn test_create_duplicate_email_fails_case_insensitively() {
    let app = helpers::TestApp::new().await;

    let email = helpers::unique_email("dup");
    app.create_identity(&helpers::unique_username("dup"), &email, vec![])
        .await;

    let err = app
        .lifecycle
        .create(CreateIdentityRequest {
            username: helpers::unique_username("dup2"),
            email: email.to_uppercase(),
            password: helpers::TEST_PASSWORD.to_string(),
            role_ids: vec![],
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::DuplicateEmail);
}

#[tokio::test]
async fn test_create_restores_soft_deleted_identity() {
    let app = helpers::TestApp::new().await;

    let email = helpers::unique_email("phoenix");
    let original = app
        .create_identity(&helpers::unique_username("first"), &email, vec![])
        .await;

    app.lifecycle
        .delete(original.id, None)
        .await
        .expect("Delete failed");

    let new_username = helpers::unique_username("second");
    let restored = app
        .lifecycle
        .create(CreateIdentityRequest {
            username: new_username.clone(),
            email: email.clone(),
            password: helpers::TEST_PASSWORD.to_string(),
            role_ids: vec![],
        })
        .await
        .expect("Restore-on-create failed");

    // Same row, new occupant: original ID, updated username, cleared markers.
    assert_eq!(restored.id, original.id);
    assert_eq!(restored.username, new_username);
    assert!(restored.is_active);
    assert!(!restored.is_deleted);
    assert!(restored.deleted_at.is_none());
    assert!(restored.deleted_by.is_none());

    let fetched = app.lifecycle.get(original.id).await.unwrap();
    assert_eq!(fetched.username, new_username);
    assert!(fetched.refresh_token.is_none());
}

#[tokio::test]
async fn test_delete_twice_fails_not_found() {
    let app = helpers::TestApp::new().await;

    let identity = app
        .create_identity(
            &helpers::unique_username("gone"),
            &helpers::unique_email("gone"),
            vec![],
        )
        .await;

    app.lifecycle
        .delete(identity.id, None)
        .await
        .expect("First delete failed");

    let err = app.lifecycle.delete(identity.id, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_deleted_row_is_retained_for_audit() {
    let app = helpers::TestApp::new().await;

    let email = helpers::unique_email("audit");
    let actor = Uuid::new_v4();
    let identity = app
        .create_identity(&helpers::unique_username("audit"), &email, vec![])
        .await;

    app.lifecycle
        .delete(identity.id, Some(actor))
        .await
        .expect("Delete failed");

    // Invisible in the active scope...
    let err = app.lifecycle.get(identity.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // ...but still present in the table with its deletion markers.
    let row = app
        .identity_repo
        .find_by_email_any_state(&email)
        .await
        .unwrap()
        .expect("Soft-deleted row should remain");
    assert!(row.is_deleted);
    assert!(row.deleted_at.is_some());
    assert_eq!(row.deleted_by, Some(actor));
}

#[tokio::test]
async fn test_update_email_conflict_and_own_email_recase() {
    let app = helpers::TestApp::new().await;

    let email_a = helpers::unique_email("holder");
    let email_b = helpers::unique_email("mover");
    app.create_identity(&helpers::unique_username("holder"), &email_a, vec![])
        .await;
    let b = app
        .create_identity(&helpers::unique_username("mover"), &email_b, vec![])
        .await;

    // Moving onto another active identity's email fails.
    let err = app
        .lifecycle
        .update(
            b.id,
            UpdateIdentityRequest {
                username: b.username.clone(),
                email: email_a.clone(),
                is_active: true,
                role_ids: vec![],
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateEmail);

    // Re-casing one's own email succeeds.
    let updated = app
        .lifecycle
        .update(
            b.id,
            UpdateIdentityRequest {
                username: b.username.clone(),
                email: email_b.to_uppercase(),
                is_active: true,
                role_ids: vec![],
            },
        )
        .await
        .expect("Own-email recase should succeed");
    assert_eq!(updated.email, email_b.to_uppercase());
}

#[tokio::test]
async fn test_update_replaces_role_set() {
    let app = helpers::TestApp::new().await;

    let super_admin = app.super_admin_role_id().await;
    let email = helpers::unique_email("demote");
    let identity = app
        .create_identity(
            &helpers::unique_username("demote"),
            &email,
            vec![super_admin],
        )
        .await;
    assert_eq!(identity.roles.len(), 1);

    let updated = app
        .lifecycle
        .update(
            identity.id,
            UpdateIdentityRequest {
                username: identity.username.clone(),
                email: email.clone(),
                is_active: true,
                role_ids: vec![],
            },
        )
        .await
        .expect("Update failed");

    // Clear-then-reassign: the previous set is gone, not merged.
    assert!(updated.roles.is_empty());
    assert!(app.lifecycle.get(identity.id).await.unwrap().roles.is_empty());
}

#[tokio::test]
async fn test_update_unknown_identity_fails_not_found() {
    let app = helpers::TestApp::new().await;

    let err = app
        .lifecycle
        .update(
            Uuid::new_v4(),
            UpdateIdentityRequest {
                username: "nobody".into(),
                email: helpers::unique_email("nobody"),
                is_active: true,
                role_ids: vec![],
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unknown_role_ids_are_silently_dropped() {
    let app = helpers::TestApp::new().await;

    let identity = app
        .create_identity(
            &helpers::unique_username("roleless"),
            &helpers::unique_email("roleless"),
            vec![Uuid::new_v4(), Uuid::new_v4()],
        )
        .await;

    assert!(identity.roles.is_empty());
}

#[tokio::test]
async fn test_create_broadcasts_notification() {
    let app = helpers::TestApp::new().await;
    let mut rx = app.dispatcher.subscribe();

    let username = helpers::unique_username("announce");
    app.create_identity(&username, &helpers::unique_email("announce"), vec![])
        .await;

    let message = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("No notification within timeout")
        .expect("Notification channel closed");

    assert_eq!(
        message,
        format!("New user '{}' has been created.", username)
    );
}
