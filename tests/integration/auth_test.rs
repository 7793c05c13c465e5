//! Integration tests for login, refresh, and authorization flows.

mod helpers;

use gatehouse_core::error::ErrorKind;
use gatehouse_database::seeding;
use gatehouse_service::identity::UpdateIdentityRequest;

#[tokio::test]
async fn test_login_returns_token_pair() {
    let app = helpers::TestApp::new().await;

    let tokens = app
        .auth
        .login(seeding::ADMIN_EMAIL, helpers::ADMIN_PASSWORD)
        .await
        .expect("Admin login failed");

    assert!(!tokens.access_token.is_empty());
    assert!(!tokens.refresh_token.is_empty());
    assert_eq!(tokens.email, seeding::ADMIN_EMAIL);
    assert_eq!(tokens.username, seeding::ADMIN_USERNAME);
}

#[tokio::test]
async fn test_login_failures_do_not_reveal_which_part_was_wrong() {
    let app = helpers::TestApp::new().await;

    let wrong_password = app
        .auth
        .login(seeding::ADMIN_EMAIL, "Wr0ng#Passw0rd")
        .await
        .unwrap_err();
    let unknown_email = app
        .auth
        .login(&helpers::unique_email("ghost"), helpers::ADMIN_PASSWORD)
        .await
        .unwrap_err();

    assert_eq!(wrong_password.kind, ErrorKind::InvalidCredentials);
    assert_eq!(unknown_email.kind, ErrorKind::InvalidCredentials);
    assert_eq!(wrong_password.message, unknown_email.message);
}

#[tokio::test]
async fn test_login_inactive_identity_rejected() {
    let app = helpers::TestApp::new().await;

    let email = helpers::unique_email("inactive");
    let identity = app
        .create_identity(&helpers::unique_username("inactive"), &email, vec![])
        .await;

    app.lifecycle
        .update(
            identity.id,
            UpdateIdentityRequest {
                username: identity.username.clone(),
                email: email.clone(),
                is_active: false,
                role_ids: vec![],
            },
        )
        .await
        .expect("Failed to deactivate identity");

    let err = app
        .auth
        .login(&email, helpers::TEST_PASSWORD)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::InactiveIdentity);
}

#[tokio::test]
async fn test_authorize_from_admin_credential() {
    let app = helpers::TestApp::new().await;

    let tokens = app
        .auth
        .login(seeding::ADMIN_EMAIL, helpers::ADMIN_PASSWORD)
        .await
        .expect("Admin login failed");

    let claims = app
        .verifier
        .verify(&tokens.access_token)
        .expect("Access credential should verify");

    assert_eq!(claims.email, seeding::ADMIN_EMAIL);
    assert!(app.evaluator.authorize(&claims, "User.Create"));
    assert!(!app.evaluator.authorize(&claims, "Billing.Manage"));
}

#[tokio::test]
async fn test_refresh_rotates_out_previous_token() {
    let app = helpers::TestApp::new().await;

    let email = helpers::unique_email("rotate");
    app.create_identity(&helpers::unique_username("rotate"), &email, vec![])
        .await;

    let first = app
        .auth
        .login(&email, helpers::TEST_PASSWORD)
        .await
        .expect("Login failed");

    let second = app
        .auth
        .refresh(&first.refresh_token)
        .await
        .expect("Refresh failed");

    assert_ne!(first.refresh_token, second.refresh_token);

    // The superseded token was overwritten by the rotation.
    let err = app.sessions.redeem(&first.refresh_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionInvalid);

    // The current token still redeems.
    assert!(app.sessions.redeem(&second.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_redeem_expired_session_fails() {
    let app = helpers::TestApp::new().await;

    let email = helpers::unique_email("expired");
    let identity = app
        .create_identity(&helpers::unique_username("expired"), &email, vec![])
        .await;

    let tokens = app
        .auth
        .login(&email, helpers::TEST_PASSWORD)
        .await
        .expect("Login failed");

    app.expire_refresh_session(identity.id).await;

    let err = app.auth.refresh(&tokens.refresh_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionInvalid);
}

#[tokio::test]
async fn test_refresh_recomputes_permissions_from_current_roles() {
    let app = helpers::TestApp::new().await;

    let email = helpers::unique_email("promote");
    let username = helpers::unique_username("promote");
    let identity = app.create_identity(&username, &email, vec![]).await;

    let before = app
        .auth
        .login(&email, helpers::TEST_PASSWORD)
        .await
        .expect("Login failed");

    // No roles: the permission claim is empty and authorization fails closed.
    let claims = app.verifier.verify(&before.access_token).unwrap();
    assert!(claims.permission_keys().is_empty());
    assert!(!app.evaluator.authorize(&claims, "User.Create"));

    let super_admin = app.super_admin_role_id().await;
    app.lifecycle
        .update(
            identity.id,
            UpdateIdentityRequest {
                username: username.clone(),
                email: email.clone(),
                is_active: true,
                role_ids: vec![super_admin],
            },
        )
        .await
        .expect("Failed to assign role");

    // The refresh re-resolves permissions from the changed role set.
    let after = app
        .auth
        .refresh(&before.refresh_token)
        .await
        .expect("Refresh failed");

    let claims = app.verifier.verify(&after.access_token).unwrap();
    assert!(app.evaluator.authorize(&claims, "User.Create"));
}
