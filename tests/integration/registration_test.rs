//! Registering new identities.

use journal_auth::RegistrationRequest;
use journal_core::events::SecurityEventKind;
use journal_core::traits::Clock;
use journal_entity::user::Role;
use journal_security::{AuthError, LoginRequest};

use crate::helpers::TestCore;

fn registration(email: &str, code: &str, role: Role) -> RegistrationRequest {
    RegistrationRequest {
        name: "Ms. Adeyemi".to_string(),
        email: email.to_string(),
        secret: "Journal2024!".to_string(),
        identity_code: code.to_string(),
        role,
    }
}

#[tokio::test]
async fn test_registered_identity_can_sign_in() {
    let app = TestCore::new().await;

    let identity = app
        .core
        .register(&registration("new.student@school.edu", "S042", Role::Student))
        .await
        .unwrap();
    assert_eq!(identity.role, Role::Student);
    assert_eq!(identity.joined_at, app.clock.now());

    let session = app
        .core
        .login(&LoginRequest::new(
            "new.student@school.edu",
            "Journal2024!",
            "S042",
        ))
        .await
        .unwrap();
    assert_eq!(session.identity.id, identity.id);

    let registered = app
        .core
        .audit()
        .events_of_kind(SecurityEventKind::IdentityRegistered)
        .await;
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].detail_str("role"), Some("student"));
}

#[tokio::test]
async fn test_registry_keeps_registration_order() {
    let app = TestCore::new().await;
    let first = app
        .core
        .register(&registration("first@school.edu", "S101", Role::Student))
        .await
        .unwrap();
    let second = app
        .core
        .register(&registration("second@school.edu", "T101", Role::Teacher))
        .await
        .unwrap();

    let ids: Vec<_> = app
        .core
        .registered_identities()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestCore::new().await;

    let err = app
        .core
        .register(&registration("Teacher@School.edu", "T002", Role::Teacher))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::Validation("Email is already registered".to_string())
    );
}

#[tokio::test]
async fn test_weak_secret_reports_the_failed_rule() {
    let app = TestCore::new().await;
    let mut request = registration("weak@school.edu", "S043", Role::Student);
    request.secret = "journal2024!".to_string();

    let err = app.core.register(&request).await.unwrap_err();
    assert_eq!(
        err,
        AuthError::Validation("Password must contain at least one uppercase letter".to_string())
    );
    assert!(app.core.registered_identities().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_identity_code_shape_is_checked() {
    let app = TestCore::new().await;

    let err = app
        .core
        .register(&registration("code@school.edu", "X1", Role::Student))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::Validation("Please enter a valid identity code".to_string())
    );
}
