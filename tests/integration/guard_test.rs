//! Role-gated access decisions.

use chrono::Duration;

use journal_core::events::SecurityEventKind;
use journal_entity::session::SessionToken;
use journal_entity::user::Role;
use journal_security::{Decision, DenyReason, LoginRequest, RequiredRoles};

use crate::helpers::{self, TestCore};

#[tokio::test]
async fn test_student_is_denied_teacher_area() {
    let app = TestCore::new().await;
    let student = app
        .login_as(
            helpers::STUDENT_EMAIL,
            helpers::STUDENT_SECRET,
            helpers::STUDENT_CODE,
        )
        .await;

    let decision = app.core.check_access(Some(&student), Role::Teacher).await;
    assert_eq!(
        decision,
        Decision::Denied(DenyReason::InsufficientRole {
            required: Role::Teacher.into(),
            actual: Role::Student,
        })
    );

    let denied = app
        .core
        .audit()
        .events_of_kind(SecurityEventKind::AccessDenied)
        .await;
    assert_eq!(denied.len(), 1);
    assert_eq!(denied[0].identity_id, Some(student.id));
    assert_eq!(denied[0].detail_str("actual_role"), Some("student"));
    assert_eq!(denied[0].detail_str("reason"), Some("insufficient_role"));
    assert_eq!(
        denied[0].details["required_roles"],
        serde_json::json!(["teacher"])
    );
}

#[tokio::test]
async fn test_denied_access_does_not_refresh_the_session() {
    let app = TestCore::new().await;
    let student = app
        .login_as(
            helpers::STUDENT_EMAIL,
            helpers::STUDENT_SECRET,
            helpers::STUDENT_CODE,
        )
        .await;
    let before = app.core.sessions().current(student.id).unwrap();

    app.clock.advance(Duration::minutes(5));
    app.core.check_access(Some(&student), Role::Admin).await;

    let after = app.core.sessions().current(student.id).unwrap();
    assert_eq!(after.last_activity, before.last_activity);
}

#[tokio::test]
async fn test_student_is_never_granted_a_teacher_area() {
    let app = TestCore::new().await;
    let student = app
        .login_as(
            helpers::STUDENT_EMAIL,
            helpers::STUDENT_SECRET,
            helpers::STUDENT_CODE,
        )
        .await;

    app.clock.advance(Duration::hours(3));
    let decision = app.core.check_access(Some(&student), Role::Teacher).await;
    assert!(!decision.is_granted());
    assert_eq!(decision, Decision::SessionExpired);
}

#[tokio::test]
async fn test_multiple_required_roles() {
    let app = TestCore::new().await;
    let teacher = app.login_teacher().await;
    let admin = app
        .login_as(helpers::ADMIN_EMAIL, helpers::ADMIN_SECRET, helpers::ADMIN_CODE)
        .await;

    let staff = [Role::Teacher, Role::Admin];
    assert_eq!(
        app.core.check_access(Some(&teacher), staff).await,
        Decision::Granted
    );
    assert_eq!(
        app.core.check_access(Some(&admin), staff).await,
        Decision::Granted
    );
    assert!(!app.core.check_access(Some(&teacher), Role::Admin).await.is_granted());
}

#[tokio::test]
async fn test_empty_requirement_admits_any_authenticated_identity() {
    let app = TestCore::new().await;
    let student = app
        .login_as(
            helpers::STUDENT_EMAIL,
            helpers::STUDENT_SECRET,
            helpers::STUDENT_CODE,
        )
        .await;

    let decision = app
        .core
        .check_access(Some(&student), RequiredRoles::any())
        .await;
    assert_eq!(decision, Decision::Granted);

    let granted = app
        .core
        .audit()
        .events_of_kind(SecurityEventKind::AccessGranted)
        .await;
    assert_eq!(granted.len(), 1);
    assert_eq!(granted[0].detail_str("decision"), Some("granted"));
}

#[tokio::test]
async fn test_missing_identity_is_denied_and_audited() {
    let app = TestCore::new().await;

    let decision = app.core.check_access(None, Role::Student).await;
    assert_eq!(decision, Decision::Denied(DenyReason::MissingIdentity));

    let denied = app
        .core
        .audit()
        .events_of_kind(SecurityEventKind::AccessDenied)
        .await;
    assert_eq!(denied.len(), 1);
    assert_eq!(denied[0].identity_id, None);
    assert_eq!(denied[0].detail_str("reason"), Some("missing_identity"));
}

#[tokio::test]
async fn test_identity_without_session_must_sign_in() {
    let app = TestCore::new().await;
    let teacher = app.login_teacher().await;
    app.core.logout(teacher.id).await;

    let decision = app.core.check_access(Some(&teacher), Role::Teacher).await;
    assert_eq!(decision, Decision::SessionExpired);
    assert!(decision.into_result().is_err());
}

#[tokio::test]
async fn test_bearer_token_access() {
    let app = TestCore::new().await;
    let session = app
        .core
        .login(&helpers::teacher_login(helpers::TEACHER_SECRET))
        .await
        .unwrap();

    assert_eq!(
        app.core
            .check_token_access(&session.token, Role::Teacher)
            .await,
        Decision::Granted
    );

    let forged = SessionToken::new("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");
    assert_eq!(
        app.core.check_token_access(&forged, Role::Teacher).await,
        Decision::Denied(DenyReason::MissingIdentity)
    );
}

#[tokio::test]
async fn test_superseded_token_is_refused() {
    let app = TestCore::new().await;
    let first = app
        .core
        .login(&helpers::teacher_login(helpers::TEACHER_SECRET))
        .await
        .unwrap();
    let second = app
        .core
        .login(&helpers::teacher_login(helpers::TEACHER_SECRET))
        .await
        .unwrap();

    assert!(!app.core.validate_session(&first));
    assert!(app.core.validate_session(&second));
    assert!(
        !app.core
            .check_token_access(&first.token, RequiredRoles::any())
            .await
            .is_granted()
    );
    assert_eq!(
        app.core
            .audit()
            .events_of_kind(SecurityEventKind::SessionSuperseded)
            .await
            .len(),
        1
    );
}

#[tokio::test]
async fn test_edited_session_role_does_not_grant_access() {
    let app = TestCore::new().await;
    let mut session = app
        .core
        .login(&LoginRequest::new(
            helpers::STUDENT_EMAIL,
            helpers::STUDENT_SECRET,
            helpers::STUDENT_CODE,
        ))
        .await
        .unwrap();
    session.identity.role = Role::Admin;

    let decision = app
        .core
        .guard()
        .authorize_session(Some(&session), Role::Admin)
        .await;
    assert!(!decision.is_granted());
    assert_eq!(
        decision,
        Decision::Denied(DenyReason::InsufficientRole {
            required: Role::Admin.into(),
            actual: Role::Student,
        })
    );

    // Presenting the edited identity alone falls back to the stored role too.
    assert!(
        !app.core
            .check_access(Some(&session.identity), Role::Admin)
            .await
            .is_granted()
    );
}
