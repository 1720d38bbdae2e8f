//! Session expiry, refresh, persistence, and logout.

use std::time::Duration as StdDuration;

use chrono::Duration;

use journal_auth::session::SessionWatcher;
use journal_core::events::SecurityEventKind;
use journal_entity::session::StoredSession;
use journal_entity::user::Role;
use journal_security::{Decision, DenyReason, LoginRequest, RequiredRoles};

use crate::helpers::{self, TestCore};

async fn assert_boundary(email: &str, secret: &str, code: &str, minutes: i64) {
    let app = TestCore::new().await;
    let session = app
        .core
        .login(&LoginRequest::new(email, secret, code))
        .await
        .unwrap();

    app.clock
        .advance(Duration::minutes(minutes) - Duration::seconds(1));
    assert!(app.core.validate_session(&session), "{email} at timeout - 1s");

    app.clock.advance(Duration::seconds(2));
    assert!(!app.core.validate_session(&session), "{email} at timeout + 1s");
}

#[tokio::test]
async fn test_role_timeout_boundaries() {
    assert_boundary(
        helpers::TEACHER_EMAIL,
        helpers::TEACHER_SECRET,
        helpers::TEACHER_CODE,
        30,
    )
    .await;
    assert_boundary(
        helpers::ADMIN_EMAIL,
        helpers::ADMIN_SECRET,
        helpers::ADMIN_CODE,
        15,
    )
    .await;
    assert_boundary(
        helpers::STUDENT_EMAIL,
        helpers::STUDENT_SECRET,
        helpers::STUDENT_CODE,
        120,
    )
    .await;
}

#[tokio::test]
async fn test_granted_access_moves_the_expiry() {
    let app = TestCore::new().await;
    let session = app
        .core
        .login(&helpers::teacher_login(helpers::TEACHER_SECRET))
        .await
        .unwrap();

    app.clock.advance(Duration::minutes(29));
    let decision = app
        .core
        .check_access(Some(&session.identity), RequiredRoles::any())
        .await;
    assert_eq!(decision, Decision::Granted);

    app.clock.advance(Duration::seconds(1));
    assert!(app.core.validate_session(&session));

    // Thirty-one minutes after issue: only the refreshed timestamp keeps it alive.
    app.clock.advance(Duration::minutes(2));
    assert!(app.core.validate_session(&session));
    let status = app.core.session_validity(session.identity.id);
    assert_eq!(status.remaining_seconds(), (30 - 2) * 60 - 1);
}

#[tokio::test]
async fn test_expired_session_is_discarded_on_next_check() {
    let app = TestCore::new().await;
    let identity = app.login_teacher().await;

    app.clock.advance(Duration::minutes(31));
    assert!(!app.core.session_validity(identity.id).valid);
    assert!(app.core.sessions().current(identity.id).is_some());

    let decision = app
        .core
        .check_access(Some(&identity), RequiredRoles::any())
        .await;
    assert_eq!(decision, Decision::SessionExpired);
    assert!(app.core.sessions().current(identity.id).is_none());
    assert!(app.kv.is_empty());
}

#[tokio::test]
async fn test_serialized_session_validates_identically() {
    let app = TestCore::new().await;
    let session = app
        .core
        .login(&helpers::teacher_login(helpers::TEACHER_SECRET))
        .await
        .unwrap();

    let json = serde_json::to_string(&StoredSession::from(&session)).unwrap();
    let reloaded = serde_json::from_str::<StoredSession>(&json)
        .unwrap()
        .into_session()
        .unwrap();

    assert_eq!(reloaded, session);
    assert_eq!(
        app.core.validate_session(&reloaded),
        app.core.validate_session(&session)
    );
}

#[tokio::test]
async fn test_persisted_session_survives_restart() {
    let app = TestCore::new().await;
    let session = app
        .core
        .login(&helpers::teacher_login(helpers::TEACHER_SECRET))
        .await
        .unwrap();

    app.clock.advance(Duration::minutes(10));
    let restarted = app.restarted().await;

    let restored = restarted.restore_session().await.unwrap();
    assert_eq!(restored.token, session.token);
    assert!(restarted.validate_session(&session));
    assert_eq!(
        restarted
            .check_access(Some(&session.identity), Role::Teacher)
            .await,
        Decision::Granted
    );
}

#[tokio::test]
async fn test_stale_persisted_session_is_cleared_on_load() {
    let app = TestCore::new().await;
    app.login_teacher().await;
    assert_eq!(app.kv.len(), 1);

    app.clock.advance(Duration::minutes(45));
    let restarted = app.restarted().await;

    assert!(restarted.restore_session().await.is_none());
    assert!(app.kv.is_empty());
    assert_eq!(
        restarted
            .audit()
            .events_of_kind(SecurityEventKind::SessionRestoreRejected)
            .await
            .len(),
        1
    );
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let app = TestCore::new().await;
    let session = app
        .core
        .login(&helpers::teacher_login(helpers::TEACHER_SECRET))
        .await
        .unwrap();

    assert!(app.core.logout(session.identity.id).await);
    assert!(!app.core.validate_session(&session));
    assert!(app.kv.is_empty());
    assert_eq!(
        app.core
            .check_token_access(&session.token, RequiredRoles::any())
            .await,
        Decision::Denied(DenyReason::MissingIdentity)
    );
    assert!(!app.core.logout(session.identity.id).await);
}

#[tokio::test]
async fn test_watcher_forces_logout_of_stale_sessions() {
    let app = TestCore::new().await;
    let identity = app.login_teacher().await;

    let handle = SessionWatcher::new(app.core.sessions().clone())
        .with_interval(StdDuration::from_millis(10))
        .spawn();
    let mut expired = handle.subscribe();

    app.clock.advance(Duration::minutes(31));

    let session = tokio::time::timeout(StdDuration::from_secs(5), expired.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.identity.id, identity.id);
    assert!(!app.core.session_validity(identity.id).valid);

    let kinds: Vec<_> = app
        .core
        .audit()
        .events_for(identity.id)
        .await
        .into_iter()
        .map(|e| e.event_kind)
        .collect();
    assert_eq!(kinds.last(), Some(&SecurityEventKind::SessionExpired));

    handle.shutdown().await;
}
