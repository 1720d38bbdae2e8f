//! Progressive lockout across login attempts.

use chrono::Duration;

use journal_core::events::SecurityEventKind;
use journal_security::AuthError;

use crate::helpers::{self, TEACHER_EMAIL, TEACHER_SECRET, TestCore, WRONG_SECRET};

#[tokio::test]
async fn test_fourth_attempt_after_three_failures_is_locked() {
    let app = TestCore::new().await;

    for _ in 0..3 {
        let err = app
            .core
            .login(&helpers::teacher_login(WRONG_SECRET))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        app.clock.advance(Duration::minutes(5));
    }
    // Undo the advance after the third failure, then wait 10 seconds.
    app.clock.advance(Duration::minutes(-5) + Duration::seconds(10));

    let response = app
        .core
        .attempt_login(&helpers::teacher_login(TEACHER_SECRET))
        .await;
    assert!(!response.success);
    assert_eq!(response.error_code.as_deref(), Some("ACCOUNT_LOCKED"));
    assert_eq!(response.remaining_seconds, Some(15 * 60 - 10));
    assert_eq!(
        response.error.as_deref(),
        Some("Too many failed attempts. Try again in 14:50")
    );
}

#[tokio::test]
async fn test_weak_secrets_alone_trigger_the_lock() {
    let app = TestCore::new().await;

    // `wrong` fails the secret policy before any record lookup, so it is
    // reported as weak, yet each attempt still counts toward the lock.
    for _ in 0..3 {
        let err = app
            .core
            .login(&helpers::teacher_login("wrong"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::WeakSecret);
    }

    app.clock.advance(Duration::seconds(10));
    let err = app
        .core
        .login(&helpers::teacher_login("wrong"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::Locked {
            remaining_seconds: 890
        }
    );
}

#[tokio::test]
async fn test_lock_lasts_fifteen_minutes_from_third_failure() {
    let app = TestCore::new().await;
    for _ in 0..3 {
        let _ = app.core.login(&helpers::teacher_login(WRONG_SECRET)).await;
    }
    assert!(app.core.lockout_status(TEACHER_EMAIL).await.unwrap().locked);

    app.clock.advance(Duration::minutes(14) + Duration::seconds(59));
    let err = app
        .core
        .login(&helpers::teacher_login(TEACHER_SECRET))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::Locked {
            remaining_seconds: 1
        }
    );

    app.clock.advance(Duration::seconds(1));
    assert!(
        app.core
            .login(&helpers::teacher_login(TEACHER_SECRET))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_attempts_while_locked_do_not_extend_the_lock() {
    let app = TestCore::new().await;
    for _ in 0..3 {
        let _ = app.core.login(&helpers::teacher_login(WRONG_SECRET)).await;
    }

    for minute in [5, 10] {
        app.clock.advance(Duration::minutes(5));
        let err = app
            .core
            .login(&helpers::teacher_login(WRONG_SECRET))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::Locked {
                remaining_seconds: (15 - minute) * 60
            }
        );
    }

    assert_eq!(
        app.core
            .audit()
            .events_of_kind(SecurityEventKind::LoginBlocked)
            .await
            .len(),
        2
    );
}

#[tokio::test]
async fn test_success_after_expiry_clears_all_history() {
    let app = TestCore::new().await;
    for _ in 0..3 {
        let _ = app.core.login(&helpers::teacher_login(WRONG_SECRET)).await;
    }
    app.clock.advance(Duration::minutes(15));

    app.login_teacher().await;

    let _ = app.core.login(&helpers::teacher_login(WRONG_SECRET)).await;
    let status = app.core.lockout_status(TEACHER_EMAIL).await.unwrap();
    assert_eq!(status.failures_in_window, 1);
    assert!(!status.locked);
}

#[tokio::test]
async fn test_success_before_threshold_resets_count() {
    let app = TestCore::new().await;
    for _ in 0..2 {
        let _ = app.core.login(&helpers::teacher_login(WRONG_SECRET)).await;
    }
    app.login_teacher().await;

    for _ in 0..2 {
        let err = app
            .core
            .login(&helpers::teacher_login(WRONG_SECRET))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }
    assert!(!app.core.lockout_status(TEACHER_EMAIL).await.unwrap().locked);
}

#[tokio::test]
async fn test_failures_spread_beyond_the_window_never_lock() {
    let app = TestCore::new().await;
    for _ in 0..6 {
        let err = app
            .core
            .login(&helpers::teacher_login(WRONG_SECRET))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        app.clock.advance(Duration::minutes(31));
    }
}

#[tokio::test]
async fn test_lock_is_per_identity_key() {
    let app = TestCore::new().await;
    for _ in 0..3 {
        let _ = app.core.login(&helpers::teacher_login(WRONG_SECRET)).await;
    }

    app.login_as(
        helpers::ADMIN_EMAIL,
        helpers::ADMIN_SECRET,
        helpers::ADMIN_CODE,
    )
    .await;
}

#[tokio::test]
async fn test_email_case_does_not_escape_the_lock() {
    let app = TestCore::new().await;
    for email in ["teacher@school.edu", "TEACHER@school.edu", "Teacher@School.EDU"] {
        let _ = app
            .core
            .login(&journal_security::LoginRequest::new(
                email,
                WRONG_SECRET,
                helpers::TEACHER_CODE,
            ))
            .await;
    }
    assert!(app.core.lockout_status(TEACHER_EMAIL).await.unwrap().locked);
}

#[tokio::test]
async fn test_concurrent_failures_cannot_exceed_threshold() {
    let app = TestCore::new().await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let core = app.core.clone();
        handles.push(tokio::spawn(async move {
            core.login(&helpers::teacher_login(WRONG_SECRET)).await
        }));
    }

    let mut invalid = 0;
    let mut locked = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Err(AuthError::InvalidCredentials) => invalid += 1,
            Err(AuthError::Locked { .. }) => locked += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(invalid, 3);
    assert_eq!(locked, 7);
}

#[tokio::test]
async fn test_lock_expiry_is_audited_on_read() {
    let app = TestCore::new().await;
    for _ in 0..3 {
        let _ = app.core.login(&helpers::teacher_login(WRONG_SECRET)).await;
    }
    app.clock.advance(Duration::minutes(16));

    assert!(!app.core.lockout_status(TEACHER_EMAIL).await.unwrap().locked);
    let audit = app.core.audit();
    assert_eq!(
        audit
            .events_of_kind(SecurityEventKind::AccountLocked)
            .await
            .len(),
        1
    );
    assert_eq!(
        audit
            .events_of_kind(SecurityEventKind::LockoutExpired)
            .await
            .len(),
        1
    );
}
