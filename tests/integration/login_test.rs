//! Login flow: credential checks, error taxonomy, and response shape.

use std::sync::Arc;

use async_trait::async_trait;

use journal_auth::credential::{CredentialStore, LoginRequest, MemoryCredentialStore};
use journal_core::error::AppError;
use journal_core::events::SecurityEventKind;
use journal_core::result::AppResult;
use journal_entity::user::{CredentialRecord, Role};
use journal_security::AuthError;

use crate::helpers::{self, TEACHER_CODE, TEACHER_EMAIL, TEACHER_SECRET, TestCore, WRONG_SECRET};

#[tokio::test]
async fn test_valid_teacher_login() {
    let app = TestCore::new().await;

    let response = app
        .core
        .attempt_login(&helpers::teacher_login(TEACHER_SECRET))
        .await;

    assert!(response.success);
    let identity = response.identity.expect("identity present");
    assert_eq!(identity.role, Role::Teacher);
    assert_eq!(identity.email, TEACHER_EMAIL);
    assert!(response.error.is_none());

    let token = response.session_token.expect("token present");
    assert!(token.len() >= 43);
    assert!(app.core.session_validity(identity.id).valid);
}

#[tokio::test]
async fn test_each_login_issues_a_new_token() {
    let app = TestCore::new().await;
    let request = helpers::teacher_login(TEACHER_SECRET);

    let first = app.core.login(&request).await.unwrap();
    let second = app.core.login(&request).await.unwrap();

    assert_ne!(first.token, second.token);
    assert!(!app.core.validate_session(&first));
    assert!(app.core.validate_session(&second));
}

#[tokio::test]
async fn test_generic_error_for_every_mismatch() {
    let app = TestCore::new().await;

    let wrong_secret = app
        .core
        .attempt_login(&helpers::teacher_login(WRONG_SECRET))
        .await;
    let wrong_code = app
        .core
        .attempt_login(&LoginRequest::new(TEACHER_EMAIL, TEACHER_SECRET, "T002"))
        .await;
    let unknown = app
        .core
        .attempt_login(&LoginRequest::new("ghost@school.edu", TEACHER_SECRET, TEACHER_CODE))
        .await;

    for response in [&wrong_secret, &wrong_code, &unknown] {
        assert!(!response.success);
        assert_eq!(response.error_code.as_deref(), Some("INVALID_CREDENTIALS"));
    }
    assert_eq!(wrong_secret.error, unknown.error);
    assert_eq!(wrong_code.error, unknown.error);
}

#[tokio::test]
async fn test_inactive_record_is_treated_as_missing() {
    let hasher = helpers::cheap_hasher();
    let store = MemoryCredentialStore::with_records([helpers::record(
        &hasher,
        TEACHER_EMAIL,
        TEACHER_SECRET,
        TEACHER_CODE,
        Role::Teacher,
        false,
    )]);
    let app = TestCore::with_store(Arc::new(store), hasher).await;

    let err = app
        .core
        .login(&helpers::teacher_login(TEACHER_SECRET))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn test_malformed_input_is_not_attributed() {
    let app = TestCore::new().await;

    let cases = [
        LoginRequest::new("", TEACHER_SECRET, TEACHER_CODE),
        LoginRequest::new(TEACHER_EMAIL, "", TEACHER_CODE),
        LoginRequest::new(TEACHER_EMAIL, TEACHER_SECRET, ""),
        LoginRequest::new("not-an-email", TEACHER_SECRET, TEACHER_CODE),
        LoginRequest::new(TEACHER_EMAIL, TEACHER_SECRET, "X001"),
    ];
    for request in &cases {
        let err = app.core.login(request).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)), "{request:?}: {err:?}");
    }

    let status = app.core.lockout_status(TEACHER_EMAIL).await.unwrap();
    assert_eq!(status.failures_in_window, 0);
    assert!(!status.locked);
}

#[tokio::test]
async fn test_weak_secret_counts_toward_lockout() {
    let app = TestCore::new().await;

    let err = app
        .core
        .login(&helpers::teacher_login("123"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::WeakSecret);
    assert_eq!(err.code(), "WEAK_SECRET");
    let status = app.core.lockout_status(TEACHER_EMAIL).await.unwrap();
    assert_eq!(status.failures_in_window, 1);
}

#[derive(Debug)]
struct OfflineStore;

#[async_trait]
impl CredentialStore for OfflineStore {
    async fn find_by_email(&self, _email: &str) -> AppResult<Option<CredentialRecord>> {
        Err(AppError::cache("connection refused"))
    }

    async fn insert(&self, _record: CredentialRecord) -> AppResult<()> {
        Err(AppError::cache("connection refused"))
    }
}

#[derive(Debug)]
struct HangingStore;

#[async_trait]
impl CredentialStore for HangingStore {
    async fn find_by_email(&self, _email: &str) -> AppResult<Option<CredentialRecord>> {
        std::future::pending().await
    }

    async fn insert(&self, _record: CredentialRecord) -> AppResult<()> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_store_failures_are_unavailable_and_never_counted() {
    for store in [
        Arc::new(OfflineStore) as Arc<dyn CredentialStore>,
        Arc::new(HangingStore) as Arc<dyn CredentialStore>,
    ] {
        let app = TestCore::with_store(store, helpers::cheap_hasher()).await;

        for _ in 0..5 {
            let response = app
                .core
                .attempt_login(&helpers::teacher_login(TEACHER_SECRET))
                .await;
            assert_eq!(response.error_code.as_deref(), Some("SERVICE_UNAVAILABLE"));
        }

        let status = app.core.lockout_status(TEACHER_EMAIL).await.unwrap();
        assert_eq!(status.failures_in_window, 0);
        assert_eq!(
            app.core
                .audit()
                .events_of_kind(SecurityEventKind::ServiceUnavailable)
                .await
                .len(),
            5
        );
    }
}

#[tokio::test]
async fn test_success_is_audited() {
    let app = TestCore::new().await;
    let identity = app.login_teacher().await;

    let kinds: Vec<SecurityEventKind> = app
        .core
        .audit()
        .events_for(identity.id)
        .await
        .into_iter()
        .map(|e| e.event_kind)
        .collect();
    assert_eq!(
        kinds,
        vec![SecurityEventKind::LoginSucceeded, SecurityEventKind::SessionIssued]
    );
}
