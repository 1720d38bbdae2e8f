//! Shared test helpers for integration tests.

use std::sync::Arc;

use argon2::Params;
use chrono::Utc;

use journal_auth::credential::{CredentialStore, LoginRequest, MemoryCredentialStore};
use journal_auth::password::PasswordHasher;
use journal_cache::memory::MemoryKvStore;
use journal_core::config::AppConfig;
use journal_core::traits::ManualClock;
use journal_core::types::IdentityId;
use journal_entity::user::{CredentialRecord, Identity, Role};
use journal_security::SecurityCore;

pub const TEACHER_EMAIL: &str = "teacher@school.edu";
pub const TEACHER_SECRET: &str = "SecureTeacher123!";
pub const TEACHER_CODE: &str = "T001";

pub const ADMIN_EMAIL: &str = "admin@school.edu";
pub const ADMIN_SECRET: &str = "SecureAdmin123!";
pub const ADMIN_CODE: &str = "A001";

pub const STUDENT_EMAIL: &str = "student@school.edu";
pub const STUDENT_SECRET: &str = "SecureStudent123!";
pub const STUDENT_CODE: &str = "S001";

/// A strong secret that matches no record.
pub const WRONG_SECRET: &str = "WrongSecret1!";

/// Test application context.
pub struct TestCore {
    /// The security core under test.
    pub core: SecurityCore,
    /// Clock shared by every component.
    pub clock: Arc<ManualClock>,
    /// Key-value backend (lockout records, persisted session, registry).
    pub kv: Arc<MemoryKvStore>,
    /// Credential trust store.
    pub credentials: Arc<dyn CredentialStore>,
    /// Hasher with cheap parameters.
    pub hasher: Arc<PasswordHasher>,
}

impl TestCore {
    /// Core with a teacher, an admin, and a student on record.
    pub async fn new() -> Self {
        let hasher = cheap_hasher();
        let store = MemoryCredentialStore::with_records([
            record(&hasher, TEACHER_EMAIL, TEACHER_SECRET, TEACHER_CODE, Role::Teacher, true),
            record(&hasher, ADMIN_EMAIL, ADMIN_SECRET, ADMIN_CODE, Role::Admin, true),
            record(&hasher, STUDENT_EMAIL, STUDENT_SECRET, STUDENT_CODE, Role::Student, true),
        ]);
        Self::with_store(Arc::new(store), hasher).await
    }

    /// Core over a given credential store.
    pub async fn with_store(credentials: Arc<dyn CredentialStore>, hasher: Arc<PasswordHasher>) -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let kv = Arc::new(MemoryKvStore::default());
        let core = Self::build(clock.clone(), kv.clone(), credentials.clone(), hasher.clone()).await;
        Self {
            core,
            clock,
            kv,
            credentials,
            hasher,
        }
    }

    /// A second core sharing this one's clock, store, and credentials,
    /// standing in for a restarted process.
    pub async fn restarted(&self) -> SecurityCore {
        Self::build(
            self.clock.clone(),
            self.kv.clone(),
            self.credentials.clone(),
            self.hasher.clone(),
        )
        .await
    }

    async fn build(
        clock: Arc<ManualClock>,
        kv: Arc<MemoryKvStore>,
        credentials: Arc<dyn CredentialStore>,
        hasher: Arc<PasswordHasher>,
    ) -> SecurityCore {
        let mut config = AppConfig::default();
        config.auth.store_timeout_ms = 200;
        config.audit.write_timeout_ms = 200;

        SecurityCore::builder(config)
            .clock(clock)
            .kv_store(kv)
            .credential_store(credentials)
            .hasher(hasher)
            .build()
            .await
            .expect("Failed to build security core")
    }

    /// Log in and return the identity, panicking on failure.
    pub async fn login_as(&self, email: &str, secret: &str, code: &str) -> Identity {
        self.core
            .login(&LoginRequest::new(email, secret, code))
            .await
            .expect("Login should succeed")
            .identity
    }

    /// Log in the seeded teacher.
    pub async fn login_teacher(&self) -> Identity {
        self.login_as(TEACHER_EMAIL, TEACHER_SECRET, TEACHER_CODE).await
    }
}

/// Argon2id with minimal cost so tests stay fast.
pub fn cheap_hasher() -> Arc<PasswordHasher> {
    Arc::new(PasswordHasher::with_params(
        Params::new(256, 1, 1, None).expect("valid params"),
    ))
}

/// Build a credential record with a hashed secret.
pub fn record(
    hasher: &PasswordHasher,
    email: &str,
    secret: &str,
    code: &str,
    role: Role,
    is_active: bool,
) -> CredentialRecord {
    CredentialRecord {
        identity_id: IdentityId::new(),
        name: format!("{role} user"),
        email: email.to_string(),
        secret_hash: hasher.hash_password(secret).expect("hashing works"),
        identity_code: code.to_string(),
        role,
        is_active,
        permissions: Default::default(),
        joined_at: Utc::now(),
    }
}

/// Login request for the seeded teacher with a chosen secret.
pub fn teacher_login(secret: &str) -> LoginRequest {
    LoginRequest::new(TEACHER_EMAIL, secret, TEACHER_CODE)
}
