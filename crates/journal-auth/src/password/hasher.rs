//! Argon2id password hashing and verification.

use std::sync::OnceLock;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use journal_core::config::AuthConfig;
use journal_core::error::AppError;

/// Plaintext hashed once to give unknown identities a realistic verify cost.
const DUMMY_SECRET: &str = "journal-dummy-secret";

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Cost parameters for new hashes.
    params: Params,
    /// Lazily computed hash used when no credential record matched.
    dummy_hash: OnceLock<String>,
}

impl PasswordHasher {
    /// Creates a hasher with the default Argon2id parameters.
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Creates a hasher with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            dummy_hash: OnceLock::new(),
        }
    }

    /// Creates a hasher from the auth configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self::with_params(params))
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored Argon2id hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    /// The parameters embedded in the hash are used, not the hasher's own.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self
            .argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Spend the same work as a real verification and report a mismatch.
    ///
    /// Used when no active credential record matched so that response
    /// time does not reveal whether an identity exists.
    pub fn verify_dummy(&self, password: &str) -> Result<bool, AppError> {
        let hash = match self.dummy_hash.get() {
            Some(hash) => hash,
            None => {
                let hash = self.hash_password(DUMMY_SECRET)?;
                self.dummy_hash.get_or_init(|| hash)
            }
        };
        self.verify_password(password, hash)?;
        Ok(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
