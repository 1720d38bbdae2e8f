//! Credential validation and registration.

pub mod registrar;
pub mod request;
pub mod store;
pub mod validator;

pub use registrar::Registrar;
pub use request::{IdentityCodeRule, LoginRequest, RegistrationRequest};
pub use store::{CredentialStore, KvCredentialStore, MemoryCredentialStore};
pub use validator::CredentialValidator;
