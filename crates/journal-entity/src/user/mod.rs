//! Identity and credential entities.

pub mod credential;
pub mod model;
pub mod role;

pub use credential::CredentialRecord;
pub use model::{Identity, normalize_email};
pub use role::Role;
