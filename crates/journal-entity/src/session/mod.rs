//! Session domain entities.

pub mod model;
pub mod stored;
pub mod token;

pub use model::Session;
pub use stored::StoredSession;
pub use token::SessionToken;
