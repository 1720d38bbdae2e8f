//! Session lifecycle: tokens, the active-session table, persistence,
//! and the optional expiry watcher.

pub mod manager;
pub mod persistence;
pub mod store;
pub mod token;
pub mod watcher;

pub use manager::{SessionManager, SessionStatus};
pub use persistence::SessionPersistence;
pub use store::SessionStore;
pub use watcher::{SessionWatcher, WatcherHandle};
