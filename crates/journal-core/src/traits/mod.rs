//! Trait seams the security components depend on abstractly.

pub mod clock;
pub mod kv_store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use kv_store::KeyValueStore;
