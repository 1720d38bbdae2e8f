//! Core type definitions used across the journal workspace.

pub mod id;

pub use id::*;
