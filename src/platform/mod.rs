//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard, touch zones, swipes)
//! - Orientation / device detection
//! - Storage (LocalStorage on web, in-memory elsewhere)

pub mod input;
pub mod storage;

pub use input::{InputAggregator, Key, TouchZone};
pub use storage::{KeyValueStore, MemoryStore, StorageError};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
