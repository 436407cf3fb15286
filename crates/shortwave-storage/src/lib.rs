//! Storage backends for the Shortwave URL shortener.
//!
//! Three implementations of the [`LinkStore`] contract with different
//! durability properties: process-memory only, whole-file JSON loaded on
//! open and flushed on close, and SQLite committed per operation.

mod batch;
pub mod file;
pub mod memory;
pub mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use shortwave_core::{LinkStore, Resolved, Result, StoreError};
pub use sqlite::SqliteStore;
