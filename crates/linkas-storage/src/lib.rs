//! Linkas Storage Layer
//!
//! Two storage areas hold every piece of extension state:
//! - `local`: durable, SQLite-backed, survives restarts (the alias store)
//! - `session`: volatile, in-memory, cleared when the browsing session ends
//!   (the per-tab capture cache)
//!
//! Both areas store whole JSON documents under string keys. There is no
//! partial patching: callers read a document, modify it, and write it back.

mod area;
mod database;
mod error;
mod migrations;

pub use area::{MemoryArea, StorageArea};
pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
