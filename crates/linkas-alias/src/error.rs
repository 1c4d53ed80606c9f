//! Alias error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AliasError {
    #[error("Storage error: {0}")]
    Storage(#[from] linkas_storage::StorageError),

    #[error("Malformed store document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Alias key cannot be empty")]
    EmptyKey,
}
