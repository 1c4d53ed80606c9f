//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] linkas_storage::StorageError),

    #[error("Alias error: {0}")]
    Alias(#[from] linkas_alias::AliasError),

    #[error("Tab error: {0}")]
    Tab(#[from] linkas_tabs::TabError),

    #[error("Capture error: {0}")]
    Capture(#[from] linkas_capture::CaptureError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Router(String),

    #[error("Router is not running")]
    RouterClosed,
}
