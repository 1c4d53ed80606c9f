//! Capture error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Storage error: {0}")]
    Storage(#[from] linkas_storage::StorageError),

    #[error("Malformed capture cache: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid regex filter in rule {rule_id}: {source}")]
    InvalidRegex {
        rule_id: u32,
        #[source]
        source: regex::Error,
    },

    #[error("Rule id already installed: {0}")]
    DuplicateRuleId(u32),
}
