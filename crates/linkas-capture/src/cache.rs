//! Per-tab capture cache in session storage
//!
//! Stored as one map `{ "<tabId>": { url, at } }` under [`LAST_SEARCH_KEY`].
//! Entries are overwritten by the next capture for the same tab and vanish
//! with the session; nothing deletes them explicitly.

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use linkas_storage::StorageArea;

use crate::Result;

pub const LAST_SEARCH_KEY: &str = "linkas_last_search_by_tab_v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureEntry {
    pub url: String,
    /// Milliseconds since the Unix epoch
    pub at: i64,
}

type CaptureMap = BTreeMap<String, CaptureEntry>;

pub struct CaptureCache {
    area: Arc<dyn StorageArea>,
    write_lock: Arc<Mutex<()>>,
}

impl CaptureCache {
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self {
            area,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn load(&self) -> Result<CaptureMap> {
        match self.area.get(LAST_SEARCH_KEY)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(CaptureMap::new()),
        }
    }

    /// Remember `url` as the latest capture for `tab_id`.
    pub fn record(&self, tab_id: i64, url: &str) -> Result<CaptureEntry> {
        let entry = CaptureEntry {
            url: url.to_string(),
            at: Utc::now().timestamp_millis(),
        };

        let _guard = self.write_lock.lock();
        let mut map = self.load()?;
        map.insert(tab_id.to_string(), entry.clone());
        self.area.set(LAST_SEARCH_KEY, &serde_json::to_value(&map)?)?;

        tracing::info!(tab_id, url = %entry.url, "Captured search URL");
        Ok(entry)
    }

    pub fn entry(&self, tab_id: i64) -> Result<Option<CaptureEntry>> {
        Ok(self.load()?.remove(&tab_id.to_string()))
    }

    /// Latest captured URL for `tab_id`, if any.
    pub fn last_url(&self, tab_id: i64) -> Result<Option<String>> {
        Ok(self.entry(tab_id)?.map(|entry| entry.url))
    }
}

impl Clone for CaptureCache {
    fn clone(&self) -> Self {
        Self {
            area: Arc::clone(&self.area),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}
