//! Alias store over the durable storage area
//!
//! Every operation is a whole-document round trip. Read-modify-write cycles
//! issued through one `AliasStore` (and its clones) are serialized by an
//! internal mutex. Writers that bypass it, or that write back a stale
//! snapshot (`import`), follow last-writer-wins.

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;

use linkas_storage::StorageArea;

use crate::error::AliasError;
use crate::parse::normalize_key;
use crate::record::{Alias, AliasInput, StoreDocument, STORE_KEY};
use crate::Result;

pub struct AliasStore {
    area: Arc<dyn StorageArea>,
    write_lock: Arc<Mutex<()>>,
}

impl AliasStore {
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self {
            area,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read the whole document, back-filling a missing one with defaults.
    pub fn load(&self) -> Result<StoreDocument> {
        match self.area.get(STORE_KEY)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(StoreDocument::default()),
        }
    }

    fn save(&self, doc: &StoreDocument) -> Result<()> {
        let value = serde_json::to_value(doc)?;
        self.area.set(STORE_KEY, &value)?;
        Ok(())
    }

    /// Look up an alias by (raw or normalized) key.
    pub fn get(&self, key: &str) -> Result<Option<Alias>> {
        let key = normalize_key(key);
        Ok(self.load()?.aliases.remove(&key))
    }

    /// Create the alias or fully replace its targets.
    ///
    /// `createdAt` survives a replace; `updatedAt` always moves forward.
    pub fn upsert(&self, input: AliasInput) -> Result<Alias> {
        let key = normalize_key(&input.key);
        if key.is_empty() {
            return Err(AliasError::EmptyKey);
        }

        let targets: Vec<String> = input
            .targets
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let _guard = self.write_lock.lock();
        let mut doc = self.load()?;
        let now = Utc::now().timestamp_millis();

        let alias = match doc.aliases.get(&key) {
            Some(existing) => Alias {
                key: key.clone(),
                targets,
                created_at: existing.created_at,
                updated_at: now.max(existing.updated_at.saturating_add(1)),
            },
            None => Alias {
                key: key.clone(),
                targets,
                created_at: now,
                updated_at: now,
            },
        };

        doc.aliases.insert(key, alias.clone());
        self.save(&doc)?;

        tracing::info!(
            key = %alias.key,
            target_count = alias.targets.len(),
            "Saved alias"
        );

        Ok(alias)
    }

    /// Remove an alias. Returns whether anything was removed; a missing key
    /// leaves the document untouched.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let key = normalize_key(key);

        let _guard = self.write_lock.lock();
        let mut doc = self.load()?;

        if doc.aliases.remove(&key).is_none() {
            tracing::debug!(key = %key, "Delete of unknown alias ignored");
            return Ok(false);
        }

        self.save(&doc)?;
        tracing::info!(key = %key, "Deleted alias");
        Ok(true)
    }

    /// Whole document, for backup and inspection.
    pub fn export(&self) -> Result<StoreDocument> {
        self.load()
    }

    /// Replace the whole document. No merge with existing data.
    pub fn import(&self, doc: StoreDocument) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.save(&doc)?;
        tracing::info!(alias_count = doc.len(), "Imported alias store");
        Ok(())
    }

    /// Aliases whose key contains `filter` (case-insensitive), sorted by key.
    pub fn list(&self, filter: &str) -> Result<Vec<Alias>> {
        let filter = filter.to_lowercase();
        let doc = self.load()?;

        let mut aliases: Vec<Alias> = doc
            .aliases
            .into_values()
            .filter(|alias| filter.is_empty() || alias.key.contains(&filter))
            .collect();
        aliases.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(aliases)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.load()?.is_empty())
    }
}

impl Clone for AliasStore {
    fn clone(&self) -> Self {
        Self {
            area: Arc::clone(&self.area),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkas_storage::{Database, MemoryArea};
    use serde_json::json;

    fn store() -> AliasStore {
        AliasStore::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    fn targets(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_upsert_creates_normalized_record() {
        let store = store();
        let alias = store
            .upsert(AliasInput::new(" @Docs ", targets(&[" https://d.io ", "", "  "])))
            .unwrap();

        assert_eq!(alias.key, "docs");
        assert_eq!(alias.targets, targets(&["https://d.io"]));
        assert_eq!(alias.created_at, alias.updated_at);

        assert_eq!(store.get("@DOCS").unwrap(), Some(alias));
    }

    #[test]
    fn test_upsert_replaces_targets_and_keeps_created_at() {
        let store = store();
        let first = store
            .upsert(AliasInput::new("g", targets(&["https://a.com", "https://b.com"])))
            .unwrap();
        let second = store
            .upsert(AliasInput::new("G", targets(&["https://c.com"])))
            .unwrap();

        assert_eq!(second.targets, targets(&["https://c.com"]));
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_after_max_timestamp_saturates() {
        let store = store();
        let doc: StoreDocument = serde_json::from_value(json!({
            "aliases": {
                "m": {"key": "m", "targets": ["https://m.io"], "updatedAt": i64::MAX}
            }
        }))
        .unwrap();
        store.import(doc).unwrap();

        let alias = store
            .upsert(AliasInput::new("m", targets(&["https://n.io"])))
            .unwrap();
        assert_eq!(alias.updated_at, i64::MAX);
        assert_eq!(alias.targets, targets(&["https://n.io"]));
    }

    #[test]
    fn test_upsert_rejects_empty_key() {
        let store = store();
        let result = store.upsert(AliasInput::new(" @ ", targets(&["https://a.com"])));
        assert!(matches!(result, Err(AliasError::EmptyKey)));
    }

    #[test]
    fn test_delete_missing_key_is_noop() {
        let store = store();
        store
            .upsert(AliasInput::new("keep", targets(&["https://k.io"])))
            .unwrap();
        let before = store.export().unwrap();

        assert!(!store.delete("nope").unwrap());
        assert_eq!(store.export().unwrap(), before);

        assert!(store.delete("@KEEP").unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_import_replaces_wholesale() {
        let store = store();
        store
            .upsert(AliasInput::new("old", targets(&["https://old.io"])))
            .unwrap();

        let doc = StoreDocument::from_json_str(
            r#"{"aliases": {"new": {"key": "new", "targets": ["https://new.io"]}}}"#,
        )
        .unwrap();
        store.import(doc).unwrap();

        let exported = store.export().unwrap();
        assert!(exported.aliases.get("old").is_none());
        assert_eq!(
            exported.aliases.get("new").unwrap().targets,
            targets(&["https://new.io"])
        );
        assert_eq!(exported.meta.version, 1);
    }

    #[test]
    fn test_load_backfills_partial_document() {
        let area = Arc::new(MemoryArea::new());
        area.set(STORE_KEY, &json!({"aliases": {}})).unwrap();

        let store = AliasStore::new(area);
        assert_eq!(store.load().unwrap(), StoreDocument::default());
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let store = store();
        for key in ["gmail", "work", "go", "g"] {
            store
                .upsert(AliasInput::new(key, targets(&["https://x.io"])))
                .unwrap();
        }

        let keys: Vec<String> = store.list("G").unwrap().into_iter().map(|a| a.key).collect();
        assert_eq!(keys, targets(&["g", "gmail", "go"]));
        assert_eq!(store.list("").unwrap().len(), 4);
    }

    #[test]
    fn test_concurrent_upserts_through_one_store_all_land() {
        let store = store();
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .upsert(AliasInput::new(format!("k{i}"), vec![format!("https://{i}.io")]))
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.load().unwrap().len(), 16);
    }

    #[test]
    fn test_stale_snapshot_write_is_last_writer_wins() {
        let store = store();
        store
            .upsert(AliasInput::new("a", targets(&["https://a.io"])))
            .unwrap();

        // A reader takes a snapshot, a concurrent writer adds "b", then the
        // snapshot is written back wholesale: "b" is silently discarded.
        let snapshot = store.export().unwrap();
        store
            .upsert(AliasInput::new("b", targets(&["https://b.io"])))
            .unwrap();
        store.import(snapshot).unwrap();

        let doc = store.export().unwrap();
        assert!(doc.aliases.contains_key("a"));
        assert!(!doc.aliases.contains_key("b"));
    }

    #[test]
    fn test_independent_stores_race_on_shared_area() {
        let area: Arc<dyn StorageArea> = Arc::new(MemoryArea::new());
        let left = AliasStore::new(Arc::clone(&area));
        let right = AliasStore::new(area);

        let mut left_doc = left.load().unwrap();
        let mut right_doc = right.load().unwrap();

        left_doc.aliases.insert("l".to_string(), Alias::default());
        right_doc.aliases.insert("r".to_string(), Alias::default());

        left.import(left_doc).unwrap();
        right.import(right_doc).unwrap();

        let doc = left.load().unwrap();
        assert!(!doc.aliases.contains_key("l"));
        assert!(doc.aliases.contains_key("r"));
    }
}
