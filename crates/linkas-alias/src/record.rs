//! Alias records and the persisted store document
//!
//! Persisted under [`STORE_KEY`] as:
//! ```text
//! { "aliases": { "<key>": { key, targets, createdAt, updatedAt } },
//!   "meta": { "version": 1 } }
//! ```
//!
//! Aliases keep the order they were first saved in. A replaced alias keeps
//! its place.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Storage key of the alias store document in the durable area.
pub const STORE_KEY: &str = "linkas_store_v1";

pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Alias {
    /// Normalized key (no leading `@`, lowercase)
    pub key: String,
    /// URL templates, in open order
    pub targets: Vec<String>,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    /// Milliseconds since the Unix epoch
    pub updated_at: i64,
}

/// Payload of an upsert request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasInput {
    pub key: String,
    pub targets: Vec<String>,
}

impl AliasInput {
    pub fn new(key: impl Into<String>, targets: Vec<String>) -> Self {
        Self {
            key: key.into(),
            targets,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreMeta {
    pub version: u32,
}

impl Default for StoreMeta {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
        }
    }
}

/// Aliases by key, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AliasMap {
    entries: Vec<(String, Alias)>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&Alias> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Insert or replace. A replaced alias keeps its position.
    pub fn insert(&mut self, key: String, alias: Alias) -> Option<Alias> {
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, alias)),
            None => {
                self.entries.push((key, alias));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Alias> {
        let i = self.position(key)?;
        Some(self.entries.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Alias)> {
        self.entries.iter().map(|(k, a)| (k.as_str(), a))
    }

    pub fn into_values(self) -> impl Iterator<Item = Alias> {
        self.entries.into_iter().map(|(_, a)| a)
    }
}

impl Serialize for AliasMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, a)| (k, a)))
    }
}

impl<'de> Deserialize<'de> for AliasMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AliasMapVisitor;

        impl<'de> Visitor<'de> for AliasMapVisitor {
            type Value = AliasMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of aliases or null")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<AliasMap, E> {
                Ok(AliasMap::new())
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<AliasMap, E> {
                Ok(AliasMap::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<AliasMap, A::Error> {
                let mut map = AliasMap::new();
                while let Some((key, alias)) = access.next_entry::<String, Alias>()? {
                    map.insert(key, alias);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_any(AliasMapVisitor)
    }
}

/// `null` reads as the default, the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The single alias store document. Missing or `null` fields are
/// back-filled on read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreDocument {
    pub aliases: AliasMap,
    #[serde(deserialize_with = "null_as_default")]
    pub meta: StoreMeta,
}

impl StoreDocument {
    /// Parse an imported document, defaulting missing or `null`
    /// `aliases`/`meta`.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Backup format: the whole document, pretty-printed.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
