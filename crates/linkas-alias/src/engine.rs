//! Resolution engine: parse -> look up -> render

use serde::{Deserialize, Serialize};

use crate::parse::parse_alias_input;
use crate::store::AliasStore;
use crate::template::render_targets;
use crate::Result;

const DEFAULT_MAX_SUGGESTIONS: usize = 8;
const DEFAULT_PREVIEW_CHARS: usize = 60;

/// Outcome of resolving raw trigger text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub found: bool,
    pub key: String,
    pub args: Vec<String>,
    pub targets: Vec<String>,
}

/// Omnibox suggestion: `content` is what gets filled back into the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub content: String,
    pub description: String,
}

pub struct ResolutionEngine {
    store: AliasStore,
    max_suggestions: usize,
    preview_chars: usize,
}

impl ResolutionEngine {
    pub fn new(store: AliasStore) -> Self {
        Self {
            store,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    pub fn with_limits(store: AliasStore, max_suggestions: usize, preview_chars: usize) -> Self {
        Self {
            store,
            max_suggestions,
            preview_chars,
        }
    }

    pub fn store(&self) -> &AliasStore {
        &self.store
    }

    /// Resolve raw trigger text. Read-only; safe to call on every keystroke.
    pub fn resolve(&self, raw: &str) -> Result<Resolution> {
        let parsed = parse_alias_input(raw);

        let Some(alias) = self.store.get(&parsed.key)? else {
            tracing::debug!(key = %parsed.key, "Alias not found");
            return Ok(Resolution {
                found: false,
                key: parsed.key,
                args: parsed.args,
                targets: Vec::new(),
            });
        };

        let targets = render_targets(&alias.targets, &parsed.args);
        tracing::debug!(key = %parsed.key, target_count = targets.len(), "Resolved alias");

        Ok(Resolution {
            found: true,
            key: parsed.key,
            args: parsed.args,
            targets,
        })
    }

    /// Keys containing `partial` (substring, case-insensitive), in store
    /// order, capped at the configured limit.
    pub fn suggest(&self, partial: &str) -> Result<Vec<Suggestion>> {
        let needle = partial.to_lowercase();
        let doc = self.store.load()?;

        Ok(doc
            .aliases
            .iter()
            .filter(|(key, _)| key.contains(&needle))
            .take(self.max_suggestions)
            .map(|(key, alias)| {
                let first = alias.targets.first().map(String::as_str).unwrap_or("");
                Suggestion {
                    content: key.to_string(),
                    description: format!(
                        "@{} → {}",
                        key,
                        truncate_preview(first, self.preview_chars)
                    ),
                }
            })
            .collect())
    }
}

impl Clone for ResolutionEngine {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            max_suggestions: self.max_suggestions,
            preview_chars: self.preview_chars,
        }
    }
}

/// Cut `text` to at most `max` characters, ending in `…` when shortened.
pub fn truncate_preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
