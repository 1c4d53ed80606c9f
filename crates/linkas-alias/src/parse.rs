//! Trigger text parsing
//!
//! Two argument styles are accepted and yield the same result:
//! - path style: `@key/a/b`
//! - word style: `@key a b`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInput {
    pub key: String,
    pub args: Vec<String>,
}

/// Normalize an alias key: trim, drop leading `@`, lowercase.
///
/// Whitespace between leading `@` characters and the key is dropped too, so
/// `normalize_key(normalize_key(x)) == normalize_key(x)` for every input.
pub fn normalize_key(key: &str) -> String {
    key.trim_start_matches(|c: char| c == '@' || c.is_whitespace())
        .trim_end()
        .to_lowercase()
}

/// Parse raw trigger text into a key and positional arguments.
pub fn parse_alias_input(raw: &str) -> ParsedInput {
    let without_at = raw.trim().trim_start_matches('@').trim();

    if without_at.contains('/') {
        let mut parts = without_at.split('/');
        let key = parts.next().unwrap_or_default();
        let args = parts
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        return ParsedInput {
            key: normalize_key(key),
            args,
        };
    }

    let mut words = without_at.split_whitespace();
    let key = words.next().unwrap_or_default();
    let args = words.map(str::to_string).collect();

    ParsedInput {
        key: normalize_key(key),
        args,
    }
}

/// Whether a search-engine query looks like an alias invocation.
pub fn is_likely_alias_query(query: &str) -> bool {
    let query = query.trim();
    query.starts_with('@') && query.chars().count() >= 2
}
