//! Per-tab capture state machine
//!
//! ```text
//! Idle ──rule matched──▶ Captured ──page load──▶ Resolving ──▶ Resolved
//!   │                                                │
//!   └──────────────page load─────────────────────────┴───────▶ Failed
//! ```
//! `Resolved` and `Failed` are terminal.

use serde::{Deserialize, Serialize};

use linkas_alias::{is_likely_alias_query, Resolution};

use crate::query::extract_search_query;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FailureReason {
    NoCapturedUrl,
    NotAliasQuery { query: String },
    AliasNotFound { query: String },
    Internal { message: String },
}

impl FailureReason {
    /// Text shown on the intermediate page.
    pub fn message(&self) -> String {
        match self {
            FailureReason::NoCapturedUrl => {
                "No captured search URL. Try input @alias in Google/Bing/DDG.".to_string()
            }
            FailureReason::NotAliasQuery { query } => format!("Not an alias query: {query}"),
            FailureReason::AliasNotFound { query } => format!("Alias not found: {query}"),
            FailureReason::Internal { message } => message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CaptureState {
    Idle,
    Captured { url: String },
    Resolving { query: String },
    Resolved { key: String, targets: Vec<String> },
    Failed { reason: FailureReason },
}

impl CaptureState {
    /// State of a tab given its captured URL, if any.
    pub fn from_capture(url: Option<String>) -> Self {
        match url {
            Some(url) => CaptureState::Captured { url },
            None => CaptureState::Idle,
        }
    }

    /// The intermediate page loaded: pull the query out of the capture.
    pub fn load_page(self) -> Self {
        match self {
            CaptureState::Idle => CaptureState::fail(FailureReason::NoCapturedUrl),
            CaptureState::Captured { url } => {
                let query = extract_search_query(&url);
                if is_likely_alias_query(&query) {
                    CaptureState::Resolving { query }
                } else {
                    CaptureState::fail(FailureReason::NotAliasQuery { query })
                }
            }
            other => other,
        }
    }

    /// Apply the resolution of the extracted query.
    pub fn finish(self, resolution: Resolution) -> Self {
        match self {
            CaptureState::Resolving { query } => {
                if resolution.found && !resolution.targets.is_empty() {
                    CaptureState::Resolved {
                        key: resolution.key,
                        targets: resolution.targets,
                    }
                } else {
                    CaptureState::fail(FailureReason::AliasNotFound { query })
                }
            }
            other => other,
        }
    }

    pub fn fail(reason: FailureReason) -> Self {
        CaptureState::Failed { reason }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CaptureState::Resolved { .. } | CaptureState::Failed { .. }
        )
    }

    /// The query being resolved, while in `Resolving`.
    pub fn query(&self) -> Option<&str> {
        match self {
            CaptureState::Resolving { query } => Some(query),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(url: &str) -> CaptureState {
        CaptureState::from_capture(Some(url.to_string()))
    }

    fn resolution(found: bool, targets: &[&str]) -> Resolution {
        Resolution {
            found,
            key: "g".to_string(),
            args: vec!["hi".to_string()],
            targets: targets.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_happy_path() {
        let state = captured("https://www.google.com/search?q=%40g+hi").load_page();
        assert_eq!(state.query(), Some("@g hi"));

        let state = state.finish(resolution(true, &["https://x.com/s?q=hi"]));
        assert!(state.is_terminal());
        assert_eq!(
            state,
            CaptureState::Resolved {
                key: "g".to_string(),
                targets: vec!["https://x.com/s?q=hi".to_string()],
            }
        );
    }

    #[test]
    fn test_idle_fails() {
        let state = CaptureState::from_capture(None).load_page();
        assert_eq!(state, CaptureState::fail(FailureReason::NoCapturedUrl));
    }

    #[test]
    fn test_plain_query_fails() {
        let state = captured("https://www.bing.com/search?q=rust+book").load_page();
        let CaptureState::Failed { reason } = state else {
            panic!("expected failure");
        };
        assert_eq!(reason.message(), "Not an alias query: rust book");
    }

    #[test]
    fn test_unresolved_fails() {
        let state = captured("https://duckduckgo.com/?q=%40zzz")
            .load_page()
            .finish(resolution(false, &[]));
        let CaptureState::Failed { reason } = state else {
            panic!("expected failure");
        };
        assert_eq!(reason.message(), "Alias not found: @zzz");

        // Found but with no targets is still a failure
        let state = captured("https://duckduckgo.com/?q=%40g")
            .load_page()
            .finish(resolution(true, &[]));
        assert!(matches!(state, CaptureState::Failed { .. }));
    }

    #[test]
    fn test_terminal_states_absorb() {
        let failed = CaptureState::fail(FailureReason::NoCapturedUrl);
        assert_eq!(failed.clone().load_page(), failed);
        assert_eq!(failed.clone().finish(resolution(true, &["x"])), failed);
    }
}
