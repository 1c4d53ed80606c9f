//! Linkas Redirect Capture
//!
//! `@alias` queries typed into a search engine never reach it:
//! 1. A declarative rule matches the engine's result-page URL and redirects
//!    the main-frame navigation to the intermediate resolve page
//! 2. The rule-matched notification stores the original URL in a per-tab
//!    capture cache (session storage)
//! 3. The resolve page reads the captured URL for its tab, extracts the
//!    query, and resolves it like omnibox input
//!
//! Supported engines: Google (`q`), Bing (`q`), DuckDuckGo (`q` or `query`).

mod cache;
mod error;
mod pipeline;
mod query;
mod rules;
mod state;

pub use cache::{CaptureCache, CaptureEntry, LAST_SEARCH_KEY};
pub use error::CaptureError;
pub use pipeline::CapturePipeline;
pub use query::extract_search_query;
pub use rules::{
    search_redirect_rule, NetworkRequest, Redirect, ResourceType, Rule, RuleAction,
    RuleCondition, RuleMatch, RuleTable, SEARCH_RESULTS_FILTER,
};
pub use state::{CaptureState, FailureReason};

pub type Result<T> = std::result::Result<T, CaptureError>;
