//! Linkas Core
//!
//! Coordination layer for go-link aliases: the background context that owns
//! all state, the message router every surface talks through, the omnibox
//! handlers and the intermediate resolve page.

mod background;
mod config;
mod error;
mod omnibox;
mod resolve_page;
mod router;

pub use background::Background;
pub use config::Config;
pub use error::CoreError;
pub use omnibox::OMNIBOX_KEYWORD;
pub use resolve_page::{PageOutcome, ResolvePage};
pub use router::{Reply, Request, Response, Router, RouterHandle};

// Re-export the component crates' public surface
pub use linkas_alias::{
    normalize_key, parse_alias_input, render_template, Alias, AliasError, AliasInput, AliasStore,
    Resolution, ResolutionEngine, StoreDocument, Suggestion,
};
pub use linkas_capture::{
    CaptureError, CapturePipeline, CaptureState, FailureReason, NetworkRequest, ResourceType,
    RuleMatch,
};
pub use linkas_storage::{Database, MemoryArea, StorageArea, StorageError};
pub use linkas_tabs::{OpenMode, Tab, TabError, TabId, TabManager, TabState, WindowDisposition};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Version of the running build.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging. Output goes to stderr so stdout stays free for the
/// host protocol.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
