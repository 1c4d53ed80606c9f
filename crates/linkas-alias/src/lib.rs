//! Linkas Alias Resolution
//!
//! An alias maps a short key to one or more URL templates:
//!   1. Raw trigger text (`@g rust book`, `@gh/rust-lang/rust`) is parsed
//!      into a normalized key and positional arguments
//!   2. The key is looked up in the alias store
//!   3. Every target template of the alias is rendered against the arguments
//!
//! A missing alias is a normal outcome (`found: false`), never an error.

mod engine;
mod error;
mod parse;
mod record;
mod store;
mod template;

pub use engine::{truncate_preview, Resolution, ResolutionEngine, Suggestion};
pub use error::AliasError;
pub use parse::{is_likely_alias_query, normalize_key, parse_alias_input, ParsedInput};
pub use record::{Alias, AliasInput, AliasMap, StoreDocument, StoreMeta, STORE_KEY, STORE_VERSION};
pub use store::AliasStore;
pub use template::{encode_component, render_targets, render_template};

pub type Result<T> = std::result::Result<T, AliasError>;
