//! Omnibox surface
//!
//! Triggered by the `@` keyword. The host hands over the text typed after
//! the keyword, so `@` is put back before resolution.

use linkas_alias::Suggestion;
use linkas_tabs::{OpenMode, Tab, WindowDisposition};

use crate::background::Background;
use crate::Result;

pub const OMNIBOX_KEYWORD: &str = "@";

impl Background {
    /// Suggestions while the user types. Failures yield no suggestions.
    pub fn on_omnibox_input_changed(&self, text: &str) -> Vec<Suggestion> {
        match self.suggest(text) {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!(error = %e, "Omnibox suggestions failed");
                Vec::new()
            }
        }
    }

    /// The user committed `text`. Opens the resolved targets relative to the
    /// active tab; anything that does not resolve is a no-op.
    pub fn on_omnibox_input_entered(&self, text: &str, disposition: WindowDisposition) -> Vec<Tab> {
        match self.enter_omnibox_text(text, disposition) {
            Ok(tabs) => tabs,
            Err(e) => {
                tracing::warn!(error = %e, "Omnibox navigation failed");
                Vec::new()
            }
        }
    }

    fn enter_omnibox_text(&self, text: &str, disposition: WindowDisposition) -> Result<Vec<Tab>> {
        let Some(active) = self.tabs().active_tab() else {
            tracing::debug!("No active tab for omnibox input");
            return Ok(Vec::new());
        };

        let raw = format!("{OMNIBOX_KEYWORD}{text}");
        let resolution = self.resolve(&raw)?;
        if !resolution.found || resolution.targets.is_empty() {
            tracing::debug!(key = %resolution.key, "Omnibox input did not resolve");
            return Ok(Vec::new());
        }

        let mode = OpenMode::from_disposition(disposition);
        self.open_targets(active.id, &resolution.targets, mode)
    }
}
