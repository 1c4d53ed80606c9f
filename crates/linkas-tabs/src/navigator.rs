//! Target navigation
//!
//! The first target follows the requested [`OpenMode`]; every further target
//! opens in a new background tab, in template order.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::manager::TabHost;
use crate::tab::{Tab, TabId};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpenMode {
    /// Replace the page in the given tab
    #[default]
    CurrentTab,
    /// Open a new focused tab
    NewActiveTab,
    /// Open a new background tab
    NewInactiveTab,
}

/// Where the omnibox asked for its result to go. Values the host does not
/// know about fall back to the current tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum WindowDisposition {
    #[default]
    CurrentTab,
    NewForegroundTab,
    NewBackgroundTab,
}

impl From<String> for WindowDisposition {
    fn from(value: String) -> Self {
        match value.as_str() {
            "newForegroundTab" => WindowDisposition::NewForegroundTab,
            "newBackgroundTab" => WindowDisposition::NewBackgroundTab,
            _ => WindowDisposition::CurrentTab,
        }
    }
}

impl OpenMode {
    pub fn from_disposition(disposition: WindowDisposition) -> Self {
        match disposition {
            WindowDisposition::NewForegroundTab => OpenMode::NewActiveTab,
            WindowDisposition::NewBackgroundTab => OpenMode::NewInactiveTab,
            WindowDisposition::CurrentTab => OpenMode::CurrentTab,
        }
    }
}

pub struct TabNavigator {
    host: Arc<dyn TabHost>,
}

impl TabNavigator {
    pub fn new(host: Arc<dyn TabHost>) -> Self {
        Self { host }
    }

    /// Open `targets` starting from `tab_id`. Blank targets are skipped; with
    /// nothing left this is a no-op. Returns the tabs touched, in order.
    pub fn open(&self, tab_id: TabId, targets: &[String], mode: OpenMode) -> Result<Vec<Tab>> {
        let mut list = targets.iter().filter(|t| !t.trim().is_empty());

        let Some(first) = list.next() else {
            tracing::debug!(tab_id, "No targets to open");
            return Ok(Vec::new());
        };

        let mut opened = Vec::with_capacity(targets.len());

        let first_tab = match mode {
            OpenMode::CurrentTab => self.host.update_tab(tab_id, first)?,
            OpenMode::NewActiveTab => self.host.create_tab(first, true)?,
            OpenMode::NewInactiveTab => self.host.create_tab(first, false)?,
        };
        opened.push(first_tab);

        for url in list {
            opened.push(self.host.create_tab(url, false)?);
        }

        tracing::info!(tab_id, mode = ?mode, count = opened.len(), "Opened targets");

        Ok(opened)
    }
}

impl Clone for TabNavigator {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}
