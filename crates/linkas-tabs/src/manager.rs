//! Tab Manager
//!
//! In-memory model of the host browser's tabs. Ids are handed out in
//! increasing order; tabs reported by the host keep the host's ids.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::error::TabError;
use crate::state::TabState;
use crate::tab::{Tab, TabId};
use crate::Result;

/// The two tab operations target navigation needs from the host browser.
pub trait TabHost: Send + Sync {
    /// Navigate an existing tab in place.
    fn update_tab(&self, tab_id: TabId, url: &str) -> Result<Tab>;

    /// Open a new tab, focused or in the background.
    fn create_tab(&self, url: &str, active: bool) -> Result<Tab>;
}

pub struct TabManager {
    tabs: Arc<RwLock<BTreeMap<TabId, Tab>>>,
    next_id: Arc<AtomicI64>,
}

impl TabManager {
    pub fn new() -> Self {
        Self {
            tabs: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Open a new tab. An active tab takes focus from the current one.
    pub fn open_tab(&self, url: String, active: bool) -> Result<Tab> {
        let id = self
            .next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map_err(|_| TabError::IdsExhausted)?;
        let state = TabState::from_focus(active);
        let tab = Tab::new(id, url, state)?;

        {
            let mut tabs = self.tabs.write();
            if active {
                for other in tabs.values_mut() {
                    other.blur();
                }
            }
            tabs.insert(id, tab.clone());
        }

        tracing::info!(tab_id = tab.id, url = %tab.url, active, "Created new tab");

        Ok(tab)
    }

    /// Record a tab the host already owns (id chosen by the host).
    pub fn track_tab(&self, tab_id: TabId, url: String, active: bool) -> Result<Tab> {
        let state = TabState::from_focus(active);
        let tab = Tab::new(tab_id, url, state)?;

        {
            let mut tabs = self.tabs.write();
            if active {
                for other in tabs.values_mut() {
                    other.blur();
                }
            }
            tabs.insert(tab_id, tab.clone());
        }

        self.next_id.fetch_max(tab_id.saturating_add(1), Ordering::SeqCst);
        tracing::debug!(tab_id, url = %tab.url, active, "Tracking host tab");

        Ok(tab)
    }

    /// Get a tab by ID
    pub fn get_tab(&self, tab_id: TabId) -> Result<Tab> {
        self.tabs
            .read()
            .get(&tab_id)
            .cloned()
            .ok_or(TabError::NotFound(tab_id))
    }

    /// The focused tab, if any.
    pub fn active_tab(&self) -> Option<Tab> {
        self.tabs.read().values().find(|t| t.is_active()).cloned()
    }

    /// Focus a tab, moving the previously active one to the background.
    pub fn activate_tab(&self, tab_id: TabId) -> Result<Tab> {
        let mut tabs = self.tabs.write();
        if !tabs.contains_key(&tab_id) {
            return Err(TabError::NotFound(tab_id));
        }

        for (id, tab) in tabs.iter_mut() {
            if *id == tab_id {
                tab.activate();
            } else {
                tab.blur();
            }
        }

        tabs.get(&tab_id).cloned().ok_or(TabError::NotFound(tab_id))
    }

    /// Navigate a tab to a new URL
    pub fn navigate_tab(&self, tab_id: TabId, url: String) -> Result<Tab> {
        let mut tabs = self.tabs.write();
        let tab = tabs.get_mut(&tab_id).ok_or(TabError::NotFound(tab_id))?;
        tab.navigate(url)?;

        tracing::debug!(tab_id, url = %tab.url, "Navigated tab");
        Ok(tab.clone())
    }

    /// Close a tab
    pub fn close_tab(&self, tab_id: TabId) -> Result<()> {
        self.tabs
            .write()
            .remove(&tab_id)
            .ok_or(TabError::NotFound(tab_id))?;

        tracing::info!(tab_id, "Closed tab");
        Ok(())
    }

    /// All tabs, ordered by id (creation order).
    pub fn list_tabs(&self) -> Vec<Tab> {
        self.tabs.read().values().cloned().collect()
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.read().len()
    }
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TabManager {
    fn clone(&self) -> Self {
        Self {
            tabs: Arc::clone(&self.tabs),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl TabHost for TabManager {
    fn update_tab(&self, tab_id: TabId, url: &str) -> Result<Tab> {
        self.navigate_tab(tab_id, url.to_string())
    }

    fn create_tab(&self, url: &str, active: bool) -> Result<Tab> {
        self.open_tab(url.to_string(), active)
    }
}
