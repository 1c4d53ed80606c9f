//! Background context
//!
//! Owns every long-lived component: the alias store and engine, the capture
//! pipeline, and the tab model. Extension surfaces never touch these
//! directly; they go through the [`Router`](crate::Router).

use std::sync::Arc;

use linkas_alias::{
    Alias, AliasInput, AliasStore, Resolution, ResolutionEngine, StoreDocument, Suggestion,
};
use linkas_capture::{
    CaptureCache, CapturePipeline, CaptureState, NetworkRequest, ResourceType, RuleMatch,
    RuleTable,
};
use linkas_storage::{Database, MemoryArea, StorageArea};
use linkas_tabs::{OpenMode, Tab, TabError, TabId, TabManager, TabNavigator};

use crate::config::Config;
use crate::Result;

/// Aliases written on first install when the store is empty.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("work", "https://example.com"),
    ("g", "https://www.google.com/search?q={q}"),
];

pub struct Background {
    config: Config,
    /// Volatile area; cleared when the browsing session ends
    session: MemoryArea,
    aliases: AliasStore,
    engine: ResolutionEngine,
    capture: CapturePipeline,
    tabs: TabManager,
    navigator: TabNavigator,
}

impl Background {
    /// Open the durable store at `config.database_path`.
    pub fn new(config: Config) -> Result<Self> {
        let db = Database::open(&config.database_path)?;
        Ok(Self::with_local_area(config, Arc::new(db)))
    }

    /// Background with an in-memory durable store.
    pub fn in_memory(config: Config) -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self::with_local_area(config, Arc::new(db)))
    }

    pub fn with_local_area(config: Config, local: Arc<dyn StorageArea>) -> Self {
        let session = MemoryArea::new();

        let aliases = AliasStore::new(local);
        let engine = ResolutionEngine::with_limits(
            aliases.clone(),
            config.max_suggestions,
            config.preview_chars,
        );

        let capture = CapturePipeline::new(
            RuleTable::new(config.extension_origin.clone()),
            CaptureCache::new(Arc::new(session.clone())),
            config.redirect_rule_id,
            config.resolve_page_path.clone(),
        );

        let tabs = TabManager::new();
        let navigator = TabNavigator::new(Arc::new(tabs.clone()));

        Self {
            config,
            session,
            aliases,
            engine,
            capture,
            tabs,
            navigator,
        }
    }

    // === Lifecycle ===

    /// First install: seed the store, then install the redirect rule.
    pub fn on_installed(&self) -> Result<()> {
        self.ensure_default_data()?;
        self.capture.install()?;
        tracing::info!("Extension installed");
        Ok(())
    }

    /// Browser startup: reinstall the redirect rule.
    pub fn on_startup(&self) -> Result<()> {
        self.capture.install()?;
        tracing::info!("Extension started");
        Ok(())
    }

    /// Seed the example aliases if seeding is enabled and the store is
    /// empty. Returns whether anything was written.
    pub fn ensure_default_data(&self) -> Result<bool> {
        if !self.config.seed_default_aliases || !self.aliases.is_empty()? {
            return Ok(false);
        }

        for (key, target) in DEFAULT_ALIASES {
            self.aliases
                .upsert(AliasInput::new(*key, vec![target.to_string()]))?;
        }

        tracing::info!(count = DEFAULT_ALIASES.len(), "Seeded default aliases");
        Ok(true)
    }

    /// Browsing session ended: everything session-scoped is gone.
    pub fn end_session(&self) {
        self.session.clear();
        tracing::info!("Session storage cleared");
    }

    // === Host events ===

    /// Run a navigation through the installed rules the way the host does.
    /// A matching main-frame request is captured and the tab lands on the
    /// intermediate page instead of the requested URL.
    pub fn navigate(&self, tab_id: TabId, url: &str, resource_type: ResourceType) -> Result<Tab> {
        let request = NetworkRequest {
            tab_id,
            url: url.to_string(),
            resource_type,
        };

        let destination = match self.capture.intercept(&request) {
            Some(hit) => hit.redirect_url,
            None => url.to_string(),
        };

        if resource_type != ResourceType::MainFrame {
            return Ok(self.tabs.get_tab(tab_id)?);
        }

        match self.tabs.navigate_tab(tab_id, destination.clone()) {
            Err(TabError::NotFound(_)) => Ok(self.tabs.track_tab(tab_id, destination, true)?),
            other => Ok(other?),
        }
    }

    /// Rule-matched notification reported by the host.
    pub fn on_rule_matched(&self, info: &RuleMatch) {
        self.capture.on_rule_matched(info);
    }

    /// The host reports a tab it owns (created, navigated or focused).
    pub fn on_tab_updated(&self, tab_id: TabId, url: &str, active: bool) -> Result<Tab> {
        let tab = self.tabs.track_tab(tab_id, url.to_string(), active)?;
        Ok(tab)
    }

    /// The host focused a tab; the previously active one goes to the
    /// background.
    pub fn on_tab_activated(&self, tab_id: TabId) -> Result<Tab> {
        Ok(self.tabs.activate_tab(tab_id)?)
    }

    /// The host closed a tab. Returns the tabs still open.
    pub fn on_tab_removed(&self, tab_id: TabId) -> Result<Vec<Tab>> {
        self.tabs.close_tab(tab_id)?;
        Ok(self.tabs.list_tabs())
    }

    // === Operations behind the router ===

    pub fn last_search_url(&self, tab_id: TabId) -> Result<Option<String>> {
        Ok(self.capture.last_search_url(tab_id)?)
    }

    pub fn resolve(&self, raw: &str) -> Result<Resolution> {
        Ok(self.engine.resolve(raw)?)
    }

    pub fn suggest(&self, partial: &str) -> Result<Vec<Suggestion>> {
        Ok(self.engine.suggest(partial)?)
    }

    pub fn open_targets(
        &self,
        tab_id: TabId,
        targets: &[String],
        mode: OpenMode,
    ) -> Result<Vec<Tab>> {
        Ok(self.navigator.open(tab_id, targets, mode)?)
    }

    pub fn upsert_alias(&self, input: AliasInput) -> Result<Alias> {
        Ok(self.aliases.upsert(input)?)
    }

    pub fn delete_alias(&self, key: &str) -> Result<bool> {
        Ok(self.aliases.delete(key)?)
    }

    pub fn list_aliases(&self, filter: &str) -> Result<Vec<Alias>> {
        Ok(self.aliases.list(filter)?)
    }

    pub fn export_store(&self) -> Result<StoreDocument> {
        Ok(self.aliases.export()?)
    }

    pub fn import_store(&self, doc: StoreDocument) -> Result<()> {
        Ok(self.aliases.import(doc)?)
    }

    /// Capture state of a tab before its intermediate page runs.
    pub fn capture_state(&self, tab_id: TabId) -> Result<CaptureState> {
        Ok(self.capture.state(tab_id)?)
    }

    // === Accessors ===

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn aliases(&self) -> &AliasStore {
        &self.aliases
    }

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn capture(&self) -> &CapturePipeline {
        &self.capture
    }

    pub fn resolve_page_url(&self) -> String {
        self.capture.resolve_page_url()
    }

    pub fn options_page_url(&self) -> String {
        self.capture.rules().extension_url(&self.config.options_page_path)
    }
}
