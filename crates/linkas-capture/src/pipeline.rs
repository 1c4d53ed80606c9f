//! Capture pipeline: rule installation plus the rule-matched hook

use crate::cache::CaptureCache;
use crate::rules::{search_redirect_rule, NetworkRequest, RuleMatch, RuleTable};
use crate::state::CaptureState;
use crate::Result;

pub struct CapturePipeline {
    rules: RuleTable,
    cache: CaptureCache,
    rule_id: u32,
    resolve_page_path: String,
}

impl CapturePipeline {
    pub fn new(
        rules: RuleTable,
        cache: CaptureCache,
        rule_id: u32,
        resolve_page_path: impl Into<String>,
    ) -> Self {
        Self {
            rules,
            cache,
            rule_id,
            resolve_page_path: resolve_page_path.into(),
        }
    }

    /// Install the search redirect rule, replacing any rule with the same id.
    pub fn install(&self) -> Result<()> {
        let rule = search_redirect_rule(self.rule_id, &self.resolve_page_path);
        self.rules.update_dynamic_rules(&[self.rule_id], vec![rule])?;
        tracing::info!(rule_id = self.rule_id, "Installed search redirect rule");
        Ok(())
    }

    /// Rule-matched notification from the host. Failures are logged and
    /// dropped; the redirect has already happened either way.
    pub fn on_rule_matched(&self, info: &RuleMatch) {
        if info.request_url.is_empty() {
            return;
        }

        if let Err(e) = self.cache.record(info.tab_id, &info.request_url) {
            tracing::warn!(tab_id = info.tab_id, error = %e, "Failed to record captured URL");
        }
    }

    /// Run a request through the rule table the way the host would. On a
    /// match the capture is recorded and the match (with its redirect URL)
    /// is returned.
    pub fn intercept(&self, request: &NetworkRequest) -> Option<RuleMatch> {
        let hit = self.rules.evaluate(request)?;
        tracing::debug!(
            tab_id = hit.tab_id,
            rule_id = hit.rule_id,
            url = %hit.request_url,
            "Redirect rule matched"
        );
        self.on_rule_matched(&hit);
        Some(hit)
    }

    pub fn last_search_url(&self, tab_id: i64) -> Result<Option<String>> {
        self.cache.last_url(tab_id)
    }

    /// Current capture state for a tab, before the resolve page runs.
    pub fn state(&self, tab_id: i64) -> Result<CaptureState> {
        Ok(CaptureState::from_capture(self.cache.last_url(tab_id)?))
    }

    /// URL of the intermediate resolve page.
    pub fn resolve_page_url(&self) -> String {
        self.rules.extension_url(&self.resolve_page_path)
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }
}

impl Clone for CapturePipeline {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            cache: self.cache.clone(),
            rule_id: self.rule_id,
            resolve_page_path: self.resolve_page_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkas_storage::MemoryArea;
    use std::sync::Arc;

    fn pipeline() -> CapturePipeline {
        CapturePipeline::new(
            RuleTable::new("chrome-extension://linkas"),
            CaptureCache::new(Arc::new(MemoryArea::new())),
            1001,
            "/pages/resolve/index.html",
        )
    }

    #[test]
    fn test_install_is_idempotent() {
        let pipeline = pipeline();
        pipeline.install().unwrap();
        pipeline.install().unwrap();
        assert_eq!(pipeline.rules().len(), 1);
    }

    #[test]
    fn test_intercept_records_capture() {
        let pipeline = pipeline();
        pipeline.install().unwrap();

        let url = "https://www.google.com/search?q=%40g+hi";
        let hit = pipeline.intercept(&NetworkRequest::main_frame(7, url)).unwrap();
        assert_eq!(hit.redirect_url, pipeline.resolve_page_url());
        assert_eq!(pipeline.last_search_url(7).unwrap().as_deref(), Some(url));
        assert!(matches!(pipeline.state(7).unwrap(), CaptureState::Captured { .. }));
        assert_eq!(pipeline.state(8).unwrap(), CaptureState::Idle);
    }

    #[test]
    fn test_no_rule_no_capture() {
        let pipeline = pipeline();
        let hit = pipeline.intercept(&NetworkRequest::main_frame(
            7,
            "https://www.google.com/search?q=%40g",
        ));
        assert!(hit.is_none());
        assert!(pipeline.last_search_url(7).unwrap().is_none());
    }
}
