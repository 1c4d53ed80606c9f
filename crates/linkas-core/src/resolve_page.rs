//! Intermediate resolve page
//!
//! Where the search redirect rule lands a tab. The page is a router client:
//! it fetches the capture for its own tab, extracts the query, resolves it
//! and, on success, navigates the same tab away to the targets.

use serde::{Deserialize, Serialize};

use linkas_capture::{CaptureState, FailureReason};
use linkas_tabs::{OpenMode, Tab, TabId};

use crate::error::CoreError;
use crate::router::{Reply, Request, RouterHandle};
use crate::Result;

/// What the page ends up showing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOutcome {
    /// Always terminal
    pub state: CaptureState,
    /// Status line text
    pub status: String,
    /// Manual escape action, offered only on failure
    pub options_url: Option<String>,
    /// Tabs touched by the final navigation
    pub opened: Vec<Tab>,
}

impl PageOutcome {
    fn new(state: CaptureState, opened: Vec<Tab>, options_url: &str) -> Self {
        let (status, options_url) = match &state {
            CaptureState::Resolved { key, .. } => (format!("Opening @{key}…"), None),
            CaptureState::Failed { reason } => (reason.message(), Some(options_url.to_string())),
            _ => (String::new(), None),
        };

        Self {
            state,
            status,
            options_url,
            opened,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, CaptureState::Resolved { .. })
    }
}

pub struct ResolvePage {
    tab_id: TabId,
    router: RouterHandle,
    options_url: String,
}

impl ResolvePage {
    pub fn new(tab_id: TabId, router: RouterHandle, options_url: impl Into<String>) -> Self {
        Self {
            tab_id,
            router,
            options_url: options_url.into(),
        }
    }

    /// Run the page to a terminal state. Internal failures end in `Failed`
    /// with the error text rather than escaping.
    pub async fn run(&self) -> PageOutcome {
        let (state, opened) = match self.drive().await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tab_id = self.tab_id, error = %e, "Resolve page failed");
                let reason = FailureReason::Internal {
                    message: e.to_string(),
                };
                (CaptureState::fail(reason), Vec::new())
            }
        };

        match &state {
            CaptureState::Resolved { key, .. } => {
                tracing::info!(tab_id = self.tab_id, key = %key, "Resolved captured alias")
            }
            CaptureState::Failed { reason } => {
                tracing::debug!(
                    tab_id = self.tab_id,
                    reason = ?reason,
                    "Captured query not resolved"
                )
            }
            _ => {}
        }

        PageOutcome::new(state, opened, &self.options_url)
    }

    async fn drive(&self) -> Result<(CaptureState, Vec<Tab>)> {
        let reply = self
            .request(Request::GetLastSearchUrl { tab_id: self.tab_id })
            .await?;
        let Reply::LastSearchUrl { url } = reply else {
            return Err(unexpected("get-last-search-url"));
        };

        let state = CaptureState::from_capture(url).load_page();
        let Some(query) = state.query().map(str::to_string) else {
            return Ok((state, Vec::new()));
        };

        let reply = self.request(Request::ResolveAlias { raw: query }).await?;
        let Reply::Resolution { resolution } = reply else {
            return Err(unexpected("resolve-alias"));
        };

        let state = state.finish(resolution);
        let CaptureState::Resolved { targets, .. } = &state else {
            return Ok((state, Vec::new()));
        };

        let reply = self
            .request(Request::OpenTargets {
                tab_id: self.tab_id,
                targets: targets.clone(),
                open_mode: OpenMode::CurrentTab,
            })
            .await?;
        let Reply::TargetsOpened { tabs } = reply else {
            return Err(unexpected("open-targets"));
        };

        Ok((state, tabs))
    }

    async fn request(&self, request: Request) -> Result<Reply> {
        self.router.call(request).await?.into_reply()
    }
}

fn unexpected(kind: &str) -> CoreError {
    CoreError::Router(format!("Unexpected reply to {kind}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::Background;
    use crate::config::Config;
    use crate::router::Router;
    use linkas_alias::AliasInput;
    use linkas_capture::ResourceType;
    use std::sync::Arc;

    const RESOLVE_PAGE: &str = "chrome-extension://linkas/pages/resolve/index.html";
    const OPTIONS_PAGE: &str = "chrome-extension://linkas/options/index.html";

    fn setup() -> (Arc<Background>, RouterHandle) {
        let bg = Background::in_memory(Config::default()).unwrap();
        bg.on_startup().unwrap();
        bg.upsert_alias(AliasInput::new("g", vec!["https://x.com/s?q={q}".into()]))
            .unwrap();
        let bg = Arc::new(bg);
        let handle = Router::new(Arc::clone(&bg)).spawn();
        (bg, handle)
    }

    #[tokio::test]
    async fn test_captured_alias_navigates_same_tab() {
        let (bg, handle) = setup();

        let parked = bg
            .navigate(7, "https://www.google.com/search?q=%40g+hi", ResourceType::MainFrame)
            .unwrap();
        assert_eq!(parked.url, RESOLVE_PAGE);

        let outcome = ResolvePage::new(7, handle, bg.options_page_url()).run().await;

        assert!(outcome.is_resolved());
        assert_eq!(outcome.status, "Opening @g…");
        assert!(outcome.options_url.is_none());
        assert_eq!(outcome.opened.len(), 1);
        assert_eq!(outcome.opened[0].id, 7);

        // Same result as typing the alias into the omnibox
        let direct = bg.resolve("@g hi").unwrap();
        assert_eq!(bg.tabs().get_tab(7).unwrap().url, direct.targets[0]);
        assert_eq!(direct.targets[0], "https://x.com/s?q=hi");
    }

    #[tokio::test]
    async fn test_multiple_targets_fan_out() {
        let (bg, handle) = setup();
        bg.upsert_alias(AliasInput::new(
            "both",
            vec!["https://a.example/{0}".into(), "https://b.example/{0}".into()],
        ))
        .unwrap();

        let url = "https://www.bing.com/search?form=QBLH&q=%40both%2Fx";
        bg.navigate(3, url, ResourceType::MainFrame).unwrap();
        let outcome = ResolvePage::new(3, handle, OPTIONS_PAGE).run().await;

        assert!(outcome.is_resolved());
        let urls: Vec<&str> = outcome.opened.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/x", "https://b.example/x"]);
        assert_eq!(outcome.opened[0].id, 3);
        assert!(!outcome.opened[1].is_active());
    }

    #[tokio::test]
    async fn test_no_capture() {
        let (_bg, handle) = setup();
        let outcome = ResolvePage::new(5, handle, OPTIONS_PAGE).run().await;

        assert_eq!(
            outcome.state,
            CaptureState::fail(FailureReason::NoCapturedUrl)
        );
        assert_eq!(
            outcome.status,
            "No captured search URL. Try input @alias in Google/Bing/DDG."
        );
        assert_eq!(outcome.options_url.as_deref(), Some(OPTIONS_PAGE));
    }

    #[tokio::test]
    async fn test_plain_search_is_not_alias() {
        let (bg, handle) = setup();
        bg.navigate(2, "https://duckduckgo.com/?query=rust+lang", ResourceType::MainFrame)
            .unwrap();

        let outcome = ResolvePage::new(2, handle, OPTIONS_PAGE).run().await;
        assert_eq!(outcome.status, "Not an alias query: rust lang");
        assert!(outcome.opened.is_empty());
        assert_eq!(bg.tabs().get_tab(2).unwrap().url, RESOLVE_PAGE);
    }

    #[tokio::test]
    async fn test_unknown_alias_parks_tab() {
        let (bg, handle) = setup();
        bg.navigate(4, "https://www.google.com/search?q=%40zzz", ResourceType::MainFrame)
            .unwrap();

        let outcome = ResolvePage::new(4, handle, OPTIONS_PAGE).run().await;
        assert_eq!(outcome.status, "Alias not found: @zzz");
        assert_eq!(outcome.options_url.as_deref(), Some(OPTIONS_PAGE));
        assert_eq!(bg.tabs().get_tab(4).unwrap().url, RESOLVE_PAGE);
    }

    #[tokio::test]
    async fn test_router_failure_is_reported() {
        let (bg, handle) = setup();
        bg.navigate(6, "https://www.google.com/search?q=%40g", ResourceType::MainFrame)
            .unwrap();
        bg.tabs().close_tab(6).unwrap();

        let outcome = ResolvePage::new(6, handle, OPTIONS_PAGE).run().await;
        let CaptureState::Failed {
            reason: FailureReason::Internal { message },
        } = &outcome.state
        else {
            panic!("expected internal failure");
        };
        assert!(message.contains('6'));
        assert_eq!(&outcome.status, message);
    }
}
