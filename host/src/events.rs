//! Host browser events
//!
//! Lifecycle and tab notifications the browser forwards to the host, tagged
//! by `event` so they never collide with router requests (tagged by `type`).

use serde::{Deserialize, Serialize};

use linkas_core::{Background, RuleMatch, Suggestion, Tab, TabId, WindowDisposition};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum HostEvent {
    Installed,
    Startup,
    RuleMatched(RuleMatch),
    TabUpdated {
        tab_id: TabId,
        url: String,
        #[serde(default)]
        active: bool,
    },
    TabActivated {
        tab_id: TabId,
    },
    TabRemoved {
        tab_id: TabId,
    },
    OmniboxInputChanged {
        text: String,
    },
    OmniboxInputEntered {
        text: String,
        #[serde(default)]
        disposition: WindowDisposition,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum EventOutcome {
    Installed,
    Startup,
    RuleMatched,
    TabUpdated { tab: Tab },
    TabActivated { tab: Tab },
    TabRemoved { tabs: Vec<Tab> },
    OmniboxInputChanged { suggestions: Vec<Suggestion> },
    OmniboxInputEntered { tabs: Vec<Tab> },
}

impl HostEvent {
    pub fn apply(self, background: &Background) -> linkas_core::Result<EventOutcome> {
        let outcome = match self {
            HostEvent::Installed => {
                background.on_installed()?;
                EventOutcome::Installed
            }
            HostEvent::Startup => {
                background.on_startup()?;
                EventOutcome::Startup
            }
            HostEvent::RuleMatched(info) => {
                background.on_rule_matched(&info);
                EventOutcome::RuleMatched
            }
            HostEvent::TabUpdated { tab_id, url, active } => EventOutcome::TabUpdated {
                tab: background.on_tab_updated(tab_id, &url, active)?,
            },
            HostEvent::TabActivated { tab_id } => EventOutcome::TabActivated {
                tab: background.on_tab_activated(tab_id)?,
            },
            HostEvent::TabRemoved { tab_id } => EventOutcome::TabRemoved {
                tabs: background.on_tab_removed(tab_id)?,
            },
            HostEvent::OmniboxInputChanged { text } => EventOutcome::OmniboxInputChanged {
                suggestions: background.on_omnibox_input_changed(&text),
            },
            HostEvent::OmniboxInputEntered { text, disposition } => {
                EventOutcome::OmniboxInputEntered {
                    tabs: background.on_omnibox_input_entered(&text, disposition),
                }
            }
        };

        Ok(outcome)
    }
}
