//! Tab data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TabError;
use crate::state::TabState;
use crate::Result;

pub type TabId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Host-assigned numeric identifier
    pub id: TabId,
    /// Current URL
    pub url: String,
    /// Current state in the state machine
    pub state: TabState,
    /// When the tab was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Tab {
    pub fn new(id: TabId, url: String, state: TabState) -> Result<Self> {
        require_url(&url)?;
        let now = Utc::now();

        Ok(Self {
            id,
            url,
            state,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn transition_to(&mut self, new_state: TabState) {
        if self.state == new_state {
            return;
        }

        tracing::debug!(
            tab_id = self.id,
            from = %self.state,
            to = %new_state,
            "Tab state transition"
        );

        self.state = new_state;
        self.updated_at = Utc::now();
    }

    pub fn activate(&mut self) {
        self.transition_to(TabState::Active)
    }

    pub fn blur(&mut self) {
        self.transition_to(TabState::Background)
    }

    /// Point the tab at a new page.
    pub fn navigate(&mut self, url: String) -> Result<()> {
        require_url(&url)?;
        self.url = url;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

fn require_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(TabError::InvalidUrl(format!("{url:?} is blank")));
    }
    Ok(())
}
