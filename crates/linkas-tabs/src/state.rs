//! Tab State Machine
//!
//! ```text
//! Active
//!   ↓ blur         ↑ activate
//! Background
//! ```
//! At most one tab is active at a time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabState {
    /// Tab is focused in its window
    Active,
    /// Tab is open but not focused
    Background,
}

impl TabState {
    /// State of a tab that does or does not hold focus.
    pub fn from_focus(focused: bool) -> Self {
        if focused {
            TabState::Active
        } else {
            TabState::Background
        }
    }

    pub fn is_active(self) -> bool {
        self == TabState::Active
    }
}

impl std::fmt::Display for TabState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TabState::Active => "active",
            TabState::Background => "background",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_mapping() {
        assert_eq!(TabState::from_focus(true), TabState::Active);
        assert!(!TabState::from_focus(false).is_active());
        assert_eq!(
            serde_json::to_string(&TabState::Background).unwrap(),
            "\"background\""
        );
    }
}
