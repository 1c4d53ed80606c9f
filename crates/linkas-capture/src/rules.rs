//! Declarative redirect rules
//!
//! A small model of a host-enforced rule table: rules are installed by id,
//! matched against main-frame requests by regex, and the winning rule's
//! redirect is applied before the page loads. The pipeline never inspects
//! traffic itself; it only sees [`RuleMatch`] notifications.

use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::CaptureError;
use crate::Result;

/// Result pages of Google, Bing and DuckDuckGo that carry a query.
/// The query parameter may come first (`?q=`) or later (`&q=`).
pub const SEARCH_RESULTS_FILTER: &str = concat!(
    r"^(https?://(www\.)?google\.com/search\?(.*&)?q=",
    r"|https?://(www\.)?bing\.com/search\?(.*&)?q=",
    r"|https?://duckduckgo\.com/\?(.*&)?(q|query)=).*$",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MainFrame,
    SubFrame,
    Script,
    Xmlhttprequest,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    pub extension_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuleAction {
    Redirect { redirect: Redirect },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    pub resource_types: Vec<ResourceType>,
    pub regex_filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: u32,
    pub priority: u32,
    pub action: RuleAction,
    pub condition: RuleCondition,
}

/// The rule that reroutes alias-bearing search result pages.
pub fn search_redirect_rule(rule_id: u32, resolve_page_path: &str) -> Rule {
    Rule {
        id: rule_id,
        priority: 1,
        action: RuleAction::Redirect {
            redirect: Redirect {
                extension_path: resolve_page_path.to_string(),
            },
        },
        condition: RuleCondition {
            resource_types: vec![ResourceType::MainFrame],
            regex_filter: SEARCH_RESULTS_FILTER.to_string(),
        },
    }
}

/// A request as seen by the host before it is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRequest {
    pub tab_id: i64,
    pub url: String,
    pub resource_type: ResourceType,
}

impl NetworkRequest {
    pub fn main_frame(tab_id: i64, url: impl Into<String>) -> Self {
        Self {
            tab_id,
            url: url.into(),
            resource_type: ResourceType::MainFrame,
        }
    }
}

/// Notification that a rule fired for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    pub rule_id: u32,
    pub tab_id: i64,
    /// The original, pre-redirect URL
    pub request_url: String,
    /// Where the host sends the tab instead
    pub redirect_url: String,
}

struct CompiledRule {
    rule: Rule,
    filter: Regex,
}

impl CompiledRule {
    fn compile(rule: Rule) -> Result<Self> {
        let filter =
            Regex::new(&rule.condition.regex_filter).map_err(|source| CaptureError::InvalidRegex {
                rule_id: rule.id,
                source,
            })?;
        Ok(Self { rule, filter })
    }

    fn matches(&self, request: &NetworkRequest) -> bool {
        self.rule
            .condition
            .resource_types
            .contains(&request.resource_type)
            && self.filter.is_match(&request.url)
    }
}

/// Dynamic rule table keyed by rule id.
pub struct RuleTable {
    extension_origin: String,
    rules: Arc<RwLock<BTreeMap<u32, Arc<CompiledRule>>>>,
}

impl RuleTable {
    pub fn new(extension_origin: impl Into<String>) -> Self {
        Self {
            extension_origin: extension_origin.into(),
            rules: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Remove `remove_rule_ids`, then add `add_rules`, as one atomic step.
    ///
    /// Fails without changing anything if a regex does not compile or an
    /// added id is still present after the removals.
    pub fn update_dynamic_rules(
        &self,
        remove_rule_ids: &[u32],
        add_rules: Vec<Rule>,
    ) -> Result<()> {
        let compiled = add_rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;

        let mut rules = self.rules.write();
        let mut next = (*rules).clone();

        for id in remove_rule_ids {
            next.remove(id);
        }

        for rule in compiled {
            let id = rule.rule.id;
            if next.contains_key(&id) {
                return Err(CaptureError::DuplicateRuleId(id));
            }
            next.insert(id, Arc::new(rule));
        }

        *rules = next;
        tracing::info!(rule_count = rules.len(), "Updated dynamic rules");
        Ok(())
    }

    /// The winning rule for `request`: highest priority, then lowest id.
    pub fn evaluate(&self, request: &NetworkRequest) -> Option<RuleMatch> {
        let rules = self.rules.read();

        let winner = rules
            .values()
            .filter(|compiled| compiled.matches(request))
            .fold(None::<&Arc<CompiledRule>>, |best, candidate| match best {
                Some(best) if best.rule.priority >= candidate.rule.priority => Some(best),
                _ => Some(candidate),
            })?;

        let RuleAction::Redirect { redirect } = &winner.rule.action;

        Some(RuleMatch {
            rule_id: winner.rule.id,
            tab_id: request.tab_id,
            request_url: request.url.clone(),
            redirect_url: self.extension_url(&redirect.extension_path),
        })
    }

    /// Absolute URL of an extension page.
    pub fn extension_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.extension_origin.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn rules(&self) -> Vec<Rule> {
        self.rules.read().values().map(|c| c.rule.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

impl Clone for RuleTable {
    fn clone(&self) -> Self {
        Self {
            extension_origin: self.extension_origin.clone(),
            rules: Arc::clone(&self.rules),
        }
    }
}
