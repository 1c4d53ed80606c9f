//! Host state: one background context behind one router

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use linkas_core::{Background, Config, Result, Router};

use crate::events::{EventOutcome, HostEvent};

/// Reply to a host event frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<EventOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct HostState {
    background: Arc<Background>,
    router: Router,
}

impl HostState {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::with_background(Background::new(config)?))
    }

    pub fn with_background(background: Background) -> Self {
        let background = Arc::new(background);
        let router = Router::new(Arc::clone(&background));
        Self { background, router }
    }

    pub fn background(&self) -> &Arc<Background> {
        &self.background
    }

    /// Answer one frame body. Always produces exactly one reply.
    pub async fn handle_frame(&self, body: &[u8]) -> Value {
        let message: Value = match serde_json::from_slice(body) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable frame");
                return json!({ "ok": false, "error": format!("Malformed frame: {e}") });
            }
        };

        let reply = if message.get("event").is_some() {
            serde_json::to_value(self.handle_event(message).await)
        } else {
            serde_json::to_value(self.router.dispatch_value(message).await)
        };

        reply.unwrap_or_else(|e| json!({ "ok": false, "error": e.to_string() }))
    }

    async fn handle_event(&self, message: Value) -> EventResponse {
        let event: HostEvent = match serde_json::from_value(message) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Unknown host event");
                return EventResponse {
                    ok: false,
                    outcome: None,
                    error: Some(format!("Unknown event: {e}")),
                };
            }
        };

        let background = Arc::clone(&self.background);
        match tokio::task::spawn_blocking(move || event.apply(&background)).await {
            Ok(Ok(outcome)) => EventResponse {
                ok: true,
                outcome: Some(outcome),
                error: None,
            },
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Host event failed");
                EventResponse {
                    ok: false,
                    outcome: None,
                    error: Some(e.to_string()),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Host event handler aborted");
                EventResponse {
                    ok: false,
                    outcome: None,
                    error: Some("Internal error".to_string()),
                }
            }
        }
    }
}
