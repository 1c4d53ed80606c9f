//! Message router
//!
//! The single request/response entry point for every extension surface.
//! Requests and replies are tagged by `type`:
//!
//! ```text
//! {"type": "resolve-alias", "raw": "@g hello"}
//!   -> {"ok": true, "reply": {"type": "resolution", "resolution": {...}}}
//! {"type": "nope"}
//!   -> {"ok": false, "error": "Unknown message"}
//! ```
//!
//! Handler failures never escape: they come back as `ok: false`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use linkas_alias::{Alias, AliasInput, Resolution, StoreDocument};
use linkas_tabs::{OpenMode, Tab, TabId};

use crate::background::Background;
use crate::error::CoreError;
use crate::Result;

/// Requests a surface may queue before `call` waits for room.
const QUEUE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Request {
    GetLastSearchUrl {
        tab_id: TabId,
    },
    ResolveAlias {
        raw: String,
    },
    OpenTargets {
        tab_id: TabId,
        #[serde(default)]
        targets: Vec<String>,
        #[serde(default)]
        open_mode: OpenMode,
    },
    UpsertAlias {
        alias: AliasInput,
    },
    DeleteAlias {
        key: String,
    },
    ExportStore,
    ImportStore {
        store: StoreDocument,
    },
    ListAliases {
        #[serde(default)]
        filter: String,
    },
}

impl Request {
    /// Every `type` the router understands.
    pub const KINDS: [&'static str; 8] = [
        "get-last-search-url",
        "resolve-alias",
        "open-targets",
        "upsert-alias",
        "delete-alias",
        "export-store",
        "import-store",
        "list-aliases",
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            Request::GetLastSearchUrl { .. } => "get-last-search-url",
            Request::ResolveAlias { .. } => "resolve-alias",
            Request::OpenTargets { .. } => "open-targets",
            Request::UpsertAlias { .. } => "upsert-alias",
            Request::DeleteAlias { .. } => "delete-alias",
            Request::ExportStore => "export-store",
            Request::ImportStore { .. } => "import-store",
            Request::ListAliases { .. } => "list-aliases",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Reply {
    LastSearchUrl { url: Option<String> },
    Resolution { resolution: Resolution },
    TargetsOpened { tabs: Vec<Tab> },
    AliasSaved { alias: Alias },
    AliasDeleted { removed: bool },
    Store { store: StoreDocument },
    StoreImported { alias_count: usize },
    Aliases { aliases: Vec<Alias> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(reply: Reply) -> Self {
        Self {
            ok: true,
            reply: Some(reply),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            reply: None,
            error: Some(message.into()),
        }
    }

    /// The reply of a successful response, or the failure as an error.
    pub fn into_reply(self) -> Result<Reply> {
        if !self.ok {
            return Err(CoreError::Router(
                self.error.unwrap_or_else(|| "Request failed".to_string()),
            ));
        }
        self.reply
            .ok_or_else(|| CoreError::Router("Empty response".to_string()))
    }
}

pub struct Router {
    background: Arc<Background>,
}

impl Router {
    pub fn new(background: Arc<Background>) -> Self {
        Self { background }
    }

    pub fn background(&self) -> &Arc<Background> {
        &self.background
    }

    /// Run one request to completion on the calling thread.
    pub fn handle(&self, request: Request) -> Result<Reply> {
        let bg = &self.background;

        let reply = match request {
            Request::GetLastSearchUrl { tab_id } => Reply::LastSearchUrl {
                url: bg.last_search_url(tab_id)?,
            },
            Request::ResolveAlias { raw } => Reply::Resolution {
                resolution: bg.resolve(&raw)?,
            },
            Request::OpenTargets {
                tab_id,
                targets,
                open_mode,
            } => Reply::TargetsOpened {
                tabs: bg.open_targets(tab_id, &targets, open_mode)?,
            },
            Request::UpsertAlias { alias } => Reply::AliasSaved {
                alias: bg.upsert_alias(alias)?,
            },
            Request::DeleteAlias { key } => Reply::AliasDeleted {
                removed: bg.delete_alias(&key)?,
            },
            Request::ExportStore => Reply::Store {
                store: bg.export_store()?,
            },
            Request::ImportStore { store } => {
                let alias_count = store.len();
                bg.import_store(store)?;
                Reply::StoreImported { alias_count }
            }
            Request::ListAliases { filter } => Reply::Aliases {
                aliases: bg.list_aliases(&filter)?,
            },
        };

        Ok(reply)
    }

    /// Answer a request. Storage work runs on the blocking pool; any
    /// failure, panics included, becomes an `ok: false` response.
    pub async fn dispatch(&self, request: Request) -> Response {
        let kind = request.kind();
        let router = self.clone();

        match tokio::task::spawn_blocking(move || router.handle(request)).await {
            Ok(Ok(reply)) => Response::ok(reply),
            Ok(Err(e)) => {
                tracing::warn!(kind, error = %e, "Request failed");
                Response::err(e.to_string())
            }
            Err(e) => {
                tracing::error!(kind, error = %e, "Request handler aborted");
                Response::err("Internal error")
            }
        }
    }

    /// Answer an untyped message as it arrives from a surface.
    pub async fn dispatch_value(&self, message: Value) -> Response {
        let kind = message
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);

        match kind {
            Some(kind) if Request::KINDS.contains(&kind.as_str()) => {
                match serde_json::from_value::<Request>(message) {
                    Ok(request) => self.dispatch(request).await,
                    Err(e) => {
                        tracing::warn!(kind = %kind, error = %e, "Malformed request");
                        Response::err(format!("Malformed {kind} message: {e}"))
                    }
                }
            }
            other => {
                tracing::debug!(kind = ?other, "Unknown message");
                Response::err("Unknown message")
            }
        }
    }

    /// Move the router onto its own task. Requests are answered one at a
    /// time, in arrival order. Must be called inside a tokio runtime.
    pub fn spawn(self) -> RouterHandle {
        let (sender, mut receiver) = mpsc::channel::<Envelope>(QUEUE_DEPTH);

        tokio::spawn(async move {
            while let Some(envelope) = receiver.recv().await {
                let response = self.dispatch(envelope.request).await;
                if envelope.reply.send(response).is_err() {
                    tracing::debug!("Caller went away before the reply");
                }
            }
            tracing::debug!("Router stopped");
        });

        RouterHandle { sender }
    }
}

impl Clone for Router {
    fn clone(&self) -> Self {
        Self {
            background: Arc::clone(&self.background),
        }
    }
}

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Client side of a spawned router. Each call waits for exactly one
/// response; there is no timeout.
#[derive(Clone)]
pub struct RouterHandle {
    sender: mpsc::Sender<Envelope>,
}

impl RouterHandle {
    pub async fn call(&self, request: Request) -> Result<Response> {
        let (reply, response) = oneshot::channel();

        self.sender
            .send(Envelope { request, reply })
            .await
            .map_err(|_| CoreError::RouterClosed)?;

        response.await.map_err(|_| CoreError::RouterClosed)
    }
}
