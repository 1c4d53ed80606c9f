//! Linkas native messaging host
//!
//! Speaks length-prefixed JSON over stdio. Frames carrying `type` go to the
//! message router; frames carrying `event` are browser notifications
//! (install, startup, rule matched, tab changes, omnibox input).
//! Logs go to stderr.

mod cli;
mod events;
mod protocol;
mod state;

use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncWrite};

use linkas_core::{Background, Config};

pub use cli::{export_store, import_store, Cli, HostCommand};
pub use events::{EventOutcome, HostEvent};
pub use protocol::{read_frame, write_frame, FrameError, MAX_FRAME_LEN};
pub use state::{EventResponse, HostState};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "LINKAS_CONFIG";

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    linkas_core::init_logging();

    let config_path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| Config::data_dir().join("linkas.toml"));
    let config = Config::load(&config_path)?;

    match cli.command {
        Some(HostCommand::Export) => {
            let background = Background::new(config)?;
            println!("{}", export_store(&background)?);
            return Ok(());
        }
        Some(HostCommand::Import { path }) => {
            let background = Background::new(config)?;
            let count = import_store(&background, &path)?;
            eprintln!("Imported {count} aliases from {}", path.display());
            return Ok(());
        }
        None => {}
    }

    let state = HostState::new(config)?;
    tracing::info!(
        version = linkas_core::VERSION,
        origin = cli.origin.as_deref().unwrap_or("-"),
        "Linkas host started"
    );

    serve(&state, tokio::io::stdin(), tokio::io::stdout()).await?;

    tracing::info!("Input closed, shutting down");
    Ok(())
}

/// Answer frames from `reader` on `writer` until the reader is exhausted.
pub async fn serve<R, W>(state: &HostState, mut reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(body) = read_frame(&mut reader).await? {
        let reply = state.handle_frame(&body).await;
        write_frame(&mut writer, &reply).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkas_core::Background;
    use serde_json::{json, Value};

    async fn exchange(frames: &[Value]) -> Vec<Value> {
        let state = HostState::with_background(Background::in_memory(Config::default()).unwrap());

        let mut input = Vec::new();
        for frame in frames {
            write_frame(&mut input, frame).await.unwrap();
        }

        let mut output = Vec::new();
        serve(&state, input.as_slice(), &mut output).await.unwrap();

        let mut replies = Vec::new();
        let mut reader = output.as_slice();
        while let Some(body) = read_frame(&mut reader).await.unwrap() {
            replies.push(serde_json::from_slice(&body).unwrap());
        }
        replies
    }

    #[tokio::test]
    async fn test_capture_flow_over_stdio() {
        let replies = exchange(&[
            json!({"event": "installed"}),
            json!({"event": "tab-updated", "tabId": 7, "url": "about:blank", "active": true}),
            json!({
                "event": "rule-matched",
                "ruleId": 1001,
                "tabId": 7,
                "requestUrl": "https://www.google.com/search?q=%40g+hi",
                "redirectUrl": "chrome-extension://linkas/pages/resolve/index.html"
            }),
            json!({"type": "get-last-search-url", "tabId": 7}),
            json!({"type": "resolve-alias", "raw": "@g hi"}),
            json!({
                "type": "open-targets",
                "tabId": 7,
                "targets": ["https://www.google.com/search?q=hi"],
                "openMode": "currentTab"
            }),
        ])
        .await;

        assert_eq!(replies.len(), 6);
        assert!(replies.iter().all(|r| r["ok"] == json!(true)));
        assert_eq!(
            replies[3]["reply"]["url"],
            json!("https://www.google.com/search?q=%40g+hi")
        );
        assert_eq!(
            replies[4]["reply"]["resolution"]["targets"],
            json!(["https://www.google.com/search?q=hi"])
        );
        assert_eq!(replies[5]["reply"]["tabs"][0]["id"], json!(7));
    }

    #[tokio::test]
    async fn test_every_frame_gets_a_reply() {
        let replies = exchange(&[
            json!({"type": "no-such-request"}),
            json!({"event": "no-such-event"}),
            json!([1, 2, 3]),
            json!({"type": "export-store"}),
        ])
        .await;

        assert_eq!(replies.len(), 4);
        assert_eq!(replies[0]["error"], json!("Unknown message"));
        assert_eq!(replies[1]["ok"], json!(false));
        assert_eq!(replies[2]["error"], json!("Unknown message"));
        assert_eq!(replies[3]["reply"]["store"]["meta"]["version"], json!(1));
    }

    #[tokio::test]
    async fn test_unreadable_frame() {
        let state = HostState::with_background(Background::in_memory(Config::default()).unwrap());
        let reply = state.handle_frame(b"{not json").await;
        assert_eq!(reply["ok"], json!(false));
        assert!(reply["error"].as_str().unwrap().starts_with("Malformed frame"));
    }
}
