//! Command line
//!
//! The browser starts the host with the caller's origin (and on Windows a
//! `--parent-window` handle); that form serves the messaging protocol.
//! The `export` and `import` subcommands back up and restore the alias
//! store from a terminal.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use linkas_core::{Background, StoreDocument};

#[derive(Debug, Parser)]
#[command(name = "linkas-host", version)]
#[command(about = "Linkas native messaging host", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<HostCommand>,

    /// Origin of the calling extension, passed by the browser.
    #[arg(value_name = "ORIGIN")]
    pub origin: Option<String>,

    /// Native handle of the calling window, passed by the browser on Windows.
    #[arg(long, value_name = "HANDLE")]
    pub parent_window: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum HostCommand {
    /// Print the alias store as pretty JSON.
    Export,

    /// Replace the alias store with a JSON backup.
    Import {
        /// Path to the backup file.
        path: PathBuf,
    },
}

/// The whole store, in backup format.
pub fn export_store(background: &Background) -> anyhow::Result<String> {
    let doc = background.export_store()?;
    Ok(doc.to_pretty_json()?)
}

/// Replace the store with the document at `path`. Returns the number of
/// aliases imported.
pub fn import_store(background: &Background, path: &Path) -> anyhow::Result<usize> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = StoreDocument::from_json_str(&text)
        .with_context(|| format!("Invalid store document in {}", path.display()))?;

    let count = doc.len();
    background.import_store(doc)?;

    tracing::info!(path = %path.display(), count, "Restored alias store from file");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkas_core::{AliasInput, Config};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_browser_launch_serves() {
        let cli = parse(&["linkas-host", "chrome-extension://abcdef/"]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.origin.as_deref(), Some("chrome-extension://abcdef/"));

        let cli = parse(&["linkas-host", "chrome-extension://abcdef/", "--parent-window=0"]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.parent_window.as_deref(), Some("0"));

        assert_eq!(parse(&["linkas-host"]).command, None);
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(parse(&["linkas-host", "export"]).command, Some(HostCommand::Export));
        assert_eq!(
            parse(&["linkas-host", "import", "backup.json"]).command,
            Some(HostCommand::Import {
                path: PathBuf::from("backup.json")
            })
        );
        assert!(Cli::try_parse_from(["linkas-host", "import"]).is_err());
    }

    #[test]
    fn test_export_then_import_restores_store() {
        let source = Background::in_memory(Config::default()).unwrap();
        source
            .upsert_alias(AliasInput::new("zz", vec!["https://z.io".into()]))
            .unwrap();
        source
            .upsert_alias(AliasInput::new("aa", vec!["https://a.io/{q}".into()]))
            .unwrap();

        let text = export_store(&source).unwrap();
        assert!(text.contains('\n'));
        assert!(text.find("\"zz\"").unwrap() < text.find("\"aa\"").unwrap());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        std::fs::write(&path, &text).unwrap();

        let target = Background::in_memory(Config::default()).unwrap();
        target
            .upsert_alias(AliasInput::new("old", vec!["https://old.io".into()]))
            .unwrap();

        assert_eq!(import_store(&target, &path).unwrap(), 2);
        assert_eq!(target.export_store().unwrap(), source.export_store().unwrap());
    }

    #[test]
    fn test_import_rejects_bad_input() {
        let background = Background::in_memory(Config::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("absent.json");
        let err = import_store(&background, &missing).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"aliases": [1]}"#).unwrap();
        let err = import_store(&background, &path).unwrap_err();
        assert!(err.to_string().starts_with("Invalid store document"));
    }

    #[test]
    fn test_import_null_document_empties_store() {
        let background = Background::in_memory(Config::default()).unwrap();
        background
            .upsert_alias(AliasInput::new("g", vec!["https://g.io".into()]))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, r#"{"aliases": null, "meta": null}"#).unwrap();

        assert_eq!(import_store(&background, &path).unwrap(), 0);
        assert!(background.export_store().unwrap().is_empty());
    }
}
