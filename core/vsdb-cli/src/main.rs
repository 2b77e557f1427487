// SPDX-License-Identifier: PMPL-1.0-or-later
//
//! vsdb — command-line client for a vsdb store.
//!
//! Each invocation opens the store, performs one operation, and exits.
//! No server, no network round trip — the whole public API surface is
//! reachable locally, one call at a time.
//!
//! A common calling convention layered on top of `glob` and `Set` values
//! — not part of the store itself — is to track a social graph as
//! `user/<id>/followers` and `user/<id>/following` keys holding `Set`
//! values of follower/following IDs, rather than in-memory back-pointers.
//! See `vsdb-storage`'s `tests/social_graph.rs` for a worked example.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use vsdb_storage::codec::Value;
use vsdb_storage::engine::StorageEngine;
use vsdb_storage::facade::{copy_value, set_value};

/// Command-line client for a vsdb store.
#[derive(Parser, Debug)]
#[command(name = "vsdb", version, about = "Command-line client for a vsdb store")]
struct Cli {
    /// Path to the database file. Defaults to $VSDB_PATH, or "./vsdb.db".
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the decoded value stored under KEY, or the aggregated
    /// dictionary of values for a glob key like "prefix/*".
    Get { key: String },
    /// Store a UTF-8 string VALUE under KEY.
    Set { key: String, value: String },
    /// Delete the entry under KEY.
    Del { key: String },
    /// Enumerate keys matching PATTERN ("*" or "prefix*").
    Glob { pattern: String },
    /// Force durability of all buffered writes.
    Sync,
}

fn resolve_path(cli_db: Option<PathBuf>) -> PathBuf {
    cli_db
        .or_else(|| std::env::var("VSDB_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("vsdb.db"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let path = resolve_path(cli.db);

    let engine = match StorageEngine::open(&path) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("error: failed to open {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let result = run(&engine, cli.command);
    engine.close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(engine: &StorageEngine, command: Command) -> Result<(), vsdb_storage::StorageError> {
    match command {
        Command::Get { key } => match copy_value(engine, &key)? {
            Some(value) => {
                println!("{}", render(&value));
                Ok(())
            }
            None => {
                println!("(absent)");
                Ok(())
            }
        },
        Command::Set { key, value } => set_value(engine, &key, Some(&Value::String(value))),
        Command::Del { key } => set_value(engine, &key, None),
        Command::Glob { pattern } => {
            let entries = engine.glob(pattern.as_bytes())?;
            for (key, payload) in entries {
                let key = String::from_utf8_lossy(&key);
                println!("{key} = {}", render(&Value::decode(&payload)));
            }
            Ok(())
        }
        Command::Sync => engine.sync(),
    }
}

/// Render a value tree as a compact, JSON-like string for terminal
/// display. Not a wire format — purely for human reading.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        Value::Data(d) => format!("<{} bytes>", d.len()),
        Value::Integer(i) => i.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Date(secs) => format!("@{secs}"),
        Value::Dictionary(entries) => {
            let body: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{k:?}: {}", render(v)))
                .collect();
            format!("{{{}}}", body.join(", "))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", body.join(", "))
        }
        Value::Set(items) => {
            let body: Vec<String> = items.iter().map(render).collect();
            format!("({})", body.join(", "))
        }
        Value::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_prefers_cli_flag() {
        assert_eq!(resolve_path(Some(PathBuf::from("x.db"))), PathBuf::from("x.db"));
    }

    #[test]
    fn render_nested_value() {
        let v = Value::Dictionary(vec![
            ("n".into(), Value::String("A".into())),
            ("tags".into(), Value::Array(vec![Value::Integer(1), Value::Null])),
        ]);
        assert_eq!(render(&v), r#"{"n": "A", "tags": [1, null]}"#);
    }
}
