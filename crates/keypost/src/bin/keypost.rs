//! Entry point for the `keypost` binary. Parses CLI arguments, initializes
//! logging, and runs one name-system operation against a SQLite-backed
//! store.
//!
//! The binary supports four subcommands:
//!
//! - `create-keypair` — generate a keypair and print it as JSON
//! - `create-record`  — build and sign the next record for a name
//! - `publish`        — validate and store a signed record
//! - `resolve`        — look up the current value of a name

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use keypost::store::SqliteStore;
use keypost::{create_keypair, NameSystem};

/// Mutable name-resolution record store.
///
/// Names are base36 key IDs derived from Ed25519 public keys. A name's
/// current value is carried by a signed record; records are validated
/// against the name alone, so the store never needs to be trusted.
#[derive(Parser, Debug)]
#[command(
    name = "keypost",
    about = "Signed, self-certifying name records",
    version,
    propagate_version = true
)]
struct KeypostCli {
    /// Path to the SQLite database file.
    #[arg(long, env = "KEYPOST_DB", default_value = "keypost.db")]
    db: PathBuf,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands for the keypost binary.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a fresh keypair and print the key ID and private key as JSON.
    CreateKeypair,
    /// Build and sign the next record for a name, then publish it.
    CreateRecord(CreateRecordArgs),
    /// Validate a signed record and store it under its name.
    Publish(PublishArgs),
    /// Print the current value a name points at.
    Resolve(ResolveArgs),
}

/// Arguments for the `create-record` subcommand.
#[derive(Parser, Debug)]
struct CreateRecordArgs {
    /// Base36 key ID the record is for.
    key: String,

    /// Value the name should point at, e.g. a content path.
    value: String,

    /// Padded-base64 private key, as printed by `create-keypair`.
    /// Prefer the `KEYPOST_PRIVATE_KEY` environment variable over
    /// passing it on the command line.
    #[arg(long, env = "KEYPOST_PRIVATE_KEY")]
    private_key: String,
}

/// Arguments for the `publish` subcommand.
#[derive(Parser, Debug)]
struct PublishArgs {
    /// Base36 key ID the record is for.
    key: String,

    /// Padded-base64 record text, as printed by `create-record`.
    record: String,
}

/// Arguments for the `resolve` subcommand.
#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Base36 key ID to resolve.
    key: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = KeypostCli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keypost=info")),
        )
        .init();

    match cli.command {
        Commands::CreateKeypair => {
            let handle = create_keypair();
            println!("{}", serde_json::to_string_pretty(&handle)?);
            Ok(())
        }
        Commands::CreateRecord(args) => {
            let system = open_system(&cli.db)?;
            let record = system
                .create_record(&args.private_key, &args.key, args.value.as_bytes())
                .await
                .context("failed to create record")?;
            system
                .publish(&args.key, &record)
                .await
                .context("failed to publish record")?;
            println!("{}", record);
            Ok(())
        }
        Commands::Publish(args) => {
            let system = open_system(&cli.db)?;
            system
                .publish(&args.key, &args.record)
                .await
                .context("failed to publish record")?;
            println!("published {}", args.key);
            Ok(())
        }
        Commands::Resolve(args) => {
            let system = open_system(&cli.db)?;
            match system.resolve(&args.key).await? {
                Some(resolved) => {
                    println!("{}", String::from_utf8_lossy(&resolved.value));
                }
                None => {
                    println!("no record found for {}", args.key);
                }
            }
            Ok(())
        }
    }
}

fn open_system(db: &PathBuf) -> Result<NameSystem<SqliteStore>> {
    let store = SqliteStore::open(db)
        .with_context(|| format!("failed to open database at {}", db.display()))?;
    Ok(NameSystem::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        KeypostCli::command().debug_assert();
    }
}
