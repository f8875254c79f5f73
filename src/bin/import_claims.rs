//! import-claims - offline batch import of claim files
//!
//! Merges a pipe-delimited list file (and optional detail file) into the
//! claims database using the same engine as the upload endpoint, then
//! prints created/updated/skipped counts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use claimdesk::db;
use claimdesk::import::{merge_claims, ImportMode};

/// Command-line arguments for import-claims
#[derive(Parser, Debug)]
#[command(name = "import-claims")]
#[command(about = "Import/merge claims from pipe-delimited list and detail files")]
#[command(version)]
struct Args {
    /// Path to the list file (| delimited, header row)
    #[arg(long)]
    list: PathBuf,

    /// Path to the optional detail file (| delimited)
    #[arg(long)]
    detail: Option<PathBuf>,

    /// Append to existing claims, or overwrite (delete all) first
    #[arg(long, value_enum, default_value_t = ImportMode::Append)]
    mode: ImportMode,

    /// Path to the claims database
    #[arg(short, long, default_value = "claims.db", env = "CLAIMDESK_DB")]
    database: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let list_text = std::fs::read_to_string(&args.list)
        .with_context(|| format!("List file not found: {}", args.list.display()))?;

    let detail_text = match &args.detail {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Detail file not found: {}", path.display()))?,
        ),
        None => None,
    };

    let pool = db::init_database(&args.database).await?;

    let summary = merge_claims(&pool, args.mode, &list_text, detail_text.as_deref()).await?;

    println!(
        "Imported. Created: {}, Updated: {}, Skipped: {}",
        summary.created, summary.updated, summary.skipped
    );

    Ok(())
}
