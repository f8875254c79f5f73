//! claimdesk server - main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use claimdesk::{build_router, db, AppState};

/// Command-line arguments for the claimdesk server
#[derive(Parser, Debug)]
#[command(name = "claimdesk")]
#[command(about = "Insurance claims tracking service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5750", env = "CLAIMDESK_PORT")]
    port: u16,

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

    info!("Starting claimdesk v{}", env!("CARGO_PKG_VERSION"));
    info!("Database path: {}", args.database.display());

    let pool = db::init_database(&args.database).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("claimdesk listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
