// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::info;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Arc;

use skillpath::catalog::Catalog;
use skillpath::constants::{DEFAULT_ADDR, DEFAULT_DB_FILE, DEFAULT_MASTERY_THRESHOLD};
use skillpath::database;
use skillpath::models::AppState;
use skillpath::routes;

#[derive(Parser)]
#[command(name = "skillpath")]
#[command(about = "Learning platform backend: topic recommendations, progress, dashboards")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "SKILLPATH_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// SQLite database path
    #[arg(long, env = "SKILLPATH_DB", default_value = DEFAULT_DB_FILE)]
    db: PathBuf,

    /// Score at which a topic counts as learned and leaves the
    /// recommendation lists
    #[arg(long, env = "SKILLPATH_MASTERY_THRESHOLD", default_value_t = DEFAULT_MASTERY_THRESHOLD)]
    mastery_threshold: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    anyhow::ensure!(
        (0.0..=1.0).contains(&cli.mastery_threshold),
        "mastery threshold {} outside [0,1]",
        cli.mastery_threshold
    );

    info!("Starting skillpath backend...");

    // A bad catalog is a fatal configuration error; refuse to serve.
    let catalog = Catalog::load_embedded().context("topic catalog failed validation")?;
    info!("Catalog loaded: {} topics", catalog.all().len());

    let conn = Connection::open(&cli.db)
        .with_context(|| format!("failed to open database at {}", cli.db.display()))?;
    database::init_db(&conn).context("failed to initialize database")?;
    info!("Database ready at {}", cli.db.display());

    let state = Arc::new(AppState::new(conn, catalog, cli.mastery_threshold));
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&cli.addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.addr))?;
    info!("Listening on {}", cli.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
