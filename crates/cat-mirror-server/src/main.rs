use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use cat_mirror::{CatalogClient, SyncReport};
use cat_mirror_catapi::CatApiClient;
use cat_mirror_server::config::ServerConfig;
use cat_mirror_server::router::build_app_router;
use cat_mirror_server::state::AppState;
use cat_mirror_store::SqliteStore;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cat-mirror")]
#[command(about = "Mirror cat breeds and images from The Cat API and serve them locally")]
struct Cli {
    /// Path to a config file (defaults to ~/.config/cat-mirror/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Run one sync operation and exit
    Sync {
        #[arg(value_enum)]
        target: SyncTarget,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SyncTarget {
    Breeds,
    BreedImages,
    CategoryImages,
    /// Breeds, then breed images, then category images
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cat_mirror=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;
    let state = build_state(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, state).await,
        Command::Sync { target } => sync(&state, target).await,
    }
}

fn build_state(config: &ServerConfig) -> Result<AppState> {
    if config.catapi.api_key.is_empty() {
        tracing::warn!("no Cat API key configured; upstream requests may be rejected");
    }

    let db_path = config.database_path()?;
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open database: {}", db_path.display()))?;

    let client: Arc<dyn CatalogClient> = Arc::new(
        CatApiClient::new(config.catapi_config()).context("failed to build Cat API client")?,
    );

    Ok(AppState::new(
        client,
        Arc::new(store),
        config.sync_settings(),
    ))
}

async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = build_app_router(state);
    let addr = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

async fn sync(state: &AppState, target: SyncTarget) -> Result<()> {
    if matches!(target, SyncTarget::Breeds | SyncTarget::All) {
        let report = state.breed_sync.sync_all_breeds().await?;
        print_report("breeds", report);
    }
    if matches!(target, SyncTarget::BreedImages | SyncTarget::All) {
        let report = state.image_sync.sync_breed_images().await?;
        print_report("breed images", report);
    }
    if matches!(target, SyncTarget::CategoryImages | SyncTarget::All) {
        let report = state.image_sync.sync_category_images().await?;
        print_report("category images", report);
    }
    Ok(())
}

fn print_report(label: &str, report: SyncReport) {
    println!("Synced {label}: {} saved", report.saved);
}
