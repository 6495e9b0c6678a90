mod config;
mod logging;
mod shutdown;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::http::StatusCode;
use clap::{Parser, Subcommand};
use entitlements::EntitlementsModule;
use mimalloc::MiMalloc;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, CliOverrides, DatabaseConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Entitlements Server - module catalog, plans and client provisioning
#[derive(Parser)]
#[command(name = "entitlements-server")]
#[command(about = "Entitlements Server - module catalog, plans and client provisioning")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (secrets redacted) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
    /// Upsert the default module catalog and exit
    SeedCatalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !Path::new(path).is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(CliOverrides {
        port: cli.port,
        verbose: cli.verbose,
    });

    if cli.print_config {
        println!("{}", config.to_pretty_json()?);
        return Ok(());
    }

    logging::init(&config.logging);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config).await,
        Commands::Check => check_config(&config),
        Commands::SeedCatalog => seed_catalog(&config).await,
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.server.socket_addr()?;
    if !config.auth.is_jwt_configured() {
        tracing::warn!("auth.jwt_secret is empty; bearer tokens will be rejected");
    }
    println!("Configuration is valid");
    println!("{}", config.to_pretty_json()?);
    Ok(())
}

async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.dsn.clone());
    opts.max_connections(cfg.max_connections).sqlx_logging(false);
    Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to database: {}", cfg.dsn))
}

async fn seed_catalog(config: &AppConfig) -> Result<()> {
    let db = connect(&config.database).await?;
    let module = EntitlementsModule::init(db, &config.entitlements).await?;
    let count = module.seed_catalog().await?;
    tracing::info!(count, "Default module catalog seeded");
    println!("Seeded {count} catalog modules");
    Ok(())
}

async fn run_server(config: &AppConfig) -> Result<()> {
    let addr = config.server.socket_addr()?;
    let db = connect(&config.database).await?;
    let module = EntitlementsModule::init(db, &config.entitlements).await?;

    if !config.auth.is_jwt_configured() {
        tracing::warn!("auth.jwt_secret is empty; bearer tokens will be rejected");
    }

    let app = module
        .router(&config.auth)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.server.request_timeout(),
        ))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Entitlements Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await
        .context("server error")?;

    tracing::info!("Entitlements Server stopped");
    Ok(())
}
