//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but request-level
//! errors should use `kernel::error::AppError`.

mod config;

use billing::{
    BillingConfig, ErrorProxy, MemoryBillingRepository, PayerProxy, PgBillingRepository,
    StripeProxy, billing_router, cors_layer,
};
use clap::{Parser, Subcommand};
use crate::config::{AppConfig, Driver, LogConfig};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Subscription billing API
#[derive(Parser)]
#[command(name = "api", version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "SUBSCRIPTIONS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Listening port (overrides file and environment)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the API (default)
    Serve,
    /// Print the version and exit
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Some(Command::Version) = cli.command {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = AppConfig::load(cli.config.as_deref(), cli.port)?;
    init_tracing(&config.log);
    tracing::debug!(?config, "Configuration loaded");

    let payer: Arc<dyn PayerProxy> = if config.stripe_key.is_empty() {
        tracing::warn!("No stripe_key configured, billing operations will fail");
        Arc::new(ErrorProxy)
    } else {
        Arc::new(StripeProxy::new(config.stripe_key.clone()))
    };

    let billing_config = BillingConfig::new(config.jwt_secret.clone(), config.admin_group_name.clone());

    let app = match config.db.driver()? {
        Driver::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&config.db.url)
                .await?;

            let repo = PgBillingRepository::new(pool, &config.db.namespace)?;
            repo.ping().await?;
            tracing::info!("Connected to database");

            if config.db.automigrate {
                repo.migrate().await?;
            }

            billing_router(repo, payer, billing_config)
        }
        Driver::Memory => {
            tracing::warn!("Using in-memory store, data is lost on exit");
            billing_router(MemoryBillingRepository::new(), payer, billing_config)
        }
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer()),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &log.level;
        format!("api={level},billing={level},auth={level},platform={level},tower_http={level}")
            .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if log.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
