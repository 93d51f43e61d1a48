//! Coin watchlist server binary.
//!
//! Run with:
//! ```bash
//! coin-watchlist serve --bind 127.0.0.1:5000
//! coin-watchlist setup-db
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coin_watchlist::{
    cache::ResponseCache,
    providers::CoinGeckoProvider,
    web::{self, AppState},
    AppConfig, MarketDataClient, WatchlistStore,
};

#[derive(Parser, Debug)]
#[command(name = "coin-watchlist")]
#[command(about = "Cryptocurrency lookup and watchlist service")]
struct Cli {
    /// Database URL, overrides DATABASE_URL / DB_NAME
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Address to listen on, overrides BIND_ADDR
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Create the watchlist table and index, then exit
    SetupDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coin_watchlist=debug,tower_http=info,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::SetupDb => setup_db(&config).await,
        Command::Serve { bind } => {
            if let Some(addr) = bind {
                config.bind_addr = addr;
            }
            serve(config).await
        }
    }
}

async fn setup_db(config: &AppConfig) -> Result<()> {
    info!(database_url = %config.database_url, "Setting up watchlist database");
    let store = WatchlistStore::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open {}", config.database_url))?;
    store.close().await;
    info!("Watchlist table and idx_coin_id index are in place");
    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    info!("Starting coin watchlist");
    info!("  Database: {}", config.database_url);
    info!("  CoinGecko: {}", config.coingecko_base_url);
    info!("  API key: {}", if config.api_key.is_some() { "set" } else { "not set" });

    let store = WatchlistStore::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open {}", config.database_url))?;

    let provider = CoinGeckoProvider::with_base_url(&config.coingecko_base_url, config.api_key.clone())
        .context("failed to build CoinGecko provider")?;
    let client = MarketDataClient::new(Arc::new(provider), Arc::new(ResponseCache::new()));

    let state = Arc::new(AppState {
        client: Arc::new(client),
        store: store.clone(),
    });

    let result = web::start_server(state, config.bind_addr).await;
    store.close().await;
    result
}
