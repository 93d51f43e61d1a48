//! HTTP surface: JSON routes over the market data client and watchlist store

pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{client::MarketDataClient, watchlist::WatchlistStore};

/// Everything a handler may touch
pub struct AppState {
    pub client: Arc<MarketDataClient>,
    pub store: WatchlistStore,
}

pub type SharedState = Arc<AppState>;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/health", get(routes::health))
        .route("/refresh-global-data", post(routes::refresh_global_data))
        .route("/coins/lookup", post(routes::lookup_coin))
        .route("/top-coins", get(routes::top_coins))
        .route("/cache", get(routes::cache_info))
        .route(
            "/watchlist",
            get(routes::list_watchlist).post(routes::save_coin),
        )
        .route(
            "/watchlist/:id",
            get(routes::view_coin).delete(routes::delete_coin),
        )
        .route("/watchlist/:id/refresh", post(routes::refresh_coin))
        .route("/watchlist/:id/note", post(routes::update_note))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves until Ctrl-C
pub async fn start_server(state: SharedState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
