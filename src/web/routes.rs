use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    constants::DEFAULT_TOP_LIMIT,
    error::{MarketDataError, WatchlistError},
    metrics::ProviderMetrics,
    types::{
        clamp_market_cap, CacheDiagnostics, CoinSnapshot, GlobalMarketSummary, MarketListing,
        NewWatchlistEntry, WatchlistEntry,
    },
    web::SharedState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Danger,
}

/// One user-facing message attached to a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Response envelope: optional data plus messages for the user
#[derive(Debug, Serialize)]
pub struct View<T> {
    pub data: Option<T>,
    pub notices: Vec<Notice>,
}

impl<T> View<T> {
    fn data(data: T) -> Self {
        Self {
            data: Some(data),
            notices: Vec::new(),
        }
    }

    fn empty() -> Self {
        Self {
            data: None,
            notices: Vec::new(),
        }
    }

    fn notice(mut self, level: NoticeLevel, message: impl Into<String>) -> Self {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
        self
    }
}

type Reply<T> = (StatusCode, Json<View<T>>);

fn reply<T>(status: StatusCode, view: View<T>) -> Reply<T> {
    (status, Json(view))
}

/// Watchlist failures surfaced to the client
#[derive(Debug)]
pub struct ApiError(WatchlistError);

impl From<WatchlistError> for ApiError {
    fn from(e: WatchlistError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            WatchlistError::NotFound(id) => {
                tracing::debug!(id, "Watchlist entry not found");
                reply(
                    StatusCode::NOT_FOUND,
                    View::<()>::empty().notice(NoticeLevel::Danger, "Coin not found in watchlist!"),
                )
                .into_response()
            }
            WatchlistError::Database(e) => {
                tracing::error!(error = %e, "Watchlist store failure");
                reply(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    View::<()>::empty().notice(NoticeLevel::Danger, "Internal server error"),
                )
                .into_response()
            }
        }
    }
}

/// Status code used when a market data call fails
fn market_status(error: &MarketDataError) -> StatusCode {
    match error {
        MarketDataError::NotFound(_) => StatusCode::NOT_FOUND,
        MarketDataError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Landing page data; a provider failure just leaves the summary empty
pub async fn home(State(state): State<SharedState>) -> Json<View<GlobalMarketSummary>> {
    match state.client.fetch_global_summary().await {
        Ok(summary) => Json(View::data(summary)),
        Err(_) => Json(View::empty()),
    }
}

pub async fn refresh_global_data(State(state): State<SharedState>) -> Json<View<()>> {
    state.client.invalidate_all().await;
    Json(View::empty().notice(NoticeLevel::Success, "Market data refreshed successfully!"))
}

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    #[serde(default)]
    pub coin_id: String,
}

pub async fn lookup_coin(
    State(state): State<SharedState>,
    Form(request): Form<LookupRequest>,
) -> Reply<CoinSnapshot> {
    let coin_id = request.coin_id.trim().to_lowercase();
    if coin_id.is_empty() {
        return reply(
            StatusCode::BAD_REQUEST,
            View::empty().notice(NoticeLevel::Danger, "Please enter a coin ID."),
        );
    }

    match state.client.fetch_coin(&coin_id).await {
        Ok(coin) => {
            let message = format!("Successfully fetched data for {}!", coin.name);
            reply(
                StatusCode::OK,
                View::data(coin).notice(NoticeLevel::Success, message),
            )
        }
        Err(e) => reply(
            market_status(&e),
            View::empty().notice(NoticeLevel::Danger, e.to_string()),
        ),
    }
}

pub async fn top_coins(State(state): State<SharedState>) -> Reply<Vec<MarketListing>> {
    match state.client.fetch_top_by_volume(DEFAULT_TOP_LIMIT).await {
        Ok(coins) => reply(StatusCode::OK, View::data(coins)),
        Err(e) => reply(
            market_status(&e),
            View::data(Vec::new()).notice(NoticeLevel::Danger, e.to_string()),
        ),
    }
}

#[derive(Debug, Serialize)]
pub struct CacheInfo {
    pub cache: CacheDiagnostics,
    pub provider: ProviderMetrics,
}

pub async fn cache_info(State(state): State<SharedState>) -> Json<CacheInfo> {
    Json(CacheInfo {
        cache: state.client.cache_diagnostics().await,
        provider: state.client.provider_metrics(),
    })
}

pub async fn list_watchlist(
    State(state): State<SharedState>,
) -> Result<Json<View<Vec<WatchlistEntry>>>, ApiError> {
    let entries = state.store.list_all().await?;
    Ok(Json(View::data(entries)))
}

pub async fn save_coin(
    State(state): State<SharedState>,
    Json(entry): Json<NewWatchlistEntry>,
) -> Result<Reply<WatchlistEntry>, ApiError> {
    let id = state.store.insert(&entry).await?;
    let saved = state.store.get_by_id(id).await?;
    let message = format!("{} added to watchlist!", saved.name);

    Ok(reply(
        StatusCode::CREATED,
        View::data(saved).notice(NoticeLevel::Success, message),
    ))
}

#[derive(Debug, Serialize)]
pub struct CoinView {
    pub saved: WatchlistEntry,
    /// Live provider data, absent when the provider call failed
    pub live: Option<CoinSnapshot>,
}

pub async fn view_coin(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<View<CoinView>>, ApiError> {
    let saved = state.store.get_by_id(id).await?;

    let view = match state.client.fetch_coin(&saved.coin_id).await {
        Ok(live) => View::data(CoinView {
            saved,
            live: Some(live),
        }),
        Err(e) => View::data(CoinView { saved, live: None }).notice(
            NoticeLevel::Warning,
            format!("Could not fetch live data: {e}"),
        ),
    };

    Ok(Json(view))
}

pub async fn refresh_coin(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Reply<WatchlistEntry>, ApiError> {
    let saved = state.store.get_by_id(id).await?;

    let live = match state.client.fetch_coin(&saved.coin_id).await {
        Ok(live) => live,
        Err(e) => {
            let message = format!("Could not refresh {}: {e}", saved.name);
            return Ok(reply(
                market_status(&e),
                View::data(saved).notice(NoticeLevel::Danger, message),
            ));
        }
    };

    state
        .store
        .update_price_and_cap(id, live.price, clamp_market_cap(live.market_cap))
        .await?;
    let updated = state.store.get_by_id(id).await?;
    let message = format!("{} refreshed successfully!", updated.name);

    Ok(reply(
        StatusCode::OK,
        View::data(updated).notice(NoticeLevel::Success, message),
    ))
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    #[serde(default)]
    pub note: String,
}

pub async fn update_note(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(request): Json<NoteRequest>,
) -> Result<Json<View<WatchlistEntry>>, ApiError> {
    state.store.update_note(id, &request.note).await?;
    let updated = state.store.get_by_id(id).await?;

    Ok(Json(
        View::data(updated).notice(NoticeLevel::Success, "Note updated successfully!"),
    ))
}

pub async fn delete_coin(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<View<()>>, ApiError> {
    state.store.delete_by_id(id).await?;
    Ok(Json(
        View::empty().notice(NoticeLevel::Danger, "Coin removed from watchlist!"),
    ))
}
