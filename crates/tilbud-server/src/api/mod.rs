mod guide;
mod search;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tilbud_core::Offer;
use tilbud_scraper::{CacheKey, DealsClient, ScrapeError, SearchCache};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState};

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<DealsClient>,
    pub cache: Arc<SearchCache>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "bad_request" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_unavailable" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    #[serde(rename = "cacheEntries")]
    cache_entries: usize,
}

/// Cache-through fetch shared by both endpoints: the key carries every
/// parameter that shapes the result, so a different limit or delay is a
/// different entry. The bool reports whether the result came from cache.
async fn fetch_cached(
    state: &AppState,
    term: &str,
    limit: usize,
    delay_ms: u64,
) -> Result<(Vec<Offer>, bool), ScrapeError> {
    let key = CacheKey {
        term: term.to_string(),
        limit,
        delay_ms,
    };

    if let Some(hit) = state.cache.get(&key).await {
        tracing::debug!(term, "cache hit");
        return Ok((hit, true));
    }

    let offers = state
        .client
        .fetch_offers(term, limit, Duration::from_millis(delay_ms))
        .await?;
    state.cache.insert(key, offers.clone()).await;
    Ok((offers, false))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/search", get(search::search))
        .route("/guide", get(guide::guide))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthData {
        status: "ok",
        cache_entries: state.cache.len().await,
    })
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}
