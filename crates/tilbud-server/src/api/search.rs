use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tilbud_core::{Offer, OfferKind};

use super::{fetch_cached, ApiError, AppState};

pub(super) const DEFAULT_LIMIT: usize = 40;
pub(super) const MAX_LIMIT: usize = 80;
pub(super) const DEFAULT_DELAY_MS: u64 = 120;
pub(super) const MAX_DELAY_MS: u64 = 1000;

#[derive(Debug, Deserialize)]
pub(super) struct SearchParams {
    q: Option<String>,
    limit: Option<i64>,
    #[serde(rename = "delayMs")]
    delay_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    q: String,
    cached: bool,
    counts: Counts,
    offers: Vec<Offer>,
    promotions: Vec<Offer>,
}

#[derive(Debug, Serialize)]
pub(super) struct Counts {
    total: usize,
    offers: usize,
    promotions: usize,
}

impl SearchResponse {
    fn empty(q: String) -> Self {
        Self {
            q,
            cached: false,
            counts: Counts {
                total: 0,
                offers: 0,
                promotions: 0,
            },
            offers: Vec::new(),
            promotions: Vec::new(),
        }
    }

    fn from_offers(q: String, cached: bool, all: Vec<Offer>) -> Self {
        let (offers, promotions): (Vec<Offer>, Vec<Offer>) = all
            .into_iter()
            .partition(|offer| offer.kind == OfferKind::Offer);
        Self {
            q,
            cached,
            counts: Counts {
                total: offers.len() + promotions.len(),
                offers: offers.len(),
                promotions: promotions.len(),
            },
            offers,
            promotions,
        }
    }
}

/// Out-of-range and missing values fall back rather than erroring, so
/// any `limit` the caller sends produces a valid request.
pub(super) fn normalize_limit(limit: Option<i64>) -> usize {
    let clamped = limit.unwrap_or(DEFAULT_LIMIT as i64).clamp(1, MAX_LIMIT as i64);
    usize::try_from(clamped).unwrap_or(DEFAULT_LIMIT)
}

pub(super) fn normalize_delay_ms(delay_ms: Option<i64>) -> u64 {
    let clamped = delay_ms
        .unwrap_or(DEFAULT_DELAY_MS as i64)
        .clamp(0, MAX_DELAY_MS as i64);
    u64::try_from(clamped).unwrap_or(DEFAULT_DELAY_MS)
}

/// `GET /search?q=<term>&limit=<n>&delayMs=<ms>`
///
/// An empty or missing term short-circuits to an empty payload without
/// touching the upstream site. A failed search-page fetch maps to 502;
/// partial results below that are already absorbed by the scraper.
pub(super) async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let q = params.q.as_deref().map_or("", str::trim).to_string();
    if q.is_empty() {
        return Json(SearchResponse::empty(q)).into_response();
    }

    let limit = normalize_limit(params.limit);
    let delay_ms = normalize_delay_ms(params.delay_ms);

    match fetch_cached(&state, &q, limit, delay_ms).await {
        Ok((offers, cached)) => {
            Json(SearchResponse::from_offers(q, cached, offers)).into_response()
        }
        Err(e) => {
            tracing::error!(term = %q, error = %e, "search fetch failed");
            ApiError::new("upstream_unavailable", "could not reach the deals site")
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 40);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(-5)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 80);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn normalize_delay_applies_defaults_and_bounds() {
        assert_eq!(normalize_delay_ms(None), 120);
        assert_eq!(normalize_delay_ms(Some(-1)), 0);
        assert_eq!(normalize_delay_ms(Some(0)), 0);
        assert_eq!(normalize_delay_ms(Some(5_000)), 1_000);
        assert_eq!(normalize_delay_ms(Some(250)), 250);
    }

    #[test]
    fn response_splits_offers_from_promotions() {
        let priced = Offer {
            source_url: "https://etilbudsavis.dk/netto/a?publication=p&offer=o1".to_string(),
            store: Some("Netto".to_string()),
            publication: None,
            offer_id: None,
            public_id: None,
            name: Some("Letmælk".to_string()),
            price: Some(11.5),
            currency: "DKK".to_string(),
            unit_price: None,
            unit_price_unit: None,
            valid_from: None,
            valid_through: None,
            image: None,
            kind: OfferKind::Offer,
            discount_percent: None,
        };
        let promo = Offer {
            source_url: "https://etilbudsavis.dk/netto/b?publication=p&offer=o2".to_string(),
            price: None,
            name: Some("Spar 20% på mejeri".to_string()),
            kind: OfferKind::Promotion,
            discount_percent: Some(20),
            ..priced.clone()
        };

        let response =
            SearchResponse::from_offers("mælk".to_string(), true, vec![priced, promo]);
        assert_eq!(response.counts.total, 2);
        assert_eq!(response.counts.offers, 1);
        assert_eq!(response.counts.promotions, 1);
        assert_eq!(response.offers[0].price, Some(11.5));
        assert_eq!(response.promotions[0].discount_percent, Some(20));
        assert!(response.cached);

        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["q"], "mælk");
        assert_eq!(json["counts"]["promotions"], 1);
    }
}
