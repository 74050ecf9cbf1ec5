//! Coverage aggregation: group matching offers by store and rank
//! stores by how many of the caller's queries they satisfy.
//!
//! Pure function of the grouped data: grouping uses a `BTreeMap` keyed
//! by normalized store name so the output is identical regardless of
//! the input offer order.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::matching::offer_matches_query;
use crate::offer::Offer;
use crate::text::normalize_text;

/// Maximum store rows returned per ranking.
pub const MAX_STORE_ROWS: usize = 10;
/// Cheapest matching offers kept per store for display.
const SAMPLE_OFFERS_PER_STORE: usize = 4;

/// One ranked store with its coverage of the requested queries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRow {
    pub store: String,
    pub coverage_count: usize,
    pub coverage_pct: u32,
    pub matched_items: Vec<String>,
    pub best_price: Option<f64>,
    pub sample_offers: Vec<Offer>,
}

/// Rank stores by distinct-query coverage, tie-broken by best price.
///
/// Offers without a store name are skipped (they cannot be grouped).
/// Sort order: higher coverage first, then lower best price (missing
/// price sorts last), then store name for a stable total order.
#[must_use]
pub fn rank_stores(queries: &[String], offers: &[Offer]) -> Vec<StoreRow> {
    if queries.is_empty() {
        return Vec::new();
    }

    let mut by_store: BTreeMap<String, Vec<&Offer>> = BTreeMap::new();
    for offer in offers {
        let Some(store) = offer.store.as_deref() else {
            continue;
        };
        let key = normalize_text(store);
        if key.is_empty() {
            continue;
        }
        by_store.entry(key).or_default().push(offer);
    }

    let total = queries.len();
    let mut rows: Vec<StoreRow> = by_store
        .into_values()
        .filter_map(|store_offers| build_row(queries, total, &store_offers))
        .collect();

    rows.sort_by(|a, b| {
        b.coverage_count
            .cmp(&a.coverage_count)
            .then_with(|| price_key(a.best_price).total_cmp(&price_key(b.best_price)))
            .then_with(|| a.store.cmp(&b.store))
    });
    rows.truncate(MAX_STORE_ROWS);
    rows
}

fn build_row(queries: &[String], total: usize, store_offers: &[&Offer]) -> Option<StoreRow> {
    let matched_items: Vec<String> = queries
        .iter()
        .filter(|query| {
            store_offers
                .iter()
                .any(|offer| offer_name_matches(offer, query))
        })
        .cloned()
        .collect();

    if matched_items.is_empty() {
        return None;
    }

    // Offers qualifying for price/sample purposes: those satisfying any query.
    let mut qualifying: Vec<&Offer> = store_offers
        .iter()
        .filter(|offer| queries.iter().any(|query| offer_name_matches(offer, query)))
        .copied()
        .collect();

    qualifying.sort_by(|a, b| {
        price_key(a.price)
            .total_cmp(&price_key(b.price))
            .then_with(|| a.source_url.cmp(&b.source_url))
    });

    let best_price = qualifying
        .iter()
        .filter_map(|o| o.price)
        .min_by(f64::total_cmp);

    let sample_offers: Vec<Offer> = qualifying
        .iter()
        .take(SAMPLE_OFFERS_PER_STORE)
        .map(|o| (*o).clone())
        .collect();

    let coverage_count = matched_items.len();
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let coverage_pct = ((coverage_count as f64 / total as f64) * 100.0).round() as u32;

    // Display name: taken from the cheapest qualifying offer so the
    // row shows a real upstream store string, not the normalized key.
    let store = qualifying
        .first()
        .and_then(|o| o.store.clone())
        .unwrap_or_default();

    Some(StoreRow {
        store,
        coverage_count,
        coverage_pct,
        matched_items,
        best_price,
        sample_offers,
    })
}

fn offer_name_matches(offer: &Offer, query: &str) -> bool {
    offer
        .name
        .as_deref()
        .is_some_and(|name| offer_matches_query(name, query))
}

// Missing prices rank after any real price.
fn price_key(price: Option<f64>) -> f64 {
    price.unwrap_or(f64::INFINITY)
}
