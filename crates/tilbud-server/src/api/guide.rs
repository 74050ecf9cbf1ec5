use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use futures::future::join_all;
use serde::Serialize;
use tilbud_core::{expand_query, is_grocery_store, is_junk_name, rank_stores, Offer, StoreRow};

use super::{fetch_cached, AppState};

/// Queries beyond this cap are dropped to bound upstream fan-out.
pub(super) const MAX_GUIDE_QUERIES: usize = 10;

const GUIDE_FETCH_LIMIT: usize = 40;
const GUIDE_FETCH_DELAY_MS: u64 = 120;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GuideResponse {
    queries: Vec<String>,
    total_queries: usize,
    stores: Vec<StoreRow>,
}

/// `GET /guide?qs=<a,b,c>&q=<single>&q=<single>`
///
/// Expands each shopping-list query, fetches offers for every expanded
/// term concurrently, filters to grocery-store non-junk offers, and
/// ranks stores by how much of the list they cover. A term whose fetch
/// fails contributes nothing; the guide never fails as a whole.
pub(super) async fn guide(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let queries = collect_queries(&pairs);
    if queries.is_empty() {
        return Json(GuideResponse {
            queries,
            total_queries: 0,
            stores: Vec::new(),
        })
        .into_response();
    }

    let terms = expanded_terms(&queries);
    tracing::debug!(queries = queries.len(), terms = terms.len(), "guide fan-out");

    let batches = join_all(terms.iter().map(|term| fetch_term(&state, term))).await;
    let offers = merge_offers(batches);
    let stores = rank_stores(&queries, &offers);

    Json(GuideResponse {
        total_queries: queries.len(),
        queries,
        stores,
    })
    .into_response()
}

/// Gather queries from the comma-separated `qs` parameter and any
/// repeated `q` parameters, in the order given, deduplicated and capped.
pub(super) fn collect_queries(pairs: &[(String, String)]) -> Vec<String> {
    let mut queries = Vec::new();
    for (key, value) in pairs {
        match key.as_str() {
            "qs" => queries.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            ),
            "q" => {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    queries.push(trimmed.to_string());
                }
            }
            _ => {}
        }
    }

    let mut seen = HashSet::new();
    queries.retain(|q| seen.insert(q.clone()));
    queries.truncate(MAX_GUIDE_QUERIES);
    queries
}

/// Expanded search terms across all queries, deduplicated so a term
/// shared by two queries is fetched once.
fn expanded_terms(queries: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut terms = Vec::new();
    for query in queries {
        for term in expand_query(query) {
            if seen.insert(term.clone()) {
                terms.push(term);
            }
        }
    }
    terms
}

async fn fetch_term(state: &AppState, term: &str) -> Vec<Offer> {
    match fetch_cached(state, term, GUIDE_FETCH_LIMIT, GUIDE_FETCH_DELAY_MS).await {
        Ok((offers, _)) => offers,
        Err(e) => {
            tracing::warn!(term, error = %e, "term fetch failed; contributing no offers");
            Vec::new()
        }
    }
}

/// Merge per-term batches: dedupe on source URL, then keep only offers
/// from recognized grocery stores whose names are not junk categories.
fn merge_offers(batches: Vec<Vec<Offer>>) -> Vec<Offer> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for offer in batches.into_iter().flatten() {
        if !seen.insert(offer.source_url.clone()) {
            continue;
        }
        if !offer.store.as_deref().is_some_and(is_grocery_store) {
            continue;
        }
        if offer.name.as_deref().is_some_and(is_junk_name) {
            continue;
        }
        merged.push(offer);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilbud_core::OfferKind;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn offer(store: &str, name: &str, url_tail: &str) -> Offer {
        Offer {
            source_url: format!("https://etilbudsavis.dk/x/{url_tail}?publication=p&offer=o"),
            store: Some(store.to_string()),
            publication: None,
            offer_id: None,
            public_id: None,
            name: Some(name.to_string()),
            price: Some(10.0),
            currency: "DKK".to_string(),
            unit_price: None,
            unit_price_unit: None,
            valid_from: None,
            valid_through: None,
            image: None,
            kind: OfferKind::Offer,
            discount_percent: None,
        }
    }

    #[test]
    fn collect_queries_merges_csv_and_repeats() {
        let collected = collect_queries(&pairs(&[
            ("qs", "mælk, rugbrød ,,smør"),
            ("q", "løg"),
            ("q", "  "),
            ("limit", "5"),
        ]));
        assert_eq!(collected, vec!["mælk", "rugbrød", "smør", "løg"]);
    }

    #[test]
    fn collect_queries_deduplicates_and_caps() {
        let collected = collect_queries(&pairs(&[("qs", "mælk,mælk"), ("q", "mælk")]));
        assert_eq!(collected, vec!["mælk"]);

        let many = (0..15).map(|i| format!("vare{i}")).collect::<Vec<_>>().join(",");
        let collected = collect_queries(&pairs(&[("qs", &many)]));
        assert_eq!(collected.len(), MAX_GUIDE_QUERIES);
        assert_eq!(collected[0], "vare0");
        assert_eq!(collected[9], "vare9");
    }

    #[test]
    fn expanded_terms_fetches_each_term_once() {
        let terms = expanded_terms(&["mælk".to_string(), "letmælk".to_string()]);
        // The generic milk query already expands to letmælk.
        assert_eq!(
            terms,
            vec!["sødmælk", "letmælk", "minimælk", "skummetmælk"]
        );
    }

    #[test]
    fn merge_drops_duplicates_non_grocery_and_junk() {
        let duplicate = offer("Netto", "Letmælk", "a");
        let batches = vec![
            vec![offer("Netto", "Letmælk", "a"), offer("Matas", "Letmælk", "b")],
            vec![duplicate, offer("Føtex", "Vingummi mix", "c"), offer("Føtex", "Rugbrød", "d")],
        ];

        let merged = merge_offers(batches);
        let names: Vec<_> = merged
            .iter()
            .map(|o| (o.store.as_deref().unwrap(), o.name.as_deref().unwrap()))
            .collect();
        assert_eq!(names, vec![("Netto", "Letmælk"), ("Føtex", "Rugbrød")]);
    }

    #[test]
    fn offers_without_store_or_name_are_handled() {
        let mut nameless = offer("Netto", "x", "a");
        nameless.name = None;
        let mut storeless = offer("Netto", "Letmælk", "b");
        storeless.store = None;

        let merged = merge_offers(vec![vec![nameless, storeless]]);
        // No store means no ranking bucket; no name is fine.
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, None);
    }
}
