//! Normalization from a decoded offer payload to the canonical
//! [`tilbud_core::Offer`].
//!
//! Upstream payload schemas vary by offer type, so every field is
//! coalesced across the shapes observed in the wild via [`first_at`].
//! The contract is fail-soft: any reasonable payload produces a
//! structurally valid `Offer`; absent data stays `None`.

use serde_json::Value;
use tilbud_core::offer::discount_percent_from_name;
use tilbud_core::{Offer, OfferKind};

/// Build a canonical [`Offer`] from a decoded payload and the page URL
/// it came from.
///
/// The URL is authoritative for `publication`/`offer_id` (payload field
/// names vary) and supplies the store name when the payload carries no
/// seller object.
#[must_use]
pub fn normalize_offer(payload: &Value, source_url: &str) -> Offer {
    let (publication, offer_id) = url_query_ids(source_url);

    let store = first_at(
        payload,
        &[
            &["seller", "name"],
            &["dealer", "name"],
            &["business", "name"],
            &["brand", "name"],
        ],
    )
    .and_then(Value::as_str)
    .map(str::to_string)
    .or_else(|| store_from_path(source_url));

    let name = first_at(payload, &[&["name"], &["heading"], &["title"]])
        .and_then(Value::as_str)
        .map(str::to_string);

    let price = first_at(
        payload,
        &[
            &["price"],
            &["pricing", "price"],
            &["offer", "price"],
            &["priceSpecification", "price"],
        ],
    )
    .and_then(parse_number);

    let currency = first_at(
        payload,
        &[
            &["currency"],
            &["pricing", "currency"],
            &["priceSpecification", "priceCurrency"],
        ],
    )
    .and_then(Value::as_str)
    .unwrap_or("DKK")
    .to_string();

    let public_id = first_at(payload, &[&["publicId"], &["public_id"], &["id"]])
        .and_then(string_or_number);

    let valid_from = first_at(payload, &[&["validFrom"], &["runFrom"], &["run_from"]])
        .and_then(Value::as_str)
        .map(str::to_string);
    let valid_through = first_at(
        payload,
        &[
            &["validThrough"],
            &["validUntil"],
            &["runTill"],
            &["run_till"],
        ],
    )
    .and_then(Value::as_str)
    .map(str::to_string);

    let image = first_at(payload, &[&["image"], &["images"]]).and_then(normalize_image);

    let (unit_price, unit_price_unit) = first_at(
        payload,
        &[
            &["unitPrice"],
            &["unit_price"],
            &["pricing", "unitPrice"],
        ],
    )
    .map_or((None, None), normalize_unit_price);

    let kind = Offer::kind_for_price(price);
    let discount_percent = match (kind, &name) {
        (OfferKind::Promotion, Some(n)) => discount_percent_from_name(n),
        _ => None,
    };

    Offer {
        source_url: source_url.to_string(),
        store,
        publication,
        offer_id,
        public_id,
        name,
        price,
        currency,
        unit_price,
        unit_price_unit,
        valid_from,
        valid_through,
        image,
        kind,
        discount_percent,
    }
}

/// Return the first present value among an ordered list of field paths.
/// All schema-variance handling funnels through here.
fn first_at<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    for path in paths {
        let mut node = value;
        let mut found = true;
        for segment in *path {
            match node.get(segment) {
                Some(next) => node = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found && !node.is_null() {
            return Some(node);
        }
    }
    None
}

/// Parse a numeric value that may arrive as a JSON number or as a
/// decimal-comma/decimal-point string.
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

fn string_or_number(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Image fields arrive as a plain URL string, an array of URLs, or an
/// object carrying `url`/`src`.
fn normalize_image(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(normalize_image),
        Value::Object(_) => value
            .get("url")
            .or_else(|| value.get("src"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Unit price arrives as a bare scalar or an object carrying price+unit.
fn normalize_unit_price(value: &Value) -> (Option<f64>, Option<String>) {
    if value.is_object() {
        let price = value.get("price").and_then(parse_number);
        let unit = value
            .get("unit")
            .and_then(Value::as_str)
            .map(str::to_string);
        return (price, unit);
    }
    (parse_number(value), None)
}

/// `publication` and `offer` query parameters from the source URL.
fn url_query_ids(source_url: &str) -> (Option<String>, Option<String>) {
    let Ok(url) = reqwest::Url::parse(source_url) else {
        return (None, None);
    };
    let mut publication = None;
    let mut offer_id = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "publication" => publication = Some(value.into_owned()),
            "offer" => offer_id = Some(value.into_owned()),
            _ => {}
        }
    }
    (publication, offer_id)
}

/// Fallback store name: the first URL path segment, with hyphens
/// restored to spaces ("rema-1000" → "rema 1000").
fn store_from_path(source_url: &str) -> Option<String> {
    let url = reqwest::Url::parse(source_url).ok()?;
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.find(|s| !s.is_empty()))?;
    Some(segment.replace('-', " "))
}
