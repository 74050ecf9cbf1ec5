//! Canonical offer record produced by the scraper's normalization layer.

use serde::{Deserialize, Serialize};

/// Whether a record carries a fixed price ("offer") or is a
/// percentage-style campaign without one ("promotion").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferKind {
    Offer,
    Promotion,
}

/// A normalized product listing from the upstream deals site.
///
/// `source_url` is the identity key: records without one are never
/// constructed. Every other field is optional because upstream payload
/// schemas vary by offer type; absent data stays absent rather than
/// being guessed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_through: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub kind: OfferKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u8>,
}

impl Offer {
    /// Classify by price presence: a fixed price makes it an offer,
    /// anything else is a promotion.
    #[must_use]
    pub fn kind_for_price(price: Option<f64>) -> OfferKind {
        if price.is_some() {
            OfferKind::Offer
        } else {
            OfferKind::Promotion
        }
    }
}

/// Extract a `NN%` discount figure from an offer name.
///
/// Only values in (0, 100] count; anything else is noise (e.g. "200%"
/// marketing copy or a stray "0%").
#[must_use]
pub fn discount_percent_from_name(name: &str) -> Option<u8> {
    let re = regex::Regex::new(r"(\d{1,3})\s?%").expect("valid regex");
    for cap in re.captures_iter(name) {
        if let Ok(n) = cap[1].parse::<u8>() {
            if n > 0 && n <= 100 {
                return Some(n);
            }
        }
    }
    None
}
