//! Embedded-payload decoding for a single offer page.
//!
//! Offer pages embed their structured state in custom elements whose
//! `key` attribute is a base64-encoded JSON array naming the record
//! type, with an HTML-escaped JSON body as the element text. Only
//! elements whose decoded key is the 2-element `["offer", ...]` form
//! carry offer data. Absence or malformation means "no offer data
//! available", never an error.

use base64::Engine;
use regex::Regex;
use serde_json::Value;

/// Locate and decode the embedded offer payload, if any.
///
/// The first element with a valid offer key and a parseable body wins.
/// The body is HTML-escaped JSON, so it cannot itself contain `<`; the
/// capture runs up to the element's closing tag.
#[must_use]
pub fn decode_offer_payload(html: &str) -> Option<Value> {
    let element_re = Regex::new(
        r#"(?is)<[a-z][a-z0-9-]*\b[^>]*\bkey\s*=\s*"([A-Za-z0-9+/=]+)"[^>]*>([^<]*)<"#,
    )
    .expect("valid regex");

    for cap in element_re.captures_iter(html) {
        let encoded_key = &cap[1];
        let Ok(key_bytes) = base64::engine::general_purpose::STANDARD.decode(encoded_key) else {
            continue;
        };
        let Ok(key) = serde_json::from_slice::<Value>(&key_bytes) else {
            continue;
        };
        if !is_offer_key(&key) {
            continue;
        }

        let body = unescape_html(&cap[2]);
        match serde_json::from_str::<Value>(body.trim()) {
            Ok(payload) => return Some(payload),
            Err(_) => continue,
        }
    }

    None
}

/// The decoded key must be a 2-element array starting with `"offer"`.
fn is_offer_key(key: &Value) -> bool {
    key.as_array().is_some_and(|arr| {
        arr.len() == 2 && arr.first().and_then(Value::as_str) == Some("offer")
    })
}

// `&amp;` last, or double-escaped entities would decode twice.
// Numeric entities (`&#229;`, `&#xE6;`) show up in Danish product
// names; an unrecognized code point is left as-is.
fn unescape_html(s: &str) -> String {
    let numeric_re = Regex::new(r"&#(?:x([0-9a-fA-F]+)|([0-9]+));").expect("valid regex");

    let named = s
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">");
    let numeric = numeric_re.replace_all(&named, |cap: &regex::Captures<'_>| {
        let code = cap.get(1).map_or_else(
            || cap[2].parse::<u32>().ok(),
            |hex| u32::from_str_radix(hex.as_str(), 16).ok(),
        );
        code.and_then(char::from_u32)
            .map_or_else(|| cap[0].to_string(), String::from)
    });
    numeric.replace("&amp;", "&")
}
