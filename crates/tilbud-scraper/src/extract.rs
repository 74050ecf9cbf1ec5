//! Offer-URL discovery from a search-results page.
//!
//! The upstream markup is not contractually stable, so three strategies
//! run in decreasing order of precision and their results are merged:
//! JSON-LD item lists, anchor hrefs, and a raw-text scan as the safety
//! net. A strategy that chokes on malformed data is skipped; extraction
//! never fails, worst case it returns an empty list.

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;

/// Ordered, deduplicated offer URLs found in a search-results page.
///
/// Every candidate passes the same accept filter: HTML entities
/// decoded, root-relative paths rewritten onto `origin`, off-domain
/// URLs and URLs missing the `publication`/`offer` query parameters
/// rejected.
#[must_use]
pub fn extract_offer_urls(html: &str, origin: &str) -> Vec<String> {
    let origin = origin.trim_end_matches('/');
    let mut urls = Vec::new();
    let mut seen = HashSet::new();

    for candidate in itemlist_urls(html) {
        push_url(&mut urls, &mut seen, origin, &candidate);
    }
    for candidate in anchor_urls(html) {
        push_url(&mut urls, &mut seen, origin, &candidate);
    }
    for candidate in raw_scan_urls(html) {
        push_url(&mut urls, &mut seen, origin, &candidate);
    }

    urls
}

/// Accept filter shared by all strategies.
fn push_url(out: &mut Vec<String>, seen: &mut HashSet<String>, origin: &str, candidate: &str) {
    let decoded = candidate.replace("&amp;", "&");
    let absolute = if decoded.starts_with('/') {
        format!("{origin}{decoded}")
    } else {
        decoded
    };

    // Prefix alone is not enough: "https://etilbudsavis.dk.evil.com"
    // starts with the origin but lives on another host.
    let on_origin = absolute
        .strip_prefix(origin)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'));
    if !on_origin {
        return;
    }
    if !(absolute.contains("publication=") && absolute.contains("offer=")) {
        return;
    }
    if seen.insert(absolute.clone()) {
        out.push(absolute);
    }
}

/// Strategy 1: JSON-LD item-list blocks. Precise while the markup
/// holds, brittle when it drifts.
fn itemlist_urls(html: &str) -> Vec<String> {
    let script_re = Regex::new(
        r#"(?is)<script[^>]+type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#,
    )
    .expect("valid regex");

    let mut results = Vec::new();

    for cap in script_re.captures_iter(html) {
        let json_text = match cap.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };

        // Malformed structured data is a skip, not a failure.
        let value: Value = match serde_json::from_str(json_text) {
            Ok(v) => v,
            Err(_) => continue,
        };

        let mut nodes: Vec<&Value> = match &value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        // Many sites wrap structured data in a top-level @graph container.
        let mut expanded = Vec::new();
        for node in &nodes {
            if let Some(graph) = node.get("@graph").and_then(Value::as_array) {
                expanded.extend(graph.iter());
            }
        }
        nodes.extend(expanded);

        for node in nodes {
            let Some(elements) = node.get("itemListElement").and_then(Value::as_array) else {
                continue;
            };
            for element in elements {
                if let Some(url) = item_element_url(element) {
                    results.push(url.to_string());
                }
            }
        }
    }

    results
}

/// A list element's URL may live under several field paths depending on
/// how the upstream renders the list.
fn item_element_url(element: &Value) -> Option<&str> {
    element
        .get("url")
        .or_else(|| element.get("item").and_then(|i| i.get("url")))
        .or_else(|| element.get("item").and_then(|i| i.get("@id")))
        .or_else(|| element.get("mainEntityOfPage"))
        .and_then(Value::as_str)
}

/// Strategy 2: anchor hrefs carrying both required query parameters.
fn anchor_urls(html: &str) -> Vec<String> {
    let re = Regex::new(r#"(?is)<a\b[^>]*\bhref\s*=\s*["']([^"']+)["']"#).expect("valid regex");
    re.captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|href| href.contains("publication=") && href.contains("offer="))
        .collect()
}

/// Strategy 3: raw-text scan for URL-shaped substrings. Guarantees
/// forward progress even if the markup changes entirely.
fn raw_scan_urls(html: &str) -> Vec<String> {
    let re = Regex::new(r#"(?:https?://|/)[^\s"'<>\\]+"#).expect("valid regex");
    re.find_iter(html)
        .map(|m| m.as_str().to_string())
        .filter(|url| url.contains("publication=") && url.contains("offer="))
        .collect()
}
