//! Per-query text matching against offer names.
//!
//! The default rule is whole-word containment of any query token of
//! length ≥3. Milk gets a narrow special case: flavored milk products
//! are not a valid substitute for plain milk, so they are excluded by
//! an explicit denylist even though their names contain "mælk". The
//! denylist is authoritative behavior, not a heuristic to extend.

use crate::expand::{is_generic_milk_query, MILK_VARIANTS};
use crate::text::{contains_word, normalize_text, query_tokens};

/// Name markers that disqualify a product from matching a plain-milk
/// query: flavored and processed milk drinks.
pub const FLAVORED_MILK_MARKERS: [&str; 5] =
    ["kakao", "chokolade", "jordbær", "vanilje", "protein"];

/// Does this offer name satisfy the query? Whole-word token matching,
/// with the milk special case described in the module docs.
#[must_use]
pub fn offer_matches_query(name: &str, query: &str) -> bool {
    let name_n = normalize_text(name);
    let query_n = normalize_text(query);

    if name_n.is_empty() || query_n.is_empty() {
        return false;
    }

    if is_generic_milk_query(&query_n) {
        return matches_plain_milk(&name_n);
    }

    query_tokens(&query_n)
        .iter()
        .any(|token| contains_word(&name_n, token))
}

/// Permissive variant: any query token of length ≥3 occurring as a
/// substring of the name. Used where recall beats precision (e.g.
/// compound Danish product names like "rødløg" for "løg").
#[must_use]
pub fn name_contains_query(name: &str, query: &str) -> bool {
    let name_n = normalize_text(name);
    let query_n = normalize_text(query);

    if name_n.is_empty() || query_n.is_empty() {
        return false;
    }

    if is_generic_milk_query(&query_n) {
        return matches_plain_milk(&name_n);
    }

    query_tokens(&query_n)
        .iter()
        .any(|token| name_n.contains(token))
}

/// Plain-milk match: an allowed fat-content variant token, or the whole
/// word "mælk" — minus the flavored denylist.
fn matches_plain_milk(name_normalized: &str) -> bool {
    if FLAVORED_MILK_MARKERS
        .iter()
        .any(|marker| name_normalized.contains(marker))
    {
        return false;
    }

    MILK_VARIANTS
        .iter()
        .any(|variant| contains_word(name_normalized, variant))
        || contains_word(name_normalized, "mælk")
}
