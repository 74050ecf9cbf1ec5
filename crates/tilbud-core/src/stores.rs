//! Store classification and junk filtering.
//!
//! Policy: exclude unless recognized. The deny-list removes
//! cross-border and discount-health retailers that show up in the
//! upstream feed; the allow-list names the domestic grocery chains the
//! ranking should cover. Both are explicit constant tables so the
//! policy stays auditable.

use crate::text::normalize_text;

/// Retailers excluded even when their names would otherwise pass the
/// allow-list: cross-border shops and discount-health chains.
pub const STORE_DENYLIST: [&str; 5] = ["fleggaard", "calle", "otto duborg", "normal", "matas"];

/// Known domestic grocery chains, matched as substrings of the
/// normalized store name.
pub const STORE_ALLOWLIST: [&str; 16] = [
    "netto",
    "føtex",
    "bilka",
    "rema 1000",
    "lidl",
    "aldi",
    "coop",
    "superbrugsen",
    "kvickly",
    "dagli brugsen",
    "fakta",
    "meny",
    "spar",
    "min købmand",
    "løvbjerg",
    "abc lavpris",
];

/// Offer-name categories out of scope for an ingredients use case:
/// sweetened beverages, confectionery, alcohol, and juice/saft/most as
/// distinct from whole fruit.
pub const JUNK_NAME_MARKERS: [&str; 14] = [
    "sodavand",
    "energidrik",
    "saftevand",
    "slik",
    "lakrids",
    "vingummi",
    "bolcher",
    "øl",
    "vin",
    "spiritus",
    "vodka",
    "juice",
    "saft",
    "most",
];

/// Is this store a recognized domestic grocery retailer?
///
/// Empty names, deny-listed retailers, and anything not on the
/// allow-list are excluded.
#[must_use]
pub fn is_grocery_store(store: &str) -> bool {
    let normalized = normalize_text(store);
    if normalized.is_empty() {
        return false;
    }
    if STORE_DENYLIST.iter().any(|d| normalized.contains(d)) {
        return false;
    }
    STORE_ALLOWLIST.iter().any(|a| normalized.contains(a))
}

/// Does this offer name fall in a junk category?
#[must_use]
pub fn is_junk_name(name: &str) -> bool {
    let normalized = normalize_text(name);
    JUNK_NAME_MARKERS
        .iter()
        .any(|marker| marker_hit(&normalized, marker))
}

// "øl" must not fire on "løg" and "vin" must not fire on "vindruer";
// markers of up to 3 characters match as whole words only, longer
// markers as plain substrings (so compounds like "æblemost" still hit).
fn marker_hit(normalized: &str, marker: &str) -> bool {
    if marker.chars().count() > 3 {
        return normalized.contains(marker);
    }
    normalized.split_whitespace().any(|w| w == marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_allowlisted_chain_is_accepted() {
        // Enumerate the full table; these entries are the contract.
        for chain in STORE_ALLOWLIST {
            assert!(is_grocery_store(chain), "{chain}");
        }
    }

    #[test]
    fn every_denylisted_retailer_is_rejected() {
        for retailer in STORE_DENYLIST {
            assert!(!is_grocery_store(retailer), "{retailer}");
        }
    }

    #[test]
    fn allowlist_matches_on_normalized_substring() {
        assert!(is_grocery_store("Netto Østerbro"));
        assert!(is_grocery_store("FØTEX"));
        assert!(is_grocery_store("Dagli'Brugsen Gilleleje"));
    }

    #[test]
    fn unknown_or_empty_store_is_excluded() {
        assert!(!is_grocery_store(""));
        assert!(!is_grocery_store("   "));
        assert!(!is_grocery_store("Jysk"));
        assert!(!is_grocery_store("Harald Nyborg"));
    }

    #[test]
    fn every_junk_marker_rejects_a_name() {
        for marker in JUNK_NAME_MARKERS {
            let name = format!("{marker} tilbud");
            assert!(is_junk_name(&name), "{marker}");
        }
    }

    #[test]
    fn junk_filter_passes_plain_ingredients() {
        assert!(!is_junk_name("Løg 1kg"));
        assert!(!is_junk_name("Letmælk 1L"));
        assert!(!is_junk_name("Gulerødder i pose"));
        assert!(!is_junk_name("Æbler, danske"));
    }

    #[test]
    fn short_alcohol_markers_do_not_fire_inside_words() {
        // "øl" as a standalone word is junk; "løg" is not.
        assert!(is_junk_name("Øl 6-pak"));
        assert!(!is_junk_name("Løg i net"));
        assert!(is_junk_name("Vin fra Italien"));
        assert!(!is_junk_name("Vindruer 500g"));
    }

    #[test]
    fn juice_and_saft_are_junk_but_fruit_is_not() {
        assert!(is_junk_name("Appelsinjuice 1L"));
        assert!(is_junk_name("Æblemost"));
        assert!(!is_junk_name("Appelsiner i net"));
    }
}
