//! Query expansion: one caller query → one or more upstream search terms.
//!
//! Exact-term search is the default. The tables below exist only for
//! categories empirically known to under- or over-match upstream; they
//! are literal behavior, not a pattern to generalize.

use crate::text::normalize_text;

/// Specific fat-content variants searched in place of the generic milk
/// term, which returns a useless result set upstream.
pub const MILK_VARIANTS: [&str; 4] = ["sødmælk", "letmælk", "minimælk", "skummetmælk"];

/// Juice queries that should surface the raw fruit instead: the use
/// case wants ingredients, not processed juice.
pub const JUICE_TO_FRUIT: [(&str, &str); 3] = [
    ("appelsinjuice", "appelsin"),
    ("æblejuice", "æble"),
    ("citronjuice", "citron"),
];

/// True when a normalized query asks for plain milk rather than a
/// specific variant or a flavored product.
#[must_use]
pub fn is_generic_milk_query(normalized: &str) -> bool {
    normalized == "mælk"
}

/// Expand one caller query into upstream search terms.
///
/// Identity for everything not covered by the tables above. All
/// resulting offers are attributed back to the original query by the
/// caller.
#[must_use]
pub fn expand_query(query: &str) -> Vec<String> {
    let normalized = normalize_text(query);

    if is_generic_milk_query(&normalized) {
        return MILK_VARIANTS.iter().map(ToString::to_string).collect();
    }

    for (juice, fruit) in JUICE_TO_FRUIT {
        if normalized == juice {
            return vec![fruit.to_string()];
        }
    }

    vec![query.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_expansion_is_identity() {
        assert_eq!(expand_query("løg"), vec!["løg".to_string()]);
        assert_eq!(expand_query("rugbrød"), vec!["rugbrød".to_string()]);
    }

    #[test]
    fn generic_milk_expands_to_all_variants() {
        let terms = expand_query("mælk");
        assert_eq!(terms.len(), MILK_VARIANTS.len());
        for variant in MILK_VARIANTS {
            assert!(terms.iter().any(|t| t == variant), "missing {variant}");
        }
    }

    #[test]
    fn milk_expansion_triggers_case_insensitively() {
        assert_eq!(expand_query("Mælk").len(), MILK_VARIANTS.len());
        assert_eq!(expand_query("  MÆLK  ").len(), MILK_VARIANTS.len());
    }

    #[test]
    fn specific_milk_variant_is_not_expanded() {
        assert_eq!(expand_query("letmælk"), vec!["letmælk".to_string()]);
    }

    #[test]
    fn juice_queries_expand_to_raw_fruit() {
        // Enumerate the full table; these entries are the contract.
        for (juice, fruit) in JUICE_TO_FRUIT {
            assert_eq!(expand_query(juice), vec![fruit.to_string()], "{juice}");
        }
    }

    #[test]
    fn unlisted_juice_stays_identity() {
        assert_eq!(expand_query("ananasjuice"), vec!["ananasjuice".to_string()]);
    }
}
