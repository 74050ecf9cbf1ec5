//! Shared text normalization for matching and classification.
//!
//! Upstream offer names and store names mix casing, punctuation, and
//! stray whitespace; everything that compares strings goes through
//! [`normalize_text`] first so the deny/allow tables can stay small.

/// Lowercase, strip punctuation to spaces, collapse whitespace.
///
/// Letters (including æ/ø/å) and digits survive; everything else
/// becomes a single-space separator.
#[must_use]
pub fn normalize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_space = true;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Whitespace tokens of a normalized query, minimum 3 characters.
/// Shorter tokens ("1L", "af", "og") are noise, not search terms.
#[must_use]
pub fn query_tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|t| t.chars().count() >= 3)
        .collect()
}

/// Whole-word (space-delimited) containment on normalized text.
#[must_use]
pub fn contains_word(normalized: &str, word: &str) -> bool {
    normalized.split_whitespace().any(|w| w == word)
}
