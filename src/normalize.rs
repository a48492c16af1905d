//! Canonical form for node identity.
//!
//! Every disease and symptom string is reduced to the same canonical form
//! before it touches the graph: Unicode NFC, surrounding whitespace trimmed,
//! lowercased. Two strings with the same canonical form name the same node.

use unicode_normalization::UnicodeNormalization;

/// Reduce a raw label to its canonical form.
pub fn canonical(raw: &str) -> String {
    raw.trim().nfc().collect::<String>().to_lowercase()
}

/// Canonicalize, returning `None` for labels that are empty after trimming.
pub fn canonical_nonempty(raw: &str) -> Option<String> {
    let c = canonical(raw);
    if c.is_empty() { None } else { Some(c) }
}

/// Uppercase the first character, for display.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
