//! Company code normalization.
//!
//! A code is lowercased, punctuation is dropped, and every run of whitespace,
//! `-` or `_` between words becomes a single `-`. `"Apple Inc."` becomes
//! `"apple-inc"`. Normalizing an already-normalized code returns it unchanged.

pub fn normalize_code(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for ch in raw.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
        }
    }

    slug
}
