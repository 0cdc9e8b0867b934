use deunicode::deunicode;

/// Derive a stable, human-readable identifier from a display name:
/// transliterate to ASCII, lowercase, collapse every run of
/// non-alphanumeric characters to a single hyphen.
///
/// Names differing only in case or whitespace collide; the store uniquifies
/// colliding candidates at insert time, not this function.
pub fn derive_id(name: &str) -> String {
    let transliterated = deunicode(name.trim());

    let mut slug = String::with_capacity(transliterated.len());
    let mut pending_hyphen = false;
    for ch in transliterated.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        // All-punctuation names still need some identifier.
        "item".to_string()
    } else {
        slug
    }
}
