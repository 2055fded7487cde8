//! Storage key normalization.
//!
//! Maps a free-form display name to the canonical key a participant is
//! stored under. The transformation is total and idempotent: its output
//! alphabet (`[a-z0-9_-]`) is left untouched by every step.

use unicode_normalization::UnicodeNormalization;

/// Key returned when nothing of the name survives normalization.
pub const FALLBACK_KEY: &str = "user";

/// Normalize a display name into a canonical storage key.
///
/// Steps, in order:
///
/// 1. Compatibility decomposition (NFKD), so `í` becomes `i` + combining accent.
/// 2. Lowercase.
/// 3. Spaces become underscores.
/// 4. Every character outside `[a-z0-9_-]` is dropped (this removes the
///    combining marks left by step 1).
/// 5. Runs of underscores collapse to one.
/// 6. Leading and trailing underscores are trimmed.
/// 7. An empty result becomes [`FALLBACK_KEY`].
///
/// ```
/// use gift_survey_core::normalize_key;
///
/// assert_eq!(normalize_key("Maíra Souza"), "maira_souza");
/// assert_eq!(normalize_key("  "), "user");
/// ```
pub fn normalize_key(name: &str) -> String {
    let filtered: String = name
        .nfkd()
        .flat_map(char::to_lowercase)
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-'))
        .collect();

    let mut key = String::with_capacity(filtered.len());
    for c in filtered.chars() {
        if c == '_' && key.ends_with('_') {
            continue;
        }
        key.push(c);
    }

    let key = key.trim_matches('_');
    if key.is_empty() {
        FALLBACK_KEY.to_string()
    } else {
        key.to_string()
    }
}

/// Whether `key` is already in canonical form.
pub fn is_canonical(key: &str) -> bool {
    normalize_key(key) == key
}
