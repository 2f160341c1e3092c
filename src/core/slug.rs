use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static INVALID_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("valid slug regex"));

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").expect("valid slug regex"));

/// Slug used when a subject has no characters that survive slugification
const FALLBACK_SLUG: &str = "ticket";

/// Derive a URL-safe slug from free text
///
/// The text is NFKD-normalized and whatever is still not ASCII is dropped,
/// so accents and ligatures decompose to their base letters. Runs of
/// whitespace and hyphens become a single hyphen, and leading/trailing
/// hyphens and underscores are trimmed. Slugs are not unique.
#[must_use]
pub fn slugify(text: &str) -> String {
    let folded: String = text.nfkd().filter(char::is_ascii).collect();
    let lowered = folded.to_lowercase();
    let cleaned = INVALID_CHARS.replace_all(&lowered, "");
    let hyphenated = SEPARATORS.replace_all(cleaned.trim(), "-");
    let slug = hyphenated.trim_matches(|c| c == '-' || c == '_');

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
